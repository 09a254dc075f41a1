use std::collections::BTreeSet;

use log::debug;

pub use crate::config::*;
use crate::election::Election;

/// A builder for setting up an election.
///
/// ```
/// pub use tactical_voting::builder::Builder;
/// pub use tactical_voting::{AnalysisRules, Candidate};
/// # use tactical_voting::TacticalErrors;
///
/// let mut builder = Builder::new(&AnalysisRules::DEFAULT_RULES)?
///     .candidates("ABC")?;
///
/// builder.add_ballot("Anna", "ABC")?;
/// builder.add_ballot("Bob", "BAC")?;
///
/// let election = builder.build()?;
/// assert_eq!(election.winner(), Candidate('A'));
///
/// # Ok::<(), TacticalErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AnalysisRules,
    pub(crate) _candidates: Option<Vec<Candidate>>,
    pub(crate) _ballots: Vec<(String, Ballot)>,
}

impl Builder {
    pub fn new(rules: &AnalysisRules) -> Result<Builder, TacticalErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _candidates: None,
            _ballots: Vec::new(),
        })
    }

    /// Sets the candidates, written as a string of single letters ("ABC").
    ///
    /// If no candidates are provided, they are inferred from the first ballot.
    pub fn candidates(self, cands: &str) -> Result<Builder, TacticalErrors> {
        let parsed = Ballot::parse(cands)?;
        Ok(Builder {
            _rules: self._rules,
            _candidates: Some(parsed.candidates().to_vec()),
            _ballots: Vec::new(),
        })
    }

    /// Adds the sincere ballot of an agent, written from the most preferred
    /// candidate to the least preferred one ("ACB").
    pub fn add_ballot(&mut self, name: &str, ballot: &str) -> Result<(), TacticalErrors> {
        self.add_ballot_2(name, Ballot::parse(ballot)?)
    }

    pub fn add_ballot_2(&mut self, name: &str, ballot: Ballot) -> Result<(), TacticalErrors> {
        if let Some(cands) = self._candidates.as_deref() {
            let expected: BTreeSet<&Candidate> = cands.iter().collect();
            let found: BTreeSet<&Candidate> = ballot.candidates().iter().collect();
            if expected != found {
                return Err(TacticalErrors::MalformedBallot(ballot.to_string()));
            }
        }
        self._ballots.push((name.to_string(), ballot));
        Ok(())
    }

    /// Adds pseudo-random ballots. The candidates must have been set.
    pub fn add_random_ballots(&mut self, voters: usize, seed: u32) -> Result<(), TacticalErrors> {
        let cands = self
            ._candidates
            .clone()
            .ok_or(TacticalErrors::EmptyElection)?;
        self._ballots.extend(random_ballots(&cands, voters, seed));
        Ok(())
    }

    pub fn build(self) -> Result<Election, TacticalErrors> {
        let cands: Vec<Candidate> = match self._candidates {
            Some(cands) => cands,
            None => match self._ballots.first() {
                Some((_, b)) => b.candidates().to_vec(),
                None => return Err(TacticalErrors::EmptyElection),
            },
        };
        Election::new(self._rules.scheme, &cands, self._ballots)
    }
}

/// Generates ballots that are hard to guess in advance, but always the same
/// for the same seed.
///
/// The order of the candidates for agent `k` follows the SHA-256 digests of
/// the seed, the agent number and the candidate. The agents are called
/// `Agent1` to `AgentN`.
pub fn random_ballots(candidates: &[Candidate], voters: usize, seed: u32) -> Vec<(String, Ballot)> {
    if candidates.is_empty() {
        return vec![];
    }
    (1..=voters)
        .map(|k| {
            let mut order = candidates.to_vec();
            order.sort_by_cached_key(|c| sha256::digest(format!("{:08}{:08}{}", seed, k, c)));
            let ballot = Ballot::from_order(order);
            debug!("random_ballots: seed: {} Agent{}: {}", seed, k, ballot);
            (format!("Agent{}", k), ballot)
        })
        .collect()
}
