use log::debug;

use std::collections::BTreeSet;

use crate::config::*;

impl VotingScheme {
    /// The points given to the candidate at position `pos` of a ballot ranking
    /// `m` candidates.
    pub fn points(&self, pos: usize, m: usize) -> u64 {
        match self {
            VotingScheme::Borda => (m - 1 - pos) as u64,
            VotingScheme::Plurality if pos == 0 => 1,
            VotingScheme::Plurality => 0,
            VotingScheme::AntiPlurality if pos + 1 < m => 1,
            VotingScheme::AntiPlurality => 0,
            VotingScheme::VotingForTwo if pos < 2 => 1,
            VotingScheme::VotingForTwo => 0,
        }
    }

    /// Converts a ballot into the points it gives to each candidate.
    pub fn score(&self, ballot: &Ballot) -> ScoreVector {
        let m = ballot.len();
        ballot
            .candidates()
            .iter()
            .enumerate()
            .map(|(pos, c)| (*c, self.points(pos, m)))
            .collect()
    }
}

/// Sums the points of all the ballots.
pub fn aggregate<'a, I>(scheme: VotingScheme, candidates: &[Candidate], ballots: I) -> Tally
where
    I: IntoIterator<Item = &'a Ballot>,
{
    let mut tally = Tally::new(candidates);
    for b in ballots {
        tally.add(&scheme.score(b));
    }
    tally
}

/// The candidate with the most points. Ties are won by the alphabetically
/// earliest candidate.
pub fn winner(tally: &Tally) -> Option<Candidate> {
    let mut best: Option<(Candidate, u64)> = None;
    for (c, points) in tally.iter() {
        best = match best {
            None => Some((c, points)),
            Some((_, best_points)) if points > best_points => Some((c, points)),
            Some((best_c, best_points)) if points == best_points && c < best_c => {
                Some((c, points))
            }
            x => x,
        };
    }
    best.map(|(c, _)| c)
}

/// All the candidates, from the most points to the least. Ties are ordered
/// alphabetically, consistently with the choice of the winner.
pub fn ranking(tally: &Tally) -> Vec<Candidate> {
    let mut res: Vec<(Candidate, u64)> = tally.iter().collect();
    res.sort_by(|(c1, p1), (c2, p2)| p2.cmp(p1).then(c1.cmp(c2)));
    res.into_iter().map(|(c, _)| c).collect()
}

fn percentage(pos: usize, m: usize) -> f64 {
    if m <= 1 {
        return 100.0;
    }
    ((m - 1 - pos) as f64) / ((m - 1) as f64) * 100.0
}

/// The happiness of a voter with the given ballot for an election outcome.
pub fn happiness(ballot: &Ballot, tally: &Tally) -> Happiness {
    let m = ballot.len();
    let my_preference = match winner(tally).and_then(|w| ballot.position(w)) {
        Some(pos) => percentage(pos, m),
        None => 0.0,
    };
    let social_index = match ranking(tally).iter().position(|c| *c == ballot.first()) {
        Some(pos) => percentage(pos, m),
        None => 0.0,
    };
    Happiness {
        my_preference,
        social_index,
    }
}

/// A voter, with its ballot and the points this ballot gives.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Agent {
    name: String,
    ballot: Ballot,
    scores: ScoreVector,
}

impl Agent {
    pub fn new(name: &str, ballot: Ballot, scheme: VotingScheme) -> Agent {
        let scores = scheme.score(&ballot);
        Agent {
            name: name.to_string(),
            ballot,
            scores,
        }
    }

    /// The same agent, casting another ballot.
    pub fn with_ballot(&self, ballot: Ballot, scheme: VotingScheme) -> Agent {
        Agent::new(&self.name, ballot, scheme)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ballot(&self) -> &Ballot {
        &self.ballot
    }

    pub fn scores(&self) -> &ScoreVector {
        &self.scores
    }
}

/// A snapshot of an election: the candidates, the agents with their ballots
/// and the resulting tally.
///
/// An election is a value. Looking at the consequences of a different ballot
/// builds a new election and leaves this one untouched.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    scheme: VotingScheme,
    candidates: Vec<Candidate>,
    agents: Vec<Agent>,
    tally: Tally,
}

impl Election {
    /// Creates an election after checking that every ballot ranks exactly the
    /// given candidates.
    pub fn new(
        scheme: VotingScheme,
        candidates: &[Candidate],
        ballots: Vec<(String, Ballot)>,
    ) -> Result<Election, TacticalErrors> {
        if candidates.is_empty() || ballots.is_empty() {
            return Err(TacticalErrors::EmptyElection);
        }
        let candidate_set: BTreeSet<Candidate> = candidates.iter().cloned().collect();
        if candidate_set.len() != candidates.len() {
            let text: String = candidates.iter().map(|c| c.0).collect();
            return Err(TacticalErrors::MalformedBallot(text));
        }
        for (_, b) in ballots.iter() {
            check_ballot(&candidate_set, b)?;
        }

        let sorted_candidates: Vec<Candidate> = candidate_set.into_iter().collect();
        let agents: Vec<Agent> = ballots
            .into_iter()
            .map(|(name, b)| Agent::new(&name, b, scheme))
            .collect();
        let tally = compute_tally(&sorted_candidates, &agents);
        debug!("Election::new: {} agents, tally: {:?}", agents.len(), tally);
        Ok(Election {
            scheme,
            candidates: sorted_candidates,
            agents,
            tally,
        })
    }

    pub fn scheme(&self) -> VotingScheme {
        self.scheme
    }

    /// The candidates, in alphabetical order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, idx: usize) -> Result<&Agent, TacticalErrors> {
        self.agents.get(idx).ok_or(TacticalErrors::UnknownAgent(idx))
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn winner(&self) -> Candidate {
        // The tally always contains at least one candidate.
        winner(&self.tally).unwrap_or(self.candidates[0])
    }

    pub fn ranking(&self) -> Vec<Candidate> {
        ranking(&self.tally)
    }

    pub fn happiness(&self, idx: usize) -> Result<Happiness, TacticalErrors> {
        Ok(happiness(self.agent(idx)?.ballot(), &self.tally))
    }

    pub fn overall_happiness(&self) -> Happiness {
        self.overall_happiness_for(&self.tally)
    }

    /// The average happiness of the agents of this election, for another
    /// election outcome.
    pub fn overall_happiness_for(&self, tally: &Tally) -> Happiness {
        let n = self.agents.len() as f64;
        let mut res = Happiness::default();
        for a in self.agents.iter() {
            let h = happiness(a.ballot(), tally);
            res.my_preference += h.my_preference;
            res.social_index += h.social_index;
        }
        res.my_preference /= n;
        res.social_index /= n;
        res
    }

    /// The tally of all the agents but one.
    pub fn tally_without(&self, idx: usize) -> Tally {
        let mut res = self.tally.clone();
        if let Some(a) = self.agents.get(idx) {
            res.subtract(a.scores());
        }
        res
    }

    /// A new election in which one agent casts the given ballot.
    pub fn with_ballot(&self, idx: usize, ballot: Ballot) -> Result<Election, TacticalErrors> {
        self.agent(idx)?;
        let candidate_set: BTreeSet<Candidate> = self.candidates.iter().cloned().collect();
        check_ballot(&candidate_set, &ballot)?;
        Ok(self.replace_ballot(idx, ballot))
    }

    // The ballot must rank the candidates of this election.
    pub(crate) fn replace_ballot(&self, idx: usize, ballot: Ballot) -> Election {
        self.replace_ballots(&[(idx, ballot)])
    }

    pub(crate) fn replace_ballots(&self, ballots: &[(usize, Ballot)]) -> Election {
        let mut agents = self.agents.clone();
        for (idx, b) in ballots.iter() {
            agents[*idx] = agents[*idx].with_ballot(b.clone(), self.scheme);
        }
        let tally = compute_tally(&self.candidates, &agents);
        Election {
            scheme: self.scheme,
            candidates: self.candidates.clone(),
            agents,
            tally,
        }
    }
}

fn compute_tally(candidates: &[Candidate], agents: &[Agent]) -> Tally {
    let mut tally = Tally::new(candidates);
    for a in agents.iter() {
        tally.add(a.scores());
    }
    tally
}

fn check_ballot(candidates: &BTreeSet<Candidate>, ballot: &Ballot) -> Result<(), TacticalErrors> {
    let ballot_set: BTreeSet<Candidate> = ballot.candidates().iter().cloned().collect();
    if ballot.len() != candidates.len() || ballot_set != *candidates {
        return Err(TacticalErrors::MalformedBallot(ballot.to_string()));
    }
    Ok(())
}
