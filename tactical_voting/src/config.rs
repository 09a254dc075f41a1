// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// A candidate in an election.
///
/// Candidates are identified by a single character and are totally ordered.
/// This order is the one used to break all the ties: the alphabetically
/// earliest candidate wins.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct Candidate(pub char);

impl Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ordered preferences of a voter, from the most preferred candidate to
/// the least preferred one.
///
/// A ballot never contains the same candidate twice and is never empty. It
/// is never edited in place: all the transformations return a new ballot.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot(Vec<Candidate>);

impl Ballot {
    pub fn new(candidates: Vec<Candidate>) -> Result<Ballot, TacticalErrors> {
        if candidates.is_empty() {
            return Err(TacticalErrors::MalformedBallot(String::new()));
        }
        for (idx, c) in candidates.iter().enumerate() {
            if candidates[..idx].contains(c) {
                let text: String = candidates.iter().map(|c| c.0).collect();
                return Err(TacticalErrors::MalformedBallot(text));
            }
        }
        Ok(Ballot(candidates))
    }

    /// Reads a ballot written as a string of candidates, for example `ACB`.
    /// Whitespace and commas are ignored.
    pub fn parse(s: &str) -> Result<Ballot, TacticalErrors> {
        Ballot::new(
            s.chars()
                .filter(|c| !c.is_whitespace() && *c != ',')
                .map(Candidate)
                .collect(),
        )
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The most preferred candidate.
    pub fn first(&self) -> Candidate {
        self.0[0]
    }

    pub fn last(&self) -> Candidate {
        self.0[self.0.len() - 1]
    }

    pub fn position(&self, candidate: Candidate) -> Option<usize> {
        self.0.iter().position(|c| *c == candidate)
    }

    /// A copy of this ballot with the candidates at positions `i` and `j` exchanged.
    pub fn swapped(&self, i: usize, j: usize) -> Ballot {
        let mut res = self.0.clone();
        res.swap(i, j);
        Ballot(res)
    }

    // No validation: callers guarantee a permutation of a valid ballot.
    pub(crate) fn from_order(candidates: Vec<Candidate>) -> Ballot {
        Ballot(candidates)
    }
}

impl Display for Ballot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in self.0.iter() {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// The points that a single ballot gives to each candidate.
pub type ScoreVector = BTreeMap<Candidate, u64>;

/// The accumulated points of all the candidates of an election.
///
/// All the candidates of the election are present, even without any point.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Tally(BTreeMap<Candidate, u64>);

impl Tally {
    /// An empty tally: all the candidates start with zero points.
    pub fn new(candidates: &[Candidate]) -> Tally {
        Tally(candidates.iter().map(|c| (*c, 0)).collect())
    }

    pub fn from_scores(scores: &[(Candidate, u64)]) -> Tally {
        Tally(scores.iter().cloned().collect())
    }

    pub fn get(&self, candidate: Candidate) -> u64 {
        self.0.get(&candidate).cloned().unwrap_or(0)
    }

    pub fn add(&mut self, scores: &ScoreVector) {
        for (c, points) in scores.iter() {
            *self.0.entry(*c).or_insert(0) += *points;
        }
    }

    pub fn subtract(&mut self, scores: &ScoreVector) {
        for (c, points) in scores.iter() {
            if let Some(v) = self.0.get_mut(c) {
                *v -= *points;
            }
        }
    }

    /// The candidates and their points, in candidate order.
    pub fn iter(&self) -> impl Iterator<Item = (Candidate, u64)> + '_ {
        self.0.iter().map(|(c, v)| (*c, *v))
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.0.keys().cloned().collect()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ******** Output data structures *********

/// The two ways of measuring the happiness of an agent.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum HappinessKind {
    /// `H_p`: how high the winner sits in the agent's own ballot.
    MyPreference,
    /// `H_si`: how high the agent's favourite candidate sits in the election results.
    SocialIndex,
}

impl HappinessKind {
    pub const ALL: [HappinessKind; 2] = [HappinessKind::MyPreference, HappinessKind::SocialIndex];

    pub fn label(&self) -> &'static str {
        match self {
            HappinessKind::MyPreference => "H_p",
            HappinessKind::SocialIndex => "H_si",
        }
    }
}

/// A value for each of the happiness measures.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct PerHappiness<T> {
    pub my_preference: T,
    pub social_index: T,
}

impl<T> PerHappiness<T> {
    pub fn get(&self, kind: HappinessKind) -> &T {
        match kind {
            HappinessKind::MyPreference => &self.my_preference,
            HappinessKind::SocialIndex => &self.social_index,
        }
    }

    pub fn get_mut(&mut self, kind: HappinessKind) -> &mut T {
        match kind {
            HappinessKind::MyPreference => &mut self.my_preference,
            HappinessKind::SocialIndex => &mut self.social_index,
        }
    }

    pub fn from_fn<F: FnMut(HappinessKind) -> T>(mut f: F) -> PerHappiness<T> {
        PerHappiness {
            my_preference: f(HappinessKind::MyPreference),
            social_index: f(HappinessKind::SocialIndex),
        }
    }
}

/// Happiness values, as percentages between 0 and 100.
pub type Happiness = PerHappiness<f64>;

/// A ballot that an agent may cast instead of its sincere one, and what
/// would happen to the election.
#[derive(PartialEq, Debug, Clone)]
pub struct TacticalOption {
    pub ballot: Ballot,
    pub winner: Candidate,
    pub tally: Tally,
    /// The happiness of the agent, still measured with its sincere preferences.
    pub happiness: Happiness,
    /// The average happiness of all the agents.
    pub overall_happiness: Happiness,
}

/// The options found for one happiness measure, indexed by the order in
/// which they were found (or by the ballot position that was swapped).
pub type OptionSet = BTreeMap<usize, TacticalOption>;

pub type TacticalOptions = PerHappiness<OptionSet>;

/// The best deviation of another agent, and what is left for the agent
/// under study after it.
#[derive(PartialEq, Debug, Clone)]
pub struct CounterDeviation {
    pub ballot: Ballot,
    pub tally: Tally,
    pub ranking: Vec<Candidate>,
    pub counter_options: OptionSet,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CounterVote {
    pub other_agent: String,
    /// `None` if the other agent has no tactical option: the agent under
    /// study is not affected by it.
    pub deviation: Option<CounterDeviation>,
}

pub type CounterVotes = PerHappiness<Vec<CounterVote>>;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ConcurrentChoice {
    pub agent: String,
    pub ballot: Ballot,
    pub sincere: bool,
}

/// The outcome of an election in which all the agents applied their best
/// tactical option at the same time.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ConcurrentOutcome {
    pub winner: Candidate,
    pub tally: Tally,
    pub choices: Vec<ConcurrentChoice>,
}

pub type ConcurrentVotes = PerHappiness<ConcurrentOutcome>;

/// Errors that prevent the analysis from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TacticalErrors {
    /// The name of the voting scheme is not one of the supported ones.
    UnsupportedScheme(String),
    /// The rules ask for another scheme than the one of the election
    /// (election scheme, rules scheme).
    SchemeMismatch(VotingScheme, VotingScheme),
    EmptyElection,
    /// A ballot with duplicate or unknown candidates, or one that does not
    /// rank all the candidates of the election.
    MalformedBallot(String),
    UnknownAgent(usize),
}

impl Error for TacticalErrors {}

impl Display for TacticalErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TacticalErrors::UnsupportedScheme(name) => {
                write!(f, "{} has not been implemented", name)
            }
            TacticalErrors::SchemeMismatch(election, rules) => write!(
                f,
                "the election uses {} but the analysis asks for {}",
                election, rules
            ),
            TacticalErrors::EmptyElection => write!(f, "the election has no candidate or no voter"),
            TacticalErrors::MalformedBallot(b) => write!(f, "malformed ballot: {:?}", b),
            TacticalErrors::UnknownAgent(idx) => write!(f, "no agent at index {}", idx),
        }
    }
}

// ********* Configuration **********

/// The positional scoring rules.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VotingScheme {
    /// Position `i` out of `m` candidates gets `m - 1 - i` points.
    Borda,
    /// One point for the first choice.
    Plurality,
    /// One point for every choice but the last one.
    AntiPlurality,
    /// One point for each of the first two choices.
    VotingForTwo,
}

impl VotingScheme {
    pub const ALL: [VotingScheme; 4] = [
        VotingScheme::Borda,
        VotingScheme::Plurality,
        VotingScheme::AntiPlurality,
        VotingScheme::VotingForTwo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VotingScheme::Borda => "Borda",
            VotingScheme::Plurality => "Plurality",
            VotingScheme::AntiPlurality => "AntiPlurality",
            VotingScheme::VotingForTwo => "VotingForTwo",
        }
    }
}

impl Display for VotingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for VotingScheme {
    type Err = TacticalErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "borda" => Ok(VotingScheme::Borda),
            "plurality" => Ok(VotingScheme::Plurality),
            "antiplurality" => Ok(VotingScheme::AntiPlurality),
            "votingfortwo" => Ok(VotingScheme::VotingForTwo),
            _ => Err(TacticalErrors::UnsupportedScheme(s.to_string())),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnalysisRules {
    pub scheme: VotingScheme,
    /// Maximum number of tactical options returned for each happiness measure.
    pub option_limit: usize,
    /// Also run the counter voting and concurrent voting analyses.
    pub advanced: bool,
}

impl AnalysisRules {
    pub const DEFAULT_RULES: AnalysisRules = AnalysisRules {
        scheme: VotingScheme::Borda,
        option_limit: 20,
        advanced: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ballot() {
        let b = Ballot::parse("A C, B").unwrap();
        assert_eq!(
            b.candidates(),
            &[Candidate('A'), Candidate('C'), Candidate('B')]
        );
        assert_eq!(b.to_string(), "ACB");
        assert_eq!(b.first(), Candidate('A'));
        assert_eq!(b.last(), Candidate('B'));
        assert_eq!(b.swapped(0, 2).to_string(), "BCA");
    }

    #[test]
    fn duplicate_candidates_are_rejected() {
        assert_eq!(
            Ballot::parse("ABA"),
            Err(TacticalErrors::MalformedBallot("ABA".to_string()))
        );
        assert!(Ballot::parse("").is_err());
    }

    #[test]
    fn scheme_names() {
        assert_eq!("Borda".parse::<VotingScheme>(), Ok(VotingScheme::Borda));
        assert_eq!(
            "anti-plurality".parse::<VotingScheme>(),
            Ok(VotingScheme::AntiPlurality)
        );
        assert_eq!(
            "VotingForTwo".parse::<VotingScheme>(),
            Ok(VotingScheme::VotingForTwo)
        );
        for s in VotingScheme::ALL {
            assert_eq!(s.name().parse::<VotingScheme>(), Ok(s));
        }
        assert_eq!(
            "Copeland".parse::<VotingScheme>(),
            Err(TacticalErrors::UnsupportedScheme("Copeland".to_string()))
        );
    }
}
