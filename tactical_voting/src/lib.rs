mod borda;
pub mod builder;
mod config;
mod election;
mod heuristics;
pub mod manual;
mod second_order;
pub mod stats;

use log::{debug, info};

pub use crate::config::*;
pub use crate::election::{aggregate, happiness, ranking, winner, Agent, Election};
pub use crate::second_order::{best_option, concurrent_vote, counter_vote};

/// Finds the ballots with which an agent could improve the outcome of the
/// election for itself, assuming that all the other agents keep their ballots.
///
/// Arguments:
/// * `election` the election, with the sincere ballots of all the agents
/// * `agent_idx` the index of the agent that deviates
/// * `rules` the scoring rule and the maximum number of options per metric.
///   The scoring rule must be the one of the election.
///
/// The options are grouped by the happiness metric they improve, and indexed
/// by the order in which they were found. An agent without any option gets
/// two empty maps: this is not an error.
pub fn tactical_options(
    election: &Election,
    agent_idx: usize,
    rules: &AnalysisRules,
) -> Result<TacticalOptions, TacticalErrors> {
    let agent = election.agent(agent_idx)?;
    if election.scheme() != rules.scheme {
        return Err(TacticalErrors::SchemeMismatch(election.scheme(), rules.scheme));
    }
    let limit = rules.option_limit;
    let res = match election.scheme() {
        VotingScheme::Borda => borda::tactical_options(election, agent_idx, limit),
        VotingScheme::Plurality => heuristics::plurality(election, agent_idx, limit),
        VotingScheme::AntiPlurality => heuristics::anti_plurality(election, agent_idx, limit),
        VotingScheme::VotingForTwo => heuristics::voting_for_two(election, agent_idx, limit),
    };
    info!(
        "Agent {}: {} options for {}, {} options for {}",
        agent.name(),
        res.my_preference.len(),
        HappinessKind::MyPreference.label(),
        res.social_index.len(),
        HappinessKind::SocialIndex.label()
    );
    Ok(res)
}

/// Computes the outcome of one deviating ballot.
///
/// The ballot must rank all the candidates of the election. The happiness
/// of the agent is measured against its sincere ballot.
pub(crate) fn evaluate_option(election: &Election, idx: usize, ballot: Ballot) -> TacticalOption {
    let sincere = election.agents()[idx].ballot();
    let deviated = election.replace_ballot(idx, ballot.clone());
    let tally = deviated.tally().clone();
    let winner = deviated.winner();
    let happiness = happiness(sincere, &tally);
    let overall_happiness = election.overall_happiness_for(&tally);
    debug!(
        "evaluate_option: agent: {} ballot: {} winner: {} tally: {:?}",
        idx, ballot, winner, tally
    );
    TacticalOption {
        ballot,
        winner,
        tally,
        happiness,
        overall_happiness,
    }
}

pub(crate) fn evaluate_options<I>(election: &Election, idx: usize, ballots: I) -> OptionSet
where
    I: IntoIterator<Item = (usize, Ballot)>,
{
    ballots
        .into_iter()
        .map(|(i, b)| (i, evaluate_option(election, idx, b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn c(x: char) -> Candidate {
        Candidate(x)
    }

    fn b(s: &str) -> Ballot {
        Ballot::parse(s).unwrap()
    }

    fn election(scheme: VotingScheme, candidates: &str, ballots: &[&str]) -> Election {
        let cands: Vec<Candidate> = candidates.chars().map(Candidate).collect();
        let ballots: Vec<(String, Ballot)> = ballots
            .iter()
            .enumerate()
            .map(|(idx, x)| (format!("Agent{}", idx + 1), b(x)))
            .collect();
        Election::new(scheme, &cands, ballots).unwrap()
    }

    fn rules(scheme: VotingScheme) -> AnalysisRules {
        AnalysisRules {
            scheme,
            ..AnalysisRules::DEFAULT_RULES
        }
    }

    #[test]
    fn borda_compromise() {
        init();
        let e = election(VotingScheme::Borda, "ABC", &["ABC", "BAC", "BAC"]);
        assert_eq!(
            e.tally(),
            &Tally::from_scores(&[(c('A'), 4), (c('B'), 5), (c('C'), 0)])
        );
        assert_eq!(e.winner(), c('B'));
        let res = tactical_options(&e, 0, &rules(VotingScheme::Borda)).unwrap();
        let opt = &res.my_preference[&0];
        assert_eq!(opt.ballot, b("ACB"));
        assert_eq!(opt.winner, c('A'));
        assert_eq!(
            opt.tally,
            Tally::from_scores(&[(c('A'), 4), (c('B'), 4), (c('C'), 1)])
        );
        assert_eq!(opt.happiness.my_preference, 100.0);
        assert!(res.my_preference.len() <= 20);
    }

    #[test]
    fn options_are_sound() {
        init();
        for scheme in VotingScheme::ALL {
            let e = election(
                scheme,
                "ABCD",
                &["ABCD", "BCDA", "CDAB", "DCBA", "BADC", "CABD", "ADCB"],
            );
            for idx in 0..e.agents().len() {
                let res = tactical_options(&e, idx, &rules(scheme)).unwrap();
                for kind in HappinessKind::ALL {
                    for opt in res.get(kind).values() {
                        let check = e.with_ballot(idx, opt.ballot.clone()).unwrap();
                        assert_eq!(check.tally(), &opt.tally);
                        assert_eq!(check.winner(), opt.winner);
                    }
                }
            }
        }
    }

    #[test]
    fn options_are_bounded() {
        let e = election(
            VotingScheme::Borda,
            "ABCDE",
            &["EDCBA", "BACDE", "BCADE", "CBADE", "ABCDE"],
        );
        let r = AnalysisRules {
            option_limit: 2,
            ..AnalysisRules::DEFAULT_RULES
        };
        for idx in 0..e.agents().len() {
            let res = tactical_options(&e, idx, &r).unwrap();
            assert!(res.my_preference.len() <= 2);
            assert!(res.social_index.len() <= 2);
        }
    }

    #[test]
    fn unknown_agent() {
        let e = election(VotingScheme::Plurality, "AB", &["AB", "BA"]);
        assert_eq!(
            tactical_options(&e, 2, &rules(VotingScheme::Plurality)),
            Err(TacticalErrors::UnknownAgent(2))
        );
    }

    #[test]
    fn scheme_mismatch() {
        let e = election(VotingScheme::Borda, "ABC", &["ABC", "BAC", "BAC"]);
        assert_eq!(
            tactical_options(&e, 0, &rules(VotingScheme::Plurality)),
            Err(TacticalErrors::SchemeMismatch(VotingScheme::Borda, VotingScheme::Plurality))
        );
        assert!(counter_vote(&e, 0, &rules(VotingScheme::AntiPlurality)).is_err());
        assert!(tactical_options(&e, 0, &rules(VotingScheme::Borda)).is_ok());
    }

    #[test]
    fn single_candidate_has_no_options() {
        for scheme in VotingScheme::ALL {
            let e = election(scheme, "A", &["A", "A"]);
            let res = tactical_options(&e, 0, &rules(scheme)).unwrap();
            assert!(res.my_preference.is_empty());
            assert!(res.social_index.is_empty());
            assert_eq!(e.happiness(0).unwrap().my_preference, 100.0);
        }
    }
}
