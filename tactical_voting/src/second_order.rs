// Interactions between the tactical options of several agents.

use log::{debug, info};

use crate::config::*;
use crate::election::Election;
use crate::tactical_options;

/// The best option for a happiness metric.
///
/// The option with the highest value of the metric is selected. In case of a
/// tie, the option with the smallest winner is preferred, then the option
/// found first.
pub fn best_option<'a, I>(options: I, kind: HappinessKind) -> Option<(usize, &'a TacticalOption)>
where
    I: IntoIterator<Item = (&'a usize, &'a TacticalOption)>,
{
    let mut best: Option<(usize, &'a TacticalOption)> = None;
    for (idx, opt) in options {
        let value = *opt.happiness.get(kind);
        let better = match best {
            None => true,
            Some((best_idx, b)) => {
                let best_value = *b.happiness.get(kind);
                value > best_value
                    || (value == best_value && opt.winner < b.winner)
                    || (value == best_value && opt.winner == b.winner && *idx < best_idx)
            }
        };
        if better {
            best = Some((*idx, opt));
        }
    }
    best
}

/// For each other agent, how the tactical options of an agent change once
/// the other agent has cast its own best tactical ballot.
///
/// Only one level of reaction is considered: the other agents do not react
/// in turn.
pub fn counter_vote(
    election: &Election,
    agent_idx: usize,
    rules: &AnalysisRules,
) -> Result<CounterVotes, TacticalErrors> {
    let agent = election.agent(agent_idx)?;
    let mut res = CounterVotes::default();
    for (other_idx, other) in election.agents().iter().enumerate() {
        if other_idx == agent_idx {
            continue;
        }
        let other_options = tactical_options(election, other_idx, rules)?;
        for kind in HappinessKind::ALL {
            let deviation = match best_option(other_options.get(kind), kind) {
                None => None,
                Some((_, opt)) => {
                    let committed = election.replace_ballot(other_idx, opt.ballot.clone());
                    let counter = tactical_options(&committed, agent_idx, rules)?;
                    debug!(
                        "counter_vote: {} plays {} for {}: {} counter options for {}",
                        other.name(),
                        opt.ballot,
                        kind.label(),
                        counter.get(kind).len(),
                        agent.name()
                    );
                    Some(CounterDeviation {
                        ballot: opt.ballot.clone(),
                        tally: committed.tally().clone(),
                        ranking: committed.ranking(),
                        counter_options: counter.get(kind).clone(),
                    })
                }
            };
            res.get_mut(kind).push(CounterVote {
                other_agent: other.name().to_string(),
                deviation,
            });
        }
    }
    Ok(res)
}

/// The outcome of the election when all the agents vote tactically at the
/// same time, each one believing it is the only one to do so.
///
/// An agent only deviates with an option that makes the first candidate of
/// its tactical ballot win.
pub fn concurrent_vote(
    election: &Election,
    rules: &AnalysisRules,
) -> Result<ConcurrentVotes, TacticalErrors> {
    let mut all_options: Vec<TacticalOptions> = Vec::new();
    for idx in 0..election.agents().len() {
        all_options.push(tactical_options(election, idx, rules)?);
    }
    Ok(PerHappiness::from_fn(|kind| {
        concurrent_outcome(election, &all_options, kind)
    }))
}

fn concurrent_outcome(
    election: &Election,
    all_options: &[TacticalOptions],
    kind: HappinessKind,
) -> ConcurrentOutcome {
    let mut deviations: Vec<(usize, Ballot)> = Vec::new();
    let mut choices: Vec<ConcurrentChoice> = Vec::new();
    for (idx, (agent, options)) in election.agents().iter().zip(all_options).enumerate() {
        let accepted = options
            .get(kind)
            .iter()
            .filter(|(_, opt)| opt.winner == opt.ballot.first());
        let ballot = match best_option(accepted, kind) {
            Some((_, opt)) => {
                deviations.push((idx, opt.ballot.clone()));
                opt.ballot.clone()
            }
            None => agent.ballot().clone(),
        };
        choices.push(ConcurrentChoice {
            agent: agent.name().to_string(),
            sincere: &ballot == agent.ballot(),
            ballot,
        });
    }
    let outcome = election.replace_ballots(&deviations);
    info!(
        "Concurrent voting for {}: {} agents deviate, winner: {}",
        kind.label(),
        deviations.len(),
        outcome.winner()
    );
    ConcurrentOutcome {
        winner: outcome.winner(),
        tally: outcome.tally().clone(),
        choices,
    }
}
