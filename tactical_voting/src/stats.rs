//! Summary statistics about how exposed an election is to tactical voting.

use log::info;

use crate::config::*;
use crate::election::{happiness, Election};
use crate::second_order::{best_option, concurrent_vote, counter_vote};
use crate::tactical_options;

#[derive(PartialEq, Debug, Clone, Default)]
pub struct ElectionStats {
    /// The average happiness with the sincere ballots.
    pub overall_happiness: Happiness,
    /// The fraction of the agents (between 0 and 1) that have at least one
    /// tactical option.
    pub risk: Happiness,
    /// The average gain of happiness of the agents that have an option, when
    /// they use their best option.
    pub average_increase: Happiness,
    /// The average happiness when all the agents vote tactically at the same time.
    /// Only filled with the advanced analysis.
    pub concurrent_happiness: Option<Happiness>,
    /// The change of the average happiness when all the agents vote
    /// tactically at the same time.
    pub concurrent_change: Option<Happiness>,
    /// The average happiness after an agent answers the best tactical ballot
    /// of another agent, over all the pairs where the other agent deviates.
    /// None without the advanced analysis or without any deviation.
    pub counter_happiness: PerHappiness<Option<f64>>,
    /// The average change of the happiness of the answering agent, compared
    /// to the sincere election.
    pub counter_change: PerHappiness<Option<f64>>,
}

pub fn election_stats(
    election: &Election,
    rules: &AnalysisRules,
) -> Result<ElectionStats, TacticalErrors> {
    let n = election.agents().len();
    let overall_happiness = election.overall_happiness();
    let mut with_options = PerHappiness::<usize>::default();
    let mut increase = Happiness::default();
    for (idx, agent) in election.agents().iter().enumerate() {
        let current = happiness(agent.ballot(), election.tally());
        let options = tactical_options(election, idx, rules)?;
        for kind in HappinessKind::ALL {
            if let Some((_, opt)) = best_option(options.get(kind), kind) {
                *with_options.get_mut(kind) += 1;
                *increase.get_mut(kind) += opt.happiness.get(kind) - current.get(kind);
            }
        }
    }

    let risk = PerHappiness::from_fn(|kind| *with_options.get(kind) as f64 / n as f64);
    let average_increase = PerHappiness::from_fn(|kind| match *with_options.get(kind) {
        0 => 0.0,
        k => increase.get(kind) / k as f64,
    });

    let (concurrent_happiness, concurrent_change) = if rules.advanced {
        let outcome = concurrent_vote(election, rules)?;
        let h = PerHappiness::from_fn(|kind| {
            *election
                .overall_happiness_for(&outcome.get(kind).tally)
                .get(kind)
        });
        let change = PerHappiness::from_fn(|kind| h.get(kind) - overall_happiness.get(kind));
        (Some(h), Some(change))
    } else {
        (None, None)
    };

    let (counter_happiness, counter_change) = if rules.advanced {
        counter_stats(election, rules)?
    } else {
        Default::default()
    };

    let res = ElectionStats {
        overall_happiness,
        risk,
        average_increase,
        concurrent_happiness,
        concurrent_change,
        counter_happiness,
        counter_change,
    };
    info!("election_stats: {:?}", res);
    Ok(res)
}

type CounterStats = (PerHappiness<Option<f64>>, PerHappiness<Option<f64>>);

// For each agent and each other agent that deviates, the agent answers with
// its own best option if it has one, and keeps its sincere ballot otherwise.
fn counter_stats(
    election: &Election,
    rules: &AnalysisRules,
) -> Result<CounterStats, TacticalErrors> {
    let mut overall = Happiness::default();
    let mut change = Happiness::default();
    let mut count = PerHappiness::<usize>::default();
    for (idx, agent) in election.agents().iter().enumerate() {
        let old = happiness(agent.ballot(), election.tally());
        let votes = counter_vote(election, idx, rules)?;
        for kind in HappinessKind::ALL {
            for dev in votes.get(kind).iter().flat_map(|v| &v.deviation) {
                let (tally, new) = match best_option(&dev.counter_options, kind) {
                    Some((_, best)) => (&best.tally, *best.happiness.get(kind)),
                    None => (&dev.tally, *happiness(agent.ballot(), &dev.tally).get(kind)),
                };
                *overall.get_mut(kind) += election.overall_happiness_for(tally).get(kind);
                *change.get_mut(kind) += new - old.get(kind);
                *count.get_mut(kind) += 1;
            }
        }
    }
    Ok((mean(&overall, &count), mean(&change, &count)))
}

fn mean(sums: &Happiness, count: &PerHappiness<usize>) -> PerHappiness<Option<f64>> {
    PerHappiness::from_fn(|kind| match *count.get(kind) {
        0 => None,
        k => Some(sums.get(kind) / k as f64),
    })
}

fn average(values: &[&Happiness]) -> Happiness {
    let n = values.len().max(1) as f64;
    PerHappiness::from_fn(|kind| values.iter().map(|h| h.get(kind)).sum::<f64>() / n)
}

// Only the values that are present are counted.
fn average_some(values: &[&PerHappiness<Option<f64>>]) -> PerHappiness<Option<f64>> {
    PerHappiness::from_fn(|kind| {
        let present: Vec<f64> = values.iter().filter_map(|h| *h.get(kind)).collect();
        match present.len() {
            0 => None,
            k => Some(present.iter().sum::<f64>() / k as f64),
        }
    })
}

/// Averages the statistics of several elections.
///
/// The concurrent statistics are only kept if all the elections have them.
/// The counter statistics are averaged over the elections that have them.
pub fn average_stats(stats: &[ElectionStats]) -> Option<ElectionStats> {
    if stats.is_empty() {
        return None;
    }
    let concurrent: Option<Vec<(&Happiness, &Happiness)>> = stats
        .iter()
        .map(|s| {
            s.concurrent_happiness
                .as_ref()
                .zip(s.concurrent_change.as_ref())
        })
        .collect();
    let (concurrent_happiness, concurrent_change) = match concurrent {
        Some(values) => {
            let h: Vec<&Happiness> = values.iter().map(|p| p.0).collect();
            let c: Vec<&Happiness> = values.iter().map(|p| p.1).collect();
            (Some(average(&h)), Some(average(&c)))
        }
        None => (None, None),
    };
    let counter_happiness: Vec<_> = stats.iter().map(|s| &s.counter_happiness).collect();
    let counter_change: Vec<_> = stats.iter().map(|s| &s.counter_change).collect();
    Some(ElectionStats {
        overall_happiness: average(&stats.iter().map(|s| &s.overall_happiness).collect::<Vec<_>>()),
        risk: average(&stats.iter().map(|s| &s.risk).collect::<Vec<_>>()),
        average_increase: average(&stats.iter().map(|s| &s.average_increase).collect::<Vec<_>>()),
        concurrent_happiness,
        concurrent_change,
        counter_happiness: average_some(&counter_happiness),
        counter_change: average_some(&counter_change),
    })
}
