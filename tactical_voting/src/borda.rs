use log::debug;

use crate::config::*;
use crate::election::Election;
use crate::evaluate_options;

/// How many points a rival may still receive from the ballot of the agent
/// while the target candidate keeps ahead of it.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct Leeway {
    candidate: Candidate,
    leeway: i64,
}

/// Computes the leeway of every rival of `target`, assuming that the target is
/// placed first on the ballot.
///
/// The rivals are returned from the largest leeway to the smallest. Rivals with
/// the same leeway keep the order of the ballot.
fn leeways(target: Candidate, ballot: &Ballot, others: &Tally) -> Vec<Leeway> {
    let m = ballot.len() as i64;
    let upper_bound = others.get(target) as i64 + (m - 1);
    let mut res: Vec<Leeway> = ballot
        .candidates()
        .iter()
        .filter(|c| **c != target)
        .map(|c| {
            let diff = upper_bound - others.get(*c) as i64;
            Leeway {
                candidate: *c,
                // The target wins the ties against later candidates only.
                leeway: if target < *c { diff } else { diff - 1 },
            }
        })
        .collect();
    res.sort_by(|l1, l2| l2.leeway.cmp(&l1.leeway));
    res
}

/// Checks that the points `m-2, ..., 0` can be handed to the rivals, sorted by
/// decreasing leeway, without exceeding any leeway.
fn is_feasible(sorted: &[Leeway]) -> bool {
    let n = sorted.len() as i64;
    sorted
        .iter()
        .enumerate()
        .all(|(idx, l)| n - 1 - (idx as i64) <= l.leeway)
}

/// The rivals that can be kept behind the target in the best case, counted from
/// the smallest leeway.
fn max_losers(sorted: &[Leeway]) -> usize {
    let mut count = 0;
    for l in sorted.iter().rev() {
        if l.leeway >= count as i64 {
            count += 1;
        }
    }
    count
}

#[derive(Debug, Clone)]
struct Frame {
    available: Vec<Leeway>,
    cursor: usize,
}

/// Depth-first enumeration of the ways to place rivals in the lowest slots of a
/// ballot whose first position goes to the target.
///
/// Slots are filled from the highest one (`to_place - 1` points) down to zero.
/// A rival may take a slot if its leeway is at least the points of this slot.
/// When `tight` is set, all the rivals have to be placed and the scan of a slot
/// stops at the first rival that does not fit. Otherwise the rivals left over
/// take the positions right after the target.
struct Placements {
    target: Candidate,
    to_place: usize,
    tight: bool,
    stack: Vec<Frame>,
    placed: Vec<Candidate>,
}

impl Placements {
    fn new(target: Candidate, sorted: Vec<Leeway>, to_place: usize, tight: bool) -> Placements {
        Placements {
            target,
            to_place,
            tight,
            stack: vec![Frame {
                available: sorted,
                cursor: 0,
            }],
            placed: Vec::new(),
        }
    }

    fn assemble(&self, leftover: &[Leeway]) -> Ballot {
        let mut res: Vec<Candidate> = vec![self.target];
        res.extend(leftover.iter().rev().map(|l| l.candidate));
        res.extend(self.placed.iter().cloned());
        Ballot::from_order(res)
    }

    // Leaving a frame undoes the placement that created it.
    fn pop(&mut self) {
        self.stack.pop();
        if !self.stack.is_empty() {
            self.placed.pop();
        }
    }
}

impl Iterator for Placements {
    type Item = Ballot;

    fn next(&mut self) -> Option<Ballot> {
        loop {
            let depth = self.stack.len();
            if depth == 0 {
                return None;
            }
            if depth > self.to_place {
                // All the slots are filled.
                let ballot = self.assemble(&self.stack[depth - 1].available);
                self.pop();
                return Some(ballot);
            }
            let slot = (self.to_place - depth) as i64;
            let tight = self.tight;
            let frame = self.stack.last_mut()?;
            let mut chosen: Option<usize> = None;
            while frame.cursor < frame.available.len() {
                let idx = frame.cursor;
                frame.cursor += 1;
                if frame.available[idx].leeway >= slot {
                    chosen = Some(idx);
                    break;
                } else if tight {
                    frame.cursor = frame.available.len();
                }
            }
            match chosen {
                Some(idx) => {
                    let mut available = frame.available.clone();
                    let l = available.remove(idx);
                    self.placed.push(l.candidate);
                    self.stack.push(Frame {
                        available,
                        cursor: 0,
                    });
                }
                None => {
                    self.pop();
                }
            }
        }
    }
}

/// The ballots, up to `limit`, that make `target` win given the tally of all
/// the other agents.
///
/// Returns nothing if some rival cannot be kept behind the target, even with
/// zero points from this ballot.
fn winning_ballots(
    target: Candidate,
    ballot: &Ballot,
    others: &Tally,
    limit: usize,
) -> Vec<Ballot> {
    let sorted = leeways(target, ballot, others);
    debug!("winning_ballots: target: {} leeways: {:?}", target, sorted);
    if sorted.iter().any(|l| l.leeway < 0) {
        debug!(
            "winning_ballots: {} cannot win: some rival is out of reach",
            target
        );
        return vec![];
    }
    if !is_feasible(&sorted) {
        debug!(
            "winning_ballots: {} cannot win: no valid assignment",
            target
        );
        return vec![];
    }
    let n = sorted.len();
    Placements::new(target, sorted, n, true)
        .take(limit)
        .collect()
}

/// The ballots, up to `limit`, that bring `target` to its best possible rank,
/// provided it is better than `current_rank`.
fn best_rank_ballots(
    target: Candidate,
    ballot: &Ballot,
    others: &Tally,
    current_rank: usize,
    limit: usize,
) -> Vec<Ballot> {
    let sorted = leeways(target, ballot, others);
    let losers = max_losers(&sorted);
    debug!(
        "best_rank_ballots: target: {} leeways: {:?} losers: {}",
        target, sorted, losers
    );
    if sorted.len() - losers >= current_rank {
        return vec![];
    }
    Placements::new(target, sorted, losers, false)
        .take(limit)
        .collect()
}

/// The tactical options of an agent under the Borda count.
pub(crate) fn tactical_options(election: &Election, idx: usize, limit: usize) -> TacticalOptions {
    let agent = &election.agents()[idx];
    let ballot = agent.ballot();
    if ballot.len() < 2 {
        return TacticalOptions::default();
    }
    let winner = election.winner();
    let others = election.tally_without(idx);
    let current_rank = election
        .ranking()
        .iter()
        .position(|c| *c == ballot.first())
        .unwrap_or(0);

    let social_index = best_rank_ballots(ballot.first(), ballot, &others, current_rank, limit);

    // Try the candidates preferred to the current winner, the favourite first.
    let mut my_preference: Vec<Ballot> = vec![];
    for c in ballot.candidates().iter() {
        if *c == winner {
            break;
        }
        let res = winning_ballots(*c, ballot, &others, limit);
        if !res.is_empty() {
            debug!(
                "tactical_options: {} can make {} win with {} ballots",
                agent.name(),
                c,
                res.len()
            );
            my_preference = res;
            break;
        }
    }

    TacticalOptions {
        my_preference: evaluate_options(election, idx, my_preference.into_iter().enumerate()),
        social_index: evaluate_options(election, idx, social_index.into_iter().enumerate()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::election::{aggregate, winner};

    fn c(x: char) -> Candidate {
        Candidate(x)
    }

    fn b(s: &str) -> Ballot {
        Ballot::parse(s).unwrap()
    }

    fn election(candidates: &str, ballots: &[&str]) -> Election {
        let cands: Vec<Candidate> = candidates.chars().map(Candidate).collect();
        let ballots: Vec<(String, Ballot)> = ballots
            .iter()
            .enumerate()
            .map(|(idx, x)| (format!("Agent{}", idx + 1), b(x)))
            .collect();
        Election::new(VotingScheme::Borda, &cands, ballots).unwrap()
    }

    #[test]
    fn leeway_depends_on_tie_break() {
        let others = Tally::from_scores(&[(c('A'), 2), (c('B'), 4), (c('C'), 0)]);
        let l = leeways(c('B'), &b("ABC"), &others);
        // Upper bound for B: 4 + 2 = 6
        assert_eq!(
            l,
            vec![
                Leeway {
                    candidate: c('C'),
                    leeway: 6
                },
                Leeway {
                    candidate: c('A'),
                    leeway: 3
                },
            ]
        );
    }

    #[test]
    fn negative_leeway_is_infeasible() {
        let others = Tally::from_scores(&[(c('A'), 3), (c('B'), 0), (c('C'), 3)]);
        assert!(winning_ballots(c('B'), &b("BCA"), &others, 20).is_empty());
    }

    #[test]
    fn scheduling_failure_is_infeasible() {
        // All the leeways are non-negative, but B and C cannot both get zero points.
        let others = Tally::from_scores(&[(c('A'), 0), (c('B'), 3), (c('C'), 3), (c('D'), 0)]);
        let l = leeways(c('A'), &b("ABCD"), &others);
        assert!(l.iter().all(|x| x.leeway >= 0));
        assert!(!is_feasible(&l));
        assert!(winning_ballots(c('A'), &b("ABCD"), &others, 20).is_empty());
    }

    #[test]
    fn enumerates_all_winning_ballots() {
        // A alone, with all the rivals far behind: every order of the rivals works.
        let others = Tally::from_scores(&[(c('A'), 10), (c('B'), 0), (c('C'), 0), (c('D'), 0)]);
        let res = winning_ballots(c('A'), &b("BACD"), &others, 20);
        assert_eq!(res.len(), 6);
        assert!(res.iter().all(|x| x.first() == c('A')));
        assert_eq!(res[0], b("ABCD"));
        let res = winning_ballots(c('A'), &b("BACD"), &others, 4);
        assert_eq!(res.len(), 4);
    }

    #[test]
    fn enumeration_respects_leeways() {
        let others = Tally::from_scores(&[(c('A'), 3), (c('B'), 4), (c('C'), 1), (c('D'), 3)]);
        let ballot = b("ABCD");
        let res = winning_ballots(c('A'), &ballot, &others, 20);
        assert!(!res.is_empty());
        for r in res.iter() {
            let mut t = others.clone();
            t.add(&VotingScheme::Borda.score(r));
            assert_eq!(winner(&t), Some(c('A')), "ballot {}", r);
        }
    }

    #[test]
    fn max_losers_counts_from_the_smallest_leeway() {
        let l = |leeway| Leeway {
            candidate: c('Z'),
            leeway,
        };
        assert_eq!(max_losers(&[l(5), l(1), l(0)]), 3);
        assert_eq!(max_losers(&[l(5), l(-1), l(-3)]), 1);
        assert_eq!(max_losers(&[l(0), l(0), l(0)]), 1);
        assert_eq!(max_losers(&[]), 0);
    }

    #[test]
    fn best_rank_puts_leftovers_after_the_target() {
        // C is out of reach for A. B and D can be kept behind.
        let others = Tally::from_scores(&[(c('A'), 1), (c('B'), 0), (c('C'), 10), (c('D'), 0)]);
        let res = best_rank_ballots(c('A'), &b("ABCD"), &others, 3, 20);
        assert!(!res.is_empty());
        for r in res.iter() {
            assert_eq!(r.first(), c('A'));
            assert_eq!(r.candidates()[1], c('C'));
            let mut t = others.clone();
            t.add(&VotingScheme::Borda.score(r));
            let rank = crate::election::ranking(&t)
                .iter()
                .position(|x| *x == c('A'))
                .unwrap();
            assert_eq!(rank, 1);
        }
        // Already at the best possible rank: nothing to improve.
        assert!(best_rank_ballots(c('A'), &b("ABCD"), &others, 1, 20).is_empty());
    }

    #[test]
    fn scenario_borda_tactical_win() {
        let e = election("ABC", &["ABC", "BAC", "BAC"]);
        assert_eq!(
            e.tally(),
            &Tally::from_scores(&[(c('A'), 4), (c('B'), 5), (c('C'), 0)])
        );
        assert_eq!(e.winner(), c('B'));
        let res = tactical_options(&e, 0, 20);
        assert_eq!(res.my_preference.len(), 1);
        let opt = &res.my_preference[&0];
        assert_eq!(opt.ballot, b("ACB"));
        assert_eq!(opt.winner, c('A'));
        assert_eq!(
            opt.tally,
            Tally::from_scores(&[(c('A'), 4), (c('B'), 4), (c('C'), 1)])
        );
        assert_eq!(opt.happiness.my_preference, 100.0);
        assert_eq!(opt.happiness.social_index, 100.0);
        assert!((opt.overall_happiness.my_preference - 200.0 / 3.0).abs() < 1e-9);

        assert_eq!(res.social_index.len(), 1);
        assert_eq!(res.social_index[&0].ballot, b("ACB"));

        // The agents voting for the winner have nothing to gain.
        let res = tactical_options(&e, 1, 20);
        assert!(res.my_preference.is_empty());
        assert!(res.social_index.is_empty());
    }

    #[test]
    fn scenario_unreachable_favourite() {
        // Tally {A:3, B:2, C:4}: B is out of reach for the second agent.
        let e = election("ABC", &["ACB", "BCA", "CAB"]);
        assert_eq!(e.winner(), c('C'));
        let res = tactical_options(&e, 1, 20);
        assert!(res.my_preference.is_empty());
    }

    #[test]
    fn options_are_sound_and_bounded() {
        let e = election(
            "ABCDE",
            &["ABCDE", "EDCBA", "CEABD", "DBAEC", "BCDEA", "AEDBC", "ECABD"],
        );
        for idx in 0..e.agents().len() {
            for limit in [1, 3, 20] {
                let res = tactical_options(&e, idx, limit);
                for kind in HappinessKind::ALL {
                    let options = res.get(kind);
                    assert!(options.len() <= limit);
                    for opt in options.values() {
                        let e2 = e.with_ballot(idx, opt.ballot.clone()).unwrap();
                        let ballots: Vec<Ballot> =
                            e2.agents().iter().map(|a| a.ballot().clone()).collect();
                        let t = aggregate(VotingScheme::Borda, e.candidates(), ballots.iter());
                        assert_eq!(t, opt.tally);
                        assert_eq!(winner(&t), Some(opt.winner));
                    }
                }
                for opt in res.my_preference.values() {
                    assert!(opt.happiness.my_preference > e.happiness(idx).unwrap().my_preference);
                }
                for opt in res.social_index.values() {
                    assert!(opt.happiness.social_index > e.happiness(idx).unwrap().social_index);
                }
            }
        }
    }

    #[test]
    fn search_is_idempotent() {
        let e = election("ABCD", &["ABCD", "DCBA", "BDCA", "CADB"]);
        for idx in 0..4 {
            assert_eq!(tactical_options(&e, idx, 20), tactical_options(&e, idx, 20));
        }
    }
}
