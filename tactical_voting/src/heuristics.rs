// Tactical options for the rules that only give points to one or two
// positions of the ballot. A single swap of positions is enough to change
// what the ballot contributes.

use log::debug;

use crate::config::*;
use crate::election::Election;
use crate::evaluate_option;

/// Plurality: voting for a less preferred candidate instead of the favourite.
///
/// Nothing can be done against a candidate that holds a strict majority of
/// the votes. The social index never improves by giving away the only point
/// of the ballot.
pub(crate) fn plurality(election: &Election, idx: usize, limit: usize) -> TacticalOptions {
    let mut res = TacticalOptions::default();
    let ballot = election.agents()[idx].ballot();
    let winner = election.winner();
    let num_agents = election.agents().len() as u64;

    if 2 * election.tally().get(winner) > num_agents {
        debug!("plurality: {} holds a majority", winner);
        return res;
    }

    let stop = ballot.position(winner).unwrap_or(0);
    for i in 1..stop {
        if res.my_preference.len() >= limit {
            break;
        }
        let opt = evaluate_option(election, idx, ballot.swapped(0, i));
        if opt.winner != winner {
            res.my_preference.insert(i, opt);
        }
    }
    res
}

/// Anti-plurality: choosing which candidate does not get a point.
pub(crate) fn anti_plurality(election: &Election, idx: usize, limit: usize) -> TacticalOptions {
    let mut res = TacticalOptions::default();
    let ballot = election.agents()[idx].ballot();
    let m = ballot.len();
    let tally = election.tally();
    let winner = election.winner();
    let current = crate::election::happiness(ballot, tally);

    // Take the point away from the winner.
    if ballot.last() != winner && limit > 0 {
        let winner_pos = ballot.position(winner).unwrap_or(0);
        let opt = evaluate_option(election, idx, ballot.swapped(winner_pos, m - 1));
        if opt.happiness.my_preference > current.my_preference {
            res.my_preference.insert(0, opt);
        }
    }

    // Take the point away from one of the candidates ranked above the favourite.
    // This gives a point to the least preferred candidate: it must not pass
    // the favourite.
    let first = ballot.first();
    let least = ballot.last();
    let least_points = tally.get(least) + 1;
    let first_points = tally.get(first);
    if least_points > first_points || (least_points == first_points && least < first) {
        return res;
    }
    let ranking = election.ranking();
    let stop = ranking.iter().position(|c| *c == first).unwrap_or(0);
    for (i, c) in ranking.iter().enumerate().take(stop) {
        if res.social_index.len() >= limit {
            break;
        }
        let pos = ballot.position(*c).unwrap_or(m - 1);
        let opt = evaluate_option(election, idx, ballot.swapped(pos, m - 1));
        if opt.happiness.social_index > current.social_index {
            res.social_index.insert(i, opt);
        }
    }
    res
}

/// Voting for two: changing the second choice of the ballot.
pub(crate) fn voting_for_two(election: &Election, idx: usize, limit: usize) -> TacticalOptions {
    let mut res = TacticalOptions::default();
    let ballot = election.agents()[idx].ballot();
    let m = ballot.len();
    if m < 2 {
        return res;
    }
    let tally = election.tally();
    let winner = election.winner();
    let current = crate::election::happiness(ballot, tally);
    let winner_pos = ballot.position(winner).unwrap_or(0);

    if winner_pos == 1 {
        // The winner is my second choice: give its point to someone else and
        // hope that my favourite passes.
        for i in 2..m {
            if res.my_preference.len() >= limit {
                break;
            }
            let opt = evaluate_option(election, idx, ballot.swapped(1, i));
            if opt.winner == ballot.first() {
                res.my_preference.insert(i - 2, opt);
            }
        }
    } else if winner_pos != 2 {
        // Promote a candidate I prefer to the winner.
        for i in 2..winner_pos {
            if res.my_preference.len() >= limit {
                break;
            }
            let opt = evaluate_option(election, idx, ballot.swapped(1, i));
            if ballot.position(opt.winner).unwrap_or(m) < winner_pos {
                res.my_preference.insert(i - 2, opt);
            }
        }
    }

    let first = ballot.first();
    let second = ballot.candidates()[1];
    let first_points = tally.get(first);
    if tally.get(second) >= first_points + 2 {
        return res;
    }
    for i in 2..m {
        if res.social_index.len() >= limit {
            break;
        }
        let c = ballot.candidates()[i];
        if tally.get(c) + 1 > first_points && c < first {
            continue;
        }
        let opt = evaluate_option(election, idx, ballot.swapped(1, i));
        if opt.happiness.social_index > current.social_index {
            res.social_index.insert(i - 2, opt);
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn plurality_majority_cannot_be_beaten() {
        let e = election(
            VotingScheme::Plurality,
            "AB",
            &["AB", "AB", "AB", "BA", "BA"],
        );
        assert_eq!(e.tally(), &Tally::from_scores(&[(c('A'), 3), (c('B'), 2)]));
        for idx in 0..5 {
            let res = plurality(&e, idx, 20);
            assert!(res.my_preference.is_empty());
            assert!(res.social_index.is_empty());
        }
    }

    #[test]
    fn plurality_compromise() {
        let e = election(
            VotingScheme::Plurality,
            "ABC",
            &["ABC", "ABC", "BCA", "BCA", "CBA"],
        );
        assert_eq!(e.winner(), c('A'));
        let res = plurality(&e, 4, 20);
        assert_eq!(res.my_preference.len(), 1);
        let opt = &res.my_preference[&1];
        assert_eq!(opt.ballot, b("BCA"));
        assert_eq!(opt.winner, c('B'));
        assert_eq!(opt.happiness.my_preference, 50.0);
        assert!(res.social_index.is_empty());
        // The first agents already vote for the winner.
        assert!(plurality(&e, 0, 20).my_preference.is_empty());
    }

    #[test]
    fn anti_plurality_options() {
        let e = election(
            VotingScheme::AntiPlurality,
            "ABC",
            &["BAC", "ABC", "BCA", "CAB"],
        );
        assert_eq!(
            e.tally(),
            &Tally::from_scores(&[(c('A'), 3), (c('B'), 3), (c('C'), 2)])
        );
        assert_eq!(e.winner(), c('A'));
        let res = anti_plurality(&e, 0, 20);
        assert_eq!(res.my_preference.len(), 1);
        let opt = &res.my_preference[&0];
        assert_eq!(opt.ballot, b("BCA"));
        assert_eq!(opt.winner, c('B'));
        assert_eq!(opt.happiness.my_preference, 100.0);

        assert_eq!(res.social_index.len(), 1);
        let opt = &res.social_index[&0];
        assert_eq!(opt.ballot, b("BCA"));
        assert_eq!(opt.happiness.social_index, 100.0);

        assert!(anti_plurality(&e, 0, 0).my_preference.is_empty());
    }

    #[test]
    fn anti_plurality_least_preferred_must_stay_behind() {
        // Giving one more point to C would put it ahead of A.
        let e = election(VotingScheme::AntiPlurality, "ABC", &["ABC", "BCA", "CBA"]);
        // A:1 B:3 C:2
        let res = anti_plurality(&e, 0, 20);
        assert!(res.social_index.is_empty());
    }

    #[test]
    fn voting_for_two_options() {
        let e = election(
            VotingScheme::VotingForTwo,
            "ABCD",
            &["BACD", "ABCD", "DCAB"],
        );
        assert_eq!(
            e.tally(),
            &Tally::from_scores(&[(c('A'), 2), (c('B'), 2), (c('C'), 1), (c('D'), 1)])
        );
        assert_eq!(e.winner(), c('A'));
        let res = voting_for_two(&e, 0, 20);
        assert_eq!(res.my_preference.len(), 2);
        assert_eq!(res.my_preference[&0].ballot, b("BCAD"));
        assert_eq!(res.my_preference[&1].ballot, b("BDCA"));
        assert!(res.my_preference.values().all(|o| o.winner == c('B')));

        assert_eq!(res.social_index.len(), 2);
        assert!(res
            .social_index
            .values()
            .all(|o| o.happiness.social_index == 100.0));

        let res = voting_for_two(&e, 0, 1);
        assert_eq!(res.my_preference.len(), 1);
        assert_eq!(res.social_index.len(), 1);
    }

    #[test]
    fn voting_for_two_runaway_second_choice() {
        // My second choice leads my favourite by two points: nothing to do for the social index.
        let e = election(
            VotingScheme::VotingForTwo,
            "ABC",
            &["CAB", "BAC", "BAC", "ABC"],
        );
        // A:4 B:3 C:1
        let res = voting_for_two(&e, 0, 20);
        assert!(res.social_index.is_empty());
    }
}
