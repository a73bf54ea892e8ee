//! Ranking engine.
//!
//! The ranking is never stored. It is derived from the match ledger every time
//! a tournament is read: each finalized win is worth [`POINTS_PER_WIN`], and
//! participants are ordered by points descending, then by ascending user ID.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::auth::UserId;
use crate::matches::Match;
use crate::tournament::Tournament;

/// Points awarded for each recorded win
pub const POINTS_PER_WIN: u32 = 3;

/// One row of a tournament ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub user_id: UserId,
    pub username: String,
    pub points: u32,
}

/// Compute the ranking of a tournament from its matches
///
/// Matches belonging to other tournaments and matches still pending are
/// ignored. Every participant gets exactly one entry, including those with no
/// wins.
pub fn rank(tournament: &Tournament, matches: &[Match]) -> Vec<RankingEntry> {
    let mut wins: HashMap<UserId, u32> = HashMap::new();
    for m in matches
        .iter()
        .filter(|m| m.tournament_id == tournament.id && m.is_finalized())
    {
        if let Some(winner_id) = m.winner_id {
            *wins.entry(winner_id).or_default() += 1;
        }
    }

    let mut ranking: Vec<RankingEntry> = tournament
        .participants
        .iter()
        .map(|p| RankingEntry {
            user_id: p.id,
            username: p.username.clone(),
            points: wins.get(&p.id).copied().unwrap_or(0) * POINTS_PER_WIN,
        })
        .collect();

    ranking.sort_by(|a, b| b.points.cmp(&a.points).then(a.user_id.cmp(&b.user_id)));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::MatchState;
    use crate::tournament::Participant;
    use chrono::Utc;
    use proptest::prelude::*;

    fn tournament(id: i64, players: &[(i64, &str)]) -> Tournament {
        Tournament {
            id,
            name: format!("T{id}"),
            game: "Chess".to_string(),
            created_at: Utc::now(),
            participants: players
                .iter()
                .map(|(id, name)| Participant::new(*id, *name))
                .collect(),
        }
    }

    fn game(id: i64, tournament_id: i64, p1: i64, p2: i64, winner: Option<i64>) -> Match {
        Match {
            id,
            tournament_id,
            player1: Participant::new(p1, format!("u{p1}")),
            player2: Participant::new(p2, format!("u{p2}")),
            state: if winner.is_some() {
                MatchState::Finalized
            } else {
                MatchState::Pending
            },
            winner_id: winner,
            score: winner.map(|_| "1-0".to_string()),
            created_at: Utc::now(),
            finalized_at: None,
        }
    }

    #[test]
    fn test_rank_counts_wins() {
        let t = tournament(1, &[(1, "alice"), (2, "bob"), (3, "carol")]);
        let matches = vec![
            game(1, 1, 1, 2, Some(1)),
            game(2, 1, 1, 3, Some(3)),
            game(3, 1, 2, 3, Some(3)),
            game(4, 1, 1, 2, None),
        ];

        let ranking = rank(&t, &matches);
        let summary: Vec<_> = ranking.iter().map(|e| (e.username.as_str(), e.points)).collect();
        assert_eq!(summary, vec![("carol", 6), ("alice", 3), ("bob", 0)]);
    }

    #[test]
    fn test_rank_ties_by_user_id() {
        let t = tournament(1, &[(5, "eve"), (2, "bob"), (9, "zed")]);
        let ranking = rank(&t, &[]);
        let ids: Vec<_> = ranking.iter().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert!(ranking.iter().all(|e| e.points == 0));
    }

    #[test]
    fn test_rank_ignores_other_tournaments() {
        let t = tournament(1, &[(1, "alice"), (2, "bob")]);
        let matches = vec![game(1, 2, 1, 2, Some(2))];
        assert!(rank(&t, &matches).iter().all(|e| e.points == 0));
    }

    #[test]
    fn test_rank_empty_tournament() {
        let t = tournament(1, &[]);
        assert!(rank(&t, &[game(1, 1, 1, 2, Some(1))]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_one_entry_per_participant_sorted(
            player_count in 0usize..12,
            results in prop::collection::vec((0usize..12, 0usize..12, any::<bool>(), any::<bool>()), 0..40),
        ) {
            let players: Vec<(i64, String)> =
                (0..player_count).map(|i| (i as i64 + 1, format!("p{i}"))).collect();
            let named: Vec<(i64, &str)> = players.iter().map(|(id, n)| (*id, n.as_str())).collect();
            let t = tournament(1, &named);

            let matches: Vec<Match> = results
                .iter()
                .enumerate()
                .filter(|(_, (a, b, _, _))| player_count > 0 && a % player_count != b % player_count)
                .map(|(i, (a, b, first_wins, finished))| {
                    let p1 = (a % player_count) as i64 + 1;
                    let p2 = (b % player_count) as i64 + 1;
                    let winner = finished.then_some(if *first_wins { p1 } else { p2 });
                    game(i as i64 + 1, 1, p1, p2, winner)
                })
                .collect();

            let ranking = rank(&t, &matches);

            prop_assert_eq!(ranking.len(), player_count);
            for p in &t.participants {
                prop_assert_eq!(ranking.iter().filter(|e| e.user_id == p.id).count(), 1);
            }
            for pair in ranking.windows(2) {
                prop_assert!(pair[0].points >= pair[1].points);
                if pair[0].points == pair[1].points {
                    prop_assert!(pair[0].user_id < pair[1].user_id);
                }
            }
            let finished = matches.iter().filter(|m| m.is_finalized()).count() as u32;
            prop_assert_eq!(ranking.iter().map(|e| e.points).sum::<u32>(), finished * POINTS_PER_WIN);
        }
    }
}
