use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

/// Maximum entries in a leaderboard response.
pub const LEADERBOARD_SIZE: usize = 10;

/// Display name for users without a profile name.
pub const ANONYMOUS_NAME: &str = "Anonymous User";

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub user_name: String,
    pub total_scans: usize,
    pub average_eco_score: f64,
    pub rank: usize,
}

/// Rank all users by average sustainability score.
///
/// Groups the flat `(user_id, score)` pairs, averages per user, sorts
/// descending by average, and keeps the top ten. Ties order by higher
/// scan count, then ascending user id, so the ranking is reproducible
/// regardless of input order.
pub fn rank_users(
    scores: &[(Uuid, f64)],
    names: &HashMap<Uuid, String>,
) -> Vec<LeaderboardEntry> {
    let mut grouped: HashMap<Uuid, (usize, f64)> = HashMap::new();
    for (user_id, score) in scores {
        let entry = grouped.entry(*user_id).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += score;
    }

    let mut entries: Vec<LeaderboardEntry> = grouped
        .into_iter()
        .map(|(user_id, (total_scans, sum))| LeaderboardEntry {
            user_id,
            user_name: names
                .get(&user_id)
                .cloned()
                .unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
            total_scans,
            average_eco_score: sum / total_scans as f64,
            rank: 0,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.average_eco_score
            .total_cmp(&a.average_eco_score)
            .then_with(|| b.total_scans.cmp(&a.total_scans))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    entries.truncate(LEADERBOARD_SIZE);

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn groups_and_averages_per_user() {
        let alice = uuid(1);
        let bob = uuid(2);
        let scores = vec![(alice, 80.0), (bob, 60.0), (alice, 90.0)];
        let names = HashMap::from([(alice, "Alice".to_string()), (bob, "Bob".to_string())]);

        let entries = rank_users(&scores, &names);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].user_name, "Alice");
        assert_eq!(entries[0].total_scans, 2);
        assert_eq!(entries[0].average_eco_score, 85.0);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].user_name, "Bob");
        assert_eq!(entries[1].rank, 2);
    }

    #[test]
    fn missing_profile_names_fall_back_to_anonymous() {
        let scores = vec![(uuid(7), 70.0)];
        let entries = rank_users(&scores, &HashMap::new());
        assert_eq!(entries[0].user_name, ANONYMOUS_NAME);
    }

    #[test]
    fn output_is_capped_at_ten_with_gapless_ranks() {
        let scores: Vec<(Uuid, f64)> = (1..=15).map(|n| (uuid(n), n as f64)).collect();

        let entries = rank_users(&scores, &HashMap::new());

        assert_eq!(entries.len(), LEADERBOARD_SIZE);
        let ranks: Vec<usize> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<_>>());
        // strictly descending here since every average is distinct
        for pair in entries.windows(2) {
            assert!(pair[0].average_eco_score > pair[1].average_eco_score);
        }
    }

    #[test]
    fn fewer_distinct_users_than_ten_keeps_them_all() {
        let scores = vec![(uuid(1), 50.0), (uuid(2), 60.0), (uuid(1), 70.0)];
        let entries = rank_users(&scores, &HashMap::new());
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn ties_order_by_scan_count_then_user_id() {
        let many = uuid(9);
        let few_hi = uuid(3);
        let few_lo = uuid(5);
        // all three average 80
        let scores = vec![
            (many, 70.0),
            (many, 90.0),
            (many, 80.0),
            (few_hi, 80.0),
            (few_lo, 80.0),
        ];

        let entries = rank_users(&scores, &HashMap::new());

        assert_eq!(entries[0].user_id, many);
        assert_eq!(entries[1].user_id, few_hi);
        assert_eq!(entries[2].user_id, few_lo);
    }

    #[test]
    fn input_order_does_not_change_the_ranking() {
        let scores = vec![
            (uuid(1), 55.0),
            (uuid(2), 55.0),
            (uuid(3), 90.0),
            (uuid(2), 55.0),
        ];
        let mut reversed = scores.clone();
        reversed.reverse();

        assert_eq!(
            rank_users(&scores, &HashMap::new()),
            rank_users(&reversed, &HashMap::new())
        );
    }

    #[test]
    fn empty_input_yields_empty_leaderboard() {
        assert!(rank_users(&[], &HashMap::new()).is_empty());
    }
}
