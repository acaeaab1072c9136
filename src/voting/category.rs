use crate::models::{RankingSubmission, Roster};
use crate::voting::{mean, CategoryRanking};

/// Orders the roster by average rank within one category, best first.
///
/// With no submissions at all every attendee is returned unranked (average 0,
/// rank 0) in roster order. Otherwise each attendee's average is taken over
/// the submissions that actually rank them; an attendee nobody ranked averages
/// 0 and therefore sorts ahead of everyone else. Ties keep roster order and
/// still receive distinct consecutive ranks.
pub fn calculate_category_rankings(
    roster: &Roster,
    submissions: &[RankingSubmission],
    category_key: &str,
) -> Vec<CategoryRanking> {
    if submissions.is_empty() {
        return roster
            .attendees
            .iter()
            .map(|attendee| CategoryRanking {
                attendee: attendee.clone(),
                average_rank: 0.0,
                rank: 0,
            })
            .collect();
    }

    let mut rankings: Vec<CategoryRanking> = roster
        .attendees
        .iter()
        .map(|attendee| {
            let ranks = submissions
                .iter()
                .filter_map(|submission| submission.rank_of(category_key, attendee))
                .map(f64::from);
            CategoryRanking {
                attendee: attendee.clone(),
                average_rank: mean(ranks),
                rank: 0, // Will set after sorting
            }
        })
        .collect();

    // sort_by is stable, so equal averages keep roster order
    rankings.sort_by(|a, b| a.average_rank.total_cmp(&b.average_rank));

    for (i, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = i + 1;
    }

    rankings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn roster(names: &[&str]) -> Roster {
        crate::models::DEFAULT_ROSTER.with_attendees(names.iter().map(|n| n.to_string()).collect())
    }

    fn ballot(by: &str, golf: &[(&str, i32)]) -> RankingSubmission {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        RankingSubmission::new(by, at).with_category("golf", golf.iter().copied())
    }

    fn summary(rankings: &[CategoryRanking]) -> Vec<(&str, f64, usize)> {
        rankings
            .iter()
            .map(|r| (r.attendee.as_str(), r.average_rank, r.rank))
            .collect()
    }

    #[test]
    fn single_ballot_is_reproduced() {
        let roster = roster(&["Alice", "Bob", "Carol"]);
        let submissions = vec![ballot("Alice", &[("Alice", 1), ("Bob", 2), ("Carol", 3)])];

        let rankings = calculate_category_rankings(&roster, &submissions, "golf");
        assert_eq!(
            summary(&rankings),
            vec![("Alice", 1.0, 1), ("Bob", 2.0, 2), ("Carol", 3.0, 3)]
        );
    }

    #[test]
    fn no_submissions_leaves_everyone_unranked_in_roster_order() {
        let roster = roster(&["Carol", "Alice", "Bob"]);
        let rankings = calculate_category_rankings(&roster, &[], "golf");
        assert_eq!(
            summary(&rankings),
            vec![("Carol", 0.0, 0), ("Alice", 0.0, 0), ("Bob", 0.0, 0)]
        );
    }

    #[test]
    fn averages_ranks_across_ballots() {
        let roster = roster(&["A", "B"]);
        let submissions = vec![
            ballot("A", &[("A", 1), ("B", 2)]),
            ballot("B", &[("A", 3), ("B", 1)]),
        ];

        let rankings = calculate_category_rankings(&roster, &submissions, "golf");
        let a = rankings.iter().find(|r| r.attendee == "A").unwrap();
        let b = rankings.iter().find(|r| r.attendee == "B").unwrap();
        assert_eq!(a.average_rank, 2.0);
        assert_eq!(b.average_rank, 1.5);
        assert!(b.rank < a.rank);
    }

    #[test]
    fn ties_get_distinct_ranks_in_roster_order() {
        let roster = roster(&["Xavier", "Yara", "Zoe"]);
        let submissions = vec![
            ballot("Xavier", &[("Zoe", 1), ("Yara", 2), ("Xavier", 3)]),
            ballot("Yara", &[("Zoe", 3), ("Yara", 2), ("Xavier", 1)]),
        ];

        let rankings = calculate_category_rankings(&roster, &submissions, "golf");
        // Everyone averages 2.0; roster order decides.
        assert_eq!(
            summary(&rankings),
            vec![("Xavier", 2.0, 1), ("Yara", 2.0, 2), ("Zoe", 2.0, 3)]
        );
    }

    #[test]
    fn missing_entries_only_count_where_present() {
        let roster = roster(&["Alice", "Bob", "Carol"]);
        let submissions = vec![
            ballot("Alice", &[("Alice", 2), ("Bob", 1), ("Carol", 3)]),
            ballot("Bob", &[("Alice", 1), ("Bob", 2)]),
            // No golf map at all.
            RankingSubmission::new("Carol", Utc::now()).with_category("athleticism", [("Carol", 1)]),
        ];

        let rankings = calculate_category_rankings(&roster, &submissions, "golf");
        let carol = rankings.iter().find(|r| r.attendee == "Carol").unwrap();
        assert_eq!(carol.average_rank, 3.0);
        assert_eq!(carol.rank, 3);
        assert_eq!(rankings[0].average_rank, 1.5);
    }

    #[test]
    fn attendee_nobody_ranked_sorts_first() {
        let roster = roster(&["Alice", "Bob", "Dave"]);
        let submissions = vec![ballot("Alice", &[("Alice", 1), ("Bob", 2)])];

        let rankings = calculate_category_rankings(&roster, &submissions, "golf");
        assert_eq!(
            summary(&rankings),
            vec![("Dave", 0.0, 1), ("Alice", 1.0, 2), ("Bob", 2.0, 3)]
        );
    }

    #[test]
    fn unknown_names_are_ignored() {
        let roster = roster(&["Alice", "Bob"]);
        let submissions = vec![ballot("Alice", &[("Mallory", 1), ("Alice", 2), ("Bob", 3)])];

        let rankings = calculate_category_rankings(&roster, &submissions, "golf");
        assert_eq!(rankings.len(), 2);
        assert!(rankings.iter().all(|r| r.attendee != "Mallory"));
    }

    #[test]
    fn output_has_one_row_per_attendee_and_is_repeatable() {
        let roster = roster(&["A", "B", "C", "D"]);
        let submissions = vec![
            ballot("A", &[("A", 4), ("B", 3), ("C", 2), ("D", 1)]),
            ballot("B", &[("A", 1), ("C", 2)]),
        ];

        let first = calculate_category_rankings(&roster, &submissions, "golf");
        let second = calculate_category_rankings(&roster, &submissions, "golf");
        assert_eq!(first.len(), 4);
        assert_eq!(first, second);

        let mut ranks: Vec<usize> = first.iter().map(|r| r.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }
}
