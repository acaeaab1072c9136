use crate::models::{RankingSubmission, Roster};
use crate::voting::{calculate_category_rankings, mean, OverallRanking};
use std::collections::HashMap;

/// Orders the roster by the mean of each attendee's per-category *rank*
/// (their position on each category board, not their raw average there).
pub fn calculate_overall_rankings(
    roster: &Roster,
    submissions: &[RankingSubmission],
) -> Vec<OverallRanking> {
    if submissions.is_empty() {
        return roster
            .attendees
            .iter()
            .map(|attendee| OverallRanking {
                attendee: attendee.clone(),
                average_score: 0.0,
                rank: 0,
                category_scores: roster
                    .categories
                    .iter()
                    .map(|category| (category.key.clone(), 0))
                    .collect(),
            })
            .collect();
    }

    // Category key -> (attendee -> rank on that category's board)
    let boards: Vec<(&str, HashMap<String, usize>)> = roster
        .categories
        .iter()
        .map(|category| {
            let ranks = calculate_category_rankings(roster, submissions, &category.key)
                .into_iter()
                .map(|row| (row.attendee, row.rank))
                .collect();
            (category.key.as_str(), ranks)
        })
        .collect();

    let mut rankings: Vec<OverallRanking> = roster
        .attendees
        .iter()
        .map(|attendee| {
            let scores: Vec<(String, usize)> = boards
                .iter()
                .map(|(key, ranks)| (key.to_string(), ranks.get(attendee).copied().unwrap_or(0)))
                .collect();
            OverallRanking {
                attendee: attendee.clone(),
                average_score: mean(scores.iter().map(|(_, rank)| *rank as f64)),
                rank: 0,
                category_scores: scores.into_iter().collect(),
            }
        })
        .collect();

    rankings.sort_by(|a, b| a.average_score.total_cmp(&b.average_score));

    for (i, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = i + 1;
    }

    rankings
}
