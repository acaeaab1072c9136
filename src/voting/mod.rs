pub mod category;
pub mod overall;
pub mod points;

use crate::models::{RankingSubmission, Roster};
use serde::Serialize;
use std::collections::BTreeMap;

pub use category::calculate_category_rankings;
pub use overall::calculate_overall_rankings;
pub use points::{calculate_team_totals, TeamTotal};

// One attendee's standing within a single category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRanking {
    pub attendee: String,
    pub average_rank: f64,
    pub rank: usize, // 0 means unranked
}

// One attendee's standing across all categories
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallRanking {
    pub attendee: String,
    pub average_score: f64,
    pub rank: usize,
    pub category_scores: BTreeMap<String, usize>,
}

/// Every leaderboard derived from one snapshot of submissions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standings {
    pub category_rankings: BTreeMap<String, Vec<CategoryRanking>>,
    pub overall_rankings: Vec<OverallRanking>,
}

pub fn calculate_standings(roster: &Roster, submissions: &[RankingSubmission]) -> Standings {
    let category_rankings = roster
        .categories
        .iter()
        .map(|category| {
            (
                category.key.clone(),
                calculate_category_rankings(roster, submissions, &category.key),
            )
        })
        .collect();

    Standings {
        category_rankings,
        overall_rankings: calculate_overall_rankings(roster, submissions),
    }
}

// Arithmetic mean; 0 for no values so callers never see NaN
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_ROSTER;
    use chrono::Utc;

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(mean(Vec::new()), 0.0);
        assert_eq!(mean([1.0, 3.0]), 2.0);
    }

    #[test]
    fn standings_cover_every_category() {
        let submissions = vec![RankingSubmission::new("Jonas", Utc::now()).with_category(
            "golf",
            DEFAULT_ROSTER
                .attendees
                .iter()
                .enumerate()
                .map(|(i, name)| (name.as_str(), i as i32 + 1)),
        )];

        let standings = calculate_standings(&DEFAULT_ROSTER, &submissions);
        assert_eq!(standings.category_rankings.len(), 5);
        for board in standings.category_rankings.values() {
            assert_eq!(board.len(), DEFAULT_ROSTER.attendees.len());
        }
        assert_eq!(standings.overall_rankings.len(), DEFAULT_ROSTER.attendees.len());
        assert_eq!(standings.category_rankings["golf"][0].attendee, "Jonas");
    }

    #[test]
    fn standings_serialize_with_camel_case_keys() {
        let standings = calculate_standings(&DEFAULT_ROSTER, &[]);
        let value = serde_json::to_value(&standings).unwrap();
        assert!(value["categoryRankings"]["golf"].is_array());
        assert_eq!(value["overallRankings"][0]["averageScore"], 0.0);
        assert_eq!(value["overallRankings"][0]["categoryScores"]["golf"], 0);
    }
}
