use crate::models::{LeaderboardData, Team};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamTotal {
    pub team_id: String,
    pub team_name: String,
    pub color: String,
    pub total_points: f64,
    pub game_points: BTreeMap<String, f64>,
    pub rank: usize,
}

/// Sums each team's points over every recorded game, highest total first.
pub fn calculate_team_totals(teams: &[Team], leaderboard: &LeaderboardData) -> Vec<TeamTotal> {
    let mut totals: Vec<TeamTotal> = teams
        .iter()
        .map(|team| {
            let game_points: BTreeMap<String, f64> = leaderboard
                .game_points
                .iter()
                .map(|(game, points)| (game.clone(), points.for_team(&team.id).unwrap_or(0.0)))
                .collect();
            TeamTotal {
                team_id: team.id.clone(),
                team_name: team.name.clone(),
                color: team.color.clone(),
                total_points: game_points.values().sum(),
                game_points,
                rank: 0,
            }
        })
        .collect();

    totals.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));

    for (i, total) in totals.iter_mut().enumerate() {
        total.rank = i + 1;
    }

    totals
}
