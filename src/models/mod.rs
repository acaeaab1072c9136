pub mod submission;

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub use submission::{parse_submission_list, RankingSubmission};

const ATTENDEES: [&str; 14] = [
    "Jonas", "Riley", "RG", "Hayes", "August", "Keaton", "Jake", "Bridger", "Mason", "Tim", "Jay",
    "Luke", "Tobin", "AJ",
];

const CATEGORIES: [(&str, &str); 5] = [
    ("golf", "Golf Ability"),
    ("americanChallenge", "American Challenge Ability"),
    ("athleticism", "General Athleticism"),
    ("drinkingGame", "Drinking Game Ability"),
    ("drugHandling", "Drug Handling Ability"),
];

pub const TEAM_IDS: [&str; 4] = ["team1", "team2", "team3", "team4"];

lazy_static! {
    pub static ref DEFAULT_ROSTER: Roster = Roster::new(
        ATTENDEES.iter().map(|name| name.to_string()).collect(),
        CATEGORIES
            .iter()
            .map(|(key, label)| Category::new(*key, *label))
            .collect(),
    );
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub label: String,
}

impl Category {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Who can be ranked and in which categories. Order matters: it is the
/// tie-break order of every leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    pub attendees: Vec<String>,
    pub categories: Vec<Category>,
}

impl Roster {
    pub fn new(attendees: Vec<String>, categories: Vec<Category>) -> Self {
        Self {
            attendees,
            categories,
        }
    }

    /// Same categories, different people.
    pub fn with_attendees(&self, attendees: Vec<String>) -> Self {
        Self {
            attendees,
            categories: self.categories.clone(),
        }
    }

    pub fn contains(&self, attendee: &str) -> bool {
        self.attendees.iter().any(|name| name == attendee)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamsData {
    pub teams: Vec<Team>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl TeamsData {
    pub fn defaults() -> Self {
        Self {
            teams: default_teams(),
            last_updated: None,
        }
    }

    /// Parses the `teams` array of an admin rename request.
    pub fn parse_teams(payload: &Value) -> Result<Vec<Team>, ValidationError> {
        let raw = payload
            .get("teams")
            .and_then(Value::as_array)
            .ok_or_else(|| ValidationError::Invalid("Missing or invalid teams array".to_string()))?;

        let mut teams = Vec::with_capacity(raw.len());
        for entry in raw {
            let field = |name: &str| {
                entry
                    .get(name)
                    .and_then(Value::as_str)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };
            match (field("id"), field("name"), field("color")) {
                (Some(id), Some(name), Some(color)) => teams.push(Team { id, name, color }),
                _ => {
                    return Err(ValidationError::Invalid(
                        "Invalid team structure. Each team must have id, name, and color"
                            .to_string(),
                    ));
                }
            }
        }

        let complete = teams.len() == TEAM_IDS.len()
            && TEAM_IDS
                .iter()
                .all(|required| teams.iter().any(|team| team.id == *required));
        if !complete {
            return Err(ValidationError::Invalid(format!(
                "Must have exactly {} teams with ids: {}",
                TEAM_IDS.len(),
                TEAM_IDS.join(", ")
            )));
        }

        Ok(teams)
    }
}

pub fn default_teams() -> Vec<Team> {
    const COLORS: [&str; 4] = ["red", "blue", "green", "yellow"];

    TEAM_IDS
        .iter()
        .zip(COLORS)
        .enumerate()
        .map(|(i, (id, color))| Team {
            id: id.to_string(),
            name: format!("Team {}", i + 1),
            color: color.to_string(),
        })
        .collect()
}

/// Points scored by each of the four teams in one game.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamPoints {
    pub team1: f64,
    pub team2: f64,
    pub team3: f64,
    pub team4: f64,
}

impl TeamPoints {
    pub fn for_team(&self, team_id: &str) -> Option<f64> {
        match team_id {
            "team1" => Some(self.team1),
            "team2" => Some(self.team2),
            "team3" => Some(self.team3),
            "team4" => Some(self.team4),
            _ => None,
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let points = |id: &str| {
            value
                .get(id)
                .and_then(Value::as_f64)
                .ok_or_else(|| ValidationError::Invalid("Invalid teamPoints structure".to_string()))
        };

        Ok(Self {
            team1: points("team1")?,
            team2: points("team2")?,
            team3: points("team3")?,
            team4: points("team4")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardData {
    #[serde(default)]
    pub game_points: BTreeMap<String, TeamPoints>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_roster_has_five_categories_in_order() {
        let keys: Vec<&str> = DEFAULT_ROSTER
            .categories
            .iter()
            .map(|c| c.key.as_str())
            .collect();
        assert_eq!(
            keys,
            vec!["golf", "americanChallenge", "athleticism", "drinkingGame", "drugHandling"]
        );
        assert_eq!(DEFAULT_ROSTER.attendees.len(), 14);
        assert!(DEFAULT_ROSTER.contains("Tobin"));
    }

    #[test]
    fn with_attendees_keeps_categories() {
        let roster = DEFAULT_ROSTER.with_attendees(vec!["Alice".into(), "Bob".into()]);
        assert_eq!(roster.attendees, vec!["Alice", "Bob"]);
        assert_eq!(roster.categories, DEFAULT_ROSTER.categories);
    }

    #[test]
    fn parse_teams_accepts_four_named_teams() {
        let payload = json!({
            "teams": [
                {"id": "team1", "name": "Sharks", "color": "blue"},
                {"id": "team2", "name": "Jets", "color": "green"},
                {"id": "team4", "name": "Bears", "color": "brown"},
                {"id": "team3", "name": "Owls", "color": "gray"},
            ]
        });
        let teams = TeamsData::parse_teams(&payload).unwrap();
        assert_eq!(teams.len(), 4);
        assert_eq!(teams[2].name, "Bears");
    }

    #[test]
    fn parse_teams_rejects_missing_fields_and_wrong_ids() {
        let missing = json!({"teams": [{"id": "team1", "name": "", "color": "red"}]});
        assert_eq!(
            TeamsData::parse_teams(&missing).unwrap_err().to_string(),
            "Invalid team structure. Each team must have id, name, and color"
        );

        let wrong_ids = json!({
            "teams": [
                {"id": "team1", "name": "A", "color": "red"},
                {"id": "team2", "name": "B", "color": "red"},
                {"id": "team3", "name": "C", "color": "red"},
                {"id": "team5", "name": "D", "color": "red"},
            ]
        });
        assert_eq!(
            TeamsData::parse_teams(&wrong_ids).unwrap_err().to_string(),
            "Must have exactly 4 teams with ids: team1, team2, team3, team4"
        );

        assert!(TeamsData::parse_teams(&json!({"teams": "nope"})).is_err());
    }

    #[test]
    fn team_points_require_every_team_to_be_numeric() {
        let ok = TeamPoints::from_value(&json!({"team1": 3, "team2": -1, "team3": 0.5, "team4": 0}))
            .unwrap();
        assert_eq!(ok.for_team("team2"), Some(-1.0));
        assert_eq!(ok.for_team("team9"), None);

        let bad = TeamPoints::from_value(&json!({"team1": 3, "team2": "2", "team3": 0, "team4": 0}));
        assert!(bad.is_err());
    }

    #[test]
    fn leaderboard_data_tolerates_missing_fields() {
        let data: LeaderboardData = serde_json::from_value(json!({})).unwrap();
        assert!(data.game_points.is_empty());
        assert!(data.last_updated.is_none());
    }
}
