use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attendee name -> rank (1 = best) within one category.
pub type CategoryRanks = BTreeMap<String, i32>;

/// One attendee's ballot across every category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSubmission {
    pub submitted_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub rankings: BTreeMap<String, CategoryRanks>,
}

impl RankingSubmission {
    pub fn new(submitted_by: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            submitted_by: submitted_by.into(),
            timestamp: Some(timestamp),
            rankings: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn with_category<'a>(
        mut self,
        category: &str,
        ranks: impl IntoIterator<Item = (&'a str, i32)>,
    ) -> Self {
        self.rankings.insert(
            category.to_string(),
            ranks
                .into_iter()
                .map(|(attendee, rank)| (attendee.to_string(), rank))
                .collect(),
        );
        self
    }

    pub fn rank_of(&self, category: &str, attendee: &str) -> Option<i32> {
        self.rankings.get(category)?.get(attendee).copied()
    }

    /// Validates a loosely shaped JSON ballot.
    ///
    /// `submittedBy` and `rankings` are mandatory. Inside `rankings`, category
    /// entries that are not objects and ranks that are not integers are dropped
    /// rather than rejected. A missing or unparseable `timestamp` is left unset.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let submitted_by = value
            .get("submittedBy")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::MissingField("submittedBy"))?;

        let raw_rankings = value
            .get("rankings")
            .and_then(Value::as_object)
            .ok_or(ValidationError::MissingField("rankings"))?;

        let mut rankings = BTreeMap::new();
        for (category, entries) in raw_rankings {
            let Some(entries) = entries.as_object() else {
                debug!("Skipping non-object rankings for category {}", category);
                continue;
            };

            let ranks: CategoryRanks = entries
                .iter()
                .filter_map(|(attendee, rank)| match integer_rank(rank) {
                    Some(rank) => Some((attendee.clone(), rank)),
                    None => {
                        debug!("Skipping non-integer rank for {} in {}: {}", attendee, category, rank);
                        None
                    }
                })
                .collect();
            rankings.insert(category.clone(), ranks);
        }

        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(Self {
            submitted_by: submitted_by.to_string(),
            timestamp,
            rankings,
        })
    }
}

fn integer_rank(value: &Value) -> Option<i32> {
    let n = match value.as_i64() {
        Some(n) => n,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 {
                return None;
            }
            f as i64
        }
    };
    i32::try_from(n).ok()
}

/// Validated copies of the stored ballots, for feeding the calculators.
/// Elements that fail validation are skipped; the stored list is not touched.
pub fn parse_submission_list(items: &[Value]) -> Vec<RankingSubmission> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match RankingSubmission::from_value(item) {
            Ok(submission) => Some(submission),
            Err(e) => {
                warn!("Skipping stored submission #{}: {}", i, e);
                None
            }
        })
        .collect()
}
