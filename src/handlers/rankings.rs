use crate::db::{self, RANKINGS_KEY};
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::models::{parse_submission_list, RankingSubmission, Roster};
use crate::voting::{calculate_standings, Standings};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsView {
    pub submissions: Vec<Value>,
    pub submission_count: usize,
    #[serde(flatten)]
    pub standings: Standings,
}

impl RankingsView {
    /// `stored` is echoed back as is; only ballots that validate are counted
    /// towards the standings.
    fn new(roster: &Roster, stored: Vec<Value>) -> Self {
        let standings = calculate_standings(roster, &parse_submission_list(&stored));
        Self {
            submission_count: stored.len(),
            submissions: stored,
            standings,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub write_success: bool,
    #[serde(flatten)]
    pub view: RankingsView,
}

pub async fn list_rankings(State(state): State<AppState>) -> Result<Json<RankingsView>, ApiError> {
    let stored = db::load_stored_submissions(state.store.as_ref())
        .await
        .map_err(|e| {
            error!("Error fetching rankings: {}", e);
            ApiError::Internal("Failed to fetch rankings".to_string())
        })?;

    info!("Fetched {} ranking submission(s)", stored.len());
    Ok(Json(RankingsView::new(&state.roster, stored)))
}

/// Appends one ballot to the stored list and returns the recomputed
/// leaderboards. Earlier entries are written back untouched. A failed write is
/// reported in `writeSuccess`, not as an error.
pub async fn submit_ranking(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let invalid = || ApiError::BadRequest("Invalid submission data".to_string());

    let Json(payload) = payload.map_err(|e| {
        warn!("Rejected ranking body: {}", e);
        invalid()
    })?;
    let mut submission = RankingSubmission::from_value(&payload).map_err(|e| {
        warn!("Rejected ranking submission: {}", e);
        invalid()
    })?;
    submission.timestamp.get_or_insert_with(Utc::now);

    if !state.roster.contains(&submission.submitted_by) {
        warn!("Submission from {} who is not on the roster", submission.submitted_by);
    }

    let mut stored = db::load_stored_submissions(state.store.as_ref())
        .await
        .map_err(|e| {
            error!("Error loading rankings before append: {}", e);
            ApiError::Internal("Failed to save ranking".to_string())
        })?;

    info!(
        "Adding submission from {}; total will be {}",
        submission.submitted_by,
        stored.len() + 1
    );
    let ballot = serde_json::to_value(&submission).map_err(|e| {
        error!("Error serializing submission: {}", e);
        ApiError::Internal("Failed to save ranking".to_string())
    })?;
    stored.push(ballot);

    let write_success = match db::save(state.store.as_ref(), RANKINGS_KEY, &stored).await {
        Ok(()) => true,
        Err(e) => {
            error!("Error writing rankings to {} store: {}", state.store.backend_tag(), e);
            false
        }
    };

    Ok(Json(SubmitResponse {
        success: true,
        write_success,
        view: RankingsView::new(&state.roster, stored),
    }))
}
