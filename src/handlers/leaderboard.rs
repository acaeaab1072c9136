use crate::db::{self, LEADERBOARD_KEY};
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::models::{LeaderboardData, TeamPoints, TeamsData};
use crate::voting::{calculate_team_totals, TeamTotal};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct LeaderboardView {
    #[serde(flatten)]
    pub data: LeaderboardData,
    pub standings: Vec<TeamTotal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub success: bool,
    pub write_success: bool,
    pub leaderboard: LeaderboardData,
}

pub async fn get_leaderboard(State(state): State<AppState>) -> Result<Json<LeaderboardView>, ApiError> {
    let data = db::load_leaderboard(state.store.as_ref())
        .await
        .map_err(|e| {
            error!("Error fetching leaderboard: {}", e);
            ApiError::Internal("Failed to fetch leaderboard".to_string())
        })?;

    let teams = match db::load_teams(state.store.as_ref()).await {
        Ok(Some(stored)) => stored.teams,
        Ok(None) => TeamsData::defaults().teams,
        Err(e) => {
            warn!("Using default teams for leaderboard: {}", e);
            TeamsData::defaults().teams
        }
    };

    let standings = calculate_team_totals(&teams, &data);
    Ok(Json(LeaderboardView { data, standings }))
}

pub async fn record_game_points(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RecordResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!("Rejected leaderboard body: {}", e);
        ApiError::BadRequest("Missing gameName or teamPoints".to_string())
    })?;
    let game_name = payload
        .get("gameName")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty());
    let raw_points = payload.get("teamPoints").filter(|points| !points.is_null());

    let (Some(game_name), Some(raw_points)) = (game_name, raw_points) else {
        return Err(ApiError::BadRequest("Missing gameName or teamPoints".to_string()));
    };
    let team_points = TeamPoints::from_value(raw_points)?;

    let mut leaderboard = db::load_leaderboard(state.store.as_ref())
        .await
        .map_err(|e| {
            error!("Error loading leaderboard before update: {}", e);
            ApiError::Internal("Failed to save leaderboard".to_string())
        })?;

    leaderboard
        .game_points
        .insert(game_name.to_string(), team_points);
    leaderboard.last_updated = Some(Utc::now());
    info!("Recorded points for {}", game_name);

    let write_success = match db::save(state.store.as_ref(), LEADERBOARD_KEY, &leaderboard).await {
        Ok(()) => true,
        Err(e) => {
            error!("Error writing leaderboard: {}", e);
            false
        }
    };

    Ok(Json(RecordResponse {
        success: true,
        write_success,
        leaderboard,
    }))
}
