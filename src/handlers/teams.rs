use crate::db::{self, TEAMS_KEY};
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::models::TeamsData;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTeamsResponse {
    pub success: bool,
    pub write_success: bool,
    pub teams: TeamsData,
}

// Never fails: clients always get something to render.
pub async fn get_teams(State(state): State<AppState>) -> Json<TeamsData> {
    match db::load_teams(state.store.as_ref()).await {
        Ok(Some(teams)) => Json(teams),
        Ok(None) => Json(TeamsData::defaults()),
        Err(e) => {
            warn!("Error fetching teams, returning defaults: {}", e);
            Json(TeamsData::defaults())
        }
    }
}

pub async fn save_teams(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SaveTeamsResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!("Rejected teams body: {}", e);
        ApiError::BadRequest("Missing or invalid teams array".to_string())
    })?;
    let teams = TeamsData {
        teams: TeamsData::parse_teams(&payload)?,
        last_updated: Some(Utc::now()),
    };

    let write_success = match db::save(state.store.as_ref(), TEAMS_KEY, &teams).await {
        Ok(()) => {
            info!("Saved team names");
            true
        }
        Err(e) => {
            error!("Error writing teams: {}", e);
            false
        }
    };

    Ok(Json(SaveTeamsResponse {
        success: true,
        write_success,
        teams,
    }))
}
