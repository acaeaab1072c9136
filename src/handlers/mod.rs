mod leaderboard;
mod rankings;
mod teams;

use crate::db::KeyValueStore;
use crate::models::Roster;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub roster: Arc<Roster>,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, roster: Roster) -> Self {
        Self {
            store,
            roster: Arc::new(roster),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/rankings",
            get(rankings::list_rankings).post(rankings::submit_ranking),
        )
        .route(
            "/api/leaderboard",
            get(leaderboard::get_leaderboard).post(leaderboard::record_game_points),
        )
        .route("/api/teams", get(teams::get_teams).post(teams::save_teams))
        .route("/api/roster", get(get_roster))
        .with_state(state)
}

async fn get_roster(State(state): State<AppState>) -> Json<Roster> {
    Json(state.roster.as_ref().clone())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use serde_json::Value;

    /// Serves reads from an inner memory store and fails every write.
    #[derive(Default)]
    pub struct ReadOnlyStore {
        pub inner: MemoryStore,
    }

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        fn backend_tag(&self) -> &'static str {
            "read-only"
        }

        async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
            self.inner.get(key).await
        }

        async fn upsert(&self, _key: &str, _value: &Value) -> Result<(), StoreError> {
            Err(StoreError::Status {
                status: 403,
                body: "read only".to_string(),
            })
        }
    }

    /// Fails every call.
    pub struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        fn backend_tag(&self) -> &'static str {
            "broken"
        }

        async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }

        async fn upsert(&self, _key: &str, _value: &Value) -> Result<(), StoreError> {
            Err(StoreError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    /// Binds the router on an ephemeral port and returns its base URL.
    pub async fn serve(store: Arc<dyn KeyValueStore>, roster: Roster) -> String {
        let app = router(AppState::new(store, roster));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
        format!("http://{addr}")
    }
}
