pub mod edge_config;
pub mod memory;

use crate::config::StoreBackend;
use crate::error::StoreError;
use crate::models::{LeaderboardData, TeamsData};
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use sqlx::{migrate::MigrateDatabase, sqlite::{SqlitePool, SqlitePoolOptions}, Row, Sqlite};
use std::sync::Arc;

pub use edge_config::EdgeConfigStore;
pub use memory::MemoryStore;

pub const RANKINGS_KEY: &str = "rankings";
pub const LEADERBOARD_KEY: &str = "leaderboard";
pub const TEAMS_KEY: &str = "teams";

/// A remote or local store of JSON values addressed by key.
///
/// `upsert` has create-or-update semantics: writing a key that does not exist
/// yet creates it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn upsert(&self, key: &str, value: &Value) -> Result<(), StoreError>;
}

pub async fn connect(backend: &StoreBackend) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    let store: Arc<dyn KeyValueStore> = match backend {
        StoreBackend::EdgeConfig {
            connection,
            api_url,
            api_token,
        } => Arc::new(EdgeConfigStore::new(
            connection.clone(),
            api_url.clone(),
            api_token.clone(),
        )?),
        StoreBackend::Sqlite { database_url } => {
            let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
            Arc::new(SqliteStore::connect(database_url, max_connections).await?)
        }
        StoreBackend::Memory => Arc::new(MemoryStore::default()),
    };
    Ok(store)
}

// Read-modify-write callers (appending a submission, merging game points) race
// with each other: the last writer wins and earlier appends can be lost.

/// The stored ballots exactly as written. Appends go onto this list so entries
/// that no longer validate are carried along unchanged.
pub async fn load_stored_submissions(store: &dyn KeyValueStore) -> Result<Vec<Value>, StoreError> {
    match store.get(RANKINGS_KEY).await? {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => {
            warn!("Stored rankings are not a list; treating as empty");
            Ok(Vec::new())
        }
        None => Ok(Vec::new()),
    }
}

pub async fn load_leaderboard(store: &dyn KeyValueStore) -> Result<LeaderboardData, StoreError> {
    match store.get(LEADERBOARD_KEY).await? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(LeaderboardData::default()),
    }
}

pub async fn load_teams(store: &dyn KeyValueStore) -> Result<Option<TeamsData>, StoreError> {
    match store.get(TEAMS_KEY).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

pub async fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(value)?;
    store.upsert(key, &value).await
}

/// Local stand-in for the hosted store, one row per key.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(db_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        // Create database if it doesn't exist
        if !db_url.contains(":memory:") && !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_items (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT value FROM kv_items WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw = row.get::<String, _>("value");
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv_items (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(serde_json::to_string(value)?)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
