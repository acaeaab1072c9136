use crate::db::edge_config::EdgeConfigConnection;
use crate::error::ConfigError;
use crate::models::{Roster, DEFAULT_ROSTER};
use std::collections::HashSet;
use std::env;
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_API_URL: &str = "https://api.vercel.com";
const DEFAULT_DATABASE_URL: &str = "sqlite:bach_board.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    EdgeConfig {
        connection: EdgeConfigConnection,
        api_url: String,
        api_token: Option<String>,
    },
    Sqlite {
        database_url: String,
    },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub backend: StoreBackend,
    pub roster: Roster,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind_raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", format!("{bind_raw}: {e}")))?;

        let edge_config = var("EDGE_CONFIG");
        let default_backend = if edge_config.is_some() { "edge-config" } else { "sqlite" };
        let backend_name = var("STORE_BACKEND").unwrap_or_else(|| default_backend.to_string());

        let backend = match backend_name.as_str() {
            "edge-config" => {
                let raw = edge_config.ok_or_else(|| {
                    ConfigError::invalid("EDGE_CONFIG", "required by the edge-config backend")
                })?;
                StoreBackend::EdgeConfig {
                    connection: EdgeConfigConnection::parse(&raw)?,
                    api_url: var("VERCEL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                    api_token: var("VERCEL_API_TOKEN"),
                }
            }
            "sqlite" => StoreBackend::Sqlite {
                database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::invalid(
                    "STORE_BACKEND",
                    format!("unknown backend {other:?} (expected edge-config, sqlite or memory)"),
                ));
            }
        };

        let roster = match var("ATTENDEES") {
            Some(raw) => DEFAULT_ROSTER.with_attendees(parse_attendees(&raw)?),
            None => DEFAULT_ROSTER.clone(),
        };

        Ok(Self {
            bind_addr,
            backend,
            roster,
        })
    }
}

fn parse_attendees(raw: &str) -> Result<Vec<String>, ConfigError> {
    let attendees: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if attendees.is_empty() {
        return Err(ConfigError::invalid("ATTENDEES", "no names given"));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = attendees.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(ConfigError::invalid(
            "ATTENDEES",
            format!("{duplicate} is listed twice"),
        ));
    }

    Ok(attendees)
}
