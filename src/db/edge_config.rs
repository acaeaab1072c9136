use crate::db::KeyValueStore;
use crate::error::{ConfigError, StoreError};
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

// The hosted store caps a single item at 256 KiB.
const LARGE_ITEM_BYTES: usize = 250 * 1024;

lazy_static! {
    static ref CONNECTION_STRING: Regex = Regex::new(
        r"^(?P<base>https?://[^/?#]+(?:/[^?#]*?)?)/(?P<id>[^/?#]+)/?(?:\?(?P<query>[^#]*))?$"
    )
    .expect("connection string pattern");
}

/// Where and how to read: `https://<host>/<config id>?token=<read token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeConfigConnection {
    pub read_base: String,
    pub config_id: String,
    pub read_token: Option<String>,
}

impl EdgeConfigConnection {
    pub fn parse(connection_string: &str) -> Result<Self, ConfigError> {
        let caps = CONNECTION_STRING
            .captures(connection_string.trim())
            .ok_or_else(|| {
                ConfigError::invalid(
                    "EDGE_CONFIG",
                    "expected https://<host>/<config id>?token=<read token>",
                )
            })?;

        let read_token = caps
            .name("query")
            .and_then(|query| {
                query
                    .as_str()
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("token="))
            })
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        Ok(Self {
            read_base: caps["base"].to_string(),
            config_id: caps["id"].to_string(),
            read_token,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Update,
    Create,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Update => "update",
            Operation::Create => "create",
        }
    }
}

/// Client for the hosted configuration store: reads go through the edge read
/// API with the connection string's token, writes through the management API
/// with a separate bearer token.
pub struct EdgeConfigStore {
    client: reqwest::Client,
    connection: EdgeConfigConnection,
    api_url: String,
    api_token: Option<String>,
}

impl EdgeConfigStore {
    pub fn new(
        connection: EdgeConfigConnection,
        api_url: String,
        api_token: Option<String>,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            connection,
            api_url,
            api_token,
        })
    }

    fn item_url(&self, key: &str) -> String {
        format!(
            "{}/{}/item/{}",
            self.connection.read_base, self.connection.config_id, key
        )
    }

    fn items_url(&self) -> String {
        format!(
            "{}/v1/edge-config/{}/items",
            self.api_url.trim_end_matches('/'),
            self.connection.config_id
        )
    }
}

// The management API answers an update of an absent key with a 400 whose
// message mentions a non-existing item.
fn is_missing_item(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(|message| message.contains("non-existing"))
        })
        .unwrap_or(false)
}

#[async_trait]
impl KeyValueStore for EdgeConfigStore {
    fn backend_tag(&self) -> &'static str {
        "edge-config"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut request = self.client.get(self.item_url(key));
        if let Some(token) = &self.connection.read_token {
            request = request.query(&[("token", token)]);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<Value>().await?)),
            status => Err(StoreError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn upsert(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let token = self
            .api_token
            .as_deref()
            .ok_or(StoreError::MissingCredentials("VERCEL_API_TOKEN"))?;

        let size = serde_json::to_vec(value)?.len();
        if size > LARGE_ITEM_BYTES {
            warn!(
                "Item {} is {} bytes, close to the 256 KiB store limit",
                key, size
            );
        }

        let mut operation = Operation::Update;
        loop {
            let body = json!({
                "items": [{
                    "operation": operation.as_str(),
                    "key": key,
                    "value": value,
                }]
            });

            let response = self
                .client
                .patch(self.items_url())
                .bearer_auth(token)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                info!(
                    "Wrote {} ({} bytes) using {}",
                    key,
                    size,
                    operation.as_str()
                );
                return Ok(());
            }

            let text = response.text().await.unwrap_or_default();
            if status == StatusCode::BAD_REQUEST
                && operation == Operation::Update
                && is_missing_item(&text)
            {
                info!("Item {} doesn't exist yet, retrying with create", key);
                operation = Operation::Create;
                continue;
            }

            return Err(StoreError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
    }
}
