use crate::db::KeyValueStore;
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, Value>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn upsert(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn upsert_overwrites_previous_value() {
        let store = MemoryStore::default();
        assert_eq!(store.get("rankings").await.unwrap(), None);

        store.upsert("rankings", &json!([1])).await.unwrap();
        store.upsert("rankings", &json!([1, 2])).await.unwrap();
        assert_eq!(store.get("rankings").await.unwrap(), Some(json!([1, 2])));
    }
}
