use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{merge_objects, DocPath, DocumentStore};

/// Process-local document store. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocPath) -> anyhow::Result<Option<Value>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&path.collection)
            .and_then(|c| c.get(&path.id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> anyhow::Result<Vec<(String, Value)>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn set(&self, path: &DocPath, data: Value) -> anyhow::Result<()> {
        let mut guard = self.collections.write().await;
        guard
            .entry(path.collection.clone())
            .or_default()
            .insert(path.id.clone(), data);
        Ok(())
    }

    async fn merge(&self, path: &DocPath, data: Value) -> anyhow::Result<()> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(path.collection.clone()).or_default();
        match docs.get_mut(&path.id) {
            Some(existing) => merge_objects(existing, data),
            None => {
                docs.insert(path.id.clone(), data);
            }
        }
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> anyhow::Result<()> {
        let mut guard = self.collections.write().await;
        if let Some(docs) = guard.get_mut(&path.collection) {
            docs.remove(&path.id);
        }
        Ok(())
    }
}
