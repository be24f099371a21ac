//! Document store seam.
//!
//! Documents are JSON objects addressed by a collection path and an id.
//! Per-user data lives under `users/{uid}/{pantry|favorites|savedPosts}`,
//! shared data under `communityPosts`.

mod memory;
mod postgres;

use std::fmt;

use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

pub const USERS: &str = "users";
pub const USER_EMAILS: &str = "userEmails";
pub const COMMUNITY_POSTS: &str = "communityPosts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCollection {
    Pantry,
    Favorites,
    SavedPosts,
}

impl UserCollection {
    pub const ALL: [UserCollection; 3] = [Self::Pantry, Self::Favorites, Self::SavedPosts];

    fn as_str(self) -> &'static str {
        match self {
            Self::Pantry => "pantry",
            Self::Favorites => "favorites",
            Self::SavedPosts => "savedPosts",
        }
    }
}

pub fn user_collection(user_id: &str, sub: UserCollection) -> String {
    format!("{}/{}/{}", USERS, user_id, sub.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPath {
    pub collection: String,
    pub id: String,
}

impl DocPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &DocPath) -> anyhow::Result<Option<Value>>;
    /// All documents of a collection as `(id, data)`, ordered by id.
    async fn list(&self, collection: &str) -> anyhow::Result<Vec<(String, Value)>>;
    /// Overwrites the whole document.
    async fn set(&self, path: &DocPath, data: Value) -> anyhow::Result<()>;
    /// Shallow merge of top-level keys; creates the document when absent.
    async fn merge(&self, path: &DocPath, data: Value) -> anyhow::Result<()>;
    /// Deleting a missing document is not an error.
    async fn delete(&self, path: &DocPath) -> anyhow::Result<()>;
}

impl<'s> dyn DocumentStore + 's {
    pub async fn read<T: DeserializeOwned>(&self, path: &DocPath) -> anyhow::Result<Option<T>> {
        match self.get(path).await? {
            Some(v) => Ok(Some(
                serde_json::from_value(v).with_context(|| format!("decode {}", path))?,
            )),
            None => Ok(None),
        }
    }

    /// Decodes every document in the collection, skipping ones that do not fit `T`.
    pub async fn read_all<T: DeserializeOwned>(&self, collection: &str) -> anyhow::Result<Vec<T>> {
        let docs = self.list(collection).await?;
        let mut out = Vec::with_capacity(docs.len());
        for (id, data) in docs {
            match serde_json::from_value(data) {
                Ok(v) => out.push(v),
                Err(e) => tracing::warn!(error = %e, collection, id = %id, "skipping malformed document"),
            }
        }
        Ok(out)
    }

    pub async fn write<T: Serialize + ?Sized>(&self, path: &DocPath, data: &T) -> anyhow::Result<()> {
        let value = serde_json::to_value(data).with_context(|| format!("encode {}", path))?;
        self.set(path, value).await
    }

    pub async fn exists(&self, path: &DocPath) -> anyhow::Result<bool> {
        Ok(self.get(path).await?.is_some())
    }

    /// Deletes every document in the collection, issuing the deletes together.
    pub async fn delete_all(&self, collection: &str) -> anyhow::Result<usize> {
        let paths: Vec<DocPath> = self
            .list(collection)
            .await?
            .into_iter()
            .map(|(id, _)| DocPath::new(collection, id))
            .collect();
        let results = join_all(paths.iter().map(|p| self.delete(p))).await;
        for (path, result) in paths.iter().zip(results) {
            result.with_context(|| format!("delete {}", path))?;
        }
        Ok(paths.len())
    }
}

fn merge_objects(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(dst), Value::Object(src)) => {
            for (k, v) in src {
                dst.insert(k, v);
            }
        }
        (dst, src) => *dst = src,
    }
}
