use anyhow::Context;
use serde_json::json;

use super::model::Ingredient;
use crate::documents::{user_collection, DocPath, DocumentStore, UserCollection};

fn pantry_path(user_id: &str, name: &str) -> DocPath {
    DocPath::new(user_collection(user_id, UserCollection::Pantry), name)
}

impl Ingredient {
    pub async fn list(docs: &dyn DocumentStore, user_id: &str) -> anyhow::Result<Vec<Ingredient>> {
        docs.read_all(&user_collection(user_id, UserCollection::Pantry))
            .await
            .context("list pantry")
    }

    /// Keyed by the (already normalized) name.
    pub async fn put(&self, docs: &dyn DocumentStore, user_id: &str) -> anyhow::Result<()> {
        docs.write(&pantry_path(user_id, &self.name), self)
            .await
            .with_context(|| format!("write pantry item {}", self.name))
    }

    pub async fn update_category(&self, docs: &dyn DocumentStore, user_id: &str) -> anyhow::Result<()> {
        docs.merge(
            &pantry_path(user_id, &self.name),
            json!({ "category": self.category }),
        )
        .await
        .with_context(|| format!("update pantry item {}", self.name))
    }

    pub async fn remove(docs: &dyn DocumentStore, user_id: &str, name: &str) -> anyhow::Result<()> {
        docs.delete(&pantry_path(user_id, name))
            .await
            .with_context(|| format!("delete pantry item {}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::MemoryDocumentStore;
    use crate::pantry::category::Category;

    #[tokio::test]
    async fn put_update_remove() {
        let docs = MemoryDocumentStore::new();
        let item = Ingredient {
            name: "arroz".into(),
            category: Category::Other,
        };
        item.put(&docs, "u1").await.unwrap();

        let changed = Ingredient {
            category: Category::GrainsAndCereals,
            ..item.clone()
        };
        changed.update_category(&docs, "u1").await.unwrap();
        let stored = Ingredient::list(&docs, "u1").await.unwrap();
        assert_eq!(stored, vec![changed]);

        assert!(Ingredient::list(&docs, "u2").await.unwrap().is_empty());

        Ingredient::remove(&docs, "u1", "arroz").await.unwrap();
        assert!(Ingredient::list(&docs, "u1").await.unwrap().is_empty());
    }
}
