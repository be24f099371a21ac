use anyhow::Context;
use tracing::error;

use super::model::FavoriteRecipe;
use crate::documents::{user_collection, DocPath, DocumentStore, UserCollection};

fn favorite_path(user_id: &str, recipe_id: &str) -> DocPath {
    DocPath::new(user_collection(user_id, UserCollection::Favorites), recipe_id)
}

impl FavoriteRecipe {
    /// Every favorite; a failed read degrades to an empty list.
    pub async fn get_all(docs: &dyn DocumentStore, user_id: &str) -> Vec<FavoriteRecipe> {
        match docs
            .read_all(&user_collection(user_id, UserCollection::Favorites))
            .await
        {
            Ok(items) => items,
            Err(e) => {
                error!(%user_id, error = %e, "failed to load favorites");
                Vec::new()
            }
        }
    }

    /// Keyed by the recipe id; saving again overwrites.
    pub async fn save(&self, docs: &dyn DocumentStore, user_id: &str) -> anyhow::Result<()> {
        docs.write(&favorite_path(user_id, &self.recipe.id), self)
            .await
            .with_context(|| format!("save favorite {}", self.recipe.id))
    }

    pub async fn remove(docs: &dyn DocumentStore, user_id: &str, recipe_id: &str) -> anyhow::Result<()> {
        docs.delete(&favorite_path(user_id, recipe_id))
            .await
            .with_context(|| format!("remove favorite {}", recipe_id))
    }

    pub async fn is_favorite(docs: &dyn DocumentStore, user_id: &str, recipe_id: &str) -> bool {
        match docs.exists(&favorite_path(user_id, recipe_id)).await {
            Ok(found) => found,
            Err(e) => {
                error!(%user_id, recipe_id, error = %e, "failed to check favorite");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::MemoryDocumentStore;
    use crate::recipes::catalog::builtin_recipes;

    #[tokio::test]
    async fn save_then_remove_leaves_list_without_recipe() {
        let docs = MemoryDocumentStore::new();
        let recipes = builtin_recipes();
        for r in &recipes[..2] {
            FavoriteRecipe::stamped(r.clone()).save(&docs, "u1").await.unwrap();
        }
        let removed = &recipes[0].id;
        assert!(FavoriteRecipe::is_favorite(&docs, "u1", removed).await);

        FavoriteRecipe::remove(&docs, "u1", removed).await.unwrap();

        let all = FavoriteRecipe::get_all(&docs, "u1").await;
        assert_eq!(all.len(), 1);
        assert!(all.iter().all(|f| &f.recipe.id != removed));
        assert!(!FavoriteRecipe::is_favorite(&docs, "u1", removed).await);
        assert!(FavoriteRecipe::get_all(&docs, "u2").await.is_empty());
    }
}
