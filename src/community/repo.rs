use anyhow::Context;

use super::model::CommunityPost;
use crate::documents::{DocPath, DocumentStore, COMMUNITY_POSTS};

fn post_path(post_id: &str) -> DocPath {
    DocPath::new(COMMUNITY_POSTS, post_id)
}

impl CommunityPost {
    pub async fn find(docs: &dyn DocumentStore, post_id: &str) -> anyhow::Result<Option<CommunityPost>> {
        docs.read(&post_path(post_id)).await
    }

    pub async fn list_all(docs: &dyn DocumentStore) -> anyhow::Result<Vec<CommunityPost>> {
        docs.read_all(COMMUNITY_POSTS).await.context("list community posts")
    }

    /// Newest first.
    pub async fn list_by_author(docs: &dyn DocumentStore, author_id: &str) -> anyhow::Result<Vec<CommunityPost>> {
        let mut posts: Vec<CommunityPost> = Self::list_all(docs)
            .await?
            .into_iter()
            .filter(|p| p.is_authored_by(author_id))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    /// Whole-document write; concurrent writers race and the last one wins.
    pub async fn save(&self, docs: &dyn DocumentStore) -> anyhow::Result<()> {
        docs.write(&post_path(&self.id), self)
            .await
            .with_context(|| format!("write post {}", self.id))
    }

    pub async fn delete(docs: &dyn DocumentStore, post_id: &str) -> anyhow::Result<()> {
        docs.delete(&post_path(post_id))
            .await
            .with_context(|| format!("delete post {}", post_id))
    }
}
