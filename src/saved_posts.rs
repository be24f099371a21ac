//! Community posts a user bookmarked, kept as copies under `users/{uid}/savedPosts`.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::{
    auth::AuthUser,
    community::model::{CommunityPost, PostView},
    documents::{user_collection, DocPath, DocumentStore, UserCollection},
    error::AppError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/saved-posts", get(list_saved))
        .route("/saved-posts/:post_id", get(check_saved))
        .route("/saved-posts/:post_id/toggle", post(toggle_saved))
}

fn saved_path(user_id: &str, post_id: &str) -> DocPath {
    DocPath::new(user_collection(user_id, UserCollection::SavedPosts), post_id)
}

/// Saved copies; a failed read degrades to an empty list.
pub async fn list(docs: &dyn DocumentStore, user_id: &str) -> Vec<CommunityPost> {
    match docs
        .read_all(&user_collection(user_id, UserCollection::SavedPosts))
        .await
    {
        Ok(posts) => posts,
        Err(e) => {
            error!(%user_id, error = %e, "failed to load saved posts");
            Vec::new()
        }
    }
}

pub async fn is_saved(docs: &dyn DocumentStore, user_id: &str, post_id: &str) -> bool {
    match docs.exists(&saved_path(user_id, post_id)).await {
        Ok(found) => found,
        Err(e) => {
            error!(%user_id, post_id, error = %e, "failed to check saved post");
            false
        }
    }
}

/// Saves a copy when absent, removes it when present; returns whether the
/// post ends up saved. A failed write reports the stored state instead.
pub async fn toggle(docs: &dyn DocumentStore, user_id: &str, post: &CommunityPost) -> bool {
    let path = saved_path(user_id, &post.id);
    let result = async {
        if docs.exists(&path).await? {
            docs.delete(&path).await?;
            Ok::<_, anyhow::Error>(false)
        } else {
            docs.write(&path, post).await?;
            Ok(true)
        }
    }
    .await;
    match result {
        Ok(saved) => saved,
        Err(e) => {
            error!(%user_id, post_id = %post.id, error = %e, "failed to toggle saved post");
            is_saved(docs, user_id, &post.id).await
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SavedStatus {
    pub saved: bool,
}

#[instrument(skip(state))]
pub async fn list_saved(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<Vec<PostView>> {
    let posts = list(state.documents.as_ref(), &user_id.to_string()).await;
    Json(posts.into_iter().map(PostView::from).collect())
}

#[instrument(skip(state))]
pub async fn check_saved(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(post_id): Path<String>,
) -> Json<SavedStatus> {
    let saved = is_saved(state.documents.as_ref(), &user_id.to_string(), &post_id).await;
    Json(SavedStatus { saved })
}

#[instrument(skip(state))]
pub async fn toggle_saved(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<SavedStatus>, AppError> {
    let docs = state.documents.as_ref();
    let uid = user_id.to_string();
    // Unsaving must still work after the original post is gone.
    let post = match CommunityPost::find(docs, &post_id).await? {
        Some(post) => post,
        None => match docs.read::<CommunityPost>(&saved_path(&uid, &post_id)).await? {
            Some(copy) => copy,
            None => return Err(AppError::NotFound),
        },
    };
    let saved = toggle(docs, &uid, &post).await;
    info!(%user_id, post_id = %post_id, saved, "saved post toggled");
    Ok(Json(SavedStatus { saved }))
}
