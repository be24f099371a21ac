use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::model::{Comment, CommunityPost, PostView, RatingSummary};
use crate::auth::repo::User;
use crate::error::AppError;
use crate::state::AppState;
use crate::storage::{post_image_key, ImageUpload};

#[derive(Debug, Error)]
pub enum CommunityError {
    #[error("post not found")]
    NotFound,
    #[error("only the author can change this post")]
    NotAuthor,
    #[error("Selecione uma imagem para a publicação.")]
    MissingImage,
    #[error("A avaliação deve ser entre 1 e 5.")]
    InvalidRating,
    #[error("O comentário não pode estar vazio.")]
    EmptyComment,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<CommunityError> for AppError {
    fn from(e: CommunityError) -> Self {
        match e {
            CommunityError::NotFound => AppError::NotFound,
            CommunityError::NotAuthor => AppError::Forbidden,
            CommunityError::MissingImage
            | CommunityError::InvalidRating
            | CommunityError::EmptyComment => AppError::BadRequest(e.to_string()),
            CommunityError::Internal(e) => AppError::Internal(e),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSort {
    #[default]
    Latest,
    Popular,
}

#[derive(Debug, Default)]
pub struct NewPost {
    pub body: String,
    pub ingredients: Vec<String>,
    pub preparation: String,
    pub image: Option<ImageUpload>,
}

/// Fields left `None` keep their stored value.
#[derive(Debug, Default)]
pub struct PostChanges {
    pub body: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub preparation: Option<String>,
    pub image: Option<ImageUpload>,
}

/// Author name and avatar as shown on posts and comments.
struct Byline {
    author_id: String,
    author: String,
    avatar: String,
}

async fn byline(state: &AppState, user_id: Uuid) -> anyhow::Result<Byline> {
    let user = User::find_by_id(state.documents.as_ref(), user_id)
        .await?
        .unwrap_or_else(|| User {
            uid: user_id,
            ..User::new(None, None, None)
        });
    Ok(Byline {
        author_id: user_id.to_string(),
        author: user.author_name(),
        avatar: user.avatar_url(),
    })
}

async fn load_post(state: &AppState, post_id: &str) -> Result<CommunityPost, CommunityError> {
    CommunityPost::find(state.documents.as_ref(), post_id)
        .await?
        .ok_or(CommunityError::NotFound)
}

async fn load_own_post(state: &AppState, user_id: Uuid, post_id: &str) -> Result<CommunityPost, CommunityError> {
    let post = load_post(state, post_id).await?;
    if !post.is_authored_by(&user_id.to_string()) {
        warn!(%user_id, post_id, "non-author tried to change post");
        return Err(CommunityError::NotAuthor);
    }
    Ok(post)
}

/// Whole feed with derived ratings; a failed read degrades to an empty feed.
#[instrument(skip(state))]
pub async fn feed(state: &AppState, sort: FeedSort) -> Vec<PostView> {
    let mut posts = match CommunityPost::list_all(state.documents.as_ref()).await {
        Ok(posts) => posts,
        Err(e) => {
            error!(error = %e, "failed to load community feed");
            return Vec::new();
        }
    };
    match sort {
        FeedSort::Latest => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        FeedSort::Popular => posts.sort_by(|a, b| {
            b.popularity()
                .total_cmp(&a.popularity())
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
    }
    posts.into_iter().map(PostView::from).collect()
}

pub async fn get(state: &AppState, post_id: &str) -> Result<PostView, CommunityError> {
    Ok(load_post(state, post_id).await?.into())
}

/// Published straight away; the image is required and uploaded under the post id.
#[instrument(skip(state, input))]
pub async fn create(state: &AppState, user_id: Uuid, input: NewPost) -> Result<CommunityPost, CommunityError> {
    let image = input.image.ok_or(CommunityError::MissingImage)?;
    let byline = byline(state, user_id).await?;

    let id = Uuid::new_v4().to_string();
    let image_url = image.store(state.storage.as_ref(), &post_image_key(&id)).await?;

    let post = CommunityPost {
        id,
        author_id: byline.author_id,
        author: byline.author,
        avatar: byline.avatar,
        body: input.body.trim().to_string(),
        image: image_url,
        ingredients: input.ingredients,
        preparation: input.preparation.trim().to_string(),
        ratings: Default::default(),
        comments: Vec::new(),
        created_at: OffsetDateTime::now_utc(),
        updated_at: None,
    };
    post.save(state.documents.as_ref()).await?;
    info!(%user_id, post_id = %post.id, "post published");
    Ok(post)
}

#[instrument(skip(state, changes))]
pub async fn update(
    state: &AppState,
    user_id: Uuid,
    post_id: &str,
    changes: PostChanges,
) -> Result<CommunityPost, CommunityError> {
    let mut post = load_own_post(state, user_id, post_id).await?;

    if let Some(body) = changes.body {
        post.body = body.trim().to_string();
    }
    if let Some(ingredients) = changes.ingredients {
        post.ingredients = ingredients;
    }
    if let Some(preparation) = changes.preparation {
        post.preparation = preparation.trim().to_string();
    }
    if let Some(image) = changes.image {
        post.image = image.store(state.storage.as_ref(), &post_image_key(&post.id)).await?;
    }
    post.updated_at = Some(OffsetDateTime::now_utc());

    post.save(state.documents.as_ref()).await?;
    info!(%user_id, post_id, "post edited");
    Ok(post)
}

/// Removes the document, then the image; a missing image only warns.
#[instrument(skip(state))]
pub async fn delete(state: &AppState, user_id: Uuid, post_id: &str) -> Result<(), CommunityError> {
    let post = load_own_post(state, user_id, post_id).await?;
    remove_post(state, &post).await?;
    info!(%user_id, post_id, "post deleted");
    Ok(())
}

pub(crate) async fn remove_post(state: &AppState, post: &CommunityPost) -> anyhow::Result<()> {
    CommunityPost::delete(state.documents.as_ref(), &post.id).await?;
    if let Err(e) = state.storage.delete_object(&post_image_key(&post.id)).await {
        warn!(post_id = %post.id, error = %e, "post image not deleted");
    }
    Ok(())
}

/// One rating per user; rating again overwrites.
#[instrument(skip(state))]
pub async fn rate(state: &AppState, user_id: Uuid, post_id: &str, value: u8) -> Result<RatingSummary, CommunityError> {
    if !(1..=5).contains(&value) {
        return Err(CommunityError::InvalidRating);
    }
    let mut post = load_post(state, post_id).await?;
    post.ratings.insert(user_id.to_string(), value);
    post.save(state.documents.as_ref()).await?;

    let summary = post.rating_summary();
    info!(%user_id, post_id, value, average = summary.average_rating, "post rated");
    Ok(summary)
}

#[instrument(skip(state, text))]
pub async fn add_comment(state: &AppState, user_id: Uuid, post_id: &str, text: &str) -> Result<Comment, CommunityError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CommunityError::EmptyComment);
    }
    let mut post = load_post(state, post_id).await?;
    let byline = byline(state, user_id).await?;

    let comment = Comment {
        id: Uuid::new_v4().to_string(),
        author_id: byline.author_id,
        author: byline.author,
        avatar: byline.avatar,
        text: text.to_string(),
        created_at: OffsetDateTime::now_utc(),
    };
    post.comments.push(comment.clone());
    post.save(state.documents.as_ref()).await?;
    info!(%user_id, post_id, comment_id = %comment.id, "comment added");
    Ok(comment)
}

/// Oldest first.
pub async fn comments(state: &AppState, post_id: &str) -> Result<Vec<Comment>, CommunityError> {
    let mut comments = load_post(state, post_id).await?.comments;
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(comments)
}
