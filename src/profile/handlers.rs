use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::{
    achievements::AchievementsPage,
    services::{self, ProfileChanges},
};
use crate::{
    auth::{dto::PublicUser, handlers::get_me, AuthUser},
    community::model::PostView,
    error::AppError,
    state::AppState,
    storage::ImageUpload,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).delete(delete_account))
        .route("/me/profile", put(update_profile))
        .route("/me/password", put(change_password))
        .route("/me/posts", get(my_posts))
        .route("/me/achievements", get(achievements))
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Permanent URL of the photo sent with this request, if any.
    pub photo_url: Option<String>,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub current_password: Option<String>,
}

async fn read_profile_form(mut mp: Multipart) -> Result<ProfileChanges, AppError> {
    let bad = |e: axum::extract::multipart::MultipartError| AppError::BadRequest(e.to_string());
    let mut changes = ProfileChanges::default();
    while let Some(field) = mp.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "display_name" => changes.display_name = Some(field.text().await.map_err(bad)?),
            "birth_date" => changes.birth_date = Some(field.text().await.map_err(bad)?),
            "photo" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad)?;
                if data.is_empty() {
                    continue;
                }
                changes.photo = Some(ImageUpload::new(data, &content_type).ok_or_else(|| {
                    AppError::BadRequest(format!("unsupported image type: {}", content_type))
                })?);
            }
            other => warn!(field = other, "ignoring unknown form field"),
        }
    }
    Ok(changes)
}

#[instrument(skip(state, mp))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mp: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    let changes = read_profile_form(mp).await?;
    let (user, photo_url) = services::update_profile(&state, user_id, changes).await?;
    Ok(Json(ProfileResponse {
        photo_url,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, body))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<PasswordRequest>,
) -> Result<StatusCode, AppError> {
    services::change_password(&state, user_id, &body.current_password, &body.new_password).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Option<Json<DeleteAccountRequest>>,
) -> Result<StatusCode, AppError> {
    let Json(body) = body.unwrap_or_default();
    services::delete_account(&state, user_id, body.current_password.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn my_posts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<PostView>>, AppError> {
    let posts = services::my_posts(&state, user_id).await?;
    Ok(Json(posts.into_iter().map(PostView::from).collect()))
}

#[instrument(skip(state))]
pub async fn achievements(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<AchievementsPage>, AppError> {
    Ok(Json(services::achievements(&state, user_id).await?))
}
