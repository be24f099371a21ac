use futures::future::join_all;
use time::{macros::format_description, Date};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::achievements::{evaluate, AchievementsPage, Activity};
use crate::auth::{
    password::{hash_password, is_strong_enough, verify_password},
    repo::User,
    AuthError,
};
use crate::community::{model::CommunityPost, services::remove_post};
use crate::documents::{user_collection, UserCollection};
use crate::error::AppError;
use crate::saved_posts;
use crate::state::AppState;
use crate::storage::{profile_photo_key, ImageUpload};

#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub birth_date: Option<String>,
    pub photo: Option<ImageUpload>,
}

async fn current_user(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    User::find_by_id(state.documents.as_ref(), user_id)
        .await?
        .ok_or(AppError::Auth(AuthError::UserNotFound))
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Applies the non-blank fields; returns the user and the new photo URL, if any.
#[instrument(skip(state, changes))]
pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    changes: ProfileChanges,
) -> Result<(User, Option<String>), AppError> {
    let mut user = current_user(state, user_id).await?;

    if let Some(name) = non_blank(changes.display_name) {
        user.display_name = Some(name);
    }
    if let Some(date) = non_blank(changes.birth_date) {
        Date::parse(&date, format_description!("[year]-[month]-[day]"))
            .map_err(|_| AppError::BadRequest("Data de nascimento inválida.".into()))?;
        user.birth_date = Some(date);
    }
    let mut photo_url = None;
    if let Some(photo) = changes.photo {
        let url = photo
            .store(state.storage.as_ref(), &profile_photo_key(&user_id.to_string()))
            .await?;
        user.photo_url = Some(url.clone());
        photo_url = Some(url);
    }

    user.save(state.documents.as_ref()).await?;
    info!(%user_id, photo = photo_url.is_some(), "profile updated");
    Ok((user, photo_url))
}

#[instrument(skip(state, current, new))]
pub async fn change_password(state: &AppState, user_id: Uuid, current: &str, new: &str) -> Result<(), AppError> {
    let mut user = current_user(state, user_id).await?;
    let Some(hash) = user.password_hash.as_deref() else {
        return Err(AuthError::InvalidCredential.into());
    };
    if !verify_password(current, hash).map_err(AuthError::from)? {
        warn!(%user_id, "password change with wrong current password");
        return Err(AuthError::WrongCurrentPassword.into());
    }
    if !is_strong_enough(new) {
        return Err(AuthError::WeakPassword.into());
    }
    user.password_hash = Some(hash_password(new).map_err(AuthError::from)?);
    user.save(state.documents.as_ref()).await?;
    info!(%user_id, "password changed");
    Ok(())
}

/// Removes the account and everything it owns. Email accounts must confirm
/// their password first.
#[instrument(skip(state, current_password))]
pub async fn delete_account(state: &AppState, user_id: Uuid, current_password: Option<&str>) -> Result<(), AppError> {
    let user = current_user(state, user_id).await?;
    if let Some(hash) = user.password_hash.as_deref() {
        let Some(password) = current_password else {
            return Err(AuthError::RequiresRecentLogin.into());
        };
        if !verify_password(password, hash).map_err(AuthError::from)? {
            warn!(%user_id, "account deletion with wrong password");
            return Err(AuthError::WrongCurrentPassword.into());
        }
    }

    let uid = user_id.to_string();
    let docs = state.documents.as_ref();

    if let Err(e) = state.storage.delete_object(&profile_photo_key(&uid)).await {
        warn!(%user_id, error = %e, "profile photo not deleted");
    }

    let posts = CommunityPost::list_by_author(docs, &uid).await?;
    for result in join_all(posts.iter().map(|p| remove_post(state, p))).await {
        result?;
    }

    let collections: Vec<String> = UserCollection::ALL
        .iter()
        .map(|&sub| user_collection(&uid, sub))
        .collect();
    for result in join_all(collections.iter().map(|c| docs.delete_all(c))).await {
        result?;
    }

    user.delete(docs).await?;
    info!(%user_id, posts = posts.len(), "account deleted");
    Ok(())
}

#[instrument(skip(state))]
pub async fn my_posts(state: &AppState, user_id: Uuid) -> Result<Vec<CommunityPost>, AppError> {
    Ok(CommunityPost::list_by_author(state.documents.as_ref(), &user_id.to_string()).await?)
}

#[instrument(skip(state))]
pub async fn achievements(state: &AppState, user_id: Uuid) -> Result<AchievementsPage, AppError> {
    let user = current_user(state, user_id).await?;
    let uid = user_id.to_string();
    let docs = state.documents.as_ref();
    let (posts, saved) = tokio::join!(
        CommunityPost::list_by_author(docs, &uid),
        saved_posts::list(docs, &uid),
    );
    Ok(evaluate(&Activity {
        posts: posts?.len(),
        saved: saved.len(),
        user: &user,
    }))
}
