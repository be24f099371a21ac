use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};

use super::{
    model::FavoriteRecipe,
    view::{FavoritesPage, FavoritesView},
};
use crate::{auth::AuthUser, error::AppError, recipes::model::Recipe, state::AppState};

pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites).post(save_favorite))
        .route(
            "/favorites/:id",
            get(check_favorite).delete(remove_favorite),
        )
}

#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub favorite: bool,
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(view): Query<FavoritesView>,
) -> Json<FavoritesPage> {
    let all = FavoriteRecipe::get_all(state.documents.as_ref(), &user_id.to_string()).await;
    Json(view.render(all))
}

#[instrument(skip(state, recipe))]
pub async fn save_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(recipe): Json<Recipe>,
) -> Result<(StatusCode, Json<FavoriteRecipe>), AppError> {
    if recipe.id.trim().is_empty() {
        return Err(AppError::BadRequest("recipe id is required".into()));
    }
    let fav = FavoriteRecipe::stamped(recipe);
    fav.save(state.documents.as_ref(), &user_id.to_string()).await?;
    info!(%user_id, recipe_id = %fav.recipe.id, "favorite saved");
    Ok((StatusCode::CREATED, Json(fav)))
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    FavoriteRecipe::remove(state.documents.as_ref(), &user_id.to_string(), &id).await?;
    info!(%user_id, recipe_id = %id, "favorite removed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn check_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Json<FavoriteStatus> {
    let favorite = FavoriteRecipe::is_favorite(state.documents.as_ref(), &user_id.to_string(), &id).await;
    Json(FavoriteStatus { favorite })
}
