use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{
    catalog::builtin_recipes,
    generator::{generate, GenerateError, RefinementOptions},
    model::Recipe,
    suggestions::suggest,
};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/catalog", get(list_catalog))
        .route("/recipes/generate", post(generate_recipes))
        .route("/recipes/suggestions", get(suggestions))
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub options: RefinementOptions,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub recipes: Vec<Recipe>,
}

impl From<GenerateError> for AppError {
    fn from(e: GenerateError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

pub async fn list_catalog() -> Json<Vec<Recipe>> {
    Json(builtin_recipes())
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
    /// Comma-separated ingredients already in the search box.
    pub exclude: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<&'static str>,
}

pub async fn suggestions(Query(q): Query<SuggestionQuery>) -> Json<SuggestionResponse> {
    let picked: Vec<String> = q
        .exclude
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::to_string)
        .collect();
    Json(SuggestionResponse {
        suggestions: suggest(&q.q, &picked),
    })
}

#[instrument(skip(state, body))]
pub async fn generate_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let recipes = generate(state.llm.as_ref(), &body.ingredients, &body.options).await?;
    info!(%user_id, count = recipes.len(), "recipes generated");
    Ok(Json(GenerateResponse { recipes }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::{
        app::testing::{bearer, call},
        state::AppState,
    };

    #[tokio::test]
    async fn suggestions_skip_picked_ingredients() {
        let state = AppState::fake();
        let token = bearer(&state);

        let (status, body) = call(
            &state,
            &token,
            Method::GET,
            "/api/v1/recipes/suggestions?q=A&exclude=arroz,%20alho",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"suggestions": ["açúcar", "azeite de oliva", "abacate"]}));

        let (_, body) = call(&state, &token, Method::GET, "/api/v1/recipes/suggestions", None).await;
        assert_eq!(body, json!({"suggestions": []}));
    }
}
