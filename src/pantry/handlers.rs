use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{
    category::Category,
    model::{normalize_name, CategoryMap, Ingredient},
    services::{self, AddOutcome, PantryManager, RenameOutcome},
    view::{CategoryFilter, PantryEvent, PantryPage, PantryView},
};
use crate::{
    auth::AuthUser,
    error::AppError,
    recipes::{generator::{generate, RefinementOptions}, GenerateResponse},
    state::AppState,
};

pub fn pantry_routes() -> Router<AppState> {
    Router::new()
        .route("/pantry", get(get_pantry).post(add_item))
        .route("/pantry/grouped", get(get_grouped))
        .route("/pantry/kitchen", post(take_to_kitchen))
        .route("/pantry/:name", put(update_item).delete(delete_item))
}

/// View state carried by the caller between requests, plus the card
/// interactions to apply on top of it.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    /// Comma-separated tray contents.
    pub selected: Option<String>,
    /// Card being edited; present but blank cancels the edit.
    pub editing: Option<String>,
    /// Comma-separated cards clicked in this request.
    pub toggle: Option<String>,
    /// Leaving the page empties the tray.
    #[serde(default)]
    pub navigate: bool,
}

fn name_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .filter_map(normalize_name)
        .collect()
}

impl ViewQuery {
    fn events(self) -> Vec<PantryEvent> {
        let mut events = vec![
            PantryEvent::SelectCategory(CategoryFilter::from_param(self.category.as_deref())),
            PantryEvent::Search(self.search.unwrap_or_default()),
        ];
        events.extend(
            name_list(self.selected.as_deref())
                .into_iter()
                .map(PantryEvent::DropOnTray),
        );
        if self.navigate {
            events.push(PantryEvent::Navigate);
        }
        match self.editing.as_deref().map(normalize_name) {
            Some(Some(name)) => events.push(PantryEvent::BeginEdit(name)),
            Some(None) => events.push(PantryEvent::CancelEdit),
            None => {}
        }
        events.extend(
            name_list(self.toggle.as_deref())
                .into_iter()
                .map(PantryEvent::Toggle),
        );
        events
    }

    /// Page state without a loaded grouping; enough for the tray.
    fn into_view(self) -> PantryView {
        let mut view = PantryView::default();
        for event in self.events() {
            view.update(event);
        }
        view
    }
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub name: String,
    #[serde(default)]
    pub category: Category,
}

#[derive(Debug, Deserialize)]
pub struct KitchenRequest {
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default)]
    pub options: RefinementOptions,
}

#[derive(Debug, Serialize)]
pub struct PantryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient: Option<Ingredient>,
    pub page: PantryPage,
}

/// Loads the grouping, then replays the caller's view state over it.
async fn open(state: &AppState, user_id: String, q: ViewQuery) -> PantryManager<'_> {
    let mut pantry = PantryManager::new(state, user_id, PantryView::default());
    pantry.reload().await;
    for event in q.events() {
        pantry.apply(event);
    }
    pantry
}

#[instrument(skip(state))]
pub async fn get_pantry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ViewQuery>,
) -> Json<PantryPage> {
    let pantry = open(&state, user_id.to_string(), q).await;
    Json(pantry.view().render())
}

#[instrument(skip(state))]
pub async fn get_grouped(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<CategoryMap> {
    Json(services::load(&state, &user_id.to_string()).await)
}

#[instrument(skip(state))]
pub async fn add_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ViewQuery>,
    Json(body): Json<AddRequest>,
) -> Result<(StatusCode, Json<PantryResponse>), AppError> {
    let mut pantry = open(&state, user_id.to_string(), q).await;
    match pantry.add(&body.name).await {
        AddOutcome::Added(item) => Ok((
            StatusCode::CREATED,
            Json(PantryResponse {
                ingredient: Some(item),
                page: pantry.view().render(),
            }),
        )),
        AddOutcome::Blank => Err(AppError::BadRequest(
            "Informe o nome do ingrediente.".into(),
        )),
        AddOutcome::Duplicate => Err(AppError::Conflict(
            "Este ingrediente já está na sua despensa.".into(),
        )),
        AddOutcome::Failed => Err(AppError::Internal(anyhow::anyhow!(
            "failed to add ingredient"
        ))),
    }
}

#[instrument(skip(state))]
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
    Query(q): Query<ViewQuery>,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<PantryResponse>, AppError> {
    let old = normalize_name(&name).ok_or(AppError::NotFound)?;
    let mut pantry = open(&state, user_id.to_string(), q).await;
    match pantry.rename(&old, &body.name, body.category).await {
        RenameOutcome::Updated(item) => Ok(Json(PantryResponse {
            ingredient: Some(item),
            page: pantry.view().render(),
        })),
        RenameOutcome::Blank => Err(AppError::BadRequest(
            "Informe o nome do ingrediente.".into(),
        )),
        RenameOutcome::NotFound => Err(AppError::NotFound),
        RenameOutcome::Duplicate => Err(AppError::Conflict(
            "Já existe um ingrediente com esse nome.".into(),
        )),
        RenameOutcome::Failed => Err(AppError::Internal(anyhow::anyhow!(
            "failed to update ingredient"
        ))),
    }
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<PantryResponse>, AppError> {
    let name = normalize_name(&name).ok_or(AppError::NotFound)?;
    let mut pantry = open(&state, user_id.to_string(), q).await;
    if !pantry.remove(&name).await {
        return Err(AppError::Internal(anyhow::anyhow!(
            "failed to remove ingredient"
        )));
    }
    Ok(Json(PantryResponse {
        ingredient: None,
        page: pantry.view().render(),
    }))
}

/// Generates recipes from the tray built by `selected` in the query and body.
#[instrument(skip(state, body))]
pub async fn take_to_kitchen(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ViewQuery>,
    Json(body): Json<KitchenRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let mut view = q.into_view();
    for name in body.selected.iter().filter_map(|n| normalize_name(n)) {
        view.update(PantryEvent::DropOnTray(name));
    }
    let Some(tray) = view.take_to_kitchen() else {
        return Err(AppError::BadRequest(
            "Selecione pelo menos um ingrediente.".into(),
        ));
    };
    let recipes = generate(state.llm.as_ref(), &tray, &body.options).await?;
    info!(%user_id, tray = tray.len(), count = recipes.len(), "recipes from pantry tray");
    Ok(Json(GenerateResponse { recipes }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::{
        app::{build_app, testing::{bearer, call}},
        llm::testing::ScriptedClient,
        state::AppState,
    };

    #[tokio::test]
    async fn add_then_list_grouped() {
        let state = AppState::fake_with_llm(Arc::new(
            ScriptedClient::new().reply("Legumes e Verduras"),
        ));
        let token = bearer(&state);

        let (status, body) = call(
            &state,
            &token,
            Method::POST,
            "/api/v1/pantry",
            Some(json!({"name": "Tomate"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["ingredient"]["name"], "tomate");

        let (status, grouped) = call(&state, &token, Method::GET, "/api/v1/pantry/grouped", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            grouped,
            json!({"Legumes e Verduras": [{"name": "tomate", "category": "Legumes e Verduras"}]})
        );

        let (status, _) = call(
            &state,
            &token,
            Method::POST,
            "/api/v1/pantry",
            Some(json!({"name": "TOMATE"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn page_carries_tray_from_query() {
        let state = AppState::fake();
        let token = bearer(&state);
        for name in ["ovo", "leite"] {
            call(&state, &token, Method::POST, "/api/v1/pantry", Some(json!({ "name": name }))).await;
        }

        let (status, page) = call(
            &state,
            &token,
            Method::GET,
            "/api/v1/pantry?category=Outros&selected=ovo",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["tray"], json!(["ovo"]));
        assert_eq!(page["tabs"][0]["name"], "Todos");
        assert_eq!(page["tabs"][1]["active"], true);
        let ovo = page["items"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == "ovo")
            .unwrap();
        assert_eq!(ovo["selected"], true);
    }

    #[tokio::test]
    async fn card_interactions_from_query() {
        let state = AppState::fake();
        let token = bearer(&state);
        for name in ["tomate", "alface"] {
            call(&state, &token, Method::POST, "/api/v1/pantry", Some(json!({ "name": name }))).await;
        }
        let card = |page: &serde_json::Value, name: &str| {
            page["items"]
                .as_array()
                .unwrap()
                .iter()
                .find(|c| c["name"] == name)
                .cloned()
                .unwrap()
        };

        let (_, p) = call(&state, &token, Method::GET, "/api/v1/pantry?selected=tomate&toggle=Alface", None).await;
        assert_eq!(p["tray"], json!(["tomate", "alface"]));

        let (_, p) = call(&state, &token, Method::GET, "/api/v1/pantry?selected=tomate&editing=alface&toggle=alface", None).await;
        assert_eq!(p["tray"], json!(["tomate"]));
        let editing = card(&p, "alface");
        assert_eq!(editing["editing"], true);
        assert_eq!(editing["draggable"], false);
        assert_eq!(card(&p, "tomate")["draggable"], true);

        let (_, p) = call(&state, &token, Method::GET, "/api/v1/pantry?selected=alface&editing=&toggle=alface", None).await;
        assert_eq!(p["tray"], json!([]));
        assert_eq!(card(&p, "alface")["editing"], false);

        let (_, p) = call(&state, &token, Method::GET, "/api/v1/pantry?selected=tomate,alface&navigate=true", None).await;
        assert_eq!(p["tray"], json!([]));

        let (_, p) = call(&state, &token, Method::GET, "/api/v1/pantry?search=ALF", None).await;
        assert_eq!(p["items"].as_array().unwrap().len(), 1);
        assert_eq!(p["search"], "ALF");
    }

    #[tokio::test]
    async fn update_and_delete() {
        let state = AppState::fake();
        let token = bearer(&state);
        call(&state, &token, Method::POST, "/api/v1/pantry", Some(json!({"name": "feijao"}))).await;

        let (status, body) = call(
            &state,
            &token,
            Method::PUT,
            "/api/v1/pantry/feijao",
            Some(json!({"name": "Feijão Preto", "category": "Feijões e Leguminosas"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ingredient"]["name"], "feijão preto");

        let (status, _) = call(
            &state,
            &token,
            Method::PUT,
            "/api/v1/pantry/feijao",
            Some(json!({"name": "x", "category": "Outros"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(
            &state,
            &token,
            Method::DELETE,
            "/api/v1/pantry/feij%C3%A3o%20preto",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"]["empty"], true);
    }

    #[tokio::test]
    async fn kitchen_requires_a_selection() {
        let state = AppState::fake();
        let token = bearer(&state);
        let (status, _) = call(
            &state,
            &token,
            Method::POST,
            "/api/v1/pantry/kitchen",
            Some(json!({"selected": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &state,
            &token,
            Method::POST,
            "/api/v1/pantry/kitchen?selected=ovo",
            Some(json!({"selected": ["Leite"], "options": {"taste": "sweet"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recipes"][0]["ingredients"], json!(["Item: ovo", "Item: leite"]));
    }

    #[tokio::test]
    async fn requires_token() {
        let state = AppState::fake();
        let res = build_app(state)
            .oneshot(Request::get("/api/v1/pantry").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
