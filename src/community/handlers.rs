use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::{
    model::{Comment, PostView, RatingSummary},
    services::{self, FeedSort, NewPost, PostChanges},
};
use crate::{auth::AuthUser, error::AppError, state::AppState, storage::ImageUpload};

pub fn community_routes() -> Router<AppState> {
    Router::new()
        .route("/community/posts", get(list_posts).post(create_post))
        .route(
            "/community/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/community/posts/:id/ratings", post(rate_post))
        .route(
            "/community/posts/:id/comments",
            get(list_comments).post(add_comment),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub sort: FeedSort,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub value: u8,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// Fields of the create/edit form; `ingredients` may repeat.
#[derive(Debug, Default)]
struct PostForm {
    body: Option<String>,
    ingredients: Option<Vec<String>>,
    preparation: Option<String>,
    image: Option<ImageUpload>,
}

async fn read_post_form(mut mp: Multipart) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if data.is_empty() {
                    continue;
                }
                let image = ImageUpload::new(data, &content_type).ok_or_else(|| {
                    AppError::BadRequest(format!("unsupported image type: {}", content_type))
                })?;
                form.image = Some(image);
            }
            "body" | "preparation" | "ingredients" | "ingredients[]" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                match name.as_str() {
                    "body" => form.body = Some(text),
                    "preparation" => form.preparation = Some(text),
                    _ => {
                        let item = text.trim();
                        let list = form.ingredients.get_or_insert_with(Vec::new);
                        if !item.is_empty() {
                            list.push(item.to_string());
                        }
                    }
                }
            }
            other => warn!(field = other, "ignoring unknown form field"),
        }
    }
    Ok(form)
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<FeedQuery>,
) -> Json<Vec<PostView>> {
    Json(services::feed(&state, q.sort).await)
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PostView>, AppError> {
    Ok(Json(services::get(&state, &id).await?))
}

#[instrument(skip(state, mp))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mp: Multipart,
) -> Result<(StatusCode, Json<PostView>), AppError> {
    let form = read_post_form(mp).await?;
    let input = NewPost {
        body: form.body.unwrap_or_default(),
        ingredients: form.ingredients.unwrap_or_default(),
        preparation: form.preparation.unwrap_or_default(),
        image: form.image,
    };
    let post = services::create(&state, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

#[instrument(skip(state, mp))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    mp: Multipart,
) -> Result<Json<PostView>, AppError> {
    let form = read_post_form(mp).await?;
    let changes = PostChanges {
        body: form.body,
        ingredients: form.ingredients,
        preparation: form.preparation,
        image: form.image,
    };
    let post = services::update(&state, user_id, &id, changes).await?;
    Ok(Json(post.into()))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services::delete(&state, user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn rate_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<RateRequest>,
) -> Result<Json<RatingSummary>, AppError> {
    Ok(Json(services::rate(&state, user_id, &id, body.value).await?))
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(services::comments(&state, &id).await?))
}

#[instrument(skip(state, body))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = services::add_comment(&state, user_id, &id, &body.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::{
        app::testing::{bearer, call, call_multipart, signed_in, Part},
        state::AppState,
    };

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[tokio::test]
    async fn publish_rate_comment_flow() {
        let state = AppState::fake();
        let (user, token) = signed_in(&state, Some("Ana Souza")).await;

        let (status, _) = call_multipart(
            &state,
            &token,
            Method::POST,
            "/api/v1/community/posts",
            &[Part::Text("body", "sem imagem")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, post) = call_multipart(
            &state,
            &token,
            Method::POST,
            "/api/v1/community/posts",
            &[
                Part::Text("body", "Bolo de cenoura"),
                Part::Text("ingredients", "3 cenouras"),
                Part::Text("ingredients", "4 ovos"),
                Part::Text("preparation", "Bata tudo."),
                Part::File {
                    name: "image",
                    content_type: "image/png",
                    bytes: PNG,
                },
            ],
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(post["author_id"], user.uid.to_string());
        assert_eq!(post["ingredients"], json!(["3 cenouras", "4 ovos"]));
        assert_eq!(post["average_rating"], 0.0);
        let id = post["id"].as_str().unwrap().to_string();

        let other = bearer(&state);
        let (status, summary) = call(
            &state,
            &other,
            Method::POST,
            &format!("/api/v1/community/posts/{}/ratings", id),
            Some(json!({"value": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary, json!({"average_rating": 4.0, "total_ratings": 1}));

        let comments_uri = format!("/api/v1/community/posts/{}/comments", id);
        let (status, _) = call(&state, &other, Method::POST, &comments_uri, Some(json!({"text": " "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, comment) =
            call(&state, &other, Method::POST, &comments_uri, Some(json!({"text": "Que delícia!"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(comment["author"], "Usuário");

        let (_, list) = call(&state, &token, Method::GET, &comments_uri, None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (_, feed) = call(&state, &token, Method::GET, "/api/v1/community/posts?sort=popular", None).await;
        assert_eq!(feed[0]["id"], id.as_str());
        assert_eq!(feed[0]["comments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn edits_and_deletes_are_author_only() {
        let state = AppState::fake();
        let (_, token) = signed_in(&state, Some("Ana")).await;
        let (_, post) = call_multipart(
            &state,
            &token,
            Method::POST,
            "/api/v1/community/posts",
            &[
                Part::Text("body", "antes"),
                Part::File {
                    name: "image",
                    content_type: "image/jpeg",
                    bytes: PNG,
                },
            ],
        )
        .await;
        let uri = format!("/api/v1/community/posts/{}", post["id"].as_str().unwrap());

        let stranger = bearer(&state);
        let (status, _) =
            call_multipart(&state, &stranger, Method::PUT, &uri, &[Part::Text("body", "hack")]).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&state, &stranger, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, edited) =
            call_multipart(&state, &token, Method::PUT, &uri, &[Part::Text("body", "depois")]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["body"], "depois");
        assert!(edited["updated_at"].is_string());

        let (status, _) = call(&state, &token, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&state, &token, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_image_upload_rejected() {
        let state = AppState::fake();
        let (_, token) = signed_in(&state, None).await;
        let (status, _) = call_multipart(
            &state,
            &token,
            Method::POST,
            "/api/v1/community/posts",
            &[Part::File {
                name: "image",
                content_type: "text/html",
                bytes: b"<html>",
            }],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
