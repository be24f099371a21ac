use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use super::{
    claims::TokenKind,
    dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
    errors::AuthError,
    jwt::{AuthUser, JwtKeys},
    password::{hash_password, is_strong_enough, verify_password},
    repo::User,
};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/anonymous", post(sign_in_anonymously))
        .route("/auth/refresh", post(refresh))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn issue_tokens(state: &AppState, user: &User) -> Result<AuthResponse, AuthError> {
    let pair = JwtKeys::from_ref(state).issue(user).map_err(|e| {
        error!(error = %e, user_id = %user.uid, "failed to sign session");
        AuthError::Internal(e)
    })?;
    Ok(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: PublicUser::from(user),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::InvalidEmail);
    }

    if !is_strong_enough(&payload.password) {
        warn!("password too short");
        return Err(AuthError::WeakPassword);
    }

    if User::find_by_email(state.documents.as_ref(), &payload.email)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(AuthError::EmailAlreadyInUse);
    }

    let hash = hash_password(&payload.password)?;
    let display_name = payload
        .display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let user = User::new(Some(payload.email), display_name, Some(hash));

    if let Err(e) = User::create(state.documents.as_ref(), &user).await {
        error!(error = %e, "create user failed");
        return Err(AuthError::Internal(e));
    }

    info!(user_id = %user.uid, "user registered");
    Ok(Json(issue_tokens(&state, &user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::InvalidEmail);
    }

    let user = match User::find_by_email(state.documents.as_ref(), &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AuthError::UserNotFound);
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(AuthError::Internal(e));
        }
    };

    let Some(hash) = user.password_hash.as_deref() else {
        return Err(AuthError::InvalidCredential);
    };
    if !verify_password(&payload.password, hash)? {
        warn!(user_id = %user.uid, "login invalid password");
        return Err(AuthError::WrongPassword);
    }

    info!(user_id = %user.uid, "user logged in");
    Ok(Json(issue_tokens(&state, &user)?))
}

/// Visitor sign-in: a fresh anonymous user with no email or password.
#[instrument(skip(state))]
pub async fn sign_in_anonymously(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let user = User::new(None, None, None);
    User::create(state.documents.as_ref(), &user).await?;
    info!(user_id = %user.uid, "visitor signed in");
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, &user)?)))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify(&payload.refresh_token, TokenKind::Refresh).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AuthError::InvalidCredential
    })?;

    let user = User::find_by_id(state.documents.as_ref(), claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    Ok(Json(issue_tokens(&state, &user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AuthError> {
    let user = User::find_by_id(state.documents.as_ref(), user_id)
        .await?
        .ok_or_else(|| {
            error!(user_id = %user_id, "user not found");
            AuthError::UserNotFound
        })?;
    Ok(Json(PublicUser::from(&user)))
}
