//! Session tokens for registered users and visitors.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    claims::{Claims, TokenKind},
    errors::AuthErrorBody,
    repo::User,
};
use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("expected a {expected:?} token")]
    WrongKind { expected: TokenKind },
}

pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[cfg.audience.as_str()]);
        validation.set_issuer(&[cfg.issuer.as_str()]);
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes.max(1)),
            refresh_ttl: Duration::minutes(cfg.refresh_ttl_minutes.max(1)),
        }
    }

    fn sign(&self, user_id: Uuid, anon: bool, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: (now + ttl).unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
            anon,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn sign_access(&self, user_id: Uuid, anon: bool) -> anyhow::Result<String> {
        self.sign(user_id, anon, TokenKind::Access)
    }

    /// Access and refresh token for the user's current session.
    pub fn issue(&self, user: &User) -> anyhow::Result<TokenPair> {
        let pair = TokenPair {
            access_token: self.sign_access(user.uid, user.anonymous)?,
            refresh_token: self.sign(user.uid, user.anonymous, TokenKind::Refresh)?,
        };
        debug!(user_id = %user.uid, visitor = user.anonymous, "session issued");
        Ok(pair)
    }

    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;
        if claims.kind != expected {
            return Err(TokenError::WrongKind { expected });
        }
        Ok(claims)
    }
}

/// Why a request carried no usable session.
#[derive(Debug)]
pub enum SessionRejection {
    Missing,
    Invalid(TokenError),
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let code = match &self {
            Self::Missing => "auth/missing-token",
            Self::Invalid(e) => {
                warn!(error = %e, "session rejected");
                "auth/invalid-token"
            }
        };
        let body = AuthErrorBody {
            code,
            message: "Sua sessão expirou. Por favor, faça login novamente para continuar.",
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Signed-in user (or visitor) from `Authorization: Bearer <access token>`.
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
            .ok_or(SessionRejection::Missing)?;

        let claims = JwtKeys::from_ref(state)
            .verify(token, TokenKind::Access)
            .map_err(SessionRejection::Invalid)?;
        Ok(AuthUser(claims.sub))
    }
}
