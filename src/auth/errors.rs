use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Identity failures, each with a stable code and a pt-BR message for the user.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth/user-not-found")]
    UserNotFound,
    #[error("auth/invalid-credential")]
    InvalidCredential,
    #[error("auth/wrong-password")]
    WrongPassword,
    #[error("auth/wrong-password")]
    WrongCurrentPassword,
    #[error("auth/invalid-email")]
    InvalidEmail,
    #[error("auth/email-already-in-use")]
    EmailAlreadyInUse,
    #[error("auth/weak-password")]
    WeakPassword,
    #[error("auth/requires-recent-login")]
    RequiresRecentLogin,
    #[error("auth/internal-error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct AuthErrorBody {
    pub code: &'static str,
    pub message: &'static str,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound => "auth/user-not-found",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::WrongPassword | Self::WrongCurrentPassword => "auth/wrong-password",
            Self::InvalidEmail => "auth/invalid-email",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::RequiresRecentLogin => "auth/requires-recent-login",
            Self::Internal(_) => "auth/internal-error",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UserNotFound | Self::InvalidCredential | Self::WrongPassword => {
                "Email ou senha incorretos."
            }
            Self::WrongCurrentPassword => "A senha atual está incorreta.",
            Self::InvalidEmail => "O formato do email é inválido.",
            Self::EmailAlreadyInUse => "Este email já foi cadastrado. Tente fazer login.",
            Self::WeakPassword => "Sua senha é fraca. Use pelo menos 6 caracteres.",
            Self::RequiresRecentLogin => {
                "Sua sessão expirou. Por favor, faça login novamente para continuar."
            }
            Self::Internal(_) => "Ocorreu um erro. Tente novamente mais tarde.",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::UserNotFound
            | Self::InvalidCredential
            | Self::WrongPassword
            | Self::WrongCurrentPassword
            | Self::RequiresRecentLogin => StatusCode::UNAUTHORIZED,
            Self::InvalidEmail | Self::WeakPassword => StatusCode::BAD_REQUEST,
            Self::EmailAlreadyInUse => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            tracing::error!(error = %e, "auth internal error");
        }
        let body = AuthErrorBody {
            code: self.code(),
            message: self.user_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
