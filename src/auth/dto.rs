use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::User;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned after register, login, visitor sign-in or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub uid: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub birth_date: Option<String>,
    pub anonymous: bool,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            uid: u.uid,
            email: u.email.clone(),
            display_name: u.display_name.clone(),
            photo_url: u.photo_url.clone(),
            birth_date: u.birth_date.clone(),
            anonymous: u.anonymous,
        }
    }
}
