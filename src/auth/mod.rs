use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
mod errors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;

pub use errors::AuthError;
pub use jwt::AuthUser;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
