//! The signed-in user's own account: profile, password, deletion, posts
//! and achievements.

pub mod achievements;
mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
