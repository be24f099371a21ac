mod handlers;
pub mod model;
mod repo;
pub mod view;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::favorite_routes()
}
