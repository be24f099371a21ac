pub mod category;
mod handlers;
pub mod model;
mod repo;
pub mod services;
pub mod view;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::pantry_routes()
}
