pub mod catalog;
pub mod generator;
mod handlers;
pub mod model;
pub mod suggestions;

use crate::state::AppState;
use axum::Router;

pub use handlers::GenerateResponse;

pub fn router() -> Router<AppState> {
    handlers::recipe_routes()
}
