use crate::routes;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn create_app() -> Router {
    create_app_with_state(AppState::new())
}

pub fn create_app_with_state(state: AppState) -> Router {
    routes::create_routes(state).route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}
