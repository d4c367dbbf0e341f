use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/:variant", get(handlers::page))
        .route("/:variant/increment", post(handlers::increment_form))
        .route("/:variant/reset", post(handlers::reset_form))
        .route("/api/:variant/state", get(handlers::get_counts))
        .route("/api/:variant/increment", post(handlers::increment_json))
        .route("/api/:variant/reset", post(handlers::reset_json))
        .route("/api/:variant/keys", post(handlers::key_event))
        .with_state(state)
}
