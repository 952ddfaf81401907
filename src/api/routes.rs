use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Reader profiles
        .route("/profiles", post(handlers::load_profile))
        .route("/profiles/:reader_id", get(handlers::get_profile))
        // Gift recommendations
        .route(
            "/profiles/:reader_id/gift-suggestions",
            post(handlers::suggest_gifts),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
