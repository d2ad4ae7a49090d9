use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::state::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/healthz", get(handlers::health_check))
        .route("/api/plot", get(handlers::plot));

    // Video endpoints; each /video_feed request acquires its own camera handle
    let stream_routes = Router::new()
        .route("/video_feed", get(handlers::video_feed))
        .route("/snapshot", get(handlers::snapshot));

    Router::new()
        .merge(api_routes)
        .merge(stream_routes)
        .merge(super::static_files::static_file_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
