pub mod error;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Only the upload route carries the large body limit.
    let transcribe_routes = Router::new()
        .route("/", post(routes::transcribe::upload))
        .layer(DefaultBodyLimit::max(state.config.upload.max_content_length));

    let api = Router::new()
        .nest("/transcribe", transcribe_routes)
        .route("/task/{task_id}", get(routes::transcribe::status))
        .route("/export/{format}", post(routes::export::export))
        .route("/send-email", post(routes::email::send));

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
