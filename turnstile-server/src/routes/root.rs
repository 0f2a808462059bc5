use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

pub fn untraced_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(get::health))
        .route("/favicon.ico", get(get::favicon))
}

mod get {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    pub async fn health() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    pub async fn favicon() -> impl IntoResponse {
        StatusCode::NOT_FOUND
    }
}
