use crate::routes;
use crate::state::AppState;
use axum::Router;
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

pub fn create_app(state: Arc<AppState>) -> Router {
    let traced = Router::new()
        .merge(routes::webrtc::routes(state.origin_policy.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(true)),
        );

    Router::new()
        .merge(traced)
        .merge(routes::root::untraced_routes())
        .layer(TimeoutLayer::new(state.config.server.request_timeout))
        .with_state(state)
}
