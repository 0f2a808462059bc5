use crate::cors::OriginPolicy;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

pub fn routes(origin_policy: Arc<OriginPolicy>) -> Router<Arc<AppState>> {
    Router::new().route(
        "/rtcConfig",
        get(get::rtc_config).layer(origin_policy.layer()),
    )
}

mod get {
    use super::*;
    use crate::metrics::RtcConfigMetrics;
    use axum::Json;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use turnstile_protocol::http::webrtc::RtcConfig;

    pub async fn rtc_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
        match state.ice_servers.snapshot() {
            Some(snapshot) => {
                RtcConfigMetrics::served(true);
                (StatusCode::OK, Json(snapshot.to_rtc_config()))
            }
            None => {
                tracing::debug!("No ICE servers available yet");
                RtcConfigMetrics::served(false);
                (StatusCode::NOT_FOUND, Json(RtcConfig::default()))
            }
        }
    }
}
