use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use reqwest::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
use std::sync::Arc;
use std::time::Duration;
use test_log::test;
use turnstile_protocol::http::webrtc::RtcConfig;
use turnstile_server::config::AppConfig;
use turnstile_server::ice::provider::UpstreamIceServer;
use turnstile_server::ice::provider::mock::MockIceProvider;
use turnstile_server::test_utils::TestApp;

const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(2);

fn allow_origin(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|value| value.to_str().ok())
}

async fn get_rtc_config(test_app: &TestApp) -> anyhow::Result<(StatusCode, serde_json::Value)> {
    let response = reqwest::get(test_app.url("/rtcConfig")).await?;
    let status = response.status();
    Ok((status, response.json().await?))
}

#[test(tokio::test)]
async fn no_provider_serves_empty_not_found() -> anyhow::Result<()> {
    let test_app = TestApp::from_config(AppConfig::default()).await;
    assert!(!test_app.has_refresher());

    for _ in 0..3 {
        let (status, body) = get_rtc_config(&test_app).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "iceServers": [] }));
    }

    Ok(())
}

#[test(tokio::test)]
async fn first_refresh_is_served() -> anyhow::Result<()> {
    let provider = Arc::new(MockIceProvider::new(vec![
        UpstreamIceServer::with_url("turn:example.com").with_auth("u", "c"),
    ]));
    let test_app = TestApp::with_provider(provider).await;
    assert!(test_app.wait_for_ice_servers(SNAPSHOT_TIMEOUT).await);

    let response = reqwest::get(test_app.url("/rtcConfig")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.text().await?,
        r#"{"iceServers":[{"urls":"stun:23.21.150.121"},{"urls":"turn:example.com","username":"u","credential":"c"}]}"#
    );

    Ok(())
}

#[test(tokio::test)]
async fn upstream_stun_servers_are_not_served() -> anyhow::Result<()> {
    let provider = Arc::new(MockIceProvider::new(vec![
        UpstreamIceServer::with_url("stun:upstream.example.com"),
        UpstreamIceServer::with_url("turn:upstream.example.com:3478?transport=udp")
            .with_auth("u", "c"),
        UpstreamIceServer::with_urls("turn:upstream.example.com:3478?transport=tcp")
            .with_auth("u", "c"),
    ]));
    let test_app = TestApp::with_provider(provider).await;
    assert!(test_app.wait_for_ice_servers(SNAPSHOT_TIMEOUT).await);

    let response = reqwest::get(test_app.url("/rtcConfig")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let config: RtcConfig = response.json().await?;

    let urls: Vec<_> = config
        .ice_servers
        .iter()
        .flat_map(|server| server.urls.iter())
        .collect();
    assert_eq!(
        urls,
        vec![
            "stun:23.21.150.121",
            "turn:upstream.example.com:3478?transport=udp",
            "turn:upstream.example.com:3478?transport=tcp",
        ]
    );

    Ok(())
}

#[test(tokio::test)]
async fn cors_echoes_allowed_origins_only() -> anyhow::Result<()> {
    let test_app = TestApp::new().await;
    assert!(test_app.wait_for_ice_servers(SNAPSHOT_TIMEOUT).await);
    let client = reqwest::Client::new();

    let allowed = client
        .get(test_app.url("/rtcConfig"))
        .header(ORIGIN, "http://myapp.localtunnel.me")
        .send()
        .await?;
    assert_eq!(allowed.status(), StatusCode::OK);
    assert_eq!(
        allow_origin(&allowed),
        Some("http://myapp.localtunnel.me")
    );

    let rejected = client
        .get(test_app.url("/rtcConfig"))
        .header(ORIGIN, "http://evil.example.com")
        .send()
        .await?;
    assert_eq!(rejected.status(), StatusCode::OK);
    assert_eq!(allow_origin(&rejected), None);

    Ok(())
}

#[test(tokio::test)]
async fn cors_applies_before_first_snapshot() -> anyhow::Result<()> {
    let test_app = TestApp::from_config(AppConfig::default()).await;

    let response = reqwest::Client::new()
        .get(test_app.url("/rtcConfig"))
        .header(ORIGIN, "http://localhost:3000")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        allow_origin(&response),
        Some("http://localhost:3000")
    );

    Ok(())
}

#[test(tokio::test)]
async fn cors_preflight_is_answered() -> anyhow::Result<()> {
    let test_app = TestApp::new().await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, test_app.url("/rtcConfig"))
        .header(ORIGIN, "https://localhost:8443")
        .header("access-control-request-method", "GET")
        .send()
        .await?;

    assert!(response.status().is_success());
    assert_eq!(
        allow_origin(&response),
        Some("https://localhost:8443")
    );

    Ok(())
}

#[test(tokio::test)]
async fn failed_refresh_keeps_serving_previous_snapshot() -> anyhow::Result<()> {
    let provider = Arc::new(MockIceProvider::default());
    let mut config = AppConfig::default();
    config.ice.refresh_interval = Duration::from_millis(20);
    let test_app = TestApp::with_provider_and_config(provider.clone(), config).await;
    assert!(test_app.wait_for_ice_servers(SNAPSHOT_TIMEOUT).await);

    let (status, before) = get_rtc_config(&test_app).await?;
    assert_eq!(status, StatusCode::OK);

    provider.set_error(true);
    let calls = provider.calls();
    tokio::time::timeout(SNAPSHOT_TIMEOUT, async {
        while provider.calls() < calls + 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;

    let (status, after) = get_rtc_config(&test_app).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before, after);

    Ok(())
}

#[test(tokio::test)]
async fn health_is_ok_in_degraded_mode() -> anyhow::Result<()> {
    let test_app = TestApp::from_config(AppConfig::default()).await;

    let response = reqwest::get(test_app.url("/health")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}
