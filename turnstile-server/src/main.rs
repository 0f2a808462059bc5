use anyhow::Context;
use axum::Router;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turnstile_server::app::create_app;
use turnstile_server::config::{AppConfig, SERVER_SHUTDOWN_TIMEOUT};
use turnstile_server::cors::OriginPolicy;
use turnstile_server::ice::{IceRefresher, IceServerCache};
use turnstile_server::metrics::register_metrics;
use turnstile_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::parse()?;
    tracing::debug!(?config, "Loaded config");

    let (shutdown_tx, shutdown_rx) = watch::channel(());

    let (prometheus_layer, metrics_handle) = PrometheusMetricLayer::pair();
    register_metrics();

    let ice_servers = Arc::new(IceServerCache::new());
    let refresh_task = match config.ice.create_provider() {
        Ok(provider) => {
            let refresher = Arc::new(IceRefresher::new(
                provider,
                ice_servers.clone(),
                config.ice.fallback_stun_url.clone(),
                config.ice.fetch_timeout,
            ));
            Some(refresher.start(config.ice.refresh_interval, shutdown_rx.clone()))
        }
        Err(err) => {
            tracing::warn!(
                ?err,
                "ICE server provider unavailable, serving without ICE servers"
            );
            None
        }
    };

    let origin_policy =
        Arc::new(OriginPolicy::new(&config.cors).context("Failed to build CORS origin policy")?);
    let app_state = Arc::new(AppState::new(config.clone(), ice_servers, origin_policy));
    let app = create_app(app_state).layer(prometheus_layer);

    let metrics_listener = TcpListener::bind(&config.server.metrics_bind_addr)
        .await
        .context("Failed to bind metrics listener")?;
    let metrics_app = Router::new().route(
        "/metrics",
        get(move || std::future::ready(metrics_handle.render())),
    );
    let mut metrics_shutdown_rx = shutdown_rx.clone();
    tokio::spawn(async move {
        let result = axum::serve(metrics_listener, metrics_app)
            .with_graceful_shutdown(async move {
                let _ = metrics_shutdown_rx.changed().await;
            })
            .await;
        if let Err(err) = result {
            tracing::warn!(?err, "Metrics server failed");
        }
    });

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .context("Failed to bind listener")?;
    tracing::info!(addr = ?listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("Server failed")?;

    if let Some(refresh_task) = refresh_task
        && tokio::time::timeout(SERVER_SHUTDOWN_TIMEOUT, refresh_task)
            .await
            .is_err()
    {
        tracing::warn!("ICE server refresh task did not stop in time");
    }

    Ok(())
}

async fn shutdown_signal(shutdown_tx: watch::Sender<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install terminate handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");

    if shutdown_tx.send(()).is_err() {
        tracing::debug!("No background tasks left to notify about shutdown");
    }
}
