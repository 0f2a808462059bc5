use crate::app::create_app;
use crate::config::AppConfig;
use crate::cors::OriginPolicy;
use crate::ice::provider::IceServerProvider;
use crate::ice::provider::mock::MockIceProvider;
use crate::ice::{IceError, IceRefresher, IceServerCache};
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A server bound to an ephemeral local port, wired up the same way as the binary.
pub struct TestApp {
    addr: SocketAddr,
    state: Arc<AppState>,
    refresh_task: Option<JoinHandle<()>>,
    shutdown_tx: watch::Sender<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_provider(Arc::new(MockIceProvider::default())).await
    }

    pub async fn with_provider(provider: Arc<MockIceProvider>) -> Self {
        Self::with_provider_and_config(provider, AppConfig::default()).await
    }

    pub async fn with_provider_and_config(
        provider: Arc<MockIceProvider>,
        config: AppConfig,
    ) -> Self {
        let provider: Arc<dyn IceServerProvider> = provider;
        Self::start(config, Ok(provider)).await
    }

    /// Builds the provider from `config.ice`, so incomplete credentials leave the app
    /// without a refresher like the binary does.
    pub async fn from_config(config: AppConfig) -> Self {
        let provider = config.ice.create_provider();
        Self::start(config, provider).await
    }

    async fn start(
        config: AppConfig,
        provider: Result<Arc<dyn IceServerProvider>, IceError>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let ice_servers = Arc::new(IceServerCache::new());
        let refresh_task = provider.ok().map(|provider| {
            Arc::new(IceRefresher::new(
                provider,
                ice_servers.clone(),
                config.ice.fallback_stun_url.clone(),
                config.ice.fetch_timeout,
            ))
            .start(config.ice.refresh_interval, shutdown_rx.clone())
        });

        let origin_policy =
            Arc::new(OriginPolicy::new(&config.cors).expect("Failed to build origin policy"));
        let state = Arc::new(AppState::new(config, ice_servers, origin_policy));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to get local address");

        let app = create_app(state.clone());
        let mut server_shutdown_rx = shutdown_rx;
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = server_shutdown_rx.changed().await;
                })
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            state,
            refresh_task,
            shutdown_tx,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn has_refresher(&self) -> bool {
        self.refresh_task.is_some()
    }

    /// Waits until the first refresh cycle has produced a snapshot.
    pub async fn wait_for_ice_servers(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            while self.state.ice_servers.is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .is_ok()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(refresh_task) = self.refresh_task.take() {
            refresh_task.abort();
        }
    }
}
