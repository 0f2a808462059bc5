use crate::ice::provider::IceServerProvider;
use crate::ice::{IceError, IceServerCache, IceSnapshot};
use crate::metrics::IceMetrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{Instrument, instrument};

/// Periodically pulls fresh credentials from an [`IceServerProvider`] into an [`IceServerCache`].
pub struct IceRefresher {
    provider: Arc<dyn IceServerProvider>,
    cache: Arc<IceServerCache>,
    fallback_stun_url: String,
    fetch_timeout: Duration,
}

impl IceRefresher {
    const MIN_PERIOD: Duration = Duration::from_millis(1);

    pub fn new(
        provider: Arc<dyn IceServerProvider>,
        cache: Arc<IceServerCache>,
        fallback_stun_url: impl Into<String>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            fallback_stun_url: fallback_stun_url.into(),
            fetch_timeout,
        }
    }

    pub fn cache(&self) -> &Arc<IceServerCache> {
        &self.cache
    }

    /// Runs a single fetch-and-swap cycle. A failed cycle leaves the current snapshot untouched.
    #[instrument(level = "debug", skip(self))]
    pub async fn refresh_once(&self) -> Result<Arc<IceSnapshot>, IceError> {
        tracing::trace!("Refreshing ICE servers");

        let result = match time::timeout(self.fetch_timeout, self.provider.fetch_ice_servers()).await
        {
            Ok(Ok(servers)) if servers.is_empty() => Err(IceError::MalformedResponse(
                "Provider returned no ICE servers".to_string(),
            )),
            Ok(result) => result,
            Err(_) => Err(IceError::Timeout(format!(
                "Provider did not respond within {:?}",
                self.fetch_timeout
            ))),
        };

        match result {
            Ok(servers) => {
                let snapshot = self
                    .cache
                    .replace(IceSnapshot::build(&self.fallback_stun_url, servers));
                let count = snapshot.ice_servers().len();
                IceMetrics::refreshed(count);
                tracing::debug!(ice_servers = count, "ICE servers refreshed");
                Ok(snapshot)
            }
            Err(err) => {
                IceMetrics::refresh_failed(&err);
                tracing::warn!(?err, "Failed to refresh ICE servers, keeping previous snapshot");
                Err(err)
            }
        }
    }

    /// Spawns the refresh task. The first cycle runs immediately, then every `period` until
    /// `shutdown_rx` fires. Shutdown does not wait for an in-flight fetch.
    #[instrument(level = "debug", skip(self, shutdown_rx))]
    pub fn start(
        self: Arc<Self>,
        period: Duration,
        mut shutdown_rx: watch::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(
            async move {
                let mut ticker = time::interval(period.max(Self::MIN_PERIOD));
                ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        biased;
                        _ = shutdown_rx.changed() => break,
                        _ = ticker.tick() => {}
                    }

                    tokio::select! {
                        biased;
                        _ = shutdown_rx.changed() => break,
                        _ = self.refresh_once() => {}
                    }
                }

                tracing::info!("Shutting down ICE server refresh task");
            }
            .in_current_span(),
        )
    }
}
