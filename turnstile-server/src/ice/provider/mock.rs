use crate::ice::IceError;
use crate::ice::provider::{IceServerProvider, UpstreamIceServer};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug)]
pub struct MockIceProvider {
    state: Mutex<State>,
    calls: AtomicUsize,
}

#[derive(Debug, Clone)]
struct State {
    should_error: bool,
    delay: Option<Duration>,
    servers: Vec<UpstreamIceServer>,
}

impl MockIceProvider {
    pub fn new(servers: Vec<UpstreamIceServer>) -> Self {
        Self {
            state: Mutex::new(State {
                should_error: false,
                delay: None,
                servers,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_servers(&self, servers: Vec<UpstreamIceServer>) {
        self.state.lock().servers = servers;
    }

    pub fn set_error(&self, should_error: bool) {
        self.state.lock().should_error = should_error;
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        self.state.lock().delay = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockIceProvider {
    fn default() -> Self {
        Self::new(vec![
            UpstreamIceServer::with_url("stun:global.stun.twilio.com:3478?transport=udp"),
            UpstreamIceServer::with_url("turn:global.turn.twilio.com:3478?transport=udp")
                .with_auth("user", "credential"),
        ])
    }
}

#[async_trait]
impl IceServerProvider for MockIceProvider {
    async fn fetch_ice_servers(&self) -> Result<Vec<UpstreamIceServer>, IceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let state = self.state.lock().clone();
        if let Some(delay) = state.delay {
            tokio::time::sleep(delay).await;
        }
        if state.should_error {
            return Err(IceError::Provider("Mock error".to_string()));
        }
        if state.servers.is_empty() {
            return Err(IceError::MalformedResponse("Mock without servers".to_string()));
        }
        Ok(state.servers)
    }
}
