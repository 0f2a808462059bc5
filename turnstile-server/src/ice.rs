use crate::ice::provider::IceServerProvider;
use crate::ice::provider::twilio::TwilioIceProvider;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

pub mod cache;
pub mod provider;
pub mod refresher;
pub mod snapshot;

pub use cache::IceServerCache;
pub use refresher::IceRefresher;
pub use snapshot::IceSnapshot;

pub const DEFAULT_FALLBACK_STUN_URL: &str = "stun:23.21.150.121";

#[derive(Debug, thiserror::Error)]
pub enum IceError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("ICE server provider error: {0}")]
    Provider(String),
    #[error("Malformed ICE server provider response: {0}")]
    MalformedResponse(String),
    #[error("Timeout getting ICE servers: {0}")]
    Timeout(String),
}

impl IceError {
    pub fn as_metric_label(&self) -> &'static str {
        match self {
            IceError::Config(_) => "config",
            IceError::Provider(_) => "provider",
            IceError::MalformedResponse(_) => "malformed_response",
            IceError::Timeout(_) => "timeout",
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct IceConfig {
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_base_url: String,
    /// Lifetime of the issued TURN credentials in seconds. The provider default applies when unset.
    pub token_ttl: Option<u64>,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub fallback_stun_url: String,
}

impl Debug for IceConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IceConfig")
            .field("twilio_account_sid", &self.twilio_account_sid)
            .field("has_twilio_auth_token", &self.twilio_auth_token.is_some())
            .field("twilio_base_url", &self.twilio_base_url)
            .field("token_ttl", &self.token_ttl)
            .field("refresh_interval", &self.refresh_interval)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("fallback_stun_url", &self.fallback_stun_url)
            .finish()
    }
}

impl Default for IceConfig {
    fn default() -> Self {
        Self {
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_base_url: TwilioIceProvider::DEFAULT_BASE_URL.to_string(),
            token_ttl: None,
            refresh_interval: Self::DEFAULT_REFRESH_INTERVAL,
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
            fallback_stun_url: DEFAULT_FALLBACK_STUN_URL.to_string(),
        }
    }
}

impl IceConfig {
    const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);
    const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn create_provider(&self) -> Result<Arc<dyn IceServerProvider>, IceError> {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

        match (
            non_empty(&self.twilio_account_sid),
            non_empty(&self.twilio_auth_token),
        ) {
            (Some(account_sid), Some(auth_token)) => Ok(Arc::new(TwilioIceProvider::new(
                &self.twilio_base_url,
                account_sid,
                auth_token,
                self.token_ttl,
                self.fetch_timeout,
            )?)),
            _ => Err(IceError::Config(
                "Missing Twilio account SID or auth token".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_is_config_error() {
        let config = IceConfig::default();
        assert!(matches!(config.create_provider(), Err(IceError::Config(_))));

        let config = IceConfig {
            twilio_account_sid: Some("AC123".to_string()),
            twilio_auth_token: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.create_provider(), Err(IceError::Config(_))));
    }

    #[test]
    fn complete_credentials_create_provider() {
        let config = IceConfig {
            twilio_account_sid: Some("AC123".to_string()),
            twilio_auth_token: Some("token".to_string()),
            ..Default::default()
        };
        assert!(config.create_provider().is_ok());
    }

    #[test]
    fn debug_hides_auth_token() {
        let config = IceConfig {
            twilio_account_sid: Some("AC123".to_string()),
            twilio_auth_token: Some("very-secret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
