#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod twilio;

use crate::ice::IceError;
use serde::Deserialize;
use turnstile_protocol::http::webrtc::{IceServer, IceUrls};

/// An ICE server entry as handed out by a credential provider, before normalization.
///
/// Providers may still use the legacy singular `url` field from before `RTCIceServer.url`
/// was renamed to `urls`.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct UpstreamIceServer {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub urls: Option<IceUrls>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
}

impl std::fmt::Debug for UpstreamIceServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamIceServer")
            .field("url", &self.url)
            .field("urls", &self.urls)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl UpstreamIceServer {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_urls(urls: impl Into<IceUrls>) -> Self {
        Self {
            urls: Some(urls.into()),
            ..Default::default()
        }
    }

    pub fn with_auth(mut self, username: impl Into<String>, credential: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.credential = Some(credential.into());
        self
    }

    /// Converts into the client-facing shape. `urls` takes precedence over the legacy `url`;
    /// entries without any URI are dropped.
    pub fn normalize(self) -> Option<IceServer> {
        let urls = self
            .urls
            .filter(|urls| !urls.is_empty())
            .or_else(|| self.url.filter(|url| !url.is_empty()).map(IceUrls::One))?;

        Some(IceServer {
            urls,
            username: self.username,
            credential: self.credential,
        })
    }
}

#[async_trait::async_trait]
pub trait IceServerProvider: Send + Sync {
    async fn fetch_ice_servers(&self) -> Result<Vec<UpstreamIceServer>, IceError>;
}
