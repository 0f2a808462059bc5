use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// One or more ICE server URIs.
///
/// Browsers accept both a bare string and a list for `RTCIceServer.urls`, so the shape
/// received from a provider is kept as-is when forwarded to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IceUrls {
    One(String),
    Many(Vec<String>),
}

impl IceUrls {
    /// The first URI, which decides how the entry is classified.
    pub fn primary(&self) -> Option<&str> {
        match self {
            IceUrls::One(url) => Some(url.as_str()),
            IceUrls::Many(urls) => urls.first().map(String::as_str),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let urls: &[String] = match self {
            IceUrls::One(url) => std::slice::from_ref(url),
            IceUrls::Many(urls) => urls,
        };
        urls.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            IceUrls::One(url) => url.is_empty(),
            IceUrls::Many(urls) => urls.iter().all(String::is_empty),
        }
    }
}

impl From<String> for IceUrls {
    fn from(value: String) -> Self {
        IceUrls::One(value)
    }
}

impl From<&str> for IceUrls {
    fn from(value: &str) -> Self {
        IceUrls::One(value.to_string())
    }
}

impl From<Vec<String>> for IceUrls {
    fn from(value: Vec<String>) -> Self {
        IceUrls::Many(value)
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServer {
    pub urls: IceUrls,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl Debug for IceServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IceServer")
            .field("urls", &self.urls)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl IceServer {
    pub fn new(urls: impl Into<IceUrls>) -> Self {
        Self {
            urls: urls.into(),
            username: None,
            credential: None,
        }
    }

    pub fn with_auth(mut self, username: String, credential: String) -> Self {
        self.username = Some(username);
        self.credential = Some(credential);
        self
    }

    /// Whether the primary URI uses `scheme` (given without the trailing colon).
    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.urls.primary().is_some_and(|url| {
            url.split_once(':')
                .is_some_and(|(s, _)| s.eq_ignore_ascii_case(scheme))
        })
    }
}

/// Payload served to browsers, shaped like `RTCConfiguration`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RtcConfig {
    pub ice_servers: Vec<IceServer>,
}

impl From<Vec<IceServer>> for RtcConfig {
    fn from(value: Vec<IceServer>) -> Self {
        Self { ice_servers: value }
    }
}
