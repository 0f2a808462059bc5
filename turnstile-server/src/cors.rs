use http::request::Parts;
use http::{HeaderValue, Method};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed verbatim, e.g. `https://karaoke.example.com`. Also accepts a
    /// comma-separated string, as set through the environment.
    #[serde(deserialize_with = "deserialize_origins")]
    pub allowed_origins: Vec<String>,
    /// Allow `http(s)://localhost` on any port.
    pub allow_localhost: bool,
    /// Allow single-label subdomains of this tunneling service, e.g. `https://abc.localtunnel.me`.
    pub tunnel_domain: Option<String>,
}

fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Origins {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Origins::deserialize(deserializer)? {
        Origins::List(origins) => origins,
        Origins::Joined(origins) => origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_localhost: true,
            tunnel_domain: Some("localtunnel.me".to_string()),
        }
    }
}

/// Decides which browser origins may read cross-origin responses.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed_origins: HashSet<String>,
    localhost: Option<Regex>,
    tunnel: Option<Regex>,
}

impl OriginPolicy {
    pub fn new(config: &CorsConfig) -> Result<Self, regex::Error> {
        let localhost = config
            .allow_localhost
            .then(|| Regex::new(r"^https?://localhost(:\d+)?$"))
            .transpose()?;

        let tunnel = config
            .tunnel_domain
            .as_deref()
            .map(|domain| domain.trim().trim_start_matches('.'))
            .filter(|domain| !domain.is_empty())
            .map(|domain| Regex::new(&format!(r"^https?://[^./:]+\.{}$", regex::escape(domain))))
            .transpose()?;

        Ok(Self {
            allowed_origins: config
                .allowed_origins
                .iter()
                .map(|origin| origin.trim_end_matches('/').to_string())
                .collect(),
            localhost,
            tunnel,
        })
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.contains(origin)
            || self.localhost.as_ref().is_some_and(|re| re.is_match(origin))
            || self.tunnel.as_ref().is_some_and(|re| re.is_match(origin))
    }

    /// A CORS layer that echoes allowed origins and omits `Access-Control-Allow-Origin` otherwise.
    pub fn layer(self: Arc<Self>) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _parts: &Parts| {
                    origin
                        .to_str()
                        .is_ok_and(|origin| self.is_allowed(origin))
                },
            ))
            .allow_methods([Method::GET])
    }
}
