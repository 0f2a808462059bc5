use crate::ice::provider::UpstreamIceServer;
use turnstile_protocol::http::webrtc::{IceServer, RtcConfig};

/// An immutable set of ICE servers built from a single provider response.
#[derive(Debug, Clone, PartialEq)]
pub struct IceSnapshot {
    ice_servers: Vec<IceServer>,
}

impl IceSnapshot {
    /// Builds the client-facing server list from a provider response.
    ///
    /// STUN entries handed out by the provider are dropped and `fallback_stun_url` is always
    /// served first instead.
    pub fn build(fallback_stun_url: &str, upstream: Vec<UpstreamIceServer>) -> Self {
        let ice_servers = std::iter::once(IceServer::new(fallback_stun_url))
            .chain(
                upstream
                    .into_iter()
                    .filter_map(UpstreamIceServer::normalize)
                    .filter(|server| !server.has_scheme("stun")),
            )
            .collect();

        Self { ice_servers }
    }

    pub fn ice_servers(&self) -> &[IceServer] {
        &self.ice_servers
    }

    pub fn to_rtc_config(&self) -> RtcConfig {
        RtcConfig::from(self.ice_servers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ice::DEFAULT_FALLBACK_STUN_URL;
    use pretty_assertions::assert_eq;
    use turnstile_protocol::http::webrtc::IceUrls;

    #[test]
    fn fallback_stun_comes_first() {
        let snapshot = IceSnapshot::build(
            DEFAULT_FALLBACK_STUN_URL,
            vec![UpstreamIceServer::with_url("turn:example.com").with_auth("u", "c")],
        );

        assert_eq!(
            snapshot.ice_servers(),
            &[
                IceServer::new("stun:23.21.150.121"),
                IceServer::new("turn:example.com").with_auth("u".to_string(), "c".to_string()),
            ]
        );
    }

    #[test]
    fn upstream_stun_entries_are_dropped() {
        let snapshot = IceSnapshot::build(
            DEFAULT_FALLBACK_STUN_URL,
            vec![
                UpstreamIceServer::with_url("stun:upstream.example.com"),
                UpstreamIceServer::with_url("turn:a.example.com:3478?transport=udp")
                    .with_auth("u", "c"),
                UpstreamIceServer::with_urls(vec![
                    "stun:b.example.com".to_string(),
                    "turn:b.example.com".to_string(),
                ]),
                UpstreamIceServer::with_urls("turns:c.example.com:443?transport=tcp")
                    .with_auth("u", "c"),
            ],
        );

        let primaries: Vec<_> = snapshot
            .ice_servers()
            .iter()
            .filter_map(|s| s.urls.primary())
            .collect();
        assert_eq!(
            primaries,
            vec![
                "stun:23.21.150.121",
                "turn:a.example.com:3478?transport=udp",
                "turns:c.example.com:443?transport=tcp",
            ]
        );
    }

    #[test]
    fn legacy_url_is_served_as_urls() {
        let snapshot = IceSnapshot::build(
            DEFAULT_FALLBACK_STUN_URL,
            vec![UpstreamIceServer::with_url("turn:legacy.example.com")],
        );

        assert_eq!(
            snapshot.ice_servers()[1].urls,
            IceUrls::One("turn:legacy.example.com".to_string())
        );
    }

    #[test]
    fn only_stun_upstream_leaves_fallback() {
        let snapshot = IceSnapshot::build(
            "stun:stun.example.org:3478",
            vec![UpstreamIceServer::with_url("stun:upstream.example.com")],
        );

        assert_eq!(snapshot.ice_servers().len(), 1);
        assert_eq!(
            snapshot.to_rtc_config().ice_servers,
            vec![IceServer::new("stun:stun.example.org:3478")]
        );
    }
}
