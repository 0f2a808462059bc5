use crate::ice::IceError;
use crate::ice::provider::{IceServerProvider, UpstreamIceServer};
use reqwest::Client;
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct TwilioToken {
    #[serde(default)]
    ice_servers: Option<Vec<UpstreamIceServer>>,
}

#[derive(Clone)]
pub struct TwilioIceProvider {
    client: Client,
    url: String,
    account_sid: String,
    auth_token: String,
    ttl: Option<u64>,
}

impl Debug for TwilioIceProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioIceProvider")
            .field("account_sid", &self.account_sid)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TwilioIceProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.twilio.com";
    const TOKENS_PATH: &'static str = "/2010-04-01/Accounts/{ACCOUNT_SID}/Tokens.json";

    pub fn new(
        base_url: impl AsRef<str>,
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        ttl: Option<u64>,
        timeout: Duration,
    ) -> Result<Self, IceError> {
        let account_sid = account_sid.into();
        Ok(Self {
            client: reqwest::ClientBuilder::new()
                .user_agent(crate::APP_USER_AGENT)
                .timeout(timeout)
                .build()
                .map_err(|e| IceError::Config(format!("Failed to create HTTP client: {e}")))?,
            url: format!(
                "{}{}",
                base_url.as_ref().trim_end_matches('/'),
                Self::TOKENS_PATH.replace("{ACCOUNT_SID}", &account_sid)
            ),
            account_sid,
            auth_token: auth_token.into(),
            ttl,
        })
    }
}

#[async_trait::async_trait]
impl IceServerProvider for TwilioIceProvider {
    #[instrument(level = "debug", err)]
    async fn fetch_ice_servers(&self) -> Result<Vec<UpstreamIceServer>, IceError> {
        tracing::debug!("Requesting Twilio network traversal token");

        let mut request = self
            .client
            .post(&self.url)
            .basic_auth(&self.account_sid, Some(&self.auth_token));
        if let Some(ttl) = self.ttl {
            request = request.form(&[("Ttl", ttl)]);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                tracing::warn!(?err, "Timed out requesting Twilio token");
                return Err(IceError::Timeout(format!(
                    "Timed out requesting Twilio token: {err}"
                )));
            }
            Err(err) => {
                tracing::warn!(?err, "Failed to request Twilio token");
                return Err(IceError::Provider(format!(
                    "Failed to request Twilio token: {err}"
                )));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) if err.is_timeout() => {
                tracing::warn!(?err, "Timed out reading Twilio token response");
                return Err(IceError::Timeout(format!(
                    "Timed out reading Twilio token response: {err}"
                )));
            }
            Err(err) => {
                tracing::warn!(?status, ?err, "Failed to read Twilio token response");
                return Err(IceError::Provider(format!(
                    "Failed to read Twilio token response: {err}"
                )));
            }
        };

        if !status.is_success() {
            tracing::warn!(?status, ?body, "Received error while requesting Twilio token");
            return Err(IceError::Provider(format!(
                "Received error while requesting Twilio token: {status}"
            )));
        }

        let token = serde_json::from_str::<TwilioToken>(&body).map_err(|err| {
            tracing::warn!(?err, "Failed to parse Twilio token response");
            IceError::MalformedResponse(format!("Failed to parse Twilio token response: {err}"))
        })?;

        match token.ice_servers {
            Some(ice_servers) if !ice_servers.is_empty() => {
                tracing::trace!(count = ice_servers.len(), "Received ICE servers from Twilio");
                Ok(ice_servers)
            }
            _ => {
                tracing::warn!("Twilio token response is missing ice_servers");
                Err(IceError::MalformedResponse(
                    "Twilio token response is missing ice_servers".to_string(),
                ))
            }
        }
    }
}
