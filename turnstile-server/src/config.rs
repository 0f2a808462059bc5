use crate::cors::CorsConfig;
use crate::ice::IceConfig;
use anyhow::Context;
use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const SERVER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ice: IceConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    pub fn parse() -> anyhow::Result<Self> {
        Self::parse_with_env(None)
    }

    /// Like [`AppConfig::parse`], but reads `TURNSTILE__*` overrides from `env` instead of the
    /// process environment when given.
    fn parse_with_env(env: Option<Map<String, String>>) -> anyhow::Result<Self> {
        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(config_file_path("config.toml")?.as_str()).required(false))
            .add_source(File::with_name("config.toml").required(false))
            .add_source(
                Environment::with_prefix("turnstile")
                    .separator("__")
                    .source(env),
            )
            .build()
            .context("Failed to build config")?
            .try_deserialize::<Self>()
            .context("Failed to deserialize config")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ice.refresh_interval.is_zero() {
            anyhow::bail!("ICE refresh interval must be greater than zero");
        } else if self.ice.fetch_timeout.is_zero() {
            anyhow::bail!("ICE fetch timeout must be greater than zero");
        } else if self.ice.fallback_stun_url.trim().is_empty() {
            anyhow::bail!("Fallback STUN URL is empty");
        }
        Ok(())
    }
}

pub fn config_file_path(file_name: impl AsRef<Path>) -> anyhow::Result<String> {
    Ok(Path::new("/etc")
        .join(env!("CARGO_PKG_NAME").to_lowercase())
        .join(file_name)
        .to_str()
        .context("Failed to build config file path")?
        .to_string())
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub metrics_bind_addr: String,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            metrics_bind_addr: "0.0.0.0:9200".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}
