use crate::application::connection_manager::ReconnectPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub feed: FeedSettings,
    pub reconnect: ReconnectSettings,
    pub storage: StorageSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReconnectSettings {
    /// 0 retries immediately with no backoff
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl ReconnectSettings {
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.feed.endpoint.trim().is_empty() {
            anyhow::bail!("feed.endpoint must not be empty");
        }
        if !(self.reconnect.multiplier >= 1.0) {
            anyhow::bail!(
                "reconnect.multiplier must be at least 1, got {}",
                self.reconnect.multiplier
            );
        }
        if self.reconnect.max_delay_ms < self.reconnect.initial_delay_ms {
            anyhow::bail!(
                "reconnect.max_delay_ms ({}) is below reconnect.initial_delay_ms ({})",
                self.reconnect.max_delay_ms,
                self.reconnect.initial_delay_ms
            );
        }
        Ok(())
    }
}

fn builder_with_defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("feed.endpoint", "ws://localhost:8080")?
        .set_default("reconnect.initial_delay_ms", 1000_i64)?
        .set_default("reconnect.max_delay_ms", 30000_i64)?
        .set_default("reconnect.multiplier", 2.0)?
        .set_default("storage.backend", "file")?
        .set_default("storage.dir", ".dashboard")?
        .set_default("server.bind", "0.0.0.0:3000")?)
}

/// Defaults, then `config/dashboard.{toml,json,yaml}` if present, then
/// `DASHBOARD__SECTION__KEY` environment variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = builder_with_defaults()?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
