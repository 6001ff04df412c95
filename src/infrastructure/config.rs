use chrono::FixedOffset;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::application::renderer::{DisplayTargets, Readout};
use crate::application::series_builder::LabelZone;

const DEFAULT_INTERVAL_MS: u64 = 300_000;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub source: SourceSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub labels: LabelSettings,
    #[serde(default)]
    pub derive_missing: bool,
    /// readout name -> display target id
    #[serde(default)]
    pub display_targets: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub base_url: String,
    #[serde(default = "default_current_path")]
    pub current_path: String,
    #[serde(default = "default_history_path")]
    pub history_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub history_hours: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_true")]
    pub fetch_on_start: bool,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            fetch_on_start: true,
        }
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LabelSettings {
    /// Fixed UTC offset for chart labels; machine local time when absent.
    pub utc_offset_minutes: Option<i32>,
}

fn default_current_path() -> String {
    "/api/current".to_string()
}

fn default_history_path() -> String {
    "/api/history".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_true() -> bool {
    true
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl DashboardConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.source.base_url.trim().is_empty() {
            anyhow::bail!("source.base_url must not be empty");
        }
        if self.source.timeout_secs == 0 {
            anyhow::bail!("source.timeout_secs must be greater than zero");
        }
        if self.refresh.interval_ms == 0 {
            anyhow::bail!("refresh.interval_ms must be greater than zero");
        }
        self.label_zone()?;
        self.display_targets()?;
        Ok(())
    }

    pub fn label_zone(&self) -> anyhow::Result<LabelZone> {
        match self.labels.utc_offset_minutes {
            None => Ok(LabelZone::Local),
            Some(minutes) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(LabelZone::Fixed)
                .ok_or_else(|| anyhow::anyhow!("labels.utc_offset_minutes out of range: {}", minutes)),
        }
    }

    pub fn display_targets(&self) -> anyhow::Result<DisplayTargets> {
        let mut targets = HashMap::new();
        for (name, target) in &self.display_targets {
            let readout = Readout::ALL
                .into_iter()
                .find(|r| r.name() == name)
                .ok_or_else(|| anyhow::anyhow!("unknown readout in display_targets: {}", name))?;
            targets.insert(readout, target.clone());
        }
        Ok(DisplayTargets::new(targets))
    }
}

/// Load `config/dashboard.toml` (optional) overlaid with `WX_DASHBOARD__*`
/// environment variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(environment_overrides())
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// `WX_DASHBOARD__SOURCE__BASE_URL` overrides `source.base_url`, and so on.
fn environment_overrides() -> config::Environment {
    config::Environment::with_prefix("WX_DASHBOARD")
        .prefix_separator("__")
        .separator("__")
}
