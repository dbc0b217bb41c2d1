//! Runtime configuration for the sync engine
//!
//! Values are merged with figment in precedence order (later wins):
//! 1. Built-in defaults
//! 2. An optional config file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables prefixed `KANBAN_SYNC_`, nested keys split on `__`
//!    (e.g. `KANBAN_SYNC_FEEDBACK__ERROR_MS=5000`)

use crate::error::Result;
use crate::feedback::Severity;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "KANBAN_SYNC_";

/// Display durations for feedback notifications, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub success_ms: u64,
    pub error_ms: u64,
    pub info_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            success_ms: 3000,
            error_ms: 3000,
            info_ms: 3000,
        }
    }
}

impl FeedbackConfig {
    pub fn duration_for(&self, severity: Severity) -> Duration {
        let ms = match severity {
            Severity::Success => self.success_ms,
            Severity::Error => self.error_ms,
            Severity::Info => self.info_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Sync engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub feedback: FeedbackConfig,
    /// Collapse change notifications queued during a refetch into one refetch
    pub coalesce_notifications: bool,
    /// Capacity of the change broadcast in the in-memory record service
    pub change_buffer: usize,
    /// Number of recent operations kept in the activity log
    pub activity_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            feedback: FeedbackConfig::default(),
            coalesce_notifications: true,
            change_buffer: 64,
            activity_limit: 100,
        }
    }
}

impl SyncConfig {
    /// Defaults overridden by environment variables
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment())
    }

    /// Defaults overridden by `path`, then by environment variables
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading sync config file");
        let file = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            _ => Figment::from(Toml::file(path)),
        };
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(file)
            .merge(Self::env());
        Self::extract(figment)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Self::env())
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        debug!(?config, "sync config loaded");
        Ok(config)
    }
}
