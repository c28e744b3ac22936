use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::tracking::{MarkerId, TrackingError};

/// Prefix for environment overrides, e.g. `MARKER_TRACKER_MARKER_IDENTIFIERS=7,9`.
pub const ENV_PREFIX: &str = "MARKER_TRACKER_";

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1";

/// Number of previous positions kept per marker when not configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 2;

fn default_server_address() -> String {
    DEFAULT_SERVER_ADDRESS.to_string()
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// Everything needed to build a [`Tracker`](super::Tracker).
///
/// TOML shape:
///
/// server_address     = "127.0.0.1"
/// marker_identifiers = [7, 9]
/// history_capacity   = 2
/// labels             = ["Marker A", "Marker B"]
///
/// `labels` may be shorter than `marker_identifiers`; the remaining markers
/// are left unlabelled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_server_address")]
    pub server_address: String,
    #[serde(default)]
    pub marker_identifiers: Vec<MarkerId>,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            marker_identifiers: Vec::new(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            labels: Vec::new(),
        }
    }
}

impl TrackerConfig {
    pub fn new(
        server_address: impl Into<String>,
        marker_identifiers: Vec<MarkerId>,
        history_capacity: usize,
    ) -> Self {
        Self {
            server_address: server_address.into(),
            marker_identifiers,
            history_capacity,
            labels: Vec::new(),
        }
    }

    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg: TrackerConfig = toml::from_str(raw).context("failed to parse tracker config")?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// Build from `MARKER_TRACKER_*` environment variables. Lists are
    /// comma-separated:
    ///
    /// - MARKER_TRACKER_SERVER_ADDRESS
    /// - MARKER_TRACKER_MARKER_IDENTIFIERS (e.g. `7,9`)
    /// - MARKER_TRACKER_HISTORY_CAPACITY
    /// - MARKER_TRACKER_LABELS
    pub fn from_env() -> anyhow::Result<Self> {
        envy::prefixed(ENV_PREFIX)
            .from_env::<TrackerConfig>()
            .context("failed to read tracker config from environment")
    }

    /// Rejects settings no tracker can run with.
    pub fn validate(&self) -> Result<(), TrackingError> {
        if self.history_capacity < 1 {
            return Err(TrackingError::InvalidConfiguration(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if self.server_address.trim().is_empty() {
            return Err(TrackingError::InvalidConfiguration(
                "server_address must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
