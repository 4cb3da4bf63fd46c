//! Versioning configuration.
//!
//! A process-wide [`GitConfig`] holds the defaults; a tracked collection can
//! override any of them with [`GitOverrides`], and lookups fall back to the
//! global value for anything left unset.
//!
//! ```toml
//! collection_suffix = ".history"
//! snapshot_window = 20
//! patcher = "json-patch"
//! ```

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::codec::PatcherKind;

pub const DEFAULT_COLLECTION_SUFFIX: &str = ".git";
pub const DEFAULT_SNAPSHOT_WINDOW: u32 = 100;
pub const DEFAULT_LOG_LIMIT: usize = 10;

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Explicit commit store namespace. When unset the namespace is the host
    /// collection name followed by `collection_suffix`.
    pub collection_name: Option<String>,
    pub collection_suffix: String,
    /// Every Nth commit carries a full snapshot; `0` disables snapshots.
    pub snapshot_window: u32,
    pub patcher: PatcherKind,
    /// Page size of `log` when the query gives none.
    pub log_limit: usize,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            collection_name: None,
            collection_suffix: DEFAULT_COLLECTION_SUFFIX.to_string(),
            snapshot_window: DEFAULT_SNAPSHOT_WINDOW,
            patcher: PatcherKind::default(),
            log_limit: DEFAULT_LOG_LIMIT,
        }
    }
}

impl GitConfig {
    /// Parse a TOML fragment. Missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: GitConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection_name.as_deref() == Some("") {
            return Err(ConfigError::Invalid("collection_name must not be empty".into()));
        }
        if self.collection_name.is_none() && self.collection_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "collection_suffix must not be empty when collection_name is unset".into(),
            ));
        }
        if self.log_limit == 0 {
            return Err(ConfigError::Invalid("log_limit must be at least 1".into()));
        }
        Ok(())
    }

    /// This config with every field set in `overrides` replaced.
    pub fn merged_with(&self, overrides: &GitOverrides) -> GitConfig {
        GitConfig {
            collection_name: overrides
                .collection_name
                .clone()
                .or_else(|| self.collection_name.clone()),
            collection_suffix: overrides
                .collection_suffix
                .clone()
                .unwrap_or_else(|| self.collection_suffix.clone()),
            snapshot_window: overrides.snapshot_window.unwrap_or(self.snapshot_window),
            patcher: overrides.patcher.unwrap_or(self.patcher),
            log_limit: overrides.log_limit.unwrap_or(self.log_limit),
        }
    }

    /// The commit store namespace for a host collection.
    pub fn namespace(&self, host_collection: Option<&str>) -> Result<String, ConfigError> {
        if let Some(name) = &self.collection_name {
            return Ok(name.clone());
        }
        match host_collection {
            Some(host) if !host.is_empty() => Ok(format!("{host}{}", self.collection_suffix)),
            _ => Err(ConfigError::MissingNamespace),
        }
    }
}

/// Per-collection settings; `None` falls back to the global [`GitConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitOverrides {
    pub collection_name: Option<String>,
    pub collection_suffix: Option<String>,
    pub snapshot_window: Option<u32>,
    pub patcher: Option<PatcherKind>,
    pub log_limit: Option<usize>,
}

impl GitOverrides {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}
