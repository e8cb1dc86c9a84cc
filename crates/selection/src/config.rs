//! Selection settings: the JSON config file and the max-records provider.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectionError};

pub const SELECTION_CONFIG_FILENAME: &str = "selection.json";
pub const SELECTION_CONFIG_VERSION: &str = "1.0.0";

/// Bound applied to "select all" when the max-records setting is missing or unusable.
pub const DEFAULT_MAX_HITS: usize = 1000;

const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SESSION_TTL_SECONDS: u64 = 86_400;
const DEFAULT_MAX_SESSIONS: u64 = 10_000;

/// Which search backend resolves "select all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Legacy single-process engine: re-runs the session's last search.
    #[default]
    LastQuery,
    /// Distributed index: runs the query directly.
    DirectQuery,
    /// No bulk capability; "select all" clears the selection.
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPreferences {
    pub ttl_seconds: u64,
    pub max_sessions: u64,
}

impl Default for SessionPreferences {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub version: String,
    /// Raw setting string; see [`resolve_max_hits`].
    #[serde(default)]
    pub max_records: Option<String>,
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,
    #[serde(default)]
    pub session: SessionPreferences,
}

fn default_search_timeout_ms() -> u64 {
    DEFAULT_SEARCH_TIMEOUT_MS
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            version: SELECTION_CONFIG_VERSION.to_string(),
            max_records: Some(DEFAULT_MAX_HITS.to_string()),
            backend: BackendKind::default(),
            search_timeout_ms: DEFAULT_SEARCH_TIMEOUT_MS,
            session: SessionPreferences::default(),
        }
    }
}

impl SelectionConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }
}

/// Source of the "select all" upper bound.
pub trait SettingsProvider: Send + Sync {
    /// The configured maximum as stored; may be absent or malformed.
    fn selection_max_records(&self) -> Option<String>;
}

impl SettingsProvider for SelectionConfig {
    fn selection_max_records(&self) -> Option<String> {
        self.max_records.clone()
    }
}

/// Parses the max-records setting, falling back to [`DEFAULT_MAX_HITS`].
pub fn resolve_max_hits(settings: &dyn SettingsProvider) -> usize {
    let Some(raw) = settings.selection_max_records() else {
        log::debug!("selection max records not configured, using {DEFAULT_MAX_HITS}");
        return DEFAULT_MAX_HITS;
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => {
            log::warn!("selection max records is 0, using {DEFAULT_MAX_HITS}");
            DEFAULT_MAX_HITS
        }
        Ok(value) => value,
        Err(error) => {
            log::warn!("invalid selection max records {raw:?} ({error}), using {DEFAULT_MAX_HITS}");
            DEFAULT_MAX_HITS
        }
    }
}

pub fn selection_config_path(dir: &Path) -> PathBuf {
    dir.join(SELECTION_CONFIG_FILENAME)
}

pub fn load_or_create_selection_config(dir: &Path) -> Result<SelectionConfig> {
    std::fs::create_dir_all(dir).map_err(|error| {
        SelectionError::Config(format!(
            "failed to create config directory {}: {error}",
            dir.display()
        ))
    })?;

    let path = selection_config_path(dir);
    if !path.exists() {
        let config = SelectionConfig::default();
        write_selection_config(&path, &config)?;
        return Ok(config);
    }

    let data = std::fs::read_to_string(&path).map_err(|error| {
        SelectionError::Config(format!(
            "failed to read selection config {}: {error}",
            path.display()
        ))
    })?;
    let mut config: SelectionConfig = serde_json::from_str(&data).map_err(|error| {
        SelectionError::Config(format!(
            "failed to parse selection config {}: {error}",
            path.display()
        ))
    })?;

    if config.version != SELECTION_CONFIG_VERSION {
        config = migrate_selection_config(config);
        write_selection_config(&path, &config)?;
    }

    Ok(config)
}

/// Older files share the current field set; only the version is bumped.
pub fn migrate_selection_config(config: SelectionConfig) -> SelectionConfig {
    log::info!(
        "migrating selection config from version {} to {}",
        config.version,
        SELECTION_CONFIG_VERSION
    );
    SelectionConfig {
        version: SELECTION_CONFIG_VERSION.to_string(),
        ..config
    }
}

pub fn write_selection_config(path: &Path, config: &SelectionConfig) -> Result<()> {
    let data = serde_json::to_string_pretty(config).map_err(|error| {
        SelectionError::Serialization(format!("failed to serialize selection config: {error}"))
    })?;
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct Raw(Option<&'static str>);

    impl SettingsProvider for Raw {
        fn selection_max_records(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[test]
    fn max_hits_falls_back_on_bad_values() {
        assert_eq!(resolve_max_hits(&Raw(Some("250"))), 250);
        assert_eq!(resolve_max_hits(&Raw(Some(" 42 "))), 42);
        assert_eq!(resolve_max_hits(&Raw(None)), DEFAULT_MAX_HITS);
        assert_eq!(resolve_max_hits(&Raw(Some("lots"))), DEFAULT_MAX_HITS);
        assert_eq!(resolve_max_hits(&Raw(Some("-5"))), DEFAULT_MAX_HITS);
        assert_eq!(resolve_max_hits(&Raw(Some("0"))), DEFAULT_MAX_HITS);
    }

    #[test]
    fn creates_default_config_file() {
        let dir = tempdir().expect("tempdir");
        let config = load_or_create_selection_config(dir.path()).expect("config");
        assert_eq!(config, SelectionConfig::default());
        assert!(selection_config_path(dir.path()).exists());
        assert_eq!(resolve_max_hits(&config), DEFAULT_MAX_HITS);
    }

    #[test]
    fn reads_partial_config_with_defaults() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(
            selection_config_path(dir.path()),
            r#"{ "version": "1.0.0", "max_records": "20", "backend": "direct-query" }"#,
        )
        .expect("write");
        let config = load_or_create_selection_config(dir.path()).expect("config");
        assert_eq!(config.backend, BackendKind::DirectQuery);
        assert_eq!(config.search_timeout_ms, DEFAULT_SEARCH_TIMEOUT_MS);
        assert_eq!(config.session, SessionPreferences::default());
        assert_eq!(resolve_max_hits(&config), 20);
    }

    #[test]
    fn migrates_old_version() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(
            selection_config_path(dir.path()),
            r#"{ "version": "0.9.0", "max_records": "5" }"#,
        )
        .expect("write");
        let config = load_or_create_selection_config(dir.path()).expect("config");
        assert_eq!(config.version, SELECTION_CONFIG_VERSION);
        assert_eq!(config.max_records.as_deref(), Some("5"));

        let reloaded = load_or_create_selection_config(dir.path()).expect("reload");
        assert_eq!(reloaded, config);
    }

    #[test]
    fn rejects_malformed_file() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(selection_config_path(dir.path()), "{ not json").expect("write");
        let error = load_or_create_selection_config(dir.path()).expect_err("should fail");
        assert!(matches!(error, SelectionError::Config(_)));
    }
}
