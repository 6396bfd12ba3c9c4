// Engine settings, loaded from the embedded default JSON or a user-supplied file
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::EngineError;

const DEFAULT_CONFIG: &str = include_str!("../../assets/config/default.json");

/// Hard ceiling on the window length any request can ask for.
pub const MAX_DAYS_LIMIT: usize = 100;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// Eastmoney for Shanghai/Shenzhen/HK codes, Yahoo Finance for the rest.
    #[serde(alias = "eastmoney")]
    #[value(alias = "eastmoney")]
    Live,
    Csv,
    Synthetic,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CacheSettings {
    /// Upper bound on cached results; the least recently used entry is evicted.
    pub max_entries: Option<usize>,
    /// Entries older than this are treated as misses.
    pub ttl_secs: Option<u64>,
}

impl CacheSettings {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            max_entries: Some(512),
            ttl_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub default_days: usize,
    pub max_days: usize,
    pub simple_max_days: usize,
    pub cache: CacheSettings,
    pub data_source: DataSourceKind,
    pub synthetic_fallback: bool,
    pub csv_data_dir: PathBuf,
    pub symbol_table_path: Option<PathBuf>,
    pub http_timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            default_days: 30,
            max_days: 100,
            simple_max_days: 30,
            cache: CacheSettings::default(),
            data_source: DataSourceKind::Live,
            synthetic_fallback: true,
            csv_data_dir: PathBuf::from("data"),
            symbol_table_path: None,
            http_timeout_secs: 10,
        }
    }
}

impl EngineSettings {
    pub fn load_default() -> Result<Self, EngineError> {
        Self::from_json(DEFAULT_CONFIG)
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings = serde_json::from_str(raw)
            .map_err(|e| EngineError::ConfigError(format!("invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.max_days == 0 || self.max_days > MAX_DAYS_LIMIT {
            return Err(EngineError::ConfigError(format!(
                "max_days must be between 1 and {}, got {}",
                MAX_DAYS_LIMIT, self.max_days
            )));
        }
        if self.cache.max_entries == Some(0) {
            return Err(EngineError::ConfigError(
                "cache.max_entries must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamps a requested window length into `[1, max_days]`, never above
    /// `MAX_DAYS_LIMIT` even for settings built without validation.
    pub fn clamp_days(&self, days: i64) -> usize {
        days.clamp(1, self.max_days.clamp(1, MAX_DAYS_LIMIT) as i64) as usize
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_default_matches_struct_default() {
        let loaded = EngineSettings::load_default().unwrap();
        assert_eq!(loaded, EngineSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "data_source": "synthetic", "cache": {{ "max_entries": 4, "ttl_secs": 60 }} }}"#).unwrap();
        file.flush().unwrap();

        let settings = EngineSettings::load(file.path()).unwrap();
        assert_eq!(settings.data_source, DataSourceKind::Synthetic);
        assert_eq!(settings.cache.max_entries, Some(4));
        assert_eq!(settings.cache.ttl(), Some(Duration::from_secs(60)));
        assert_eq!(settings.max_days, 100);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(matches!(
            EngineSettings::from_json(r#"{ "max_days": 0 }"#),
            Err(EngineError::ConfigError(_))
        ));
        assert!(matches!(
            EngineSettings::from_json(r#"{ "cache": { "max_entries": 0, "ttl_secs": null } }"#),
            Err(EngineError::ConfigError(_))
        ));
        assert!(matches!(
            EngineSettings::from_json(r#"{ "max_days": 101 }"#),
            Err(EngineError::ConfigError(_))
        ));
        assert_eq!(EngineSettings::from_json(r#"{ "max_days": 100 }"#).unwrap().max_days, 100);
        assert!(EngineSettings::from_json("not json").is_err());
        assert!(EngineSettings::load(Path::new("missing_settings.json")).is_err());
    }

    #[test]
    fn test_clamp_days() {
        let settings = EngineSettings::default();
        assert_eq!(settings.clamp_days(500), 100);
        assert_eq!(settings.clamp_days(0), 1);
        assert_eq!(settings.clamp_days(-3), 1);
        assert_eq!(settings.clamp_days(10), 10);

        let unchecked = EngineSettings { max_days: 500, ..EngineSettings::default() };
        assert_eq!(unchecked.clamp_days(300), 100);
    }

    #[test]
    fn test_eastmoney_is_an_alias_for_live() {
        let settings = EngineSettings::from_json(r#"{ "data_source": "eastmoney" }"#).unwrap();
        assert_eq!(settings.data_source, DataSourceKind::Live);
        let settings = EngineSettings::from_json(r#"{ "data_source": "live" }"#).unwrap();
        assert_eq!(settings.data_source, DataSourceKind::Live);
    }
}
