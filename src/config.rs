use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::ConfigError;
use crate::history::DEFAULT_HISTORY_KEY;

pub const DEFAULT_API_HOST: &str = "http://localhost:3000";
pub const DEFAULT_ROWS: u32 = 10_000;

/// Runtime configuration.
///
/// Resolution order: built-in defaults, then the optional config file at
/// `<config_dir>/spendlens/config.toml`, then `SPENDLENS_*` environment
/// variables. Command-line flags override individual fields last.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the aggregation service, without a trailing slash.
    pub api_host: String,
    /// Row limit forwarded to the aggregate endpoint.
    pub rows: u32,
    /// Directory holding persisted key-value state.
    pub storage_dir: PathBuf,
    /// Storage key for the history collection.
    pub history_key: String,
}

/// On-disk configuration; every field optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_host: Option<String>,
    rows: Option<u32>,
    storage_dir: Option<PathBuf>,
    history_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            rows: DEFAULT_ROWS,
            storage_dir: default_storage_dir(),
            history_key: DEFAULT_HISTORY_KEY.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, config file, and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(file) = read_config_file() {
            config.apply_file(file);
        }
        config.apply_env()?;
        config.validated()
    }

    /// Check the API host parses as a URL and normalize it.
    fn validated(mut self) -> Result<Self, ConfigError> {
        Url::parse(&self.api_host).map_err(|source| ConfigError::InvalidApiHost {
            host: self.api_host.clone(),
            source,
        })?;
        self.api_host = self.api_host.trim_end_matches('/').to_string();
        Ok(self)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(api_host) = file.api_host {
            self.api_host = api_host;
        }
        if let Some(rows) = file.rows {
            self.rows = rows;
        }
        if let Some(storage_dir) = file.storage_dir {
            self.storage_dir = storage_dir;
        }
        if let Some(history_key) = file.history_key {
            self.history_key = history_key;
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(api_host) = env_var("SPENDLENS_API_HOST") {
            self.api_host = api_host;
        }
        if let Some(rows) = env_var("SPENDLENS_ROWS") {
            self.rows = rows.parse().map_err(|_| ConfigError::InvalidValue {
                var: "SPENDLENS_ROWS".to_string(),
                value: rows,
            })?;
        }
        if let Some(storage_dir) = env_var("SPENDLENS_STORAGE_DIR") {
            self.storage_dir = PathBuf::from(storage_dir);
        }
        if let Some(history_key) = env_var("SPENDLENS_HISTORY_KEY") {
            self.history_key = history_key;
        }
        Ok(())
    }

    pub fn aggregate_url(&self) -> String {
        format!("{}/aggregate", self.api_host)
    }

    pub fn report_url(&self) -> String {
        format!("{}/report", self.api_host)
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn read_config_file() -> Option<ConfigFile> {
    let path = dirs::config_dir()?.join("spendlens").join("config.toml");
    let raw = fs::read_to_string(&path).ok()?;
    match toml::from_str(&raw) {
        Ok(file) => Some(file),
        Err(e) => {
            warn!("Ignoring malformed config file {:?}: {}", path, e);
            None
        }
    }
}

fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("spendlens"))
        .unwrap_or_else(|| PathBuf::from(".spendlens"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_host, "http://localhost:3000");
        assert_eq!(config.rows, 10_000);
        assert_eq!(config.history_key, "tableHistory");
    }

    #[test]
    fn test_endpoint_urls() {
        let config = Config::default();
        assert_eq!(config.aggregate_url(), "http://localhost:3000/aggregate");
        assert_eq!(config.report_url(), "http://localhost:3000/report");
    }

    #[test]
    fn test_validated_trims_trailing_slash() {
        let config = Config {
            api_host: "http://analytics.example.com/".to_string(),
            ..Config::default()
        };
        let config = config.validated().unwrap();
        assert_eq!(config.aggregate_url(), "http://analytics.example.com/aggregate");
    }

    #[test]
    fn test_validated_rejects_garbage_host() {
        let config = Config {
            api_host: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validated(),
            Err(ConfigError::InvalidApiHost { .. })
        ));
    }

    #[test]
    fn test_file_overrides() {
        let mut config = Config::default();
        let file: ConfigFile = toml::from_str(
            r#"
            api_host = "http://analytics.example.com"
            rows = 500
            "#,
        )
        .unwrap();
        config.apply_file(file);
        assert_eq!(config.api_host, "http://analytics.example.com");
        assert_eq!(config.rows, 500);
        // Untouched fields keep their defaults
        assert_eq!(config.history_key, "tableHistory");
    }

    #[test]
    fn test_empty_file_changes_nothing() {
        let mut config = Config::default();
        config.apply_file(ConfigFile::default());
        assert_eq!(config.api_host, "http://localhost:3000");
        assert_eq!(config.rows, 10_000);
    }
}
