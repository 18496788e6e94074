use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::rotation::DEFAULT_ROTATION_INTERVAL;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable overriding the backend address
pub const API_URL_ENV: &str = "TERP_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_url: Option<String>,
    pub rotation_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Backend address: CLI flag, then environment, then config file, then default
    pub fn resolve_api_url(&self, cli_url: Option<&str>) -> String {
        let env_url = std::env::var(API_URL_ENV).ok();
        self.resolve_api_url_with(cli_url, env_url.as_deref())
    }

    fn resolve_api_url_with(&self, cli_url: Option<&str>, env_url: Option<&str>) -> String {
        [cli_url, env_url, self.api_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn rotation_interval(&self) -> Duration {
        self.rotation_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ROTATION_INTERVAL)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("terp-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.rotation_interval(), DEFAULT_ROTATION_INTERVAL);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_url: Some("http://terp.example:9000".to_string()),
            rotation_interval_ms: Some(1500),
            request_timeout_secs: Some(30),
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.rotation_interval(), Duration::from_millis(1500));
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_api_url_precedence() {
        let config = Config {
            api_url: Some("http://from-file:8000/".to_string()),
            ..Config::new()
        };

        assert_eq!(
            config.resolve_api_url_with(Some("http://from-cli:1"), Some("http://from-env:2")),
            "http://from-cli:1"
        );
        assert_eq!(
            config.resolve_api_url_with(None, Some("http://from-env:2")),
            "http://from-env:2"
        );
        assert_eq!(config.resolve_api_url_with(None, Some("  ")), "http://from-file:8000");
        assert_eq!(Config::new().resolve_api_url_with(None, None), DEFAULT_API_URL);
    }

    #[test]
    fn test_zero_interval_falls_back_to_default() {
        let config = Config {
            rotation_interval_ms: Some(0),
            request_timeout_secs: Some(0),
            ..Config::new()
        };
        assert_eq!(config.rotation_interval(), DEFAULT_ROTATION_INTERVAL);
        assert_eq!(config.request_timeout(), None);
    }
}
