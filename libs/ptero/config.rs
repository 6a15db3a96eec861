use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarMissing(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub const ENV_URL: &str = "PTERO_URL";
pub const ENV_APPLICATION_KEY: &str = "PTERO_APPLICATION_KEY";
pub const ENV_CLIENT_KEY: &str = "PTERO_CLIENT_KEY";

/// Panel connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Base URL of the panel
    pub url: String,
    /// Application API key (`ptla_...`)
    #[serde(default)]
    pub application_key: Option<String>,
    /// Client API key (`ptlc_...`)
    #[serde(default)]
    pub client_key: Option<String>,
    /// Keep fetched application entities in memory
    #[serde(default)]
    pub cache: bool,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PanelConfig {
    /// Load configuration from a YAML file, with `.env`/environment overrides
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let config: PanelConfig = serde_yaml::from_str(&yaml_content)?;
        Self::finish(config)
    }

    /// Parse configuration from YAML text, with environment overrides
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PanelConfig = serde_yaml::from_str(yaml)?;
        Self::finish(config)
    }

    /// Build configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let url = std::env::var(ENV_URL)
            .map_err(|_| ConfigError::EnvVarMissing(ENV_URL.to_string()))?;
        let mut config = PanelConfig {
            url,
            application_key: None,
            client_key: None,
            cache: false,
            log_level: default_log_level(),
        };
        config.apply_env();
        config.url = config.url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn finish(mut config: PanelConfig) -> Result<Self> {
        dotenv::dotenv().ok();
        config.apply_env();
        config.url = config.url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_URL) {
            info!("Overriding panel URL from environment variable");
            self.url = url;
        }
        if let Ok(key) = std::env::var(ENV_APPLICATION_KEY) {
            self.application_key = Some(key);
        }
        if let Ok(key) = std::env::var(ENV_CLIENT_KEY) {
            self.client_key = Some(key);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(ConfigError::ValidationError("url cannot be empty".to_string()));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(
                "url must start with http:// or https://".to_string(),
            ));
        }
        if self.application_key.is_none() && self.client_key.is_none() {
            return Err(ConfigError::ValidationError(
                "at least one of application_key or client_key is required".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Panel URL: {}", self.url);
        info!("  Application key: {}", mask(self.application_key.as_deref()));
        info!("  Client key: {}", mask(self.client_key.as_deref()));
        info!("  Cache: {}", if self.cache { "enabled" } else { "disabled" });
        info!("  Log level: {}", self.log_level);
    }
}

fn mask(key: Option<&str>) -> String {
    match key {
        Some(k) if k.chars().count() > 8 => {
            format!("{}***", k.chars().take(5).collect::<String>())
        }
        Some(_) => "***".to_string(),
        None => "(not set)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "url: https://panel.example.com/\nclient_key: ptlc_abcdef123\ncache: true"
        )
        .unwrap();

        let config = PanelConfig::load(file.path()).unwrap();
        assert_eq!(config.url, "https://panel.example.com");
        assert!(config.cache);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_keys_rejected() {
        let err = PanelConfig::from_yaml("url: https://panel.example.com").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_bad_url_rejected() {
        let err = PanelConfig::from_yaml("url: panel.example.com\napplication_key: k").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let err = PanelConfig::from_yaml(
            "url: https://p.example.com\napplication_key: k\nlog_level: loud",
        )
        .unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn test_missing_file() {
        let err = PanelConfig::load("/nonexistent/ptero.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileError(_)));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask(Some("ptla_1234567890")), "ptla_***");
        assert_eq!(mask(Some("short")), "***");
        assert_eq!(mask(None), "(not set)");
        assert_eq!(mask(Some("ptla_éééééé")), "ptla_***");
        assert_eq!(mask(Some("ptlaééééééé")), "ptlaé***");
    }
}
