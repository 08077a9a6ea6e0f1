use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Hosted store endpoint, read once at startup.
pub const BACKEND_URL_VAR: &str = "TECHCAL_BACKEND_URL";
/// Public (anon) API key for the hosted store, read once at startup.
pub const BACKEND_KEY_VAR: &str = "TECHCAL_BACKEND_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Missing required environment variable: {0}")]
    MissingEnv(&'static str),
}

/// Connection details for the hosted backend. These come from the
/// environment, never from the config file; absence of either is a fatal
/// startup error.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            std::env::var(BACKEND_URL_VAR).map_err(|_| ConfigError::MissingEnv(BACKEND_URL_VAR))?;
        let anon_key =
            std::env::var(BACKEND_KEY_VAR).map_err(|_| ConfigError::MissingEnv(BACKEND_KEY_VAR))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub ui: UiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    pub theme: String,
    pub date_format: String,
    pub show_header_stats: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    pub session_cache: PathBuf,
    pub offline_cache: PathBuf,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("techcal")
            .join("config.toml")
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).expect("config serializes to TOML");
        std::fs::write(&config_path, content)?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("techcal");

        Self {
            ui: UiConfig {
                theme: "default".to_string(),
                date_format: "%Y-%m-%d".to_string(),
                show_header_stats: true,
            },
            storage: StorageConfig {
                session_cache: config_dir.join("session.json"),
                offline_cache: config_dir.join("cache.db"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_default_theme() {
        let config = Config::default();
        assert_eq!(config.ui.theme, "default");
    }

    #[test]
    fn default_config_shows_header_stats() {
        let config = Config::default();
        assert!(config.ui.show_header_stats);
    }

    #[test]
    fn parse_valid_toml_config() {
        let toml_content = r#"
            [ui]
            theme = "nord"
            date_format = "%d/%m/%Y"
            show_header_stats = false

            [storage]
            session_cache = "/tmp/session.json"
            offline_cache = "/tmp/cache.db"
        "#;

        let config = Config::from_toml(toml_content).unwrap();

        assert_eq!(config.ui.theme, "nord");
        assert!(!config.ui.show_header_stats);
        assert_eq!(config.storage.session_cache, PathBuf::from("/tmp/session.json"));
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let invalid_toml = "this is not valid toml";
        let result = Config::from_toml(invalid_toml);
        assert!(result.is_err());
    }

    #[test]
    fn backend_config_requires_both_env_vars() {
        // Set one var and clear the other; from_env must name the missing
        // one. Env mutation is process-global, so both checks live in one
        // test.
        unsafe {
            std::env::set_var(BACKEND_URL_VAR, "https://db.example.com/");
            std::env::remove_var(BACKEND_KEY_VAR);
        }
        match BackendConfig::from_env() {
            Err(ConfigError::MissingEnv(var)) => assert_eq!(var, BACKEND_KEY_VAR),
            other => panic!("expected MissingEnv, got {:?}", other),
        }

        unsafe {
            std::env::set_var(BACKEND_KEY_VAR, "anon-key");
        }
        let backend = BackendConfig::from_env().unwrap();
        assert_eq!(backend.base_url, "https://db.example.com");
        assert_eq!(backend.anon_key, "anon-key");
    }
}
