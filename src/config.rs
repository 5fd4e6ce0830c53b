use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

/// Process configuration, built once at startup and handed to the
/// components that need it. Secrets come from the environment and override
/// whatever the config file holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    pub gemini_api_key: Option<String>,
}

fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("readlater")
        .join("readlater.db")
        .to_string_lossy()
        .to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_jwt_secret() -> String {
    // Placeholder written into a fresh config file; override it there or
    // via READLATER_JWT_SECRET before exposing the service.
    "change-me".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            jwt_secret: default_jwt_secret(),
            gemini_api_key: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("READLATER_DB_PATH") {
            self.db_path = path;
        }
        if let Ok(addr) = std::env::var("READLATER_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Ok(secret) = std::env::var("READLATER_JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readlater")
            .join("config.toml")
    }

    /// Enrichment cannot run without a provider credential; a missing key
    /// is fatal at startup, not a per-request error.
    pub fn require_gemini_api_key(&self) -> Result<String> {
        self.gemini_api_key
            .clone()
            .ok_or_else(|| AppError::Config("GEMINI_API_KEY is not set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert!(config.gemini_api_key.is_none());
        assert!(config.require_gemini_api_key().is_err());
    }

    #[test]
    fn parses_partial_config_files() {
        let config: Config = toml::from_str(r#"bind_addr = "0.0.0.0:9000""#).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.jwt_secret, "change-me");
    }
}
