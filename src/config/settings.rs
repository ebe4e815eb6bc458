//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub engine: EngineSettings,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Generation engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Path to the model weights the engine loads on first request
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Device placement policy: "auto", "cpu", or an accelerator ordinal
    #[serde(default = "default_device")]
    pub device: String,
    /// Numeric precision policy passed through to the engine
    #[serde(default = "default_dtype")]
    pub dtype: String,
}

fn default_model_path() -> String {
    "./models/default".to_string()
}

fn default_device() -> String {
    "auto".to_string()
}

fn default_dtype() -> String {
    "auto".to_string()
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
}

fn default_output_dir() -> String {
    "./outputs".to_string()
}

fn default_url_prefix() -> String {
    "/images".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("engine.model_path", default_model_path())?
            .set_default("engine.device", default_device())?
            .set_default("engine.dtype", default_dtype())?
            .set_default("storage.output_dir", default_output_dir())?
            .set_default("storage.url_prefix", default_url_prefix())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            // Load from configuration file
            .add_source(
                File::with_name(path.as_ref().to_str().unwrap_or("config/default"))
                    .required(false),
            )
            // Override with environment variables (prefixed with TXT2IMG_)
            .add_source(
                Environment::with_prefix("TXT2IMG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        if self.engine.model_path.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Engine model_path cannot be empty".to_string(),
            )));
        }

        if self.storage.output_dir.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Storage output_dir cannot be empty".to_string(),
            )));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            engine: EngineSettings {
                model_path: default_model_path(),
                device: default_device(),
                dtype: default_dtype(),
            },
            storage: StorageConfig {
                output_dir: default_output_dir(),
                url_prefix: default_url_prefix(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}
