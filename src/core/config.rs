//! Configuration management for fhirbind servers and clients.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::encoding::EncodingFormat;
use crate::core::error::{BindError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Server-side binding configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Encoding used when negotiation selects nothing
    #[serde(default = "default_encoding")]
    pub default_encoding: EncodingFormat,

    /// Pretty-print responses unless `_pretty` says otherwise
    #[serde(default)]
    pub pretty_print: bool,

    /// Value of the `X-Powered-By` response header
    #[serde(default = "default_powered_by")]
    pub powered_by: String,

    /// Public base URL, used to make `Location` headers absolute
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Client-side invocation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Encoding requested from servers and used for request bodies
    #[serde(default = "default_encoding")]
    pub encoding: EncodingFormat,

    /// Ask servers for pretty-printed responses
    #[serde(default)]
    pub pretty_print: bool,

    /// Base URL outgoing invocations are resolved against
    #[serde(default = "default_client_base_url")]
    pub base_url: String,
}

// Default value functions
fn default_encoding() -> EncodingFormat {
    EncodingFormat::Json
}

fn default_powered_by() -> String {
    concat!("fhirbind ", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_client_base_url() -> String {
    "http://localhost:8080/fhir".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_encoding: default_encoding(),
            pretty_print: false,
            powered_by: default_powered_by(),
            base_url: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            pretty_print: false,
            base_url: default_client_base_url(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| BindError::Configuration(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default location of the user config file
    pub fn user_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fhirbind").join("config.toml"))
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// File lookup order:
    /// 1. FHIRBIND_CONFIG env var
    /// 2. User config file (~/.config/fhirbind/config.toml)
    /// 3. ./fhirbind.toml
    /// 4. Defaults
    pub fn load() -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("FHIRBIND_CONFIG") {
            Self::from_file(config_path)?
        } else {
            match Self::user_config_file().filter(|p| p.exists()) {
                Some(path) => Self::from_file(path)?,
                None if Path::new("fhirbind.toml").exists() => Self::from_file("fhirbind.toml")?,
                None => Self::default(),
            }
        };

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(encoding) = env::var("FHIRBIND_DEFAULT_ENCODING") {
            if let Ok(e) = encoding.parse() {
                self.server.default_encoding = e;
            }
        }
        if let Ok(pretty) = env::var("FHIRBIND_PRETTY_PRINT") {
            if let Ok(p) = pretty.parse() {
                self.server.pretty_print = p;
            }
        }
        if let Ok(base_url) = env::var("FHIRBIND_SERVER_BASE_URL") {
            self.server.base_url = Some(base_url);
        }

        if let Ok(encoding) = env::var("FHIRBIND_CLIENT_ENCODING") {
            if let Ok(e) = encoding.parse() {
                self.client.encoding = e;
            }
        }
        if let Ok(base_url) = env::var("FHIRBIND_CLIENT_BASE_URL") {
            self.client.base_url = base_url;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        Self::validate_base_url("client.base_url", &self.client.base_url)?;

        if let Some(base_url) = &self.server.base_url {
            Self::validate_base_url("server.base_url", base_url)?;
        }

        if self.server.powered_by.trim().is_empty() {
            return Err(BindError::Configuration(
                "server.powered_by must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_base_url(field: &str, value: &str) -> Result<()> {
        let url = Url::parse(value)
            .map_err(|e| BindError::Configuration(format!("{field} is not a valid URL: {e}")))?;

        if url.cannot_be_a_base() {
            return Err(BindError::Configuration(format!(
                "{field} cannot be used as a base URL: {value}"
            )));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Server default encoding: {}", self.server.default_encoding);
        tracing::info!("  Server pretty print: {}", self.server.pretty_print);
        tracing::info!("  Server powered-by: {}", self.server.powered_by);
        tracing::info!("  Server base URL: {:?}", self.server.base_url);
        tracing::info!("  Client encoding: {}", self.client.encoding);
        tracing::info!("  Client pretty print: {}", self.client.pretty_print);
        tracing::info!("  Client base URL: {}", self.client.base_url);
    }
}
