//! Configuration management for adfetch
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use adfetch::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `ADFETCH__<section>__<key>`
//!
//! Examples:
//! - `ADFETCH__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `ADFETCH__ADLIB__API_VERSION=v19.0`
//! - `ADFETCH__MEDIA__OUTPUT_DIR=/var/lib/adfetch`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/adfetch.toml`.
//! This can be overridden using the `ADFETCH_CONFIG` environment variable.

mod models;
mod size;
mod sources;
mod validation;

pub use size::{ByteSize, SizeError};
pub use models::{
    AdLibConfig, ApiLimits, Config, MediaConfig, ServerConfig, StorageProvider, TelemetryConfig,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`ADFETCH__*`)
    /// 2. TOML file (default: `config/adfetch.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
