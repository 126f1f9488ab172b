//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use crate::engine::DEFAULT_BATCH_LIMIT;
use serde::Deserialize;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0),
            port: 3000,
        }
    }
}

/// Validation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Hard cap on scripts per batch request.
    pub batch_limit: usize,
    /// Pool size for registered target databases.
    pub max_pool_size: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_BATCH_LIMIT,
            max_pool_size: 5,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub validation: ValidationConfig,
    pub cors: CorsConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        let server = ServerConfig {
            host: std::env::var("HOST")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        let batch_limit = std::env::var("BATCH_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_BATCH_LIMIT);
        if batch_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "BATCH_LIMIT must be at least 1".to_string(),
            ));
        }

        let validation = ValidationConfig {
            batch_limit,
            max_pool_size: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(|| ValidationConfig::default().max_pool_size),
        };

        let cors = CorsConfig {
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        };

        Ok(Self {
            server,
            validation,
            cors,
        })
    }
}
