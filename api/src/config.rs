//! API Configuration Module
//!
//! Handles configuration loading for the FinCanvas API server from
//! optional config files and `FINCANVAS_`-prefixed environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::{info, warn};

/// Server configuration for the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server bind address and port
    pub bind_address: SocketAddr,

    /// Server environment (development, staging, production)
    pub environment: String,

    /// CORS allowed origins
    pub cors_origins: Vec<String>,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080),
            environment: "development".to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            request_timeout_secs: 30,
            logging: LoggingConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from config files and environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("fincanvas.toml").required(false))
            .add_source(File::with_name("config/fincanvas.toml").required(false))
            .add_source(
                Environment::with_prefix("FINCANVAS")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("environment", "development")?
            .set_default(
                "cors_origins",
                vec!["http://localhost:5173", "http://localhost:3000"],
            )?
            .set_default("request_timeout_secs", 30)?;

        // Comma-separated CORS origins override
        if let Ok(cors_origins_str) = env::var("FINCANVAS_CORS_ORIGINS") {
            let cors_origins: Vec<String> = cors_origins_str
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            if !cors_origins.is_empty() {
                builder = builder.set_override("cors_origins", cors_origins)?;
            }
        }

        let config = builder.build()?;
        let api_config: ApiConfig = config.try_deserialize()?;

        api_config.validate()?;

        info!("API configuration loaded:");
        info!("  Environment: {}", api_config.environment);
        info!("  Bind Address: {}", api_config.bind_address);
        info!("  CORS Origins: {:?}", api_config.cors_origins);
        info!("  Request Timeout: {}s", api_config.request_timeout_secs);

        Ok(api_config)
    }

    /// Validates the configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.cors_origins.is_empty() {
            warn!("CORS origins list is empty - this may cause issues in production");
        }

        Ok(())
    }

    /// Returns true if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Returns true if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable structured logging (JSON format)
    pub structured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            structured: false,
        }
    }
}
