//! Configuration management for the Helpdesk Admin Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with HELPDESK_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// SLA defaults applied when a routing rule has no override
    pub sla: SlaConfig,

    /// Vendor directory service configuration
    pub vendor_directory: VendorDirectoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for validating JWT tokens issued by the identity service
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlaConfig {
    /// Default first-response window in hours
    pub response_hours: i32,

    /// Default resolution window in hours
    pub resolution_hours: i32,

    /// Per-department resolution overrides, keyed by department name
    #[serde(default)]
    pub department_resolution_hours: HashMap<String, i32>,
}

impl SlaConfig {
    /// Resolution window for a department, falling back to the global
    /// default
    pub fn resolution_hours_for(&self, department: &str) -> i32 {
        self.department_resolution_hours
            .get(department)
            .copied()
            .unwrap_or(self.resolution_hours)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct VendorDirectoryConfig {
    /// Vendor directory API endpoint
    pub base_url: String,

    /// Vendor directory API key
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("HELPDESK_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("sla.response_hours", 24)?
            .set_default("sla.resolution_hours", 72)?
            .set_default("vendor_directory.timeout_seconds", 5)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (HELPDESK_ prefix)
            .add_source(
                Environment::with_prefix("HELPDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
