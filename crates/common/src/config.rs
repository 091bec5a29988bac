//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Token signing configuration.
    pub auth: AuthConfig,
    /// Built-in system account.
    #[serde(default)]
    pub system_account: SystemAccountConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Bearer token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret.
    pub jwt_secret: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

/// The reserved platform account, created at startup when missing.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemAccountConfig {
    /// Display name.
    #[serde(default = "default_system_name")]
    pub name: String,
    /// Initial password. Only used when the account is first created.
    #[serde(default = "default_system_password")]
    pub password: String,
}

impl Default for SystemAccountConfig {
    fn default() -> Self {
        Self {
            name: default_system_name(),
            password: default_system_password(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_token_ttl_hours() -> i64 {
    24
}

fn default_system_name() -> String {
    "TSocial".to_string()
}

fn default_system_password() -> String {
    "change-me-now".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `TSOCIAL_ENV`)
    /// 3. Environment variables with `TSOCIAL__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("TSOCIAL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TSOCIAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TSOCIAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let raw = config::Config::builder()
            .set_override("server.host", "127.0.0.1")
            .unwrap()
            .set_override("database.url", "postgres://localhost/tsocial")
            .unwrap()
            .set_override("auth.jwt_secret", "secret")
            .unwrap()
            .build()
            .unwrap();

        let config: Config = raw.try_deserialize().unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.system_account.name, "TSocial");
    }
}
