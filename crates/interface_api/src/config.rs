//! API configuration

use serde::Deserialize;
use validator::Validate;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

/// API configuration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApiConfig {
    /// Server host
    #[serde(default = "default_host")]
    #[validate(length(min = 1, message = "host must not be empty"))]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1, message = "port must be between 1 and 65535"))]
    pub port: u16,
    /// Database URL
    #[validate(length(min = 1, message = "database_url must not be empty"))]
    pub database_url: String,
    /// Maximum pooled database connections
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1, max = 100, message = "db_max_connections must be between 1 and 100"))]
    pub db_max_connections: u32,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: "postgres://localhost/accounting".to_string(),
            db_max_connections: default_max_connections(),
            log_level: default_log_level(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_`-prefixed environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Builds configuration from individual variables over the defaults
    ///
    /// `API_DATABASE_URL` takes precedence over `DATABASE_URL`, and
    /// `API_LOG_LEVEL` over `RUST_LOG`. Unparseable numbers fall back to
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("API_HOST").unwrap_or(defaults.host),
            port: lookup("API_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_url: lookup("API_DATABASE_URL")
                .or_else(|| lookup("DATABASE_URL"))
                .unwrap_or(defaults.database_url),
            db_max_connections: lookup("API_DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.db_max_connections),
            log_level: lookup("API_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
        }
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
