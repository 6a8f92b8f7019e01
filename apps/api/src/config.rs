//! API configuration module.
//!
//! Configuration is layered with the `config` crate:
//!
//! ```text
//! built-in defaults  →  pawmart.toml (optional)  →  PAWMART_* environment
//!   (lowest)                                          (highest)
//! ```
//!
//! e.g. `PAWMART_PORT=8080 PAWMART_JWT_SECRET=... pawmart-api`
//!
//! `PAWMART_JWT_SECRET` is mandatory for a file-backed database. The
//! built-in development secret is only accepted with
//! `PAWMART_DATABASE_PATH=:memory:`, where nothing outlives the process.

use serde::{Deserialize, Serialize};

/// Secret used when none is configured. [`ApiConfig::validate`] rejects it
/// unless the database is in memory.
pub const DEV_JWT_SECRET: &str = "pawmart-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file (`:memory:` for an ephemeral database)
    pub database_path: String,

    /// Connection pool size
    pub database_max_connections: u32,

    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Allowed CORS origin. `None` allows any origin.
    #[serde(default)]
    pub cors_origin: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_path: "./pawmart.db".to_string(),
            database_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_lifetime_secs: 30 * 24 * 3600, // 30 days
            cors_origin: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from defaults, `pawmart.toml` and `PAWMART_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("pawmart")
    }

    /// Like [`load`](Self::load) with a different file name (without
    /// extension).
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let config = Self::layered(file)?;
        config.validate()?;
        Ok(config)
    }

    fn layered(file: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&ApiConfig::default())?)
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix("PAWMART").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Checks values the server cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue("jwt_secret".to_string()));
        }
        if self.uses_dev_secret() && !self.is_memory_database() {
            return Err(ConfigError::DevSecret);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_lifetime_secs".to_string()));
        }
        if self.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database_max_connections".to_string(),
            ));
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn is_memory_database(&self) -> bool {
        self.database_path == ":memory:"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("PAWMART_JWT_SECRET must be set when the database is stored on disk")]
    DevSecret,

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
