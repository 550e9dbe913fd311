use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Only the database-backed commands and the server need this.
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Optional override for the embedded static inventory catalog.
    pub inventory_path: Option<PathBuf>,
    pub tfl_api_key: Option<String>,
    pub tfl_base_url: String,
    pub geocoder_base_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Timeout applied to each individual upstream HTTP request.
    pub provider_timeout_secs: u64,
    /// Upper bound on one adapter's whole fallback chain.
    pub provider_deadline_secs: u64,
    pub user_agent: String,
    pub max_radius_km: f64,
    pub cache_retention_days: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("inventory_path", &self.inventory_path)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "tfl_api_key",
                &self.tfl_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("tfl_base_url", &self.tfl_base_url)
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("provider_deadline_secs", &self.provider_deadline_secs)
            .field("user_agent", &self.user_agent)
            .field("max_radius_km", &self.max_radius_km)
            .field("cache_retention_days", &self.cache_retention_days)
            .finish()
    }
}

impl AppConfig {
    /// The Postgres URL, or [`ConfigError::MissingEnvVar`] when `DATABASE_URL` is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if no URL was configured.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}
