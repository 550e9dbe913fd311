use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing is decoupled from the process environment so it can be tested
/// with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = optional("DATABASE_URL");

    let env = parse_environment(&or_default("PARKON_ENV", "development"));
    let bind_addr = parse_addr("PARKON_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PARKON_LOG_LEVEL", "info");
    let inventory_path = optional("PARKON_INVENTORY_PATH").map(PathBuf::from);

    let tfl_api_key = optional("TFL_API_KEY");
    let tfl_base_url = or_default("PARKON_TFL_BASE_URL", "https://api.tfl.gov.uk");
    let geocoder_base_url = or_default("PARKON_GEOCODER_BASE_URL", "https://api.postcodes.io");

    let db_max_connections = parse_number(&lookup, "PARKON_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_number(&lookup, "PARKON_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_number(&lookup, "PARKON_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let provider_timeout_secs = parse_number(&lookup, "PARKON_PROVIDER_TIMEOUT_SECS", "10")?;
    let provider_deadline_secs = parse_number(&lookup, "PARKON_PROVIDER_DEADLINE_SECS", "15")?;
    if provider_timeout_secs == 0 {
        return Err(invalid(
            "PARKON_PROVIDER_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    if provider_deadline_secs < provider_timeout_secs {
        return Err(invalid(
            "PARKON_PROVIDER_DEADLINE_SECS",
            format!("must be at least PARKON_PROVIDER_TIMEOUT_SECS ({provider_timeout_secs})"),
        ));
    }

    let user_agent = or_default("PARKON_USER_AGENT", "parkon/0.1 (parking-search)");

    let raw_radius = or_default("PARKON_MAX_RADIUS_KM", "16.0934");
    let max_radius_km = raw_radius
        .parse::<f64>()
        .map_err(|e| invalid("PARKON_MAX_RADIUS_KM", e.to_string()))?;
    if !max_radius_km.is_finite() || max_radius_km <= 0.0 {
        return Err(invalid(
            "PARKON_MAX_RADIUS_KM",
            format!("must be a positive number, got {raw_radius}"),
        ));
    }

    let cache_retention_days = parse_number(&lookup, "PARKON_CACHE_RETENTION_DAYS", "30")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        inventory_path,
        tfl_api_key,
        tfl_base_url,
        geocoder_base_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        provider_timeout_secs,
        provider_deadline_secs,
        user_agent,
        max_radius_km,
        cache_retention_days,
    })
}

/// Reads `var` (or `default` when unset) and parses it as a number.
fn parse_number<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("{e} (got {raw:?})"),
        })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
