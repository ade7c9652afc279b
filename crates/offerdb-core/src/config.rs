use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_OFFERS_ENDPOINT: &str = "http://automobiles.honda.com/platform/api/v1/specials";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/117.0";

/// Every day at 00:00.
pub const DEFAULT_SCHEDULE: &str = "0 0 0 * * *";

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
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("OFFERDB_ENV", "development"))?;
    let bind_addr = or_default("OFFERDB_BIND_ADDR", "0.0.0.0:8000")
        .parse::<std::net::SocketAddr>()
        .map_err(|e| invalid("OFFERDB_BIND_ADDR", e.to_string()))?;

    let log_level = or_default("OFFERDB_LOG_LEVEL", "info");
    let log_file = lookup("OFFERDB_LOG_FILE")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let db_max_connections = parse_u32("OFFERDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("OFFERDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("OFFERDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let offers_endpoint = or_default("OFFERDB_OFFERS_ENDPOINT", DEFAULT_OFFERS_ENDPOINT);
    if !offers_endpoint.starts_with("http://") && !offers_endpoint.starts_with("https://") {
        return Err(invalid(
            "OFFERDB_OFFERS_ENDPOINT",
            format!("expected an http(s) URL, got \"{offers_endpoint}\""),
        ));
    }
    let user_agent = or_default("OFFERDB_USER_AGENT", DEFAULT_USER_AGENT);
    let request_timeout_secs = parse_u64("OFFERDB_REQUEST_TIMEOUT_SECS", "30")?;

    let max_workers = or_default("OFFERDB_MAX_WORKERS", "5")
        .parse::<usize>()
        .map_err(|e| invalid("OFFERDB_MAX_WORKERS", e.to_string()))?;
    if max_workers == 0 {
        return Err(invalid("OFFERDB_MAX_WORKERS", "must be at least 1".into()));
    }
    let region_timeout_secs = parse_u64("OFFERDB_REGION_TIMEOUT_SECS", "300")?;
    let schedule = or_default("OFFERDB_SCHEDULE", DEFAULT_SCHEDULE);

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        log_file,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        offers_endpoint,
        user_agent,
        request_timeout_secs,
        max_workers,
        region_timeout_secs,
        schedule,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "OFFERDB_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
