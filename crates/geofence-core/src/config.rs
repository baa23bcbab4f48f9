use crate::app_config::{AppConfig, Environment};
use crate::store::LatLng;
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
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let api_base_url = require("GEOFENCE_API_BASE_URL")?;
    if api_base_url.trim().is_empty() {
        return Err(invalid("GEOFENCE_API_BASE_URL", "must not be empty".to_string()));
    }
    let api_token = lookup("GEOFENCE_API_TOKEN")
        .ok()
        .filter(|token| !token.is_empty());

    let env = parse_environment(&or_default("GEOFENCE_ENV", "development"));
    let log_level = or_default("GEOFENCE_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("GEOFENCE_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("GEOFENCE_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("GEOFENCE_RETRY_BACKOFF_BASE_MS", "500")?;
    let debounce_ms = parse_u64("GEOFENCE_DEBOUNCE_MS", "100")?;

    let coordinate_decimals = parse_u32("GEOFENCE_COORDINATE_DECIMALS", "7")?;
    if !(1..=12).contains(&coordinate_decimals) {
        return Err(invalid(
            "GEOFENCE_COORDINATE_DECIMALS",
            format!("{coordinate_decimals} is outside 1..=12"),
        ));
    }

    let default_center = parse_center(&or_default("GEOFENCE_DEFAULT_CENTER", "-6.2,106.816666"))
        .map_err(|reason| invalid("GEOFENCE_DEFAULT_CENTER", reason))?;

    Ok(AppConfig {
        env,
        api_base_url,
        api_token,
        log_level,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        debounce_ms,
        coordinate_decimals,
        default_center,
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

/// Parse a `"lat,lng"` pair.
fn parse_center(raw: &str) -> Result<LatLng, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got \"{raw}\""))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("{lat},{lng} is not a valid coordinate"));
    }
    Ok(LatLng::new(lat, lng))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
