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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty values count as unset so `.env` templates with `KEY=` work.
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

    let env = parse_environment(&or_default("GEOFENCE_ENV", "development"))?;

    let bind_addr = or_default("GEOFENCE_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("GEOFENCE_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("GEOFENCE_LOG_LEVEL", "info");

    let places_api_key = optional("GOOGLE_PLACES_API_KEY");
    let directions_api_key = optional("GOOGLE_DIRECTIONS_API_KEY");
    let maps_api_key = optional("GOOGLE_MAPS_API_KEY");
    let slack_webhook_url = optional("SLACK_WEBHOOK_URL");

    let basic_auth_password = optional("BASIC_AUTH_PASSWORD");
    if basic_auth_password.is_none() && env == Environment::Production {
        return Err(ConfigError::MissingEnvVar("BASIC_AUTH_PASSWORD".to_string()));
    }

    let export_dir = PathBuf::from(or_default("GEOFENCE_EXPORT_DIR", "./exports"));
    let fixtures_dir = PathBuf::from(or_default("GEOFENCE_FIXTURES_DIR", "./fixtures"));
    let category_synonyms_path = optional("GEOFENCE_CATEGORY_SYNONYMS_PATH").map(PathBuf::from);

    let request_timeout_secs = parse_u64("GEOFENCE_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "GEOFENCE_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let max_retries = parse_u32("GEOFENCE_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("GEOFENCE_RETRY_BACKOFF_BASE_MS", "500")?;
    let enrich_delay_ms = parse_u64("GEOFENCE_ENRICH_DELAY_MS", "200")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        places_api_key,
        directions_api_key,
        maps_api_key,
        basic_auth_password,
        slack_webhook_url,
        export_dir,
        fixtures_dir,
        category_synonyms_path,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        enrich_delay_ms,
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
            var: "GEOFENCE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
