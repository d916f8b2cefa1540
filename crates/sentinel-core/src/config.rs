use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or half of a credential pair is set.
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
/// Returns `ConfigError` if values are invalid or half of a credential pair is set.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

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

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("SENTINEL_ENV", "development"))?;

    let es_url = or_default("SENTINEL_ES_URL", "http://localhost:9200");
    if !(es_url.starts_with("http://") || es_url.starts_with("https://")) {
        return Err(invalid(
            "SENTINEL_ES_URL",
            format!("expected an http(s) URL, got '{es_url}'"),
        ));
    }

    let es_username = lookup("SENTINEL_ES_USERNAME").ok();
    let es_password = lookup("SENTINEL_ES_PASSWORD").ok();
    match (&es_username, &es_password) {
        (Some(_), None) => {
            return Err(ConfigError::MissingEnvVar(
                "SENTINEL_ES_PASSWORD".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(ConfigError::MissingEnvVar(
                "SENTINEL_ES_USERNAME".to_string(),
            ))
        }
        _ => {}
    }

    let index = or_default("SENTINEL_INDEX", "tweets");
    let weapons_path = PathBuf::from(or_default("SENTINEL_WEAPONS_PATH", "./data/weapons.txt"));
    let sentiment_lexicon_path = lookup("SENTINEL_SENTIMENT_LEXICON_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let batch_size = parse_positive_usize("SENTINEL_BATCH_SIZE", "500")?;
    let chunk_size = parse_positive_usize("SENTINEL_CHUNK_SIZE", "500")?;
    let scroll_keepalive = or_default("SENTINEL_SCROLL_KEEPALIVE", "2m");

    let bulk_timeout_secs = parse_u64("SENTINEL_BULK_TIMEOUT_SECS", "60")?;
    let es_request_timeout_secs = parse_u64("SENTINEL_ES_REQUEST_TIMEOUT_SECS", "30")?;
    let es_max_retries = parse_u32("SENTINEL_ES_MAX_RETRIES", "3")?;
    let es_retry_backoff_ms = parse_u64("SENTINEL_ES_RETRY_BACKOFF_MS", "500")?;

    let bind_addr = or_default("SENTINEL_BIND_ADDR", "127.0.0.1:8001")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("SENTINEL_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("SENTINEL_LOG_LEVEL", "info");

    let text_column = or_default("SENTINEL_TEXT_COLUMN", "text");
    let flag_column = or_default("SENTINEL_FLAG_COLUMN", "Antisemitic");

    Ok(AppConfig {
        env,
        es_url,
        es_username,
        es_password,
        index,
        weapons_path,
        sentiment_lexicon_path,
        batch_size,
        chunk_size,
        scroll_keepalive,
        bulk_timeout_secs,
        es_request_timeout_secs,
        es_max_retries,
        es_retry_backoff_ms,
        bind_addr,
        log_level,
        text_column,
        flag_column,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SENTINEL_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
