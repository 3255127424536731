use crate::app_config::{AppConfig, Environment, ScorerKind};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
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
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let env = parse_environment(&or_default("STOCKCHECK_ENV", "development"))?;
    let log_level = or_default("STOCKCHECK_LOG_LEVEL", "info");
    let stores_path = PathBuf::from(or_default("STOCKCHECK_STORES_PATH", "./config/stores.yaml"));

    let match_threshold = parse_threshold(&or_default("STOCKCHECK_MATCH_THRESHOLD", "70"))
        .map_err(|reason| invalid("STOCKCHECK_MATCH_THRESHOLD", reason))?;
    let scorer = parse_scorer(&or_default("STOCKCHECK_SCORER", "token_sort"))?;

    let wait_timeout_secs = parse_u64("STOCKCHECK_WAIT_TIMEOUT_SECS", "5")?;
    if wait_timeout_secs == 0 {
        return Err(invalid(
            "STOCKCHECK_WAIT_TIMEOUT_SECS",
            "must be greater than 0".to_string(),
        ));
    }
    let poll_interval_ms = parse_u64("STOCKCHECK_POLL_INTERVAL_MS", "250")?;
    let request_timeout_secs = parse_u64("STOCKCHECK_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default(
        "STOCKCHECK_USER_AGENT",
        "stockcheck/0.1 (ingredient-availability)",
    );
    let max_retries = parse_u32("STOCKCHECK_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("STOCKCHECK_RETRY_BACKOFF_BASE_MS", "500")?;

    let store_timeout_secs = match lookup("STOCKCHECK_STORE_TIMEOUT_SECS") {
        Ok(raw) => Some(
            raw.parse::<u64>()
                .map_err(|e| invalid("STOCKCHECK_STORE_TIMEOUT_SECS", e.to_string()))?,
        ),
        Err(_) => None,
    };

    Ok(AppConfig {
        env,
        log_level,
        stores_path,
        match_threshold,
        scorer,
        wait_timeout_secs,
        poll_interval_ms,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        store_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOCKCHECK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_scorer(s: &str) -> Result<ScorerKind, ConfigError> {
    match s {
        "token_sort" => Ok(ScorerKind::TokenSort),
        "token_set" => Ok(ScorerKind::TokenSet),
        "jaro_winkler" => Ok(ScorerKind::JaroWinkler),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOCKCHECK_SCORER".to_string(),
            reason: format!("unknown scorer '{other}'"),
        }),
    }
}

/// Parses a score threshold and checks it lies in `0..=100`.
///
/// Shared by `STOCKCHECK_MATCH_THRESHOLD` and the CLI `--threshold` flag.
///
/// # Errors
///
/// Returns a message if `raw` is not a number or is out of range.
pub fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    validate_threshold(value)?;
    Ok(value)
}

pub(crate) fn validate_threshold(value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("threshold {value} is outside 0..=100"))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
