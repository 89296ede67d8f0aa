use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_APP_NAME: &str = "MKIT-AUTOUPDATEPRICE";
const DEFAULT_FETCH_TIMEOUT_SECS: &str = "15";

/// Reads `.env` (if any), then builds [`AppConfig`] from the `PRICESYNC_*`
/// environment variables.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Builds [`AppConfig`] from the current process environment only; no
/// `.env` file is read.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Builds [`AppConfig`] from `lookup`, which stands in for `std::env::var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("PRICESYNC_ENV", "development"))?;
    let app_name = or_default("PRICESYNC_APP_NAME", DEFAULT_APP_NAME);
    let debug = parse_bool("PRICESYNC_DEBUG", &or_default("PRICESYNC_DEBUG", "false"))?;
    let log_level = or_default("PRICESYNC_LOG_LEVEL", "info");
    let suppliers_path = PathBuf::from(or_default(
        "PRICESYNC_SUPPLIERS_PATH",
        "./config/suppliers.yaml",
    ));
    let output_dir = PathBuf::from(or_default("PRICESYNC_OUTPUT_DIR", "./scraped_data"));

    let fetch_timeout_secs = parse_u64("PRICESYNC_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;
    if fetch_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICESYNC_FETCH_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }

    let user_agent = or_default("PRICESYNC_USER_AGENT", "pricesync/0.1 (price-update)");

    let batch_deadline_secs = match lookup("PRICESYNC_BATCH_DEADLINE_SECS") {
        Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<u64>().map_err(|e| {
            ConfigError::InvalidEnvVar {
                var: "PRICESYNC_BATCH_DEADLINE_SECS".to_string(),
                reason: e.to_string(),
            }
        })?),
        _ => None,
    };

    Ok(AppConfig {
        env,
        app_name,
        debug,
        log_level,
        suppliers_path,
        output_dir,
        fetch_timeout_secs,
        user_agent,
        batch_deadline_secs,
    })
}

/// Parse a string into an `Environment` variant, ignoring case.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "development" => Ok(Environment::Development),
        "test" | "testing" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICESYNC_ENV".to_string(),
            reason: format!(
                "unknown environment '{other}'; expected development, test, or production"
            ),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
