//! Logging setup - powered by tracing-subscriber
//!
//! Events go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::core::config::{LogConfig, LogFormat};

/// Environment variable overriding the configured log level
pub const LOG_ENV: &str = "VARSEL_LOG";

/// Pick the filter directive: explicit flag, then `VARSEL_LOG`, then config
pub fn resolve_level(flag: Option<&str>, config: &LogConfig) -> String {
    if let Some(level) = flag {
        return level.to_string();
    }
    match std::env::var(LOG_ENV) {
        Ok(level) if !level.trim().is_empty() => level,
        _ => config.level.clone(),
    }
}

/// Build the `EnvFilter`, quieting noisy dependencies
fn build_env_filter(level: &str) -> Result<EnvFilter, String> {
    let directives = [level.to_string(), "rusqlite=warn".to_string()];
    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| format!("Invalid log filter '{}': {}", filter_str, e))
}

/// Install the global subscriber
///
/// Calling this twice is harmless; the first subscriber stays installed.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), String> {
    let layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(build_env_filter(level)?)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(build_env_filter(level)?)
            .boxed(),
    };

    if tracing_subscriber::registry().with(layer).try_init().is_ok() {
        tracing::trace!(level, ?format, "logging initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_config() {
        let config = LogConfig::default();
        assert_eq!(resolve_level(Some("debug"), &config), "debug");
    }

    #[test]
    fn test_build_env_filter_rejects_garbage() {
        assert!(build_env_filter("info").is_ok());
        assert!(build_env_filter("varsel=notalevel").is_err());
    }
}
