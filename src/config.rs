use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

use crate::error::{ConsoleError, Result};
use crate::state::DEFAULT_NAMESPACE;

/// Runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Directory holding the persisted collections and session
    pub state_path: PathBuf,
    /// Prefix of every storage key
    pub namespace: String,
    pub log_level: LevelFilter,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("state"),
            namespace: DEFAULT_NAMESPACE.to_string(),
            log_level: LevelFilter::INFO,
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let mut config = Self {
            state_path: std::env::var("TSS_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_path),
            namespace: defaults.namespace,
            log_level: std::env::var("TSS_LOG_LEVEL")
                .ok()
                .and_then(|s| parse_log_level(&s))
                .unwrap_or(defaults.log_level),
        };

        if let Some(namespace) = std::env::var("TSS_NAMESPACE")
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            config.set_namespace(namespace)?;
        }

        Ok(config)
    }

    /// Replace the namespace, rejecting anything that is not a plain key prefix
    pub fn set_namespace(&mut self, namespace: String) -> Result<()> {
        validate_namespace(&namespace)?;
        self.namespace = namespace;
        Ok(())
    }
}

/// Namespaces become part of file names, so only ASCII letters, digits, `-`
/// and `_` are allowed.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    let valid = !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ConsoleError::Validation {
            message: format!(
                "invalid namespace '{}': use only letters, digits, '-' and '_'",
                namespace
            ),
        })
    }
}

/// `trace`, `debug`, `info`, `warn`, `error` or `off`, any case
pub fn parse_log_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), Some(LevelFilter::DEBUG));
        assert_eq!(parse_log_level(" off "), Some(LevelFilter::OFF));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.state_path, PathBuf::from("state"));
        assert_eq!(config.namespace, "tss");
        assert_eq!(config.log_level, LevelFilter::INFO);
    }

    #[test]
    fn test_namespace_must_stay_inside_state_dir() {
        for bad in ["../x", "a/b", "a\\b", "..", "", "demo space"] {
            assert!(
                matches!(validate_namespace(bad), Err(ConsoleError::Validation { .. })),
                "{:?} should be rejected",
                bad
            );
        }

        let mut config = ConsoleConfig::default();
        assert!(config.set_namespace("../escape".to_string()).is_err());
        assert_eq!(config.namespace, "tss");

        config.set_namespace("demo-2_b".to_string()).unwrap();
        assert_eq!(config.namespace, "demo-2_b");
    }
}
