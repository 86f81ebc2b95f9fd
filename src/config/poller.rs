//! Poller configuration: worker count, interval, timeouts and I/O paths.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

/// Where successful responses are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output.
    Stdout,
    /// A file opened in append mode, created if missing.
    File(PathBuf),
}

/// Root poller configuration.
///
/// Every field has a default so that a JSON config file only needs to list
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Number of simultaneously active polling workers.
    pub worker_count: usize,
    /// Delay between the starts of consecutive polls of one service, in seconds.
    pub interval_secs: u64,
    /// Upper bound for a single HTTP request, in seconds.
    pub request_timeout_secs: u64,
    /// How long `stop` waits for in-flight polls, in seconds.
    pub shutdown_grace_secs: u64,
    /// Path of the JSON service catalog.
    pub catalog: PathBuf,
    /// Output path; `-` selects standard output.
    pub output: PathBuf,
    /// Names of services to poll. Empty selects the whole catalog.
    pub services: Vec<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            worker_count: 5,
            interval_secs: 10,
            request_timeout_secs: 30,
            shutdown_grace_secs: 10,
            catalog: PathBuf::from("services.json"),
            output: PathBuf::from("output.jsonl"),
            services: Vec::new(),
        }
    }
}

impl PollerConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidArgument` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidArgument(
                "worker_count must be greater than 0".into(),
            ));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::InvalidArgument(
                "interval_secs must be greater than 0".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidArgument(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.shutdown_grace_secs == 0 {
            return Err(ConfigError::InvalidArgument(
                "shutdown_grace_secs must be greater than 0".into(),
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::InvalidArgument("output must not be empty".into()));
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed or a value is invalid.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| ConfigError::InvalidArgument(format!("config parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read configuration from a JSON file.
    ///
    /// The result is not validated; callers typically layer command-line
    /// overrides on top before calling [`PollerConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidArgument` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidArgument(format!("cannot read config {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ConfigError::InvalidArgument(format!("config parse error in {}: {e}", path.display()))
        })
    }

    /// Poll interval as a `Duration`.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Shutdown grace period as a `Duration`.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Resolve the output path into a sink target.
    #[must_use]
    pub fn output_target(&self) -> OutputTarget {
        if self.output == Path::new("-") {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(self.output.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_selects_stdout() {
        let cfg = PollerConfig {
            output: PathBuf::from("-"),
            ..PollerConfig::default()
        };
        assert_eq!(cfg.output_target(), OutputTarget::Stdout);
        assert_eq!(
            PollerConfig::default().output_target(),
            OutputTarget::File(PathBuf::from("output.jsonl"))
        );
    }

    #[test]
    fn durations_follow_seconds() {
        let cfg = PollerConfig::default();
        assert_eq!(cfg.interval(), Duration::from_secs(10));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.shutdown_grace(), Duration::from_secs(10));
    }
}
