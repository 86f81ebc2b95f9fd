//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::PollerConfig;
use crate::core::ConfigError;

/// Service poller - periodically polls HTTP services and appends their JSON
/// responses, one per line, to an output file.
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(name = "service-poller")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    SERVICE_POLLER_THREADS           Number of simultaneously active polling workers (default: 5)
    SERVICE_POLLER_INTERVAL_SECS     Poll interval in seconds (default: 10)
    SERVICE_POLLER_OUTPUT            Output file, `-` for stdout (default: output.jsonl)
    SERVICE_POLLER_CATALOG           Service catalog file (default: services.json)
    SERVICE_POLLER_CONFIG            JSON config file
    RUST_LOG                         Log filter (default: info)

While running, press Ctrl-C or type `q` and Enter to stop.
"#)]
pub struct Cli {
    /// Number of simultaneously active polling workers
    #[arg(short = 'n', long = "threads", env = "SERVICE_POLLER_THREADS", value_name = "N")]
    pub threads: Option<usize>,

    /// Poll interval in seconds
    #[arg(short = 't', long = "time", env = "SERVICE_POLLER_INTERVAL_SECS", value_name = "SECONDS")]
    pub interval_secs: Option<u64>,

    /// Output file (appended to); `-` writes to stdout
    #[arg(short, long, env = "SERVICE_POLLER_OUTPUT", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Service catalog (JSON array of {name, url})
    #[arg(short, long, env = "SERVICE_POLLER_CATALOG", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// JSON config file; command-line values override it
    #[arg(long, env = "SERVICE_POLLER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long = "request-timeout", value_name = "SECONDS")]
    pub request_timeout_secs: Option<u64>,

    /// How long to wait for in-flight polls on shutdown, in seconds
    #[arg(long = "shutdown-grace", value_name = "SECONDS")]
    pub shutdown_grace_secs: Option<u64>,

    /// Print the service catalog and exit
    #[arg(long)]
    pub list: bool,

    /// Services to poll (default: every service in the catalog)
    #[arg(value_name = "SERVICE")]
    pub services: Vec<String>,
}

impl Cli {
    /// Layer defaults, the optional config file and command-line values, then validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be loaded or the
    /// resulting configuration is invalid.
    pub fn to_config(&self) -> Result<PollerConfig, ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => PollerConfig::from_file(path)?,
            None => PollerConfig::default(),
        };
        if let Some(threads) = self.threads {
            cfg.worker_count = threads;
        }
        if let Some(secs) = self.interval_secs {
            cfg.interval_secs = secs;
        }
        if let Some(secs) = self.request_timeout_secs {
            cfg.request_timeout_secs = secs;
        }
        if let Some(secs) = self.shutdown_grace_secs {
            cfg.shutdown_grace_secs = secs;
        }
        if let Some(output) = &self.output {
            cfg.output.clone_from(output);
        }
        if let Some(catalog) = &self.catalog {
            cfg.catalog.clone_from(catalog);
        }
        if !self.services.is_empty() {
            cfg.services.clone_from(&self.services);
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
