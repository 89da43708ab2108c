//! Configuration management.
//!
//! Centralizes scan defaults and output preferences, loadable from
//! `TWISTSCAN_*` environment variables and merged with CLI arguments (CLI
//! takes precedence). No variable is required; the environment only
//! overrides defaults.

use std::time::Duration;

use crate::cli::Cli;
use crate::errors::{Result, ScanError};
use crate::scanner::ScanOptions;

/// Main configuration structure.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Scan behavior settings.
    pub scan: ScanConfig,

    /// Output and filtering preferences.
    pub output: OutputConfig,
}

/// Scan-related configuration options.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum concurrent probes.
    pub concurrency: usize,

    /// Wall-clock budget per candidate.
    pub timeout: Duration,

    /// Emit results in input order.
    pub ordered: bool,

    /// Resolve registration data per candidate.
    pub whois: bool,

    /// Score candidate content against the target page.
    pub content_hash: bool,

    /// Keep only mail-capable candidates.
    pub mx_only: bool,
}

/// Output configuration.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Maximum number of results to report (0 = unlimited).
    pub max_results: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let defaults = ScanOptions::default();
        Self {
            concurrency: defaults.concurrency,
            timeout: defaults.timeout,
            ordered: false,
            whois: false,
            content_hash: false,
            mx_only: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { max_results: 0 }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(concurrency) = std::env::var("TWISTSCAN_CONCURRENCY")
            && let Ok(n) = concurrency.parse::<usize>()
        {
            config.scan.concurrency = n;
        }

        if let Ok(timeout) = std::env::var("TWISTSCAN_TIMEOUT_MS")
            && let Ok(ms) = timeout.parse::<u64>()
        {
            config.scan.timeout = Duration::from_millis(ms);
        }

        if let Ok(max_results) = std::env::var("TWISTSCAN_MAX_RESULTS")
            && let Ok(max) = max_results.parse::<usize>()
        {
            config.output.max_results = max;
        }

        config
    }

    /// Merge with CLI arguments, giving CLI precedence.
    pub fn merge_with_cli(&mut self, cli: &Cli) {
        if let Some(concurrency) = cli.concurrency {
            self.scan.concurrency = concurrency;
        }
        self.scan.timeout = Duration::from_millis(cli.timeout);
        self.scan.whois = cli.whois;
        self.scan.content_hash = cli.content;
        self.scan.mx_only = cli.mx_only;
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.scan.concurrency == 0 {
            return Err(ScanError::configuration(
                "concurrency must be greater than 0",
            ));
        }
        if self.scan.timeout.is_zero() {
            return Err(ScanError::configuration(
                "per-candidate timeout must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Scanner options derived from the merged configuration.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            concurrency: self.scan.concurrency,
            timeout: self.scan.timeout,
            ordered: self.scan.ordered,
            whois: self.scan.whois,
            content_hash: self.scan.content_hash,
            mx_only: self.scan.mx_only,
        }
    }
}
