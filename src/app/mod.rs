//! High-level application orchestration layer.
//!
//! Encapsulates the binary's procedural flow so `main` stays minimal:
//! schema-generation early exit, configuration merge and validation, the
//! scan itself, and result formatting/writing. Returns the intended process
//! exit code; per the CLI contract only a missing argument is nonzero, every
//! post-parse failure reports and exits zero.

use std::time::Instant;

use crate::cli::{Cli, ScanEnv};
use crate::config::Config;
use crate::errors::Result;
use crate::output::{self, ScanReport};
use crate::scanner;

/// Application façade.
pub struct App;

impl App {
    /// Execute the end-to-end scan workflow.
    pub async fn run(cli: &Cli) -> Result<i32> {
        // Early exit: schema generation
        if cli.generate_schema {
            match ScanReport::generate_json_schema() {
                Ok(schema) => println!("{schema}"),
                Err(e) => eprintln!("Error generating JSON schema: {e}"),
            }
            return Ok(0);
        }

        let Some(domain) = cli.domain.as_deref() else {
            // Unreachable behind clap's required_unless_present, kept as a
            // guard for programmatic construction.
            if cli.error_enabled() {
                eprintln!("Error: a target domain must be provided.");
            }
            return Ok(1);
        };

        // Load / validate config
        let mut config = Config::from_env();
        config.merge_with_cli(cli);
        if let Err(e) = config.validate() {
            if cli.error_enabled() {
                eprintln!("Configuration error: {e}");
            }
            return Ok(0);
        }
        let options = config.scan_options();

        if cli.show_commands() {
            eprintln!("(cmd) dig <candidate> A CNAME MX TXT NS");
            if options.whois {
                eprintln!("(cmd) whois <candidate>");
            }
            if options.content_hash {
                eprintln!("(cmd) curl -skL https://<candidate>/");
            }
        }
        if cli.is_trace() {
            eprintln!(
                "Scanning permutations of {domain} (concurrency={}, timeout={}ms)",
                options.concurrency,
                options.timeout.as_millis()
            );
        }

        let start = Instant::now();
        let mut results = match scanner::analyze_domain(domain, &options).await {
            Ok(results) => results,
            Err(e) => {
                if cli.error_enabled() {
                    eprintln!("Error: {e}");
                }
                return Ok(0);
            }
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        if config.output.max_results > 0 {
            results.truncate(config.output.max_results);
        }

        if cli.is_trace() {
            for (kind, count) in output::count_by_kind(&results) {
                eprintln!("  {kind}: {count}");
            }
        }

        let report = ScanReport::new(domain, &options, results, duration_ms);

        let use_colors = cli.output.is_none()
            && atty::is(atty::Stream::Stdout)
            && std::env::var("NO_COLOR").is_err();
        let formatter = output::create_formatter(cli.format, use_colors);
        let text = formatter.format_report(&report)?;
        output::write_output(&text, cli.output.as_deref())?;

        if cli.error_enabled() {
            eprintln!(
                "{} candidates reported in {:.1}s",
                report.statistics.result_count,
                duration_ms as f64 / 1000.0
            );
        }

        Ok(0)
    }
}
