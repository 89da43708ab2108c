use clap::Parser;

use crate::output::OutputFormat;
use crate::scanner::ScanOptions;

/// Command-line interface definition.
///
/// Verbosity levels:
/// 0 - silent (only final output)
/// 1 - errors + summary (default)
/// 2 - warnings + errors
/// 5 - trace/debug
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Detect squatted variants of a domain by permuting it and probing each candidate over DNS, HTTP and WHOIS/RDAP"
)]
pub struct Cli {
    /// Target domain to permute and scan (e.g. example.com)
    #[arg(required_unless_present = "generate_schema")]
    pub domain: Option<String>,

    /// Maximum concurrent probes (default: 2x CPU count)
    #[arg(long, short = 'c', value_name = "INT")]
    pub concurrency: Option<usize>,

    /// Per-candidate timeout in milliseconds
    #[arg(long, short = 't', value_name = "MS", default_value_t = 15_000)]
    pub timeout: u64,

    /// Resolve WHOIS/RDAP registration data for each candidate
    #[arg(long, short = 'w')]
    pub whois: bool,

    /// Fetch the target page and score candidate content similarity
    #[arg(long = "content")]
    pub content: bool,

    /// Only report candidates that publish MX records
    #[arg(long = "mx-only")]
    pub mx_only: bool,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<String>,

    /// Verbosity level (0,1,2,5)
    #[arg(long, default_value_t = 1)]
    pub verbose: u8,

    /// Show approximate shell-equivalent commands
    #[arg(long)]
    pub show_commands: bool,

    /// Print the JSON schema of the structured output and exit
    #[arg(long)]
    pub generate_schema: bool,
}

/// Abstraction over verbosity/diagnostics so orchestration code does not
/// depend on the concrete CLI type.
pub trait ScanEnv {
    fn show_commands(&self) -> bool;
    fn is_trace(&self) -> bool;
    fn warn_enabled(&self) -> bool;
}

impl ScanEnv for Cli {
    fn show_commands(&self) -> bool {
        self.show_commands
    }
    fn is_trace(&self) -> bool {
        self.is_trace()
    }
    fn warn_enabled(&self) -> bool {
        self.warn_enabled()
    }
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Convenience: are we in very verbose/debug mode?
    pub fn is_trace(&self) -> bool {
        self.verbose >= 5
    }

    /// Are warning-level messages enabled?
    pub fn warn_enabled(&self) -> bool {
        self.verbose >= 2
    }

    /// Are error-level messages enabled?
    pub fn error_enabled(&self) -> bool {
        self.verbose >= 1
    }

    /// Translate the CLI surface into scanner options.
    pub fn scan_options(&self) -> ScanOptions {
        let defaults = ScanOptions::default();
        ScanOptions {
            concurrency: self.concurrency.unwrap_or(defaults.concurrency),
            timeout: std::time::Duration::from_millis(self.timeout),
            ordered: false,
            whois: self.whois,
            content_hash: self.content,
            mx_only: self.mx_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let cli = Cli::try_parse_from(["twistscan", "example.com"]).unwrap();
        assert_eq!(cli.domain.as_deref(), Some("example.com"));
        assert_eq!(cli.timeout, 15_000);
        assert!(!cli.whois && !cli.content && !cli.mx_only);
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn missing_domain_is_an_error() {
        assert!(Cli::try_parse_from(["twistscan"]).is_err());
    }

    #[test]
    fn schema_generation_needs_no_domain() {
        let cli = Cli::try_parse_from(["twistscan", "--generate-schema"]).unwrap();
        assert!(cli.generate_schema);
        assert!(cli.domain.is_none());
    }

    #[test]
    fn flags_map_to_scan_options() {
        let cli = Cli::try_parse_from([
            "twistscan",
            "example.com",
            "-c",
            "7",
            "-t",
            "2500",
            "-w",
            "--content",
            "--mx-only",
        ])
        .unwrap();
        let options = cli.scan_options();
        assert_eq!(options.concurrency, 7);
        assert_eq!(options.timeout, std::time::Duration::from_millis(2500));
        assert!(options.whois && options.content_hash && options.mx_only);
    }

    #[test]
    fn format_values_parse() {
        for (arg, expected) in [
            ("table", OutputFormat::Table),
            ("json", OutputFormat::Json),
            ("csv", OutputFormat::Csv),
        ] {
            let cli = Cli::try_parse_from(["twistscan", "example.com", "-f", arg]).unwrap();
            assert_eq!(cli.format, expected);
        }
    }
}
