//! Unified error handling for the scanning engine.
//!
//! A `thiserror`-based model with:
//!   * Typed variants for the failure domains we actually hit
//!     (input validation, DNS, WHOIS/RDAP, HTTP, content fetch)
//!   * A categorization layer (`ErrorCategory`) for structured reporting
//!   * Helper constructors
//!   * `From` conversions for common lower-level errors
//!
//! Probe-stage failures are almost never surfaced through this type: stages
//! after resolution swallow their own errors and substitute typed defaults
//! (see `scanner`). `ScanError` covers the places where an error is the
//! answer — WHOIS lookups, target fingerprinting, configuration validation.

use std::io;

use thiserror::Error;

/// High-level classification for structured reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Parse,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Network => "network",
            ErrorCategory::Parse => "parse",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Primary application error type.
#[derive(Error, Debug)]
pub enum ScanError {
    // ------------------------ Input / Validation ----------------------------
    #[error("Invalid domain name: {domain}")]
    InvalidDomain { domain: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ----------------------------- Network ----------------------------------
    #[error("DNS {record_type} lookup failed for {domain}: {reason}")]
    DnsResolution {
        domain: String,
        record_type: String,
        reason: String,
    },

    #[error("Domain not resolvable: {domain}")]
    NotResolvable { domain: String },

    #[error("HTTP request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("RDAP lookup for '{domain}' failed: {reason}")]
    Rdap { domain: String, reason: String },

    #[error("WHOIS query '{query}' to server '{server}' failed: {reason}")]
    WhoisQuery {
        server: String,
        query: String,
        reason: String,
    },

    #[error("No WHOIS server for TLD: {tld}")]
    NoWhoisServer { tld: String },

    #[error("Content fetch failed for {domain}: {reason}")]
    ContentFetch { domain: String, reason: String },

    // ---------------------------- Parsing -----------------------------------
    #[error("Failed to parse {what} for '{subject}': {reason}")]
    Parse {
        what: String,
        subject: String,
        reason: String,
    },

    // ----------------------------- I/O / FS ---------------------------------
    #[error("I/O error during {operation} on {path}: {source}")]
    Io {
        path: String,
        operation: String,
        #[source]
        source: io::Error,
    },

    // ---------------------------- Internal ----------------------------------
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ScanError {
    /// Categorize the error for structured output.
    pub fn category(&self) -> ErrorCategory {
        use ScanError::*;
        match self {
            InvalidDomain { .. } | Configuration { .. } => ErrorCategory::Input,
            DnsResolution { .. }
            | NotResolvable { .. }
            | Http { .. }
            | Rdap { .. }
            | WhoisQuery { .. }
            | NoWhoisServer { .. }
            | ContentFetch { .. } => ErrorCategory::Network,
            Parse { .. } => ErrorCategory::Parse,
            Io { .. } | Internal { .. } => ErrorCategory::Internal,
        }
    }

    // ---------------------------- Constructors -----------------------------

    pub fn invalid_domain(domain: impl Into<String>) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn dns_resolution(
        domain: impl Into<String>,
        record_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DnsResolution {
            domain: domain.into(),
            record_type: record_type.into(),
            reason: reason.into(),
        }
    }

    pub fn not_resolvable(domain: impl Into<String>) -> Self {
        Self::NotResolvable {
            domain: domain.into(),
        }
    }

    pub fn http(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn rdap(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rdap {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub fn whois_query(
        server: impl Into<String>,
        query: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::WhoisQuery {
            server: server.into(),
            query: query.into(),
            reason: reason.into(),
        }
    }

    pub fn content_fetch(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContentFetch {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(
        what: impl Into<String>,
        subject: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parse {
            what: what.into(),
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<String>, operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Public result alias.
pub type Result<T> = std::result::Result<T, ScanError>;

impl From<io::Error> for ScanError {
    fn from(e: io::Error) -> Self {
        ScanError::Io {
            path: "<unknown>".into(),
            operation: "unspecified".into(),
            source: e,
        }
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(e: serde_json::Error) -> Self {
        ScanError::Parse {
            what: "json".into(),
            subject: "<body>".into(),
            reason: e.to_string(),
        }
    }
}
