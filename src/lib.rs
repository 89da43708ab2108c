//! Twistscan Library
//!
//! A Rust library for detecting domain squatting and phishing threats. It
//! generates typo/visual permutations of a target domain and concurrently
//! probes each candidate across several network services:
//!
//! - Resolve A/CNAME/MX/TXT/NS records and detect wildcard zones
//! - Classify resolved addresses into public and internal space
//! - Fingerprint HTTP responders and score page-content similarity
//! - Resolve registration data, RDAP first with a WHOIS fallback
//! - Score string similarity between target and candidate labels
//!
//! # Example
//!
//! ```rust,no_run
//! use twistscan::scanner::{analyze_domain, ScanOptions};
//!
//! # async fn run() -> twistscan::Result<()> {
//! let options = ScanOptions { whois: true, ..ScanOptions::default() };
//! for record in analyze_domain("example.com", &options).await? {
//!     println!("{} [{}] {:?}", record.fqdn(), record.candidate.kind, record.public_ips);
//! }
//! # Ok(())
//! # }
//! ```

// Re-export all modules for library use
pub mod app;
pub mod cli;
pub mod config;
pub mod content;
pub mod dns;
pub mod errors;
pub mod fuzzy;
pub mod http;
pub mod ipclass;
pub mod output;
pub mod permutation;
pub mod providers;
pub mod record;
pub mod retry;
pub mod scanner;
pub mod spf;
pub mod whois;

// Re-export commonly used types and functions for convenience
pub use errors::{Result, ScanError};
pub use permutation::generate_permutations;
pub use record::{Candidate, FuzzyScores, ScanRecord, SpfReport, WhoisRecord};
pub use scanner::{ScanOptions, analyze_chunk, analyze_domain, get_live_mx_domains};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
