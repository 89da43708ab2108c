//! DNS probing for candidate domains.
//!
//! Centralizes every resolver interaction of the probe pipeline:
//! - A-record resolution composed with a CNAME check that filters the
//!   registry-wildcard false positive (a CNAME pointing at the bare TLD)
//! - Auxiliary record lookups (MX, TXT, NS)
//! - DMARC retrieval and tag parsing
//! - Wildcard-zone detection via a random throwaway label
//!
//! Only resolution can gate a probe; the auxiliary lookups soft-fail into
//! typed empty values at the call site. Network timeouts ride on the
//! resolver's own defaults.

use std::collections::BTreeMap;

use rand::Rng;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    proto::rr::{RData, RecordType},
};

use crate::errors::{Result, ScanError};
use crate::record::{Candidate, MxRecord};

pub const NO_DMARC_ERROR: &str = "No DMARC record found";

/// Outcome of composing the A and CNAME lookups for a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub ips: Vec<String>,
    pub cname: Option<String>,
}

/// Resolver wrapper shared across all probes of a scan.
#[derive(Clone)]
pub struct DnsProbe {
    resolver: TokioAsyncResolver,
}

impl Default for DnsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsProbe {
    /// System-configured resolver with default options.
    pub fn new() -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default()),
        }
    }

    /// A-record lookup returning dotted-quad strings.
    pub async fn lookup_a(&self, fqdn: &str) -> Result<Vec<String>> {
        let lookup = self
            .resolver
            .ipv4_lookup(fqdn)
            .await
            .map_err(|e| ScanError::dns_resolution(fqdn, "A", e.to_string()))?;
        let ips: Vec<String> = lookup.iter().map(|a| a.0.to_string()).collect();
        if ips.is_empty() {
            return Err(ScanError::dns_resolution(fqdn, "A", "no records"));
        }
        Ok(ips)
    }

    /// Compose A and CNAME lookups (run in parallel) into a `Resolution`.
    ///
    /// A failed A lookup propagates; a CNAME whose string form equals the
    /// candidate's TLD is the registry-wildcard false positive and fails the
    /// resolution outright.
    pub async fn resolve(&self, candidate: &Candidate) -> Result<Resolution> {
        let (a_result, cname_result) = tokio::join!(
            self.lookup_a(&candidate.fqdn),
            self.resolver.lookup(candidate.fqdn.as_str(), RecordType::CNAME),
        );

        let ips = a_result?;
        let cnames: Vec<String> = match cname_result {
            Ok(lookup) => lookup
                .iter()
                .filter_map(|rdata| match rdata {
                    RData::CNAME(name) => Some(name.0.to_utf8()),
                    _ => None,
                })
                .collect(),
            // No CNAME chain is the common case, not a failure.
            Err(_) => Vec::new(),
        };

        compose_resolution(ips, cnames, &candidate.tld)
            .map_err(|reason| ScanError::dns_resolution(&candidate.fqdn, "CNAME", reason))
    }

    /// MX records in resolver order; an empty zone is an empty list.
    pub async fn mx(&self, fqdn: &str) -> Result<Vec<MxRecord>> {
        let lookup = self
            .resolver
            .mx_lookup(fqdn)
            .await
            .map_err(|e| ScanError::dns_resolution(fqdn, "MX", e.to_string()))?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord {
                priority: mx.preference(),
                server: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
            })
            .collect())
    }

    /// Raw TXT record strings, one per record.
    pub async fn txt(&self, fqdn: &str) -> Result<Vec<String>> {
        let lookup = self
            .resolver
            .txt_lookup(fqdn)
            .await
            .map_err(|e| ScanError::dns_resolution(fqdn, "TXT", e.to_string()))?;
        Ok(lookup.iter().map(|txt| txt.to_string()).collect())
    }

    /// Nameserver hostnames, trailing dot stripped, deduplicated with input
    /// order preserved.
    pub async fn ns(&self, fqdn: &str) -> Result<Vec<String>> {
        let lookup = self
            .resolver
            .ns_lookup(fqdn)
            .await
            .map_err(|e| ScanError::dns_resolution(fqdn, "NS", e.to_string()))?;
        let mut seen = Vec::new();
        for ns in lookup.iter() {
            let host = ns.0.to_utf8().trim_end_matches('.').to_string();
            if !seen.contains(&host) {
                seen.push(host);
            }
        }
        Ok(seen)
    }

    /// DMARC policy of `_dmarc.<domain>` as a tag map. A missing or
    /// unreadable record is a successful report carrying the error entry.
    pub async fn dmarc(&self, fqdn: &str) -> BTreeMap<String, String> {
        let dmarc_host = format!("_dmarc.{fqdn}");
        match self.txt(&dmarc_host).await {
            Ok(records) => parse_dmarc_records(&records),
            Err(_) => dmarc_error_report(),
        }
    }

    /// Probe a random throwaway label below the candidate; any answer means
    /// the zone resolves arbitrary names.
    pub async fn wildcard(&self, fqdn: &str) -> bool {
        let probe_host = format!("{}.{fqdn}", random_label());
        match self.resolver.ipv4_lookup(probe_host.as_str()).await {
            Ok(lookup) => lookup.iter().count() > 0,
            Err(_) => false,
        }
    }
}

/// Merge A answers and CNAME answers, applying the CNAME-equals-TLD
/// heuristic. Errors carry the reason string only; the caller adds context.
fn compose_resolution(
    ips: Vec<String>,
    cnames: Vec<String>,
    tld: &str,
) -> std::result::Result<Resolution, String> {
    match cnames.first() {
        None => Ok(Resolution { ips, cname: None }),
        Some(first) => {
            let normalized = first.trim_end_matches('.');
            if normalized == tld {
                Err("tld matches false positive".to_string())
            } else {
                Ok(Resolution {
                    ips,
                    cname: Some(normalized.to_string()),
                })
            }
        }
    }
}

/// Parse the first `v=DMARC1` record into its tag map.
fn parse_dmarc_records(records: &[String]) -> BTreeMap<String, String> {
    let Some(record) = records.iter().find(|r| r.starts_with("v=DMARC1")) else {
        return dmarc_error_report();
    };

    let mut tags = BTreeMap::new();
    for part in record.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some((key, value)) = part.split_once('=') {
            tags.insert(key.to_string(), value.to_string());
        }
    }
    tags
}

fn dmarc_error_report() -> BTreeMap<String, String> {
    BTreeMap::from([("error".to_string(), NO_DMARC_ERROR.to_string())])
}

/// 24 hexadecimal characters; long enough that a positive answer can only
/// come from a wildcard.
fn random_label() -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::rng();
    (0..24)
        .map(|_| HEX[rng.random_range(0..HEX.len())] as char)
        .collect()
}
