//! Registration data resolution: RDAP first, port-43 WHOIS as fallback.
//!
//! Both resolvers implement a uniform async trait so the strategy (and the
//! tests) can compose them without caring which protocol answered. RDAP is
//! preferred for its structured JSON and contact data; the WHOIS text path
//! covers TLDs with no RDAP service and registries whose RDAP endpoints are
//! flaky under fan-out.

pub mod rdap;
pub mod servers;

use async_trait::async_trait;

use crate::errors::Result;
use crate::record::WhoisRecord;
use crate::whois::servers::AVAILABILITY_MARKERS;

/// Uniform interface over the two registration-data protocols.
#[async_trait]
pub trait RegistrationSource: Send + Sync {
    async fn lookup(&self, fqdn: &str) -> Result<WhoisRecord>;
}

/// RDAP resolver (IANA bootstrap + per-TLD service).
pub struct RdapSource;

#[async_trait]
impl RegistrationSource for RdapSource {
    async fn lookup(&self, fqdn: &str) -> Result<WhoisRecord> {
        rdap::lookup(fqdn).await
    }
}

/// Classic WHOIS resolver over TCP 43.
pub struct WhoisSource;

#[async_trait]
impl RegistrationSource for WhoisSource {
    async fn lookup(&self, fqdn: &str) -> Result<WhoisRecord> {
        servers::lookup(fqdn).await
    }
}

/// Resolve registration data for a domain: attempt RDAP, fall back to WHOIS
/// on any RDAP error. The lookup fails only when both paths fail, in which
/// case the WHOIS error is surfaced.
pub async fn lookup(fqdn: &str) -> Result<WhoisRecord> {
    match RdapSource.lookup(fqdn).await {
        Ok(record) => Ok(record),
        Err(_) => WhoisSource.lookup(fqdn).await,
    }
}

/// Best-effort registration check.
///
/// A domain counts as unregistered when its status values or the error
/// message carry one of the well-known availability phrases; a successful
/// lookup without them counts as registered. Errors that are not
/// availability answers are surfaced to the caller.
pub async fn is_registered(fqdn: &str) -> Result<bool> {
    match lookup(fqdn).await {
        Ok(record) => {
            let status_says_available = record
                .status
                .as_deref()
                .unwrap_or_default()
                .iter()
                .any(|status| contains_availability_marker(status));
            if status_says_available {
                return Ok(false);
            }
            Ok(record.registered)
        }
        Err(error) => {
            if contains_availability_marker(&error.to_string()) {
                return Ok(false);
            }
            Err(error)
        }
    }
}

fn contains_availability_marker(text: &str) -> bool {
    let lowered = text.to_lowercase();
    AVAILABILITY_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScanError;
    use crate::record::{ContactField, RegistrationSourceKind};

    fn record_with_status(status: Option<Vec<String>>, registered: bool) -> WhoisRecord {
        WhoisRecord {
            domain: "example.com".into(),
            source: RegistrationSourceKind::Whois,
            raw_data: String::new(),
            registered,
            registrar: None,
            creation_date: None,
            expiration_date: None,
            updated_date: None,
            status,
            nameservers: None,
            registrant: Some(ContactField::not_available()),
            admin_contact: Some(ContactField::not_available()),
            tech_contact: Some(ContactField::not_available()),
            abuse_contact: Some(ContactField::not_available()),
        }
    }

    #[test]
    fn availability_markers_match_case_insensitively() {
        assert!(contains_availability_marker("Status: AVAILABLE"));
        assert!(contains_availability_marker("No Match for domain"));
        assert!(contains_availability_marker("Domain not found in RDAP"));
        assert!(!contains_availability_marker("clientTransferProhibited"));
    }

    #[test]
    fn status_values_can_mark_availability() {
        let record = record_with_status(Some(vec!["AVAILABLE".into()]), true);
        assert!(
            record
                .status
                .as_deref()
                .unwrap()
                .iter()
                .any(|s| contains_availability_marker(s))
        );
    }

    #[tokio::test]
    async fn not_found_error_means_unregistered() {
        // Mirror the decision logic on a synthetic error, no network needed.
        let error = ScanError::rdap("nosuch.example", "Domain not found in RDAP");
        assert!(contains_availability_marker(&error.to_string()));
    }

    #[test]
    fn registered_record_with_clean_status_counts_as_registered() {
        let record = record_with_status(Some(vec!["clientDeleteProhibited".into()]), true);
        assert!(record.registered);
        assert!(
            !record
                .status
                .as_deref()
                .unwrap()
                .iter()
                .any(|s| contains_availability_marker(s))
        );
    }
}
