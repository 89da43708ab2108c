//! Result data model for domain scans.
//!
//! Every probed candidate folds into a single `ScanRecord` with a fixed
//! schema: all fields are always present, and missing data is represented by
//! the typed empty value (empty list, null, sentinel string) rather than an
//! absent key. Stages write into dedicated slots of a pre-initialized record,
//! which pins the output schema and removes ad-hoc key-presence checks.
//!
//! These structures are designed to be both human-readable and
//! machine-parsable (JSON/CSV), and carry `JsonSchema` derives so the CLI can
//! emit a schema for downstream consumers.

use std::collections::{BTreeMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One generated variant of the target domain, as produced by the
/// permutation source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Candidate {
    /// Tag identifying the permutation strategy (e.g. "Homoglyph", "Tld",
    /// "Bitsquatting", "Keyword").
    pub kind: String,

    /// Lowercase ASCII/IDN fully-qualified domain.
    pub fqdn: String,

    /// Effective top-level domain of the variant.
    pub tld: String,
}

/// Flags raised by the IP classifier when a resolved address falls into a
/// loopback / null-route / RFC1918 bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IpFlag {
    Localhost,
    NullRoute,
    Private10,
    Private172,
    Private192,
}

/// A single MX record, in resolver order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct MxRecord {
    pub priority: u16,
    pub server: String,
}

/// Outcome of the HTTP fingerprint stage.
///
/// `Ok` carries the parsed response; `Skipped` is emitted when no public IP
/// exists to dial; any network failure collapses into `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServerResponse {
    Ok {
        hostname: String,
        status_code: String,
        server: String,
        headers: BTreeMap<String, String>,
    },
    Skipped {
        hostname: String,
        reason: String,
    },
    Error {
        hostname: String,
        reason: String,
    },
}

impl ServerResponse {
    pub fn skipped(hostname: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Skipped {
            hostname: hostname.into(),
            reason: reason.into(),
        }
    }

    pub fn error(hostname: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Error {
            hostname: hostname.into(),
            reason: reason.into(),
        }
    }
}

/// One parsed SPF mechanism token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SpfMechanism {
    Include(String),
    Ip4(String),
    Ip6(String),
    A(String),
    Mx(String),
    Unknown(String),
}

/// A categorized `include:` target from the provider catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ProviderMatch {
    /// The raw include value from the SPF record.
    pub include: String,

    /// Human-readable provider name ("Google Workspace", …). For catalog
    /// misses this is the base domain of the include target.
    pub provider: String,
}

/// Parsed SPF policy for a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SpfReport {
    pub version: String,

    pub mechanisms: Vec<SpfMechanism>,

    /// First `all` qualifier seen; defaults to "~all" when the record
    /// carries none.
    pub all_mechanism: String,

    pub includes: Vec<String>,

    /// Count of mechanisms that force a DNS lookup during SPF evaluation
    /// (include/a/mx). RFC 7208 caps this at 10; we record, not enforce.
    pub lookup_count: usize,

    pub raw_record: String,

    /// Provider descriptors grouped by catalog category; misses land under
    /// "unknown".
    pub providers: BTreeMap<String, Vec<ProviderMatch>>,
}

/// Which resolver produced a `WhoisRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationSourceKind {
    Rdap,
    Whois,
}

/// Structured registration contact extracted from RDAP jCard data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Contact {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
}

impl Contact {
    /// True when the identifying fields are all absent, which is how
    /// GDPR-era registries publish "nothing".
    pub fn is_effectively_empty(&self) -> bool {
        self.name.is_none() && self.organization.is_none() && self.address.is_none()
    }
}

/// Contact slot in a `WhoisRecord`: either structured details or one of the
/// sentinel strings used when the provider withholds data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ContactField {
    Details(Contact),
    Sentinel(String),
}

impl ContactField {
    pub const REDACTED: &'static str = "Redacted by provider";
    pub const NOT_AVAILABLE: &'static str = "Not available in WHOIS";

    pub fn redacted() -> Self {
        Self::Sentinel(Self::REDACTED.to_string())
    }

    pub fn not_available() -> Self {
        Self::Sentinel(Self::NOT_AVAILABLE.to_string())
    }

    /// Wrap a parsed contact, applying the redaction substitution when the
    /// identifying fields are all empty.
    pub fn from_contact(contact: Contact) -> Self {
        if contact.is_effectively_empty() {
            Self::redacted()
        } else {
            Self::Details(contact)
        }
    }
}

/// Registration data for a domain, from RDAP or the WHOIS fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct WhoisRecord {
    pub domain: String,

    pub source: RegistrationSourceKind,

    /// Raw response body (RDAP JSON or WHOIS text) for auditing.
    pub raw_data: String,

    pub registered: bool,

    pub registrar: Option<String>,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub updated_date: Option<String>,

    pub status: Option<Vec<String>>,
    pub nameservers: Option<Vec<String>>,

    pub registrant: Option<ContactField>,
    pub admin_contact: Option<ContactField>,
    pub tech_contact: Option<ContactField>,
    pub abuse_contact: Option<ContactField>,
}

/// Similarity breakdown for a fetched candidate page, or the marker left
/// behind when the fetch failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ContentDetails {
    Breakdown {
        jaccard: f64,
        length_ratio: f64,
        structure: f64,
    },
    Error {
        error: String,
    },
}

/// Composite content-similarity score in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ContentScore {
    pub score: u32,
    pub details: ContentDetails,
}

impl ContentScore {
    pub fn fetch_failed() -> Self {
        Self {
            score: 0,
            details: ContentDetails::Error {
                error: "fetch_failed".to_string(),
            },
        }
    }
}

/// Deterministic string-distance metrics between target and candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct FuzzyScores {
    /// Jaro distance on the full FQDNs, in `[0, 1]`.
    pub jaro_winkler: f64,

    /// Classic edit distance on the first dot-labels.
    pub levenshtein: usize,

    /// `1 - d / max(|a|, |b|)`; 1.0 for two empty labels.
    pub levenshtein_normalized: f64,

    /// Count of differing positions after padding to equal length.
    pub char_diff: usize,

    /// QWERTY-proximity score in `[0, 1]`.
    pub keyboard_proximity: f64,
}

/// Normalized target page used as the reference for content comparison.
/// Built once per scan, shared read-only across probes.
#[derive(Debug, Clone)]
pub struct ContentFingerprint {
    pub domain: String,
    pub content: String,
    pub shingles: HashSet<String>,
    pub length: usize,
}

/// Complete probe outcome for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ScanRecord {
    #[serde(flatten)]
    pub candidate: Candidate,

    /// True iff A-record resolution yielded at least one address (directly
    /// or through a CNAME not equal to the candidate's TLD).
    pub resolvable: bool,

    pub ip_addresses: Vec<String>,
    pub public_ips: Vec<String>,
    pub internal_ips: Vec<String>,
    pub ip_flags: Vec<IpFlag>,

    pub mx_records: Vec<MxRecord>,
    pub txt_records: Vec<String>,
    pub spf: Option<SpfReport>,

    /// Parsed DMARC tags, or `{"error": "No DMARC record found"}`.
    pub dmarc: BTreeMap<String, String>,

    pub nameservers: Vec<String>,
    pub wildcard: bool,

    pub server_response: ServerResponse,

    pub whois: Option<WhoisRecord>,
    pub content_hash: Option<ContentScore>,

    pub fuzzy: FuzzyScores,
}

impl ScanRecord {
    /// Pre-initialized record for a candidate: every slot starts at its
    /// typed empty value, stages overwrite what they learn.
    pub fn new(candidate: Candidate) -> Self {
        let fqdn = candidate.fqdn.clone();
        Self {
            candidate,
            resolvable: false,
            ip_addresses: Vec::new(),
            public_ips: Vec::new(),
            internal_ips: Vec::new(),
            ip_flags: Vec::new(),
            mx_records: Vec::new(),
            txt_records: Vec::new(),
            spf: None,
            dmarc: BTreeMap::new(),
            nameservers: Vec::new(),
            wildcard: false,
            server_response: ServerResponse::skipped(fqdn, "not probed"),
            whois: None,
            content_hash: None,
            fuzzy: FuzzyScores::default(),
        }
    }

    pub fn fqdn(&self) -> &str {
        &self.candidate.fqdn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_with_every_key() {
        let record = ScanRecord::new(Candidate {
            kind: "Homoglyph".into(),
            fqdn: "examp1e.com".into(),
            tld: "com".into(),
        });
        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "kind",
            "fqdn",
            "tld",
            "resolvable",
            "ip_addresses",
            "public_ips",
            "internal_ips",
            "ip_flags",
            "mx_records",
            "txt_records",
            "spf",
            "dmarc",
            "nameservers",
            "wildcard",
            "server_response",
            "whois",
            "content_hash",
            "fuzzy",
        ] {
            assert!(json.get(key).is_some(), "missing key: {key}");
        }
    }

    #[test]
    fn contact_redaction_substitution() {
        let empty = Contact {
            email: Some("abuse@example.com".into()),
            ..Default::default()
        };
        match ContactField::from_contact(empty) {
            ContactField::Sentinel(s) => assert_eq!(s, ContactField::REDACTED),
            other => panic!("expected redaction sentinel, got {other:?}"),
        }

        let named = Contact {
            name: Some("Jane Doe".into()),
            ..Default::default()
        };
        assert!(matches!(
            ContactField::from_contact(named),
            ContactField::Details(_)
        ));
    }

    #[test]
    fn sentinel_serializes_as_bare_string() {
        let json = serde_json::to_string(&ContactField::not_available()).unwrap();
        assert_eq!(json, "\"Not available in WHOIS\"");
    }

    #[test]
    fn server_response_status_tagging() {
        let json =
            serde_json::to_value(ServerResponse::skipped("a.com", "no public IPs")).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "no public IPs");
    }
}
