//! Scan coordination: fan-out over candidates, per-candidate probing.
//!
//! The coordinator runs every candidate through a bounded worker pool
//! (semaphore + `buffer_unordered`), applies a wall-clock deadline per
//! candidate, and folds the survivors into the final result list. Probes
//! are fully independent: each owns its partial record, so a timeout or
//! failure in one never disturbs another, and dropping the scan future
//! cancels every in-flight probe at its next await point.
//!
//! Within a probe only the resolution stage can gate; every later stage
//! catches its own failure and writes the typed default into its slot.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::content;
use crate::dns::DnsProbe;
use crate::errors::{Result, ScanError};
use crate::fuzzy;
use crate::http;
use crate::ipclass;
use crate::permutation;
use crate::record::{Candidate, ContentFingerprint, ScanRecord, ServerResponse};
use crate::spf;
use crate::whois;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);
const SKIP_REASON_NO_PUBLIC_IPS: &str = "no public IPs";

/// Scan-wide options. The boolean stages are opt-in; everything defaults to
/// the cheapest useful scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum simultaneously running probes.
    pub concurrency: usize,

    /// Wall-clock budget per candidate; expired probes are dropped.
    pub timeout: Duration,

    /// Emit results in input order instead of completion order.
    pub ordered: bool,

    /// Resolve registration data (RDAP/WHOIS) per candidate.
    pub whois: bool,

    /// Fetch the target page once and score candidate content against it.
    pub content_hash: bool,

    /// Keep only candidates with at least one MX record.
    pub mx_only: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            concurrency: cpus * 2,
            timeout: DEFAULT_TIMEOUT,
            ordered: false,
            whois: false,
            content_hash: false,
            mx_only: false,
        }
    }
}

/// Permute `target` and probe every variant.
pub async fn analyze_domain(target: &str, options: &ScanOptions) -> Result<Vec<ScanRecord>> {
    if psl::domain_str(target).is_none() {
        return Err(ScanError::invalid_domain(target));
    }
    let candidates = permutation::generate_permutations(target);
    analyze_chunk(candidates, target, options).await
}

/// `analyze_domain` restricted to mail-capable variants.
pub async fn get_live_mx_domains(target: &str, options: &ScanOptions) -> Result<Vec<ScanRecord>> {
    let options = ScanOptions {
        mx_only: true,
        ..options.clone()
    };
    analyze_domain(target, &options).await
}

/// Probe an explicit candidate list. Same contract as `analyze_domain`;
/// this is also the entry point a distributed outer layer dispatches chunks
/// to.
pub async fn analyze_chunk(
    candidates: Vec<Candidate>,
    target: &str,
    options: &ScanOptions,
) -> Result<Vec<ScanRecord>> {
    // The reference fingerprint is built once, before fan-out. Failure to
    // fetch the target page disables content scoring for this run only.
    let fingerprint: Option<Arc<ContentFingerprint>> = if options.content_hash {
        content::fetch_target(target).await.ok().map(Arc::new)
    } else {
        None
    };

    let dns = DnsProbe::new();
    let concurrency = options.concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let outcomes: Vec<Option<(usize, ScanRecord)>> =
        stream::iter(candidates.into_iter().enumerate())
            .map(|(index, candidate)| {
                let dns = dns.clone();
                let semaphore = Arc::clone(&semaphore);
                let fingerprint = fingerprint.clone();
                let target = target.to_string();
                let options = options.clone();
                async move {
                    let _permit = semaphore.acquire().await.ok()?;
                    let probe = probe_candidate(
                        &dns,
                        candidate,
                        &target,
                        &options,
                        fingerprint.as_deref(),
                    );
                    // Deadline expiry and resolution failure both drop the
                    // candidate silently: fan-out is best-effort recon.
                    match timeout(options.timeout, probe).await {
                        Ok(Ok(record)) => Some((index, record)),
                        Ok(Err(_)) | Err(_) => None,
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

    Ok(finalize_results(
        outcomes.into_iter().flatten().collect(),
        target,
        options,
    ))
}

/// Apply the coordinator's result filters and ordering.
fn finalize_results(
    keyed: Vec<(usize, ScanRecord)>,
    target: &str,
    options: &ScanOptions,
) -> Vec<ScanRecord> {
    let mut keyed: Vec<(usize, ScanRecord)> = keyed
        .into_iter()
        .filter(|(_, record)| record.fqdn() != target)
        .filter(|(_, record)| !options.mx_only || !record.mx_records.is_empty())
        .collect();

    if options.ordered {
        keyed.sort_by_key(|(index, _)| *index);
    }

    keyed.into_iter().map(|(_, record)| record).collect()
}

/// Run the full stage pipeline for one candidate.
///
/// Stage order: resolution (gating), auxiliary DNS, SPF parse, IP
/// classification, HTTP fingerprint, WHOIS, content similarity, fuzzy
/// scores. Stages after the first substitute their typed default on
/// failure.
async fn probe_candidate(
    dns: &DnsProbe,
    candidate: Candidate,
    target: &str,
    options: &ScanOptions,
    fingerprint: Option<&ContentFingerprint>,
) -> Result<ScanRecord> {
    let resolution = dns
        .resolve(&candidate)
        .await
        .map_err(|_| ScanError::not_resolvable(&candidate.fqdn))?;

    let mut record = ScanRecord::new(candidate);
    record.resolvable = !resolution.ips.is_empty();
    record.ip_addresses = resolution.ips;

    let fqdn = record.fqdn().to_string();

    // Auxiliary DNS lookups are independent; run them together and let each
    // default on failure.
    let (mx, txt, ns, dmarc, wildcard) = tokio::join!(
        dns.mx(&fqdn),
        dns.txt(&fqdn),
        dns.ns(&fqdn),
        dns.dmarc(&fqdn),
        dns.wildcard(&fqdn),
    );
    record.mx_records = mx.unwrap_or_default();
    record.txt_records = txt.unwrap_or_default();
    record.nameservers = ns.unwrap_or_default();
    record.dmarc = dmarc;
    record.wildcard = wildcard;

    record.spf = spf::parse(&record.txt_records);

    let classification = ipclass::classify(&record.ip_addresses);
    record.public_ips = classification.public;
    record.internal_ips = classification.internal;
    record.ip_flags = classification.flags;

    // Never dial private or bogus space.
    record.server_response = if record.public_ips.is_empty() {
        ServerResponse::skipped(&fqdn, SKIP_REASON_NO_PUBLIC_IPS)
    } else {
        http::fingerprint(&fqdn).await
    };

    if options.whois {
        record.whois = whois::lookup(&fqdn).await.ok();
    }

    if let Some(fingerprint) = fingerprint
        && !record.public_ips.is_empty()
    {
        record.content_hash = Some(content::compare(&fqdn, fingerprint).await);
    }

    record.fuzzy = fuzzy::score(target, &fqdn);

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MxRecord;

    fn candidate(fqdn: &str) -> Candidate {
        Candidate {
            kind: "Tld".into(),
            fqdn: fqdn.into(),
            tld: fqdn.rsplit('.').next().unwrap_or("").into(),
        }
    }

    fn record(fqdn: &str, mx: bool) -> ScanRecord {
        let mut record = ScanRecord::new(candidate(fqdn));
        if mx {
            record.mx_records.push(MxRecord {
                priority: 10,
                server: format!("mail.{fqdn}"),
            });
        }
        record
    }

    #[test]
    fn defaults_track_cpu_count() {
        let options = ScanOptions::default();
        assert!(options.concurrency >= 2);
        assert_eq!(options.timeout, Duration::from_millis(15_000));
        assert!(!options.ordered && !options.whois && !options.content_hash && !options.mx_only);
    }

    #[test]
    fn target_is_always_filtered_out() {
        let keyed = vec![
            (0, record("example.com", true)),
            (1, record("examp1e.com", true)),
        ];
        let results = finalize_results(keyed, "example.com", &ScanOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].fqdn(), "examp1e.com");
    }

    #[test]
    fn mx_only_drops_mailless_candidates() {
        let options = ScanOptions {
            mx_only: true,
            ..ScanOptions::default()
        };
        let keyed = vec![
            (0, record("a-example.com", false)),
            (1, record("b-example.com", true)),
        ];
        let results = finalize_results(keyed, "example.com", &options);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].fqdn(), "b-example.com");
        assert!(results.iter().all(|r| !r.mx_records.is_empty()));
    }

    #[test]
    fn ordered_mode_restores_input_order() {
        let options = ScanOptions {
            ordered: true,
            ..ScanOptions::default()
        };
        let keyed = vec![
            (2, record("c-example.com", false)),
            (0, record("a-example.com", false)),
            (1, record("b-example.com", false)),
        ];
        let results = finalize_results(keyed, "example.com", &options);
        let fqdns: Vec<&str> = results.iter().map(|r| r.fqdn()).collect();
        assert_eq!(fqdns, vec!["a-example.com", "b-example.com", "c-example.com"]);
    }

    #[tokio::test]
    async fn empty_candidate_list_scans_to_empty() {
        let results = analyze_chunk(Vec::new(), "example.com", &ScanOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn invalid_target_is_rejected() {
        let result = analyze_domain("not a domain", &ScanOptions::default()).await;
        assert!(matches!(result, Err(ScanError::InvalidDomain { .. })));
    }

    #[tokio::test]
    async fn unresolvable_candidate_gates_the_probe() {
        // The reserved .invalid TLD can never resolve; the probe must fail
        // with the gating error rather than produce a record.
        let dns = DnsProbe::new();
        let result = probe_candidate(
            &dns,
            candidate("host.invalid"),
            "example.com",
            &ScanOptions::default(),
            None,
        )
        .await;
        assert!(matches!(result, Err(ScanError::NotResolvable { .. })));
    }
}
