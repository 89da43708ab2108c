//! SPF record parsing and provider categorization.
//!
//! Finds the `v=spf1` record among a candidate's TXT records, tokenizes its
//! mechanisms, tallies the RFC 7208 lookup budget (recorded, not enforced)
//! and categorizes `include:` targets against the static provider catalog.

use std::collections::BTreeMap;

use crate::providers;
use crate::record::{ProviderMatch, SpfMechanism, SpfReport};

const ALL_QUALIFIERS: [&str; 4] = ["~all", "-all", "?all", "+all"];
const DEFAULT_ALL: &str = "~all";

/// Parse the first SPF record out of a TXT record set.
///
/// Returns `None` when no record starts with `v=spf1` — the probe pipeline
/// stores that as a null report, not a failure.
pub fn parse(txt_records: &[String]) -> Option<SpfReport> {
    let raw = txt_records
        .iter()
        .find(|record| record.starts_with("v=spf1"))?;

    let mut mechanisms = Vec::new();
    let mut includes = Vec::new();
    let mut all_mechanism: Option<String> = None;

    for token in raw.split(' ').skip(1) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if ALL_QUALIFIERS.contains(&token) {
            if all_mechanism.is_none() {
                all_mechanism = Some(token.to_string());
            }
            continue;
        }

        let mechanism = if let Some(rest) = token.strip_prefix("include:") {
            includes.push(rest.to_string());
            SpfMechanism::Include(rest.to_string())
        } else if let Some(rest) = token.strip_prefix("ip4:") {
            SpfMechanism::Ip4(rest.to_string())
        } else if let Some(rest) = token.strip_prefix("ip6:") {
            SpfMechanism::Ip6(rest.to_string())
        } else if let Some(rest) = token.strip_prefix("a:") {
            SpfMechanism::A(rest.to_string())
        } else if let Some(rest) = token.strip_prefix("mx:") {
            SpfMechanism::Mx(rest.to_string())
        } else {
            SpfMechanism::Unknown(token.to_string())
        };
        mechanisms.push(mechanism);
    }

    let lookup_count = mechanisms
        .iter()
        .filter(|m| {
            matches!(
                m,
                SpfMechanism::Include(_) | SpfMechanism::A(_) | SpfMechanism::Mx(_)
            )
        })
        .count();

    let providers = categorize_includes(&includes);

    Some(SpfReport {
        version: "spf1".to_string(),
        mechanisms,
        all_mechanism: all_mechanism.unwrap_or_else(|| DEFAULT_ALL.to_string()),
        includes,
        lookup_count,
        raw_record: raw.clone(),
        providers,
    })
}

/// Group include targets by catalog category. The catalog is keyed by base
/// domain (last two dot-labels, leading underscore label stripped); misses
/// land under the "unknown" category with the base domain as the name.
fn categorize_includes(includes: &[String]) -> BTreeMap<String, Vec<ProviderMatch>> {
    let mut grouped: BTreeMap<String, Vec<ProviderMatch>> = BTreeMap::new();

    for include in includes {
        let base = base_domain(include);
        let (category, provider_name) = match providers::lookup(&base) {
            Some(provider) => (provider.category.to_string(), provider.name.to_string()),
            None => (providers::CATEGORY_UNKNOWN.to_string(), base.clone()),
        };
        grouped.entry(category).or_default().push(ProviderMatch {
            include: include.clone(),
            provider: provider_name,
        });
    }

    grouped
}

fn base_domain(include: &str) -> String {
    let trimmed = include.trim_start_matches('_');
    let labels: Vec<&str> = trimmed.split('.').collect();
    if labels.len() <= 2 {
        trimmed.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_record() {
        let txt = vec![
            "some unrelated record".to_string(),
            "v=spf1 include:_spf.google.com include:mail.example.com ip4:1.2.3.4 -all".to_string(),
        ];
        let report = parse(&txt).expect("SPF record present");

        assert_eq!(report.version, "spf1");
        assert_eq!(report.lookup_count, 2);
        assert_eq!(report.all_mechanism, "-all");
        assert_eq!(report.includes, vec!["_spf.google.com", "mail.example.com"]);
        assert_eq!(report.mechanisms.len(), 3);

        let workspaces = report
            .providers
            .get("Email Workspaces")
            .expect("google categorized");
        assert_eq!(workspaces[0].provider, "Google Workspace");
        assert_eq!(workspaces[0].include, "_spf.google.com");

        let unknown = report.providers.get("unknown").expect("miss categorized");
        assert_eq!(unknown[0].provider, "example.com");
    }

    #[test]
    fn missing_record_is_none() {
        assert!(parse(&["v=DMARC1; p=none".to_string()]).is_none());
        assert!(parse(&[]).is_none());
    }

    #[test]
    fn all_mechanism_defaults_to_softfail() {
        let report = parse(&["v=spf1 ip4:9.9.9.9".to_string()]).unwrap();
        assert_eq!(report.all_mechanism, "~all");
        assert_eq!(report.lookup_count, 0);
    }

    #[test]
    fn first_all_qualifier_wins() {
        let report = parse(&["v=spf1 ?all -all".to_string()]).unwrap();
        assert_eq!(report.all_mechanism, "?all");
        // Qualifiers do not become mechanism entries.
        assert!(report.mechanisms.is_empty());
    }

    #[test]
    fn bare_a_and_mx_are_unknown_tokens() {
        let report = parse(&["v=spf1 a mx include:x.y -all".to_string()]).unwrap();
        assert_eq!(report.lookup_count, 1);
        assert!(
            report
                .mechanisms
                .iter()
                .filter(|m| matches!(m, SpfMechanism::Unknown(_)))
                .count()
                == 2
        );
    }

    #[test]
    fn base_domain_strips_underscore_and_labels() {
        assert_eq!(base_domain("_spf.google.com"), "google.com");
        assert_eq!(base_domain("mailgun.org"), "mailgun.org");
        assert_eq!(base_domain("a.b.c.d"), "c.d");
    }
}
