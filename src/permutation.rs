//! Candidate generation via the `twistrs` permutation engine.
//!
//! The permutation engine is an external producer from the scanner's point
//! of view: it hands back a finite set of `{kind, fqdn, tld}` triples and
//! never touches the network. Permutations are deduplicated; a domain the
//! engine cannot parse yields an empty list rather than an error, because a
//! scan over nothing is still a valid (empty) scan.

use std::collections::HashSet;

use twistrs::filter::Permissive;
use twistrs::permutate::Domain;

use crate::record::Candidate;

/// Generate all typo/visual permutations of `domain`.
pub fn generate_permutations(domain: &str) -> Vec<Candidate> {
    let Ok(parsed) = Domain::new(domain) else {
        return Vec::new();
    };

    let permutations = parsed.all(&Permissive);

    permutations
        .collect::<HashSet<_>>()
        .iter()
        .map(|p| Candidate {
            kind: format!("{:?}", p.kind),
            fqdn: p.domain.fqdn.clone(),
            tld: p.domain.tld.clone(),
        })
        .collect()
}
