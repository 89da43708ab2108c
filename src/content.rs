//! Content similarity between the target site and a candidate.
//!
//! The target page is fetched once per scan and reduced to a normalized
//! fingerprint (lowercased, scripts/styles/comments removed, volatile
//! attributes stripped, URLs blanked, whitespace collapsed) plus a set of
//! character shingles. Candidates are fetched the same way and compared on
//! three axes: shingle Jaccard overlap, length ratio, and tag-structure
//! similarity, combined into a 0–100 composite.
//!
//! Fetching is HTTPS-first with an HTTP fallback, follows a handful of
//! redirects and skips certificate verification — squatted sites routinely
//! serve broken or borrowed certificates, and we want the page anyway.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, ScanError};
use crate::record::{ContentDetails, ContentFingerprint, ContentScore};

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REDIRECTS: usize = 5;
const SHINGLE_SIZE: usize = 5;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Structural tags counted for the structure axis. Both pages missing a tag
/// counts as perfect agreement for that tag.
const STRUCTURE_TAGS: [&str; 20] = [
    "html", "head", "body", "title", "div", "span", "p", "a", "img", "form", "input", "button",
    "table", "ul", "ol", "li", "h1", "h2", "h3", "iframe",
];

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(true)
        .user_agent(USER_AGENT)
        .build()
        .expect("reqwest client construction cannot fail with static options")
});

static RE_SCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").unwrap());
static RE_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").unwrap());
static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static RE_ATTRS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s+(?:id|class|style|onclick|onload|data-[a-z0-9-]*)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .unwrap()
});
static RE_URLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(href|src|action)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Fetch a page body, trying HTTPS before HTTP. Only 2xx responses count.
async fn fetch(domain: &str) -> anyhow::Result<String> {
    let mut last_error = anyhow!("no scheme attempted for {domain}");

    for scheme in ["https", "http"] {
        let url = format!("{scheme}://{domain}");
        match HTTP_CLIENT.get(&url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => return Ok(body),
                Err(e) => last_error = anyhow!("body read failed for {url}: {e}"),
            },
            Ok(response) => {
                last_error = anyhow!("{url} returned status {}", response.status());
            }
            Err(e) => last_error = anyhow!("request to {url} failed: {e}"),
        }
    }

    Err(last_error)
}

/// Reduce raw HTML to its comparable skeleton.
pub fn normalize(html: &str) -> String {
    let lowered = html.to_lowercase();
    let stripped = RE_SCRIPT.replace_all(&lowered, " ");
    let stripped = RE_STYLE.replace_all(&stripped, " ");
    let stripped = RE_COMMENT.replace_all(&stripped, " ");
    let stripped = RE_ATTRS.replace_all(&stripped, "");
    let stripped = RE_URLS.replace_all(&stripped, "${1}=\"\"");
    let collapsed = RE_WHITESPACE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Character shingles of fixed width; incomplete trailing windows are
/// discarded.
pub fn shingles(normalized: &str) -> HashSet<String> {
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() < SHINGLE_SIZE {
        return HashSet::new();
    }
    chars
        .windows(SHINGLE_SIZE)
        .map(|window| window.iter().collect())
        .collect()
}

/// Build the reference fingerprint for the scan target.
pub async fn fetch_target(domain: &str) -> Result<ContentFingerprint> {
    let body = fetch(domain)
        .await
        .map_err(|e| ScanError::content_fetch(domain, e.to_string()))?;
    let content = normalize(&body);
    let shingles = shingles(&content);
    let length = content.chars().count();

    Ok(ContentFingerprint {
        domain: domain.to_string(),
        content,
        shingles,
        length,
    })
}

/// Fetch a candidate and score it against the target fingerprint. Fetch
/// failures are an answer, not an error: they yield the zero score with the
/// `fetch_failed` marker.
pub async fn compare(domain: &str, fingerprint: &ContentFingerprint) -> ContentScore {
    match fetch(domain).await {
        Ok(body) => score_content(fingerprint, &body),
        Err(_) => ContentScore::fetch_failed(),
    }
}

/// Score normalized candidate HTML against the target fingerprint.
pub fn score_content(fingerprint: &ContentFingerprint, candidate_html: &str) -> ContentScore {
    let candidate = normalize(candidate_html);
    let candidate_shingles = shingles(&candidate);
    let candidate_length = candidate.chars().count();

    let jaccard = jaccard_percent(&fingerprint.shingles, &candidate_shingles);
    let length_ratio = length_ratio_percent(fingerprint.length, candidate_length);
    let structure = structure_percent(&fingerprint.content, &candidate);

    let score = (0.6 * jaccard + 0.2 * length_ratio + 0.2 * structure).round() as u32;

    ContentScore {
        score,
        details: ContentDetails::Breakdown {
            jaccard,
            length_ratio,
            structure,
        },
    }
}

fn jaccard_percent(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64 * 100.0
}

fn length_ratio_percent(a: usize, b: usize) -> f64 {
    if a == 0 || b == 0 {
        return 0.0;
    }
    a.min(b) as f64 / a.max(b) as f64 * 100.0
}

/// Per-tag agreement of `<tag` occurrence counts, averaged over the fixed
/// tag list.
fn structure_percent(a: &str, b: &str) -> f64 {
    let mut total = 0.0;
    for tag in STRUCTURE_TAGS {
        let open = format!("<{tag}");
        let count_a = a.matches(&open).count();
        let count_b = b.matches(&open).count();
        total += if count_a == 0 && count_b == 0 {
            1.0
        } else {
            count_a.min(count_b) as f64 / count_a.max(count_b) as f64
        };
    }
    total / STRUCTURE_TAGS.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint_of(html: &str) -> ContentFingerprint {
        let content = normalize(html);
        let shingles = shingles(&content);
        let length = content.chars().count();
        ContentFingerprint {
            domain: "example.com".to_string(),
            content,
            shingles,
            length,
        }
    }

    #[test]
    fn normalization_strips_noise() {
        let html = r#"<HTML><head><script type="text/javascript">alert(1)</script>
            <style>body { color: red }</style></head>
            <!-- tracking pixel -->
            <body id="main" class="page" data-user="42">
            <a href="https://example.com/login" onclick="steal()">Log in</a>
            </body></HTML>"#;
        let normalized = normalize(html);

        assert!(!normalized.contains("alert"));
        assert!(!normalized.contains("color: red"));
        assert!(!normalized.contains("tracking"));
        assert!(!normalized.contains("example.com/login"));
        assert!(!normalized.contains("class="));
        assert!(normalized.contains(r#"href="""#));
        assert!(normalized.contains("log in"));
        // Lowercased and whitespace-collapsed.
        assert!(normalized.starts_with("<html>"));
        assert!(!normalized.contains("\n"));
    }

    #[test]
    fn shingle_window_discards_incomplete_tail() {
        assert!(shingles("abcd").is_empty());
        let set = shingles("abcdef");
        assert_eq!(set.len(), 2);
        assert!(set.contains("abcde"));
        assert!(set.contains("bcdef"));
    }

    #[test]
    fn identical_documents_score_100() {
        let html = "<html><body><p>Welcome to our bank</p></body></html>";
        let fp = fingerprint_of(html);
        let score = score_content(&fp, html);
        assert_eq!(score.score, 100);
        match score.details {
            ContentDetails::Breakdown { jaccard, .. } => assert_eq!(jaccard, 100.0),
            _ => panic!("expected breakdown"),
        }
    }

    #[test]
    fn disjoint_documents_have_zero_jaccard() {
        let fp = fingerprint_of("<p>aaaaaaaaaa</p>");
        let score = score_content(&fp, "<p>zzzzzzzzzz</p>");
        match score.details {
            ContentDetails::Breakdown { jaccard, .. } => {
                // The tag markup itself still overlaps; compare the raw sets.
                let a = shingles("aaaaaaaaaa");
                let b = shingles("zzzzzzzzzz");
                assert_eq!(jaccard_percent(&a, &b), 0.0);
                assert!(jaccard < 100.0);
            }
            _ => panic!("expected breakdown"),
        }
    }

    #[test]
    fn empty_sets_yield_zero_jaccard() {
        assert_eq!(jaccard_percent(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn length_ratio_handles_zero() {
        assert_eq!(length_ratio_percent(0, 100), 0.0);
        assert_eq!(length_ratio_percent(50, 100), 50.0);
        assert_eq!(length_ratio_percent(100, 100), 100.0);
    }

    #[test]
    fn structure_rewards_matching_tag_counts() {
        let same = structure_percent("<div><div><p>", "<div><div><p>");
        let differing = structure_percent("<div><div><p>", "<table><li>");
        assert_eq!(same, 100.0);
        assert!(differing < same);
    }

    #[test]
    fn composite_score_is_bounded() {
        let fp = fingerprint_of("<html><body><h1>Store</h1><p>Buy things</p></body></html>");
        for candidate in [
            "<html><body><h1>Store</h1><p>Buy things</p></body></html>",
            "<html><body><h1>Other</h1></body></html>",
            "",
        ] {
            let score = score_content(&fp, candidate);
            assert!(score.score <= 100, "score {} out of range", score.score);
        }
    }

    #[test]
    fn fetch_failed_marker() {
        let score = ContentScore::fetch_failed();
        assert_eq!(score.score, 0);
        assert!(matches!(score.details, ContentDetails::Error { ref error } if error == "fetch_failed"));
    }
}
