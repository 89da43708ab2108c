//! Port-43 WHOIS lookups against the per-TLD registry servers.
//!
//! The TLD → server table ships as `data/whois_servers.json` (derived from
//! the IANA registry) and is parsed once on first use. The response format
//! on port 43 is free-form text, so extraction is a set of line-oriented
//! heuristics: first line containing a field prefix wins, status tokens and
//! nameservers are collected with deduplication, and registration is
//! inferred from the well-known availability phrases.

use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::errors::{Result, ScanError};
use crate::record::{ContactField, RegistrationSourceKind, WhoisRecord};

const WHOIS_PORT: u16 = 43;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Phrases that mark a domain as unregistered in WHOIS responses.
pub const AVAILABILITY_MARKERS: [&str; 3] = ["no match", "not found", "available"];

static WHOIS_SERVERS: Lazy<HashMap<String, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/whois_servers.json"))
        .expect("bundled whois_servers.json is valid JSON")
});

/// Registry WHOIS host for a TLD, if the table knows one.
pub fn server_for_tld(tld: &str) -> Option<&'static str> {
    WHOIS_SERVERS.get(tld).map(|s| s.as_str())
}

/// Query the registry WHOIS server for `fqdn` and parse the response.
pub async fn lookup(fqdn: &str) -> Result<WhoisRecord> {
    let tld = fqdn
        .rsplit('.')
        .next()
        .unwrap_or(fqdn)
        .to_ascii_lowercase();
    let server = server_for_tld(&tld).ok_or(ScanError::NoWhoisServer { tld: tld.clone() })?;

    let raw = query(server, fqdn).await?;
    Ok(parse_response(fqdn, &raw))
}

/// Canonical WHOIS exchange: connect, send `<query>\r\n`, read to close.
async fn query(server: &str, fqdn: &str) -> Result<String> {
    let mut stream = match timeout(CONNECT_TIMEOUT, TcpStream::connect((server, WHOIS_PORT))).await
    {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return Err(ScanError::whois_query(server, fqdn, format!("connect error: {e}"))),
        Err(_) => return Err(ScanError::whois_query(server, fqdn, "connect timeout")),
    };

    let line = format!("{fqdn}\r\n");
    stream
        .write_all(line.as_bytes())
        .await
        .map_err(|e| ScanError::whois_query(server, fqdn, format!("write error: {e}")))?;

    let mut buf = Vec::new();
    match timeout(READ_TIMEOUT, stream.read_to_end(&mut buf)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => return Err(ScanError::whois_query(server, fqdn, format!("read error: {e}"))),
        // Partial data before an idle timeout is still usable.
        Err(_) if !buf.is_empty() => {}
        Err(_) => return Err(ScanError::whois_query(server, fqdn, "read timeout")),
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Line-oriented heuristic parse of a WHOIS text response.
pub fn parse_response(fqdn: &str, raw: &str) -> WhoisRecord {
    let lowered = raw.to_lowercase();
    let registered = !AVAILABILITY_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker));

    WhoisRecord {
        domain: fqdn.to_string(),
        source: RegistrationSourceKind::Whois,
        raw_data: raw.to_string(),
        registered,
        registrar: field_value(raw, "registrar"),
        creation_date: field_value(raw, "creation date"),
        expiration_date: field_value(raw, "expir"),
        updated_date: field_value(raw, "updated date"),
        status: non_empty(status_values(raw)),
        nameservers: non_empty(nameserver_values(raw)),
        registrant: Some(ContactField::not_available()),
        admin_contact: Some(ContactField::not_available()),
        tech_contact: Some(ContactField::not_available()),
        abuse_contact: Some(ContactField::not_available()),
    }
}

/// First line whose lowercased form contains `prefix`: value after the
/// first ':', trimmed. Empty values collapse to None.
fn field_value(raw: &str, prefix: &str) -> Option<String> {
    raw.lines()
        .find(|line| line.to_lowercase().contains(prefix))
        .and_then(|line| line.split_once(':'))
        .map(|(_, rest)| rest.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// All status tokens: lines containing `status:` or `domain status:`, first
/// whitespace-delimited token after the colon, deduplicated.
fn status_values(raw: &str) -> Vec<String> {
    let mut values = Vec::new();
    for line in raw.lines() {
        let lowered = line.to_lowercase();
        if !(lowered.contains("status:") || lowered.contains("domain status:")) {
            continue;
        }
        if let Some((_, rest)) = line.split_once(':')
            && let Some(token) = rest.trim().split_whitespace().next()
        {
            let token = token.to_string();
            if !values.contains(&token) {
                values.push(token);
            }
        }
    }
    values
}

/// Nameserver hosts: lines containing `name server:` or `nserver:`,
/// lowercased, deduplicated.
fn nameserver_values(raw: &str) -> Vec<String> {
    let mut values = Vec::new();
    for line in raw.lines() {
        let lowered = line.to_lowercase();
        if !(lowered.contains("name server:") || lowered.contains("nserver:")) {
            continue;
        }
        if let Some((_, rest)) = line.split_once(':') {
            let host = rest.trim().to_lowercase();
            if !host.is_empty() && !values.contains(&host) {
                values.push(host);
            }
        }
    }
    values
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() { None } else { Some(values) }
}
