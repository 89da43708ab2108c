//! Minimal HTTP fingerprinting over a raw TCP connection.
//!
//! Issues a single `HEAD /` against port 80 and parses the status line and
//! headers from whatever comes back. Deliberately primitive: no TLS
//! handshake, no redirect following, no body read — the point is a cheap
//! liveness-and-banner probe, not a crawl. Every network failure collapses
//! into an error response value so the probe pipeline never propagates it.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::record::ServerResponse;

const HTTP_PORT: u16 = 80;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Fingerprint `hostname` with a `HEAD / HTTP/1.1` request.
pub async fn fingerprint(hostname: &str) -> ServerResponse {
    match probe(hostname).await {
        Ok(raw) => parse_response(hostname, &raw),
        Err(e) => ServerResponse::error(hostname, e.to_string()),
    }
}

async fn probe(hostname: &str) -> Result<String> {
    // Connect with timeout
    let mut stream = match timeout(CONNECT_TIMEOUT, TcpStream::connect((hostname, HTTP_PORT))).await
    {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return Err(anyhow!("connect error to {hostname}: {e}")),
        Err(_) => return Err(anyhow!("connect timeout to {hostname}")),
    };

    let request = format!("HEAD / HTTP/1.1\r\nHost: {hostname}\r\nConnection: close\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| anyhow!("write error to {hostname}: {e}"))?;

    let mut buf = Vec::new();
    timeout(RECV_TIMEOUT, stream.read_to_end(&mut buf))
        .await
        .map_err(|_| anyhow!("read timeout from {hostname}"))?
        .map_err(|e| anyhow!("read error from {hostname}: {e}"))?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Split the raw response into a status code and header map.
fn parse_response(hostname: &str, raw: &str) -> ServerResponse {
    let mut lines = raw.split("\r\n");

    let status_code = match lines.next().and_then(|line| line.split(' ').nth(1)) {
        Some(code) => code.to_string(),
        None => return ServerResponse::error(hostname, "malformed status line"),
    };

    let mut headers = BTreeMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(": ") {
            headers.insert(key.to_string(), value.to_string());
        }
    }

    let server = headers
        .get("Server")
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string());

    ServerResponse::Ok {
        hostname: hostname.to_string(),
        status_code,
        server,
        headers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_and_headers() {
        let raw = "HTTP/1.1 301 Moved Permanently\r\nServer: nginx/1.24.0\r\nLocation: https://example.com/\r\n\r\n";
        match parse_response("example.com", raw) {
            ServerResponse::Ok {
                hostname,
                status_code,
                server,
                headers,
            } => {
                assert_eq!(hostname, "example.com");
                assert_eq!(status_code, "301");
                assert_eq!(server, "nginx/1.24.0");
                assert_eq!(headers.get("Location").unwrap(), "https://example.com/");
            }
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[test]
    fn missing_server_header_defaults_to_unknown() {
        let raw = "HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n";
        match parse_response("a.com", raw) {
            ServerResponse::Ok { server, .. } => assert_eq!(server, "Unknown"),
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[test]
    fn empty_response_is_error() {
        assert!(matches!(
            parse_response("a.com", ""),
            ServerResponse::Error { .. }
        ));
    }

    #[tokio::test]
    async fn unreachable_host_collapses_to_error() {
        // Reserved TLD guarantees resolution failure, which must surface as
        // an error value rather than a panic or propagated error.
        let response = fingerprint("host.invalid").await;
        assert!(matches!(response, ServerResponse::Error { .. }));
    }
}
