// src/http/client.rs
//
// HTTP client for ranged GETs against pre-signed URLs

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::header::RANGE;
use reqwest::{ClientBuilder, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::error::ProbeError;

/// HTTP client configuration for the pre-signed fetch path
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// TCP keepalive settings
    pub tcp_keepalive: Option<Duration>,
    /// Pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            tcp_keepalive: Some(Duration::from_secs(60)),
            pool_idle_timeout: Some(Duration::from_secs(90)),
        }
    }
}

/// Build a reqwest client for S3-style endpoints.
/// AWS S3 doesn't support HTTP/2, so the client is pinned to HTTP/1.1.
pub fn build_client(config: &HttpClientConfig) -> Result<reqwest::Client> {
    let mut builder = ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .http1_only();

    if let Some(keepalive) = config.tcp_keepalive {
        builder = builder.tcp_keepalive(keepalive);
    }
    if let Some(idle_timeout) = config.pool_idle_timeout {
        builder = builder.pool_idle_timeout(idle_timeout);
    }

    builder = builder
        .tcp_nodelay(true)
        .use_rustls_tls()
        .hickory_dns(true);

    builder.build().context("Failed to build HTTP client")
}

/// GET an exact byte range from `url`. Only 206 Partial Content is accepted:
/// a 200 means the server ignored the Range header and was about to stream
/// the entire object, which defeats the point of a cutout fetch.
pub async fn get_range(
    client: &reqwest::Client,
    url: &str,
    offset: u64,
    length: u64,
) -> Result<Bytes> {
    if length == 0 {
        anyhow::bail!("zero-length range request for {}", redact_query(url));
    }
    let range = format!("bytes={}-{}", offset, offset + length - 1);
    debug!("GET {} Range: {}", redact_query(url), range);

    let resp = client
        .get(url)
        .header(RANGE, range)
        .send()
        .await
        .map_err(|e| classify_request_error(url, e))?;

    let status = resp.status();
    if status != StatusCode::PARTIAL_CONTENT {
        return Err(ProbeError::HttpStatus {
            url: redact_query(url).to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let body = resp.bytes().await.map_err(|e| classify_request_error(url, e))?;
    Ok(body)
}

/// Map a reqwest error to the typed kinds the contract distinguishes.
/// TLS trust failures get their own variant: they are environmental
/// (platform trust store) rather than a problem with the URL or the object.
fn classify_request_error(url: &str, err: reqwest::Error) -> anyhow::Error {
    let url = redact_query(url).to_string();
    if is_tls_failure(&err) {
        ProbeError::TlsHandshake { url, source: err }.into()
    } else {
        ProbeError::Http { url, source: err }.into()
    }
}

/// Walk the error chain looking for TLS / certificate evidence.
fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        let text = e.to_string().to_ascii_lowercase();
        if text.contains("tls")
            || text.contains("certificate")
            || text.contains("handshake")
            || text.contains("unknownissuer")
        {
            return true;
        }
        source = e.source();
    }
    false
}

/// Pre-signed URLs embed short-lived credentials in the query string;
/// strip it before the URL appears in errors or logs.
fn redact_query(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}
