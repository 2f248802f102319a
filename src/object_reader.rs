// src/object_reader.rs
//
// Pluggable ranged-read abstraction over the two fetch paths.
// Supported schemes: s3:// (anonymous native path), https:// (pre-signed URL path)

use anyhow::{bail, Result};
use async_trait::async_trait;
use bytes::Bytes;

use crate::constants::{SCHEME_HTTP, SCHEME_HTTPS, SCHEME_S3};
use crate::http::{build_client, get_range, HttpClientConfig};
use crate::s3_utils::{get_object_range_async, parse_s3_uri, stat_object_size_async};

/// A minimal scheme enum so we can route URIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    S3,
    Https,
    Unknown,
}

/// Best-effort scheme inference from a URI.
pub fn infer_scheme(uri: &str) -> Scheme {
    if uri.starts_with(SCHEME_S3) {
        Scheme::S3
    } else if uri.starts_with(SCHEME_HTTPS) || uri.starts_with(SCHEME_HTTP) {
        Scheme::Https
    } else {
        Scheme::Unknown
    }
}

/// ObjectReader trait for the probe's fetch paths.
///
/// Both paths expose the same operation — read an exact byte range, fully
/// into memory — so the cutout pipeline above is identical for either, which
/// is what makes the timing comparison apples-to-apples.
#[async_trait]
pub trait ObjectReader: Send + Sync {
    /// Read exactly `length` bytes starting at `offset`.
    async fn read_range(&self, offset: u64, length: u64) -> Result<Bytes>;

    /// Redacted identity of the target, for logs and errors.
    fn describe(&self) -> String;
}

/// Native path: anonymous ranged GetObject through the AWS SDK.
pub struct S3ObjectReader {
    bucket: String,
    key: String,
}

impl S3ObjectReader {
    pub fn from_uri(uri: &str) -> Result<Self> {
        let (bucket, key) = parse_s3_uri(uri)?;
        if key.is_empty() {
            bail!("cannot read: URI has no object key");
        }
        Ok(Self { bucket, key })
    }

    /// Object size via HEAD.
    pub async fn size(&self) -> Result<u64> {
        stat_object_size_async(&self.bucket, &self.key).await
    }
}

#[async_trait]
impl ObjectReader for S3ObjectReader {
    async fn read_range(&self, offset: u64, length: u64) -> Result<Bytes> {
        get_object_range_async(&self.bucket, &self.key, offset, length).await
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

/// Pre-signed path: plain HTTPS range requests, credentials live in the URL.
pub struct HttpObjectReader {
    client: reqwest::Client,
    url: String,
}

impl HttpObjectReader {
    pub fn new(url: &str) -> Result<Self> {
        let client = build_client(&HttpClientConfig::default())?;
        Ok(Self { client, url: url.to_string() })
    }
}

#[async_trait]
impl ObjectReader for HttpObjectReader {
    async fn read_range(&self, offset: u64, length: u64) -> Result<Bytes> {
        get_range(&self.client, &self.url, offset, length).await
    }

    fn describe(&self) -> String {
        // Strip the query string: it embeds the short-lived credentials.
        self.url
            .split_once('?')
            .map(|(base, _)| base)
            .unwrap_or(&self.url)
            .to_string()
    }
}

/// Convenience factory that picks a fetch path from a URI.
pub fn reader_for_uri(uri: &str) -> Result<Box<dyn ObjectReader>> {
    match infer_scheme(uri) {
        Scheme::S3 => Ok(Box::new(S3ObjectReader::from_uri(uri)?)),
        Scheme::Https => Ok(Box::new(HttpObjectReader::new(uri)?)),
        Scheme::Unknown => {
            bail!("Unable to infer fetch path from URI: {uri}. Supported schemes: s3://, https://")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_inference_routes_both_paths() {
        assert_eq!(infer_scheme("s3://bucket/key.fits"), Scheme::S3);
        assert_eq!(infer_scheme("https://bucket.s3.amazonaws.com/key.fits?Expires=1"), Scheme::Https);
        assert_eq!(infer_scheme("file:///tmp/key.fits"), Scheme::Unknown);
    }

    #[test]
    fn describe_redacts_presigned_credentials() {
        let reader =
            HttpObjectReader::new("https://b.s3.amazonaws.com/k.fits?X-Amz-Signature=secret")
                .unwrap();
        assert_eq!(reader.describe(), "https://b.s3.amazonaws.com/k.fits");
    }

    #[test]
    fn s3_reader_requires_a_key() {
        assert!(S3ObjectReader::from_uri("s3://bucket/").is_err());
        assert!(S3ObjectReader::from_uri("s3://bucket/key.fits").is_ok());
    }
}
