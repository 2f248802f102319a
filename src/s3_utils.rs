//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// src/s3_utils.rs
//! S3 URI parsing and ranged GET helpers on top of the global anonymous client.

use anyhow::{bail, Context, Result};
use bytes::Bytes;

use crate::s3_client::anonymous_s3_client_async;

// -----------------------------------------------------------------------------
//  URI helpers ----------------------------------------------------------------
// -----------------------------------------------------------------------------

/// Split `s3://bucket/key` → (`bucket`, `key`).
pub fn parse_s3_uri(uri: &str) -> Result<(String, String)> {
    let trimmed = uri
        .strip_prefix("s3://")
        .context("URI must start with s3://")?;
    let (bucket, key) = trimmed
        .split_once('/')
        .context("URI must contain a '/' after bucket")?;
    if bucket.is_empty() {
        bail!("URI has an empty bucket name");
    }
    Ok((bucket.to_owned(), key.to_owned()))
}

// ----------------------------
// Get operations
// ----------------------------

/// Download an exact byte range of an object into memory.
/// `length` must be non-zero; the Range header end is inclusive.
pub async fn get_object_range_async(
    bucket: &str,
    key: &str,
    offset: u64,
    length: u64,
) -> Result<Bytes> {
    if length == 0 {
        bail!("zero-length range request for s3://{}/{}", bucket, key);
    }
    let client = anonymous_s3_client_async().await?;
    let range = format!("bytes={}-{}", offset, offset + length - 1);
    let resp = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .range(range.clone())
        .send()
        .await
        .with_context(|| format!("ranged get_object failed for s3://{}/{} ({})", bucket, key, range))?;
    let data = resp
        .body
        .collect()
        .await
        .context("collect body failed")?
        .into_bytes();
    Ok(data)
}

/// Object size via HEAD, used for sanity checks before walking HDUs.
pub async fn stat_object_size_async(bucket: &str, key: &str) -> Result<u64> {
    let client = anonymous_s3_client_async().await?;
    let resp = client
        .head_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .with_context(|| format!("head_object failed for s3://{}/{}", bucket, key))?;
    let len = resp
        .content_length()
        .context("head_object returned no content length")?;
    u64::try_from(len).context("negative content length")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_bucket_and_key() {
        let (bucket, key) =
            parse_s3_uri("s3://stpubdata/hst/public/j8pu/j8pu0y010/j8pu0y010_drc.fits").unwrap();
        assert_eq!(bucket, "stpubdata");
        assert_eq!(key, "hst/public/j8pu/j8pu0y010/j8pu0y010_drc.fits");
    }

    #[test]
    fn parse_rejects_other_schemes() {
        assert!(parse_s3_uri("https://bucket/key").is_err());
        assert!(parse_s3_uri("bucket/key").is_err());
    }

    #[test]
    fn parse_rejects_missing_key_separator() {
        assert!(parse_s3_uri("s3://bucket-only").is_err());
        assert!(parse_s3_uri("s3:///key").is_err());
    }
}
