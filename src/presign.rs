// src/presign.rs
//
//! Pre-signed URL generation by shelling out to the AWS CLI.
//!
//! The probe deliberately uses `aws s3 presign` rather than SDK presigning:
//! the point of the comparison is the URL an operator would hand out from
//! their pre-authenticated CLI session. The tool must be installed and
//! configured; its stdout is the signed URL, whitespace-trimmed.

use anyhow::{Context, Result};
use std::process::Command;
use tracing::info;

use crate::constants::{PRESIGN_TOOL, SCHEME_HTTPS};
use crate::error::ProbeError;
use crate::s3_utils::parse_s3_uri;

/// Produce a pre-signed HTTPS URL for `uri` (an `s3://bucket/key` URI).
/// Expiry is whatever the CLI default grants; the URL is used once and
/// discarded at process exit.
pub fn presign_get(uri: &str) -> Result<String> {
    parse_s3_uri(uri).context("presign needs a full s3://bucket/key URI")?;

    let output = Command::new(PRESIGN_TOOL)
        .args(["s3", "presign", uri])
        .output()
        .with_context(|| {
            format!("failed to run `{PRESIGN_TOOL} s3 presign` (is the AWS CLI installed?)")
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ProbeError::PresignTool(stderr).into());
    }

    let url = String::from_utf8(output.stdout)
        .context("presign output was not UTF-8")?
        .trim()
        .to_string();
    validate_presigned_url(&url)?;
    info!("presigned {} ({} chars)", uri, url.len());
    Ok(url)
}

/// Syntactic validation of presign output. An empty string fails fast so no
/// request is ever attempted against an empty URL; anything without an HTTPS
/// scheme or an expiry parameter is not a pre-signed URL.
pub fn validate_presigned_url(url: &str) -> Result<(), ProbeError> {
    if url.is_empty() {
        return Err(ProbeError::EmptyPresignedUrl);
    }
    if !url.starts_with(SCHEME_HTTPS) {
        return Err(ProbeError::InvalidPresignedUrl(format!(
            "missing https:// scheme: {url}"
        )));
    }
    // Both signature versions carry an expiry in the query string.
    let has_expiry = url.contains("X-Amz-Expires=") || url.contains("Expires=");
    if !has_expiry {
        return Err(ProbeError::InvalidPresignedUrl(format!(
            "no expiry parameter in query string: {url}"
        )));
    }
    Ok(())
}
