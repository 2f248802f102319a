// src/error.rs
//
//! Typed error kinds the probe contract distinguishes. Most plumbing uses
//! `anyhow::Result`; these variants travel inside the anyhow chain so callers
//! (and tests) can downcast to the specific failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The presign tool ran successfully but printed nothing. Failing here
    /// prevents issuing a range request against an empty URL.
    #[error("presign tool produced no output")]
    EmptyPresignedUrl,

    /// The presign tool could not be run or exited non-zero.
    #[error("presign tool failed: {0}")]
    PresignTool(String),

    /// The presign tool printed something that is not a pre-signed HTTPS URL.
    #[error("not a pre-signed HTTPS URL: {0}")]
    InvalidPresignedUrl(String),

    /// TLS handshake or certificate-trust failure on the HTTPS path.
    /// Reported distinctly: platform trust-store differences make this the
    /// most common environmental failure for pre-signed fetches.
    #[error("TLS handshake failed for {url}")]
    TlsHandshake {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Transport-level failure of an HTTP range request.
    #[error("range request failed for {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with 206 Partial Content. A 200 here
    /// means the Range header was ignored and the full object was coming back.
    #[error("unexpected HTTP status {status} for {url} (expected 206 Partial Content)")]
    HttpStatus { url: String, status: u16 },

    /// Structural problem in the remote FITS file.
    #[error("invalid FITS structure: {0}")]
    Fits(String),

    /// Requested section does not fit the image extension.
    #[error("section out of bounds: {0}")]
    Section(String),
}
