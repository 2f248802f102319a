// src/probe.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! The two-path cutout probe: presign, fetch the same section via the native
//! s3:// path and via the pre-signed HTTPS URL, time both, compare the bytes.

use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::info;

use crate::cutout::fetch_section;
use crate::fits::Section;
use crate::object_reader::reader_for_uri;
use crate::presign::presign_get;
use crate::s3_client::run_on_global_rt;

/// What to probe. `Default` reproduces the original diagnostic run.
#[derive(Debug, Clone)]
pub struct ProbeSpec {
    pub s3_uri: String,
    pub ext_index: usize,
    pub section: Section,
}

impl Default for ProbeSpec {
    fn default() -> Self {
        use crate::constants::{
            DEFAULT_COL_SLICE, DEFAULT_EXTENSION_INDEX, DEFAULT_PROBE_URI, DEFAULT_ROW_SLICE,
        };
        Self {
            s3_uri: DEFAULT_PROBE_URI.to_string(),
            ext_index: DEFAULT_EXTENSION_INDEX,
            section: Section::new(
                DEFAULT_ROW_SLICE.parse().expect("default row slice"),
                DEFAULT_COL_SLICE.parse().expect("default col slice"),
            ),
        }
    }
}

/// One timed fetch: the cutout bytes and the wall-clock elapsed time,
/// measured on a monotonic clock so the duration is non-negative by
/// construction.
#[derive(Debug, Clone)]
pub struct FetchSample {
    pub bytes: Vec<u8>,
    pub elapsed: Duration,
}

/// Outcome of comparing the two cutouts. The original script never checked;
/// the probe does, because "both paths return the same data" is the whole
/// premise of the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoutComparison {
    Identical,
    LengthMismatch { native: usize, presigned: usize },
    ContentMismatch,
}

/// Full probe result.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub presigned_url: String,
    pub native: FetchSample,
    pub presigned: FetchSample,
    pub comparison: CutoutComparison,
}

/// Fetch one cutout through whichever path `uri` routes to, timing the whole
/// operation including reader construction.
pub async fn fetch_cutout_timed(
    uri: &str,
    ext_index: usize,
    section: &Section,
) -> Result<FetchSample> {
    let start = Instant::now();
    let reader = reader_for_uri(uri)?;
    let bytes = fetch_section(reader.as_ref(), ext_index, section).await?;
    let elapsed = start.elapsed();
    info!(
        "fetched {} bytes from {} in {:.6}s",
        bytes.len(),
        reader.describe(),
        elapsed.as_secs_f64()
    );
    Ok(FetchSample { bytes, elapsed })
}

/// Blocking wrapper for non-async callers (the CLI).
pub fn fetch_cutout_timed_blocking(
    uri: &str,
    ext_index: usize,
    section: &Section,
) -> Result<FetchSample> {
    let uri = uri.to_string();
    let section = *section;
    run_on_global_rt(async move { fetch_cutout_timed(&uri, ext_index, &section).await })
}

pub fn compare_cutouts(native: &[u8], presigned: &[u8]) -> CutoutComparison {
    if native.len() != presigned.len() {
        CutoutComparison::LengthMismatch { native: native.len(), presigned: presigned.len() }
    } else if native != presigned {
        CutoutComparison::ContentMismatch
    } else {
        CutoutComparison::Identical
    }
}

/// Run the whole probe: presign, fetch both paths sequentially, compare.
pub async fn run_cutout_probe_async(spec: &ProbeSpec) -> Result<ProbeReport> {
    // Presign first, as the original did — the clock on the signed URL starts
    // ticking before either fetch.
    let uri = spec.s3_uri.clone();
    let presigned_url = task::spawn_blocking(move || presign_get(&uri))
        .await
        .context("presign task panicked")??;

    let native = fetch_cutout_timed(&spec.s3_uri, spec.ext_index, &spec.section).await?;
    let presigned = fetch_cutout_timed(&presigned_url, spec.ext_index, &spec.section).await?;
    let comparison = compare_cutouts(&native.bytes, &presigned.bytes);

    Ok(ProbeReport { presigned_url, native, presigned, comparison })
}

/// Blocking wrapper over [`run_cutout_probe_async`].
pub fn run_cutout_probe(spec: &ProbeSpec) -> Result<ProbeReport> {
    let spec = spec.clone();
    run_on_global_rt(async move { run_cutout_probe_async(&spec).await })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_matches_the_documented_fixture() {
        let spec = ProbeSpec::default();
        assert_eq!(spec.ext_index, 1);
        assert_eq!(spec.section.label(), "10x20");
        assert!(spec.s3_uri.ends_with("j8pu0y010_drc.fits"));
        // 4 bytes/pixel for the BITPIX=-32 fixture
        assert_eq!(spec.section.byte_len(4), 800);
    }

    #[test]
    fn comparison_distinguishes_the_three_outcomes() {
        assert_eq!(compare_cutouts(b"abcd", b"abcd"), CutoutComparison::Identical);
        assert_eq!(
            compare_cutouts(b"abcd", b"abc"),
            CutoutComparison::LengthMismatch { native: 4, presigned: 3 }
        );
        assert_eq!(compare_cutouts(b"abcd", b"abce"), CutoutComparison::ContentMismatch);
    }
}
