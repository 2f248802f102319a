//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! CLI for the two-path FITS cutout probe.
//!
//! With no arguments it reproduces the original diagnostic run against the
//! public HST image: presign, fetch `[10:20, 30:50]` of extension 1 via the
//! anonymous s3:// path and via the pre-signed HTTPS URL, print byte counts
//! and timings for both.
//!
//! Examples:
//! ```bash
//! fitscut-cli
//! fitscut-cli -v s3://stpubdata/hst/public/j8pu/j8pu0y010/j8pu0y010_drc.fits
//! fitscut-cli s3://bucket/image.fits --ext 1 --rows 0:64 --cols 0:64
//! ```

use anyhow::Result;
use chrono::Utc;
use clap::{ArgAction, Parser};
use std::io::{self, ErrorKind, Write};
use tracing_subscriber::EnvFilter;

use fitscut::constants::{DEFAULT_COL_SLICE, DEFAULT_EXTENSION_INDEX, DEFAULT_PROBE_URI, DEFAULT_ROW_SLICE};
use fitscut::{
    compare_cutouts, fetch_cutout_timed_blocking, presign_get, AxisRange, CutoutComparison,
    ProbeSpec, Section,
};

/// Macro to safely print with broken pipe handling
macro_rules! safe_println {
    ($($arg:tt)*) => {
        match writeln!(io::stdout(), $($arg)*) {
            Ok(_) => {},
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                // Gracefully exit on broken pipe (e.g., when piped to head/tail)
                std::process::exit(0);
            }
            Err(e) => return Err(e.into())
        }
    };
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short = 'v',
        long,
        action = ArgAction::Count,
        help = "Increase log verbosity: -v = Info, -vv = Debug",
    )]
    verbose: u8,

    /// S3 URI of the FITS object to probe.
    #[arg(default_value = DEFAULT_PROBE_URI)]
    uri: String,

    /// Extension (HDU) index holding the image.
    #[arg(short = 'e', long = "ext", default_value_t = DEFAULT_EXTENSION_INDEX)]
    ext: usize,

    /// Row slice, half-open start:stop.
    #[arg(long, default_value = DEFAULT_ROW_SLICE)]
    rows: AxisRange,

    /// Column slice, half-open start:stop.
    #[arg(long, default_value = DEFAULT_COL_SLICE)]
    cols: AxisRange,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let spec = ProbeSpec {
        s3_uri: cli.uri,
        ext_index: cli.ext,
        section: Section::new(cli.rows, cli.cols),
    };

    // Presign first: the signed URL's clock starts before either fetch.
    let presigned_url = presign_get(&spec.s3_uri)?;

    let started = Utc::now();
    safe_println!("{}.{:06}", started.timestamp(), started.timestamp_subsec_micros());
    safe_println!(
        "Fits cutout {} with s3_uri: {}",
        spec.section.label(),
        spec.s3_uri
    );
    safe_println!("--");
    let native = fetch_cutout_timed_blocking(&spec.s3_uri, spec.ext_index, &spec.section)?;
    safe_println!("Fetched cutout of length: {} bytes", native.bytes.len());
    safe_println!("Fetch in: {}", native.elapsed.as_secs_f64());

    safe_println!("Fits cutout with s3_presigned_uri: {}", presigned_url);
    safe_println!("--");
    let presigned = fetch_cutout_timed_blocking(&presigned_url, spec.ext_index, &spec.section)?;
    safe_println!("Fetched cutout of length: {} bytes", presigned.bytes.len());
    safe_println!("Fetch in: {}", presigned.elapsed.as_secs_f64());

    match compare_cutouts(&native.bytes, &presigned.bytes) {
        CutoutComparison::Identical => safe_println!("Cutouts identical: yes"),
        CutoutComparison::LengthMismatch { native, presigned } => {
            safe_println!(
                "Cutouts identical: NO (length mismatch: {} vs {} bytes)",
                native,
                presigned
            )
        }
        CutoutComparison::ContentMismatch => {
            safe_println!("Cutouts identical: NO (same length, different bytes)")
        }
    }

    Ok(())
}
