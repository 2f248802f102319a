// src/lib.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// Crate root — public re-exports for the cutout probe library.

pub mod constants;
pub mod error;

// Internal modules - these may change in future versions
pub mod s3_client;
pub mod s3_utils;
pub mod http;
pub mod presign;
pub mod fits;
pub mod object_reader;
pub mod cutout;
pub mod probe;

// ===== Re-exports expected by src/bin/cli.rs and the tests =====
pub use error::ProbeError;

pub use fits::{AxisRange, ByteRange, ImageLayout, Section};

pub use object_reader::{
    infer_scheme,
    reader_for_uri,
    HttpObjectReader,
    ObjectReader,
    S3ObjectReader,
    Scheme,
};

pub use cutout::{fetch_section, locate_hdu, read_header_at, HduInfo};

pub use presign::{presign_get, validate_presigned_url};

pub use probe::{
    compare_cutouts,
    fetch_cutout_timed,
    fetch_cutout_timed_blocking,
    run_cutout_probe,
    run_cutout_probe_async,
    CutoutComparison,
    FetchSample,
    ProbeReport,
    ProbeSpec,
};

pub use s3_client::run_on_global_rt;
pub use s3_utils::parse_s3_uri;
