// src/constants.rs
//
// Centralized constants for fitscut to avoid hardcoded values throughout the codebase

/// FITS files are organized in fixed-size logical blocks (2880 bytes)
pub const FITS_BLOCK_SIZE: usize = 2880;

/// Every FITS header card is a fixed 80-byte ASCII record
pub const FITS_CARD_SIZE: usize = 80;

/// Number of header cards per FITS block
pub const FITS_CARDS_PER_BLOCK: usize = FITS_BLOCK_SIZE / FITS_CARD_SIZE;

/// Upper bound on header blocks scanned per HDU before the file is
/// considered malformed (a missing END card would otherwise walk the
/// whole object one block at a time)
pub const MAX_HEADER_BLOCKS: usize = 1000;

/// Default probe target: a public HST drizzled image in the STScI
/// open-data bucket. BITPIX is -32, so a 10x20 pixel section is 800 bytes.
pub const DEFAULT_PROBE_URI: &str = "s3://stpubdata/hst/public/j8pu/j8pu0y010/j8pu0y010_drc.fits";

/// Default extension (HDU) index holding the science image
pub const DEFAULT_EXTENSION_INDEX: usize = 1;

/// Default section, matching the astropy cloud-access example cutout
pub const DEFAULT_ROW_SLICE: &str = "10:20";
pub const DEFAULT_COL_SLICE: &str = "30:50";

/// Default AWS region when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// URI scheme constants
pub const SCHEME_S3: &str = "s3://";
pub const SCHEME_HTTPS: &str = "https://";
pub const SCHEME_HTTP: &str = "http://";

/// External tool used to produce pre-signed URLs (`aws s3 presign`)
pub const PRESIGN_TOOL: &str = "aws";

/// Default timeout for HTTP connection establishment (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default timeout for a single range request (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Environment Variables
// =============================================================================

/// Standard AWS region override
pub const ENV_AWS_REGION: &str = "AWS_REGION";

/// Custom S3-compatible endpoint (e.g. MinIO at http://localhost:9000)
pub const ENV_AWS_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";

/// Custom CA bundle (PEM) for TLS trust, mirrored from the AWS SDK convention
pub const ENV_AWS_CA_BUNDLE_PATH: &str = "AWS_CA_BUNDLE_PATH";

/// Override for the number of worker threads in the global runtime
pub const ENV_RT_THREADS: &str = "FITSCUT_RT_THREADS";
