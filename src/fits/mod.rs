// src/fits/mod.rs
//
// Minimal FITS structure support: enough header parsing to locate an image
// extension and turn a 2-D section into byte ranges. Data values are never
// decoded, only sliced as raw bytes.

pub mod header;
pub mod section;

pub use header::{padded_size, CardValue, FitsHeader};
pub use section::{AxisRange, ByteRange, ImageLayout, Section};
