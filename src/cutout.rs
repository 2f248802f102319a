// src/cutout.rs
//
//! Cutout pipeline: walk HDU headers by ranged reads, then fetch a 2-D
//! section of an image extension without ever touching the rest of the array.

use anyhow::{bail, Result};
use tracing::debug;

use crate::constants::{FITS_BLOCK_SIZE, MAX_HEADER_BLOCKS};
use crate::error::ProbeError;
use crate::fits::{padded_size, FitsHeader, ImageLayout, Section};
use crate::object_reader::ObjectReader;

/// One located HDU: its parsed header plus absolute data span.
#[derive(Debug, Clone)]
pub struct HduInfo {
    pub header: FitsHeader,
    /// Absolute offset of this HDU's header.
    pub header_start: u64,
    /// Absolute offset of the first data byte.
    pub data_start: u64,
    /// Unpadded data size in bytes.
    pub data_len: u64,
}

/// Read one complete header starting at `offset`, block by block until END.
/// Returns the header and its padded length in bytes.
pub async fn read_header_at(
    reader: &dyn ObjectReader,
    offset: u64,
) -> Result<(FitsHeader, u64)> {
    let block_size = FITS_BLOCK_SIZE as u64;
    let mut header = FitsHeader::new();
    let mut blocks: u64 = 0;
    loop {
        let block = reader.read_range(offset + blocks * block_size, block_size).await?;
        if block.len() != FITS_BLOCK_SIZE {
            bail!(ProbeError::Fits(format!(
                "truncated header block at offset {} ({} bytes)",
                offset + blocks * block_size,
                block.len()
            )));
        }
        blocks += 1;
        if header.ingest_block(&block)? {
            return Ok((header, blocks * block_size));
        }
        if blocks as usize >= MAX_HEADER_BLOCKS {
            bail!(ProbeError::Fits(format!(
                "no END card within {MAX_HEADER_BLOCKS} header blocks at offset {offset}"
            )));
        }
    }
}

/// Walk HDUs from the start of the file to `index` (0 = primary).
pub async fn locate_hdu(reader: &dyn ObjectReader, index: usize) -> Result<HduInfo> {
    let mut offset: u64 = 0;
    let mut current = 0usize;
    loop {
        let (header, header_len) = read_header_at(reader, offset).await?;

        if offset == 0 {
            if header.logical("SIMPLE") != Some(true) {
                bail!(ProbeError::Fits("primary header lacks SIMPLE = T".into()));
            }
        } else if header.xtension().is_none() {
            // Walking past the last HDU usually lands in data that still
            // parses as cards; a missing XTENSION is the reliable tell.
            bail!(ProbeError::Fits(format!(
                "no XTENSION card at offset {offset} — extension index {index} out of range?"
            )));
        }

        let data_start = offset + header_len;
        let data_len = header.data_size()?;
        debug!(
            "HDU {} at {}: header {} bytes, data {} bytes",
            current, offset, header_len, data_len
        );

        if current == index {
            return Ok(HduInfo { header, header_start: offset, data_start, data_len });
        }
        offset = data_start + padded_size(data_len);
        current += 1;
    }
}

/// Fetch `section` from the 2-D image extension at `ext_index`, returning the
/// raw bytes (big-endian, as stored) concatenated in row order. Ranges are
/// fetched strictly sequentially.
pub async fn fetch_section(
    reader: &dyn ObjectReader,
    ext_index: usize,
    section: &Section,
) -> Result<Vec<u8>> {
    let hdu = locate_hdu(reader, ext_index).await?;
    let header = &hdu.header;

    let naxis = header.naxis()?;
    if naxis != 2 {
        bail!(ProbeError::Fits(format!(
            "HDU {ext_index} is not a 2-D image (NAXIS = {naxis})"
        )));
    }

    let layout = ImageLayout {
        data_start: hdu.data_start,
        width: header.naxis_n(1)?,
        height: header.naxis_n(2)?,
        bytes_per_pixel: header.bytes_per_pixel()?,
    };
    let ranges = section.byte_ranges(&layout)?;
    debug!(
        "section {} of {}: {} range request(s)",
        section,
        reader.describe(),
        ranges.len()
    );

    let mut out = Vec::with_capacity(section.byte_len(layout.bytes_per_pixel) as usize);
    for range in &ranges {
        let chunk = reader.read_range(range.offset, range.length).await?;
        if chunk.len() as u64 != range.length {
            bail!(
                "short range read from {}: got {} of {} bytes at offset {}",
                reader.describe(),
                chunk.len(),
                range.length,
                range.offset
            );
        }
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}
