// tests/common/mod.rs
//
// Shared helpers: an in-memory ObjectReader and a synthetic FITS builder,
// so the cutout pipeline can be driven end-to-end without object storage.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

use fitscut::ObjectReader;

pub const BLOCK: usize = 2880;

/// Pad one header card to its fixed 80 bytes.
pub fn card(text: &str) -> Vec<u8> {
    assert!(text.len() <= 80, "card text too long: {text}");
    let mut raw = text.as_bytes().to_vec();
    raw.resize(80, b' ');
    raw
}

/// Assemble cards (END included by the caller) into padded header blocks.
pub fn header_bytes(cards: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    for c in cards {
        out.extend_from_slice(&card(c));
    }
    let padded = out.len().div_ceil(BLOCK) * BLOCK;
    out.resize(padded, b' ');
    out
}

fn int_card(keyword: &str, value: i64) -> String {
    format!("{keyword:<8}= {value:>20}")
}

/// Big-endian float32 pixel value for (row, col) in a `width`-pixel-wide
/// image: just the flat pixel index, so expected cutout bytes can be
/// recomputed independently of the range planner.
pub fn pixel_bytes(row: usize, col: usize, width: usize) -> [u8; 4] {
    ((row * width + col) as f32).to_be_bytes()
}

/// A complete two-HDU FITS object: empty primary (optionally padded with
/// commentary cards to force a multi-block header) plus one float32 IMAGE
/// extension of `width` x `height` pixels.
pub fn synthetic_image_fits(width: usize, height: usize, primary_filler_cards: usize) -> Vec<u8> {
    let mut primary = vec![
        "SIMPLE  =                    T".to_string(),
        int_card("BITPIX", 8),
        int_card("NAXIS", 0),
    ];
    for i in 0..primary_filler_cards {
        primary.push(format!("COMMENT   filler card {i}"));
    }
    primary.push("END".to_string());

    let extension = vec![
        "XTENSION= 'IMAGE   '".to_string(),
        int_card("BITPIX", -32),
        int_card("NAXIS", 2),
        int_card("NAXIS1", width as i64),
        int_card("NAXIS2", height as i64),
        int_card("PCOUNT", 0),
        int_card("GCOUNT", 1),
        "END".to_string(),
    ];

    let mut out = header_bytes(&primary);
    out.extend_from_slice(&header_bytes(&extension));

    let data_len = width * height * 4;
    let mut data = Vec::with_capacity(data_len.div_ceil(BLOCK) * BLOCK);
    for row in 0..height {
        for col in 0..width {
            data.extend_from_slice(&pixel_bytes(row, col, width));
        }
    }
    data.resize(data_len.div_ceil(BLOCK) * BLOCK, 0);
    out.extend_from_slice(&data);
    out
}

/// In-memory reader that records every range it serves.
pub struct MockReader {
    data: Vec<u8>,
    requests: Mutex<Vec<(u64, u64)>>,
}

impl MockReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<(u64, u64)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectReader for MockReader {
    async fn read_range(&self, offset: u64, length: u64) -> Result<Bytes> {
        self.requests.lock().unwrap().push((offset, length));
        let start = offset as usize;
        let end = start + length as usize;
        if end > self.data.len() {
            anyhow::bail!(
                "range {}..{} beyond object of {} bytes",
                start,
                end,
                self.data.len()
            );
        }
        Ok(Bytes::copy_from_slice(&self.data[start..end]))
    }

    fn describe(&self) -> String {
        "mock://fits".to_string()
    }
}
