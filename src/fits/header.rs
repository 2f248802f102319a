// src/fits/header.rs
//
//! FITS header cards and HDU size arithmetic.
//!
//! A header is a sequence of 2880-byte blocks, each holding 36 fixed 80-byte
//! ASCII cards, terminated by an `END` card. Only the value types the probe
//! needs are parsed: logicals, integers, and quoted strings.

use crate::constants::{FITS_BLOCK_SIZE, FITS_CARD_SIZE};
use crate::error::ProbeError;

/// A parsed header card value.
#[derive(Debug, Clone, PartialEq)]
pub enum CardValue {
    Logical(bool),
    Integer(i64),
    Str(String),
    /// Anything else (reals, complex, malformed); kept verbatim.
    Other(String),
}

/// One keyword card. Commentary cards (COMMENT, HISTORY, blank) are skipped
/// at ingest and never stored.
#[derive(Debug, Clone)]
pub struct Card {
    pub keyword: String,
    pub value: Option<CardValue>,
}

/// Accumulates cards block by block until `END`.
#[derive(Debug, Clone, Default)]
pub struct FitsHeader {
    cards: Vec<Card>,
}

impl FitsHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one 2880-byte header block. Returns `true` once the `END`
    /// card has been seen; cards after `END` within the block are padding.
    pub fn ingest_block(&mut self, block: &[u8]) -> Result<bool, ProbeError> {
        if block.len() != FITS_BLOCK_SIZE {
            return Err(ProbeError::Fits(format!(
                "header block is {} bytes, expected {}",
                block.len(),
                FITS_BLOCK_SIZE
            )));
        }
        for raw in block.chunks(FITS_CARD_SIZE) {
            match parse_card(raw)? {
                ParsedCard::End => return Ok(true),
                ParsedCard::Commentary => {}
                ParsedCard::Keyword(card) => self.cards.push(card),
            }
        }
        Ok(false)
    }

    pub fn value(&self, keyword: &str) -> Option<&CardValue> {
        self.cards
            .iter()
            .find(|c| c.keyword == keyword)
            .and_then(|c| c.value.as_ref())
    }

    pub fn integer(&self, keyword: &str) -> Option<i64> {
        match self.value(keyword) {
            Some(CardValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn logical(&self, keyword: &str) -> Option<bool> {
        match self.value(keyword) {
            Some(CardValue::Logical(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn string(&self, keyword: &str) -> Option<&str> {
        match self.value(keyword) {
            Some(CardValue::Str(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    fn required_integer(&self, keyword: &str) -> Result<i64, ProbeError> {
        self.integer(keyword)
            .ok_or_else(|| ProbeError::Fits(format!("missing or non-integer {keyword} card")))
    }

    /// True for a primary HDU header (starts with SIMPLE rather than XTENSION).
    pub fn is_primary(&self) -> bool {
        self.logical("SIMPLE").is_some()
    }

    pub fn xtension(&self) -> Option<&str> {
        self.string("XTENSION")
    }

    pub fn bitpix(&self) -> Result<i64, ProbeError> {
        let v = self.required_integer("BITPIX")?;
        match v {
            8 | 16 | 32 | 64 | -32 | -64 => Ok(v),
            other => Err(ProbeError::Fits(format!("invalid BITPIX {other}"))),
        }
    }

    /// Bytes per pixel, from BITPIX (e.g. -32 → 4).
    pub fn bytes_per_pixel(&self) -> Result<u64, ProbeError> {
        Ok(self.bitpix()?.unsigned_abs() / 8)
    }

    pub fn naxis(&self) -> Result<usize, ProbeError> {
        let v = self.required_integer("NAXIS")?;
        if !(0..=999).contains(&v) {
            return Err(ProbeError::Fits(format!("invalid NAXIS {v}")));
        }
        Ok(v as usize)
    }

    /// Length of axis `n` (1-based, NAXIS1 is the fastest-varying axis).
    pub fn naxis_n(&self, n: usize) -> Result<u64, ProbeError> {
        let v = self.required_integer(&format!("NAXIS{n}"))?;
        u64::try_from(v).map_err(|_| ProbeError::Fits(format!("negative NAXIS{n} {v}")))
    }

    /// PCOUNT defaults to 0 when absent (primary HDUs omit it).
    pub fn pcount(&self) -> u64 {
        self.integer("PCOUNT").and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
    }

    /// GCOUNT defaults to 1 when absent.
    pub fn gcount(&self) -> u64 {
        self.integer("GCOUNT").and_then(|v| u64::try_from(v).ok()).unwrap_or(1)
    }

    /// Unpadded data size in bytes: |BITPIX|/8 × GCOUNT × (PCOUNT + Π NAXISᵢ).
    /// Zero when NAXIS = 0.
    pub fn data_size(&self) -> Result<u64, ProbeError> {
        let naxis = self.naxis()?;
        if naxis == 0 {
            return Ok(0);
        }
        let mut pixels: u64 = 1;
        for n in 1..=naxis {
            pixels = pixels
                .checked_mul(self.naxis_n(n)?)
                .ok_or_else(|| ProbeError::Fits("axis product overflow".into()))?;
        }
        let bpp = self.bytes_per_pixel()?;
        self.pcount()
            .checked_add(pixels)
            .and_then(|elems| elems.checked_mul(self.gcount()))
            .and_then(|elems| elems.checked_mul(bpp))
            .ok_or_else(|| ProbeError::Fits("data size overflow".into()))
    }
}

/// Round a data size up to the next 2880-byte block boundary.
pub fn padded_size(len: u64) -> u64 {
    len.div_ceil(FITS_BLOCK_SIZE as u64) * FITS_BLOCK_SIZE as u64
}

enum ParsedCard {
    End,
    Commentary,
    Keyword(Card),
}

fn parse_card(raw: &[u8]) -> Result<ParsedCard, ProbeError> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| ProbeError::Fits("non-ASCII header card".into()))?;
    let keyword = text[..8.min(text.len())].trim().to_string();

    if keyword == "END" {
        return Ok(ParsedCard::End);
    }
    // Commentary cards and anything without the "= " value indicator.
    if keyword.is_empty() || text.len() < 10 || &text[8..10] != "= " {
        return Ok(ParsedCard::Commentary);
    }

    let value = parse_value(&text[10..]);
    Ok(ParsedCard::Keyword(Card { keyword, value }))
}

/// Parse the value field of a card, stripping the `/ comment` part
/// (quote-aware: a slash inside a quoted string is not a comment).
fn parse_value(field: &str) -> Option<CardValue> {
    let mut in_quote = false;
    let mut value_end = field.len();
    for (i, ch) in field.char_indices() {
        match ch {
            '\'' => in_quote = !in_quote,
            '/' if !in_quote => {
                value_end = i;
                break;
            }
            _ => {}
        }
    }
    let value = field[..value_end].trim();
    if value.is_empty() {
        return None;
    }

    if let Some(inner) = value.strip_prefix('\'') {
        // Quoted string; '' is an escaped quote. Trailing blanks are padding.
        let mut out = String::new();
        let mut chars = inner.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '\'' {
                if chars.peek() == Some(&'\'') {
                    out.push('\'');
                    chars.next();
                } else {
                    break;
                }
            } else {
                out.push(ch);
            }
        }
        return Some(CardValue::Str(out.trim_end().to_string()));
    }

    match value {
        "T" => Some(CardValue::Logical(true)),
        "F" => Some(CardValue::Logical(false)),
        _ => match value.parse::<i64>() {
            Ok(n) => Some(CardValue::Integer(n)),
            Err(_) => Some(CardValue::Other(value.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(text: &str) -> Vec<u8> {
        let mut raw = text.as_bytes().to_vec();
        raw.resize(80, b' ');
        raw
    }

    fn block(cards: &[&str]) -> Vec<u8> {
        let mut out = Vec::with_capacity(FITS_BLOCK_SIZE);
        for c in cards {
            out.extend_from_slice(&card(c));
        }
        out.resize(FITS_BLOCK_SIZE, b' ');
        out
    }

    fn header(cards: &[&str]) -> FitsHeader {
        let mut h = FitsHeader::new();
        let done = h.ingest_block(&block(cards)).unwrap();
        assert!(done, "test header must contain END");
        h
    }

    #[test]
    fn parses_logical_integer_and_string_values() {
        let h = header(&[
            "SIMPLE  =                    T / conforms to FITS standard",
            "BITPIX  =                  -32",
            "NAXIS   =                    2",
            "NAXIS1  =                 4096",
            "NAXIS2  =                 2048",
            "ORIGIN  = 'STScI/MAST'         / institution",
            "END",
        ]);
        assert_eq!(h.logical("SIMPLE"), Some(true));
        assert_eq!(h.integer("BITPIX"), Some(-32));
        assert_eq!(h.string("ORIGIN"), Some("STScI/MAST"));
        assert_eq!(h.naxis_n(1).unwrap(), 4096);
    }

    #[test]
    fn quoted_string_may_contain_slash_and_escaped_quote() {
        let h = header(&[
            "SIMPLE  =                    T",
            "BITPIX  =                    8",
            "NAXIS   =                    0",
            "TARGET  = 'NGC/1365 o''clock'  / slash is not a comment here",
            "END",
        ]);
        assert_eq!(h.string("TARGET"), Some("NGC/1365 o'clock"));
    }

    #[test]
    fn commentary_cards_are_skipped() {
        let h = header(&[
            "SIMPLE  =                    T",
            "BITPIX  =                    8",
            "NAXIS   =                    0",
            "COMMENT   FITS (Flexible Image Transport System) format",
            "HISTORY   processed",
            "END",
        ]);
        assert!(h.value("COMMENT").is_none());
        assert_eq!(h.naxis().unwrap(), 0);
    }

    #[test]
    fn end_card_terminates_ingest() {
        let mut h = FitsHeader::new();
        let done = h
            .ingest_block(&block(&["SIMPLE  =                    T", "END"]))
            .unwrap();
        assert!(done);

        let mut h2 = FitsHeader::new();
        let not_done = h2
            .ingest_block(&block(&["SIMPLE  =                    T"]))
            .unwrap();
        assert!(!not_done);
    }

    #[test]
    fn data_size_for_image_extension() {
        // float32 image, 4096x2048: 4 * (0 + 4096*2048) * 1
        let h = header(&[
            "XTENSION= 'IMAGE   '",
            "BITPIX  =                  -32",
            "NAXIS   =                    2",
            "NAXIS1  =                 4096",
            "NAXIS2  =                 2048",
            "PCOUNT  =                    0",
            "GCOUNT  =                    1",
            "END",
        ]);
        assert_eq!(h.data_size().unwrap(), 4 * 4096 * 2048);
        assert_eq!(h.bytes_per_pixel().unwrap(), 4);
        assert_eq!(h.xtension(), Some("IMAGE"));
        assert!(!h.is_primary());
    }

    #[test]
    fn data_size_zero_when_no_axes() {
        let h = header(&[
            "SIMPLE  =                    T",
            "BITPIX  =                    8",
            "NAXIS   =                    0",
            "END",
        ]);
        assert_eq!(h.data_size().unwrap(), 0);
    }

    #[test]
    fn padded_size_rounds_to_block_boundary() {
        assert_eq!(padded_size(0), 0);
        assert_eq!(padded_size(1), 2880);
        assert_eq!(padded_size(2880), 2880);
        assert_eq!(padded_size(2881), 5760);
    }

    #[test]
    fn rejects_bad_bitpix() {
        let h = header(&[
            "SIMPLE  =                    T",
            "BITPIX  =                   12",
            "NAXIS   =                    0",
            "END",
        ]);
        assert!(h.bitpix().is_err());
    }

    #[test]
    fn rejects_short_block() {
        let mut h = FitsHeader::new();
        assert!(h.ingest_block(&[b' '; 100]).is_err());
    }
}
