// src/fits/section.rs
//
//! 2-D section (cutout) geometry: half-open row/column ranges over an image
//! HDU, planned into the minimal list of byte ranges to fetch.

use std::fmt;
use std::str::FromStr;

use crate::error::ProbeError;

/// Half-open pixel range along one axis, numpy-slice style (`10:20`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub start: u64,
    pub stop: u64,
}

impl AxisRange {
    pub fn new(start: u64, stop: u64) -> Result<Self, ProbeError> {
        if start >= stop {
            return Err(ProbeError::Section(format!(
                "empty or descending range {start}:{stop}"
            )));
        }
        Ok(Self { start, stop })
    }

    /// Pixel count; never zero, the constructor rejects empty ranges.
    pub fn len(&self) -> u64 {
        self.stop - self.start
    }
}

impl FromStr for AxisRange {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, stop) = s
            .split_once(':')
            .ok_or_else(|| ProbeError::Section(format!("expected start:stop, got {s:?}")))?;
        let start = start
            .trim()
            .parse::<u64>()
            .map_err(|_| ProbeError::Section(format!("bad range start {start:?}")))?;
        let stop = stop
            .trim()
            .parse::<u64>()
            .map_err(|_| ProbeError::Section(format!("bad range stop {stop:?}")))?;
        Self::new(start, stop)
    }
}

impl fmt::Display for AxisRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.stop)
    }
}

/// A rectangular cutout: rows index NAXIS2, columns index NAXIS1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub rows: AxisRange,
    pub cols: AxisRange,
}

impl Section {
    pub fn new(rows: AxisRange, cols: AxisRange) -> Self {
        Self { rows, cols }
    }

    /// (rows, cols) pixel counts.
    pub fn shape(&self) -> (u64, u64) {
        (self.rows.len(), self.cols.len())
    }

    /// Human label like `10x20`, as the original diagnostic printed it.
    pub fn label(&self) -> String {
        format!("{}x{}", self.rows.len(), self.cols.len())
    }

    /// Total bytes this section yields at the given pixel width.
    pub fn byte_len(&self, bytes_per_pixel: u64) -> u64 {
        self.rows.len() * self.cols.len() * bytes_per_pixel
    }

    /// Plan the byte ranges covering this section within `layout`.
    /// One range per row, with adjacent contiguous ranges coalesced — a
    /// full-width section collapses to a single request.
    pub fn byte_ranges(&self, layout: &ImageLayout) -> Result<Vec<ByteRange>, ProbeError> {
        if self.rows.stop > layout.height || self.cols.stop > layout.width {
            return Err(ProbeError::Section(format!(
                "section [{}, {}] exceeds image {}x{} (rows x cols)",
                self.rows, self.cols, layout.height, layout.width
            )));
        }

        let bpp = layout.bytes_per_pixel;
        let row_len = self.cols.len() * bpp;
        let mut ranges: Vec<ByteRange> = Vec::with_capacity(self.rows.len() as usize);
        for row in self.rows.start..self.rows.stop {
            let offset = layout.data_start + (row * layout.width + self.cols.start) * bpp;
            match ranges.last_mut() {
                Some(prev) if prev.offset + prev.length == offset => prev.length += row_len,
                _ => ranges.push(ByteRange { offset, length: row_len }),
            }
        }
        Ok(ranges)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.rows, self.cols)
    }
}

/// Where a 2-D image's pixels live inside the remote object.
#[derive(Debug, Clone, Copy)]
pub struct ImageLayout {
    /// Absolute byte offset of the first data byte of the HDU.
    pub data_start: u64,
    /// NAXIS1: pixels per row (fastest-varying axis).
    pub width: u64,
    /// NAXIS2: number of rows.
    pub height: u64,
    pub bytes_per_pixel: u64,
}

/// An absolute byte range within the remote object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: u64,
    pub length: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ImageLayout {
        ImageLayout {
            data_start: 5760,
            width: 100,
            height: 50,
            bytes_per_pixel: 4,
        }
    }

    #[test]
    fn axis_range_parses_and_rejects() {
        assert_eq!(
            "10:20".parse::<AxisRange>().unwrap(),
            AxisRange { start: 10, stop: 20 }
        );
        assert!("20:10".parse::<AxisRange>().is_err());
        assert!("7:7".parse::<AxisRange>().is_err());
        assert!("10-20".parse::<AxisRange>().is_err());
        assert!("a:b".parse::<AxisRange>().is_err());
    }

    #[test]
    fn documented_cutout_is_800_bytes() {
        // rows 10:20 x cols 30:50 at 4 bytes/pixel
        let section = Section::new(
            "10:20".parse().unwrap(),
            "30:50".parse().unwrap(),
        );
        assert_eq!(section.label(), "10x20");
        assert_eq!(section.byte_len(4), 800);
        let total: u64 = section
            .byte_ranges(&layout())
            .unwrap()
            .iter()
            .map(|r| r.length)
            .sum();
        assert_eq!(total, 800);
    }

    #[test]
    fn row_ranges_have_documented_offsets() {
        let section = Section::new("10:12".parse().unwrap(), "30:50".parse().unwrap());
        let ranges = section.byte_ranges(&layout()).unwrap();
        assert_eq!(ranges.len(), 2);
        // row 10: 5760 + (10*100 + 30)*4
        assert_eq!(ranges[0], ByteRange { offset: 5760 + 1030 * 4, length: 80 });
        // row 11 starts one full image row later
        assert_eq!(ranges[1].offset, ranges[0].offset + 100 * 4);
    }

    #[test]
    fn full_width_section_coalesces_to_one_range() {
        let section = Section::new("10:20".parse().unwrap(), "0:100".parse().unwrap());
        let ranges = section.byte_ranges(&layout()).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(
            ranges[0],
            ByteRange { offset: 5760 + 10 * 100 * 4, length: 10 * 100 * 4 }
        );
    }

    #[test]
    fn out_of_bounds_section_is_rejected() {
        let section = Section::new("45:55".parse().unwrap(), "30:50".parse().unwrap());
        assert!(matches!(
            section.byte_ranges(&layout()),
            Err(ProbeError::Section(_))
        ));
        let section = Section::new("10:20".parse().unwrap(), "90:101".parse().unwrap());
        assert!(section.byte_ranges(&layout()).is_err());
    }
}
