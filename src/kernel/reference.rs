//! Parser for published voxel S-value tables.
//!
//! ```text
//! Y-90 - 3.00 mm - Soft Tissue - ...
//! i	j	k	S-value (mGy/(MBq s))
//! 0	0	0	1.23E+00
//! 0	0	1	4.56E-01
//! ```
//!
//! The header fields are separated by `" - "`. Records start on the third
//! line and are tab-separated; text after the S-value is ignored.

use std::path::Path;

use ndarray::Array3;

use super::{Tissue, VoxelKernelTable};
use crate::error::{Error, Result};
use crate::types::{Index3, SValuef64};
use units::mm;

/// Read the table in `path`, which is Latin-1 encoded
pub fn read(path: &Path) -> Result<VoxelKernelTable> {
    let bytes = std::fs::read(path)?;
    parse(&latin1(&bytes), path)
}

fn latin1(bytes: &[u8]) -> String { bytes.iter().map(|&b| b as char).collect() }

/// Parse the contents of a reference table; `path` is only used in error messages
pub fn parse(text: &str, path: &Path) -> Result<VoxelKernelTable> {
    let err = |line: usize, message: String| Error::parse(path, line, message);
    let mut lines = text.lines();

    let header = lines.next().ok_or_else(|| err(1, "empty file".into()))?;
    let fields: Vec<_> = header.split(" - ").collect();
    if fields.len() < 3 {
        return Err(err(1, format!("expected `nuclide - voxel size - tissue` header, found `{header}`")))
    }
    let size = voxel_size_mm(fields[1]).ok_or_else(|| err(1, format!("no voxel size in `{}`", fields[1])))?;
    let tissue_word = fields[2].split_whitespace().next().unwrap_or("");
    let tissue: Tissue = tissue_word.parse().map_err(|e: Error| err(1, e.to_string()))?;

    let mut records = vec![];
    for (n, line) in lines.enumerate().skip(1) {
        let line_number = n + 2;
        if line.trim().is_empty() { continue }
        records.push(parse_record(line).map_err(|m| err(line_number, m))?);
    }
    if records.is_empty() {
        return Err(err(1, "no S-value records".into()))
    }

    let mut shape = [0; 3];
    for (index, _) in &records {
        for axis in 0..3 { shape[axis] = shape[axis].max(index[axis] + 1); }
    }
    let mut svalues = Array3::zeros(shape);
    for (index, s) in records {
        svalues[index] = s;
    }
    log::debug!("{}: {tissue} at {size} mm, extent {shape:?}", path.display());
    Ok(VoxelKernelTable::new(mm(size), tissue, None, svalues, None))
}

/// Extract the number embedded in a token like `3.00 mm` or `Voxel2.21mm`
fn voxel_size_mm(token: &str) -> Option<f64> {
    let digits: String = token.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    digits.parse().ok()
}

fn parse_record(line: &str) -> std::result::Result<(Index3, SValuef64), String> {
    let fields: Vec<_> = line.split('\t').collect();
    if fields.len() < 4 {
        return Err(format!("expected 4 tab-separated fields, found {}", fields.len()))
    }
    let offset = |i: usize| fields[i].trim().parse::<usize>()
        .map_err(|e| format!("bad offset `{}`: {e}", fields[i].trim()));
    let index = [offset(0)?, offset(1)?, offset(2)?];
    let s = fields[3].split_whitespace().next().unwrap_or("");
    let s = s.parse().map_err(|e| format!("bad S-value `{s}`: {e}"))?;
    Ok((index, s))
}
