//! Exact and fuzzy splitters: one data file in, candidate regions out.
//!
//! Both splitters walk a file front to back and emit contiguous,
//! non-overlapping spans of at least the minimum region size (except the
//! final span, which takes whatever is left). They differ in what they know:
//!
//! - [`split_exact_regions`] parses every record, so each region carries an
//!   exact row count and every boundary is a record boundary by
//!   construction.
//! - [`split_fuzzy_regions`] probes near each target offset and lets the
//!   reader resynchronize, so it touches only a few KiB per region but
//!   leaves row counts unknown.
//!
//! Candidate regions come back with `id` and `begin_row_id` unassigned;
//! [`crate::region::finalize_regions`] fills those in once all files of a
//! table have been split.

use crate::io::{SourceFormat, open_reader};
use crate::region::TableRegion;
use anyhow::Result;
use std::path::Path;

/// Default minimum region size: 256 MiB.
pub const DEFAULT_MIN_REGION_SIZE: u64 = 256 << 20;

/// Ceiling on a single read while splitting row-exact: 64 KiB.
pub const DEFAULT_READ_BLOCK_SIZE: u64 = 64 << 10;

/// Bytes read past each fuzzy target offset to find the next record
/// boundary: 4 KiB.
pub const PROBE_WINDOW: u64 = 4 << 10;

/// Split `file` into regions by parsing every record.
///
/// The file is consumed in blocks of at most
/// [`DEFAULT_READ_BLOCK_SIZE`] bytes (less when `min_region_size` is
/// smaller); after each block, the open region is closed if it has reached
/// `min_region_size`. A final short region holds the remainder, and a file
/// with no records yields no regions at all. Every region's `rows` is the
/// exact number of table rows its records contribute.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn split_exact_regions(
    db: &str,
    table: &str,
    file: &Path,
    format: SourceFormat,
    min_region_size: u64,
) -> Result<Vec<TableRegion>> {
    let mut reader = open_reader(format, file, 0)?;
    let block_size = DEFAULT_READ_BLOCK_SIZE.min(min_region_size);
    let mut regions = Vec::new();
    let mut offset = 0u64;
    let mut region_start = 0u64;
    let mut region_size = 0u64;
    let mut region_rows = 0u64;
    loop {
        let Some(records) = reader.read(block_size)? else {
            break;
        };
        let pos = reader.tell();
        region_size += pos - offset;
        offset = pos;
        for record in &records {
            region_rows += record.rows;
        }
        if region_size >= min_region_size {
            regions.push(candidate(db, table, file, region_start, region_size, Some(region_rows)));
            region_start = offset;
            region_size = 0;
            region_rows = 0;
        }
    }
    if region_size > 0 {
        regions.push(candidate(db, table, file, region_start, region_size, Some(region_rows)));
    }
    Ok(regions)
}

/// Split `file` into regions by byte probing.
///
/// From each region's start the reader seeks `min_region_size` bytes
/// forward, resynchronizes to the next record boundary within a
/// [`PROBE_WINDOW`]-sized read, and cuts there; the next region begins at
/// the cut. A seek past the end of the file clamps, so the final region
/// always ends exactly at the file length and the regions tile the whole
/// file. Row counts stay unknown (`rows: None`).
///
/// # Errors
/// Returns an error if the file cannot be opened, repositioned, or read.
pub fn split_fuzzy_regions(
    db: &str,
    table: &str,
    file: &Path,
    format: SourceFormat,
    min_region_size: u64,
) -> Result<Vec<TableRegion>> {
    let mut reader = open_reader(format, file, 0)?;
    let mut regions = Vec::new();
    let mut offset = 0u64;
    loop {
        reader.seek(offset + min_region_size)?;
        let probe = reader.read(PROBE_WINDOW)?;
        let pos = reader.tell();
        if pos > offset {
            regions.push(candidate(db, table, file, offset, pos - offset, None));
        }
        if probe.is_none() {
            break;
        }
        offset = pos;
    }
    Ok(regions)
}

fn candidate(
    db: &str,
    table: &str,
    file: &Path,
    offset: u64,
    size: u64,
    rows: Option<u64>,
) -> TableRegion {
    TableRegion {
        id: None,
        db: db.to_string(),
        table: table.to_string(),
        file: file.to_path_buf(),
        offset,
        size,
        rows,
        begin_row_id: None,
    }
}
