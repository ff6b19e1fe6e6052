//! Table regions: bounded, ordered byte spans of source data files.
//!
//! A [`TableRegion`] describes one contiguous span of one data file belonging
//! to a table. Regions are produced by the splitters in [`crate::split`],
//! merged across files by [`crate::founder::RegionFounder`], and then
//! finalized here: sorted into their canonical order and assigned dense IDs
//! (plus starting row IDs when row counts are known).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A table known to the loader: its logical identity plus the data files
/// that hold its rows.
///
/// `data_files` order does not matter for correctness; finalization imposes
/// the canonical region order regardless of how the files are listed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    /// Schema (database) the table belongs to.
    pub db: String,
    /// Table name.
    pub name: String,
    /// Data files holding the table's rows.
    pub data_files: Vec<PathBuf>,
}

/// One contiguous byte span of one data file.
///
/// Freshly split regions carry `id: None` and `begin_row_id: None`; both are
/// filled in by [`finalize_regions`]. `rows` is `Some` only when the region
/// was produced by a row-exact split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRegion {
    /// Dense rank of this region within its table, assigned at finalization.
    pub id: Option<usize>,
    /// Schema the region's table belongs to.
    pub db: String,
    /// Table the region feeds.
    pub table: String,
    /// Data file this span lives in.
    pub file: PathBuf,
    /// Byte offset of the span's first byte.
    pub offset: u64,
    /// Span length in bytes.
    pub size: u64,
    /// Exact number of table rows in the span, when known.
    pub rows: Option<u64>,
    /// First global row ID owned by this region (1-based), allocated at
    /// finalization in row-exact mode.
    pub begin_row_id: Option<u64>,
}

impl TableRegion {
    /// Stable identifier of the region: `db|table|id|offset`.
    ///
    /// An unassigned ID renders as `-1`, so keys minted before finalization
    /// are recognizably provisional. After [`finalize_regions`], keys are
    /// unique within a table and stable across repeated foundings of the
    /// same source files, which is what lets checkpoint entries written by
    /// one run match regions produced by the next.
    #[must_use]
    pub fn key(&self) -> String {
        let id = self.id.map_or(-1, |id| id as i64);
        format!("{}|{}|{}|{}", self.db, self.table, id, self.offset)
    }

    /// Exclusive end offset of the span.
    #[must_use]
    pub fn end_offset(&self) -> u64 {
        self.offset + self.size
    }
}

/// Sort regions into their canonical order: by file path (as raw bytes),
/// then by span offset within the file.
///
/// This order is a pure function of the source data, independent of how
/// many workers split the files or how their results interleaved.
pub fn sort_regions(regions: &mut [TableRegion]) {
    regions.sort_unstable_by(|a, b| {
        a.file
            .as_os_str()
            .cmp(b.file.as_os_str())
            .then_with(|| a.offset.cmp(&b.offset))
    });
}

/// Sort regions canonically, then assign dense IDs and (optionally) starting
/// row IDs.
///
/// IDs always come out as `0..regions.len()` in canonical order. When
/// `allocate_row_ids` is set (row-exact splits only, since it needs `rows`
/// to be populated), each region's `begin_row_id` is one past the total row
/// count of every region before it, starting at 1, so the table's global row
/// IDs form one gap-free sequence across files. A region with no row count
/// contributes zero rows to the running total.
pub fn finalize_regions(regions: &mut [TableRegion], allocate_row_ids: bool) {
    sort_regions(regions);
    for (rank, region) in regions.iter_mut().enumerate() {
        region.id = Some(rank);
        region.begin_row_id = None;
    }
    if allocate_row_ids {
        let mut total_rows: u64 = 0;
        for region in regions.iter_mut() {
            region.begin_row_id = Some(total_rows + 1);
            total_rows += region.rows.unwrap_or(0);
        }
    }
}
