//! # Ironload
//!
//! The **region-founding engine** of a parallel bulk loader. Ironload takes a
//! directory of flat data files (SQL dumps, CSV, JSONL), splits every file
//! into bounded byte spans called *regions*, and hands back a finalized,
//! deterministically ordered and numbered region list that downstream import
//! workers can process independently and resume after a crash.
//!
//! ## Key Features
//!
//! - **Deterministic identity** - the same source files always found the same
//!   regions, with the same IDs and keys, regardless of worker count
//! - **Two splitting strategies** - row-exact (parse everything, know every
//!   row count, allocate global row IDs) and fuzzy (probe for boundaries,
//!   touch a few KiB per region)
//! - **Record-safe boundaries** - regions never bisect a SQL statement or a
//!   data line
//! - **Bounded parallelism** - each founder owns a fixed-size worker pool;
//!   files split concurrently, misbehaving files are skipped and reported
//! - **Resumable imports** - region-keyed checkpoint stores (feature
//!   `checkpointing`) let a restarted load skip completed regions
//!
//! ## Quick Start
//!
//! ```
//! use ironload::*;
//! use ironload::testing::{DataDir, sequential_rows, write_sql_dump};
//!
//! # fn main() -> anyhow::Result<()> {
//! // Lay out a tiny dump directory: one table, two data files
//! let dir = DataDir::new()?;
//! let rows = sequential_rows(50, 2);
//! write_sql_dump(&dir.file_path("shop.orders.0001.sql"), "orders", &rows, 10)?;
//! write_sql_dump(&dir.file_path("shop.orders.0002.sql"), "orders", &rows, 10)?;
//!
//! // Discover tables, then split their files into regions in parallel
//! let tables = discover_tables(dir.path(), SourceFormat::SqlDump)?;
//! let founder = RegionFounder::with_concurrency(1024, 2)?;
//! let found = founder.make_table_regions(&tables[0], SplitStrategy::RowExact, SourceFormat::SqlDump);
//!
//! // Regions are canonically ordered, densely numbered, and carry
//! // contiguous global row IDs
//! assert_eq!(found.regions.len(), 2);
//! assert_eq!(found.regions[0].id, Some(0));
//! assert_eq!(found.regions[0].begin_row_id, Some(1));
//! assert_eq!(found.regions[1].begin_row_id, Some(51));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Region
//!
//! A [`TableRegion`] is one contiguous byte span `[offset, offset + size)` of
//! one data file, assigned to one table. Regions from all of a table's files
//! are sorted by `(file, offset)` and numbered `0..n`; in row-exact mode each
//! also receives a `begin_row_id` so the table's global row IDs form a single
//! gap-free sequence. A region's [`key`](TableRegion::key) is stable across
//! runs, which is what checkpointing builds on.
//!
//! ### Founding
//!
//! A [`RegionFounder`] dispatches each data file of a [`TableMeta`] to its
//! worker pool, collects the per-file spans, and finalizes them. Files that
//! fail to split are skipped; the returned [`FoundRegions`] reports a
//! per-file [`FileOutcome`] so callers can decide whether skips are fatal.
//!
//! ### Exact vs. fuzzy splitting
//!
//! [`SplitStrategy::RowExact`] parses every record through a
//! [`DataReader`], so boundaries are exact and row counts known.
//! [`SplitStrategy::Fuzzy`] seeks ahead and lets the reader resynchronize to
//! the next record boundary, reading only a probe window per region; row
//! counts stay unknown and no row IDs are allocated.
//!
//! ### Checkpoints
//!
//! A [`checkpoint::CheckpointStore`] records completed region keys per
//! table. Because founding is deterministic, a fresh run over the same files
//! reproduces the same keys and can skip whatever the store already holds.
//!
//! ## Feature Flags
//!
//! - `checkpointing` *(default)* - the [`checkpoint`] module and its file
//!   and in-memory stores
//!
//! ## Architecture
//!
//! A load built on ironload follows one flow:
//! 1. [`discover_tables`] scans the dump directory and groups data files by
//!    table
//! 2. [`RegionFounder::make_table_regions`] splits each table's files on the
//!    worker pool and finalizes the merged list
//! 3. Import workers read each region through [`open_reader`] at the
//!    region's offset and load its records
//! 4. After each region, the importer marks its key complete in a
//!    checkpoint store; on restart, completed keys are skipped
//!
//! ## Module Overview
//!
//! - [`region`] - region and table types, canonical ordering, finalization
//! - [`split`] - exact and fuzzy single-file splitters
//! - [`founder`] - the parallel founder and its per-file outcomes
//! - [`io`] - format readers (SQL dump, CSV, JSONL) behind [`DataReader`]
//! - [`discover`] - dump-directory scanning
//! - [`checkpoint`] - resumable-import stores (feature `checkpointing`)
//! - [`testing`] - fixtures for tests of loaders built on this crate

pub mod discover;
pub mod founder;
pub mod io;
pub mod region;
pub mod split;
pub mod testing;

#[cfg(feature = "checkpointing")]
pub mod checkpoint;

// General re-exports
pub use discover::discover_tables;
pub use founder::{FileOutcome, FoundRegions, RegionFounder, SplitStrategy};
pub use io::{DataReader, Record, SourceFormat, open_reader};
pub use region::{TableMeta, TableRegion, finalize_regions, sort_regions};
pub use split::{
    DEFAULT_MIN_REGION_SIZE, DEFAULT_READ_BLOCK_SIZE, PROBE_WINDOW, split_exact_regions,
    split_fuzzy_regions,
};

// Gated re-exports
#[cfg(feature = "checkpointing")]
pub use checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
