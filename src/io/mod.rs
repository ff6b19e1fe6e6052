//! Source-file readers used by the region splitters.
//!
//! This module provides:
//! - **The reader contract**: [`DataReader`], a sequential, seekable,
//!   record-aware view over one data file
//! - **Format selection**: [`SourceFormat`] and [`open_reader`]
//! - **Implementations**: [`SqlDumpReader`] for SQL dump files and
//!   [`LineReader`] for line-delimited formats (CSV, JSONL)
//!
//! # Notes
//! - All positions are byte offsets into the underlying file; `tell()` after a
//!   read is always a record boundary, which is what lets splitters cut
//!   regions that never bisect a record.
//! - `open_reader` trusts its `start_offset` to be a record boundary. Only an
//!   explicit [`DataReader::seek`] lands mid-record and triggers
//!   resynchronization on the next read.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

pub mod lines;
pub mod sql;

pub use lines::LineReader;
pub use sql::SqlDumpReader;

/// One complete logical record pulled from a data file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Raw bytes of the record, without surrounding whitespace or the line
    /// terminator (line formats keep no terminator; SQL statements keep their
    /// closing `;`).
    pub bytes: Vec<u8>,
    /// Number of table rows this record contributes.
    pub rows: u64,
}

/// The wire shape of a table's data files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// mydumper-style SQL dump: `;`-terminated statements, with `--` and
    /// `/* */` comments between them.
    SqlDump,
    /// Delimited text, one record per line. `has_header` marks the first
    /// line of each file as a header rather than data. Quoted fields that
    /// embed line breaks are not supported by the byte-level splitters.
    Csv {
        /// Whether the first line of each file is a header.
        has_header: bool,
    },
    /// JSON Lines: one JSON document per line.
    Jsonl,
}

impl SourceFormat {
    /// File extension conventionally carried by data files of this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::SqlDump => "sql",
            SourceFormat::Csv { .. } => "csv",
            SourceFormat::Jsonl => "jsonl",
        }
    }
}

/// Sequential, seekable reader over one source data file.
///
/// Implementations parse just enough structure to find record boundaries and
/// per-record row counts; they never interpret field values. The contract
/// shared by all implementations:
///
/// - [`read`](Self::read) returns `Ok(Some(batch))` with at least one complete
///   record, or `Ok(None)` once no further record exists. `max_bytes` is a
///   target, not a cap: reading continues past it only until the record in
///   progress is complete, and the first record of a batch is always returned
///   whole even when it alone exceeds `max_bytes`.
/// - [`tell`](Self::tell) reports the consumed position: the offset one past
///   the last byte owned by anything returned (or skipped) so far. After
///   `Ok(Some(_))` it is a record boundary. It may advance on `Ok(None)` too,
///   when trailing non-record bytes (whitespace, comments, a final partial
///   record) were consumed while looking for one.
/// - [`seek`](Self::seek) clamps to the file length and marks the stream
///   unaligned: the next `read` first discards bytes up to the following
///   record boundary. Seeking to offset 0 realigns the stream.
pub trait DataReader: Send {
    /// Reposition the stream to `offset`, clamped to the file length.
    ///
    /// Returns the clamped position. A seek to any offset other than 0
    /// leaves the stream unaligned; the next [`read`](Self::read)
    /// resynchronizes by skipping to the next record boundary before
    /// collecting records.
    ///
    /// # Errors
    /// Returns an error if the underlying file cannot be repositioned.
    fn seek(&mut self, offset: u64) -> Result<u64>;

    /// Read the next batch of complete records, stopping at the first record
    /// boundary at or past `max_bytes` consumed bytes.
    ///
    /// Returns `Ok(None)` when no further record exists in the file.
    ///
    /// # Errors
    /// Returns an error if the underlying file cannot be read.
    fn read(&mut self, max_bytes: u64) -> Result<Option<Vec<Record>>>;

    /// Current consumed position in the file.
    fn tell(&self) -> u64;
}

/// Open a reader for `path` positioned at `start_offset`.
///
/// `start_offset` is trusted to be a record boundary (0, or a boundary
/// reported by a previous reader via `tell()`, e.g. a region's offset), so
/// the first read starts collecting records immediately instead of
/// resynchronizing. Offsets past the end of the file are clamped.
///
/// # Errors
/// Returns an error if the file cannot be opened or its length queried.
pub fn open_reader(
    format: SourceFormat,
    path: &Path,
    start_offset: u64,
) -> Result<Box<dyn DataReader>> {
    let reader: Box<dyn DataReader> = match format {
        SourceFormat::SqlDump => Box::new(SqlDumpReader::open(path, start_offset)?),
        SourceFormat::Csv { has_header } => {
            Box::new(LineReader::open_csv(path, start_offset, has_header)?)
        }
        SourceFormat::Jsonl => Box::new(LineReader::open_jsonl(path, start_offset)?),
    };
    Ok(reader)
}

/// Buffered byte source shared by the reader implementations: tracks the
/// consumed position exactly and clamps seeks to the file length.
pub(crate) struct FileSource {
    inner: BufReader<File>,
    path: PathBuf,
    pos: u64,
    len: u64,
}

impl FileSource {
    pub(crate) fn open(path: &Path, offset: u64) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("stat {}", path.display()))?
            .len();
        let mut src = Self {
            inner: BufReader::new(file),
            path: path.to_path_buf(),
            pos: 0,
            len,
        };
        if offset > 0 {
            src.seek(offset)?;
        }
        Ok(src)
    }

    /// Reposition to `offset` clamped to the file length; returns the
    /// clamped position.
    pub(crate) fn seek(&mut self, offset: u64) -> Result<u64> {
        let clamped = offset.min(self.len);
        self.inner
            .seek(SeekFrom::Start(clamped))
            .with_context(|| format!("seek to {} in {}", clamped, self.path.display()))?;
        self.pos = clamped;
        Ok(clamped)
    }

    pub(crate) fn pos(&self) -> u64 {
        self.pos
    }

    /// Consume and return the next byte, or `None` at end of file.
    pub(crate) fn next_byte(&mut self) -> Result<Option<u8>> {
        let buf = self
            .inner
            .fill_buf()
            .with_context(|| format!("read {}", self.path.display()))?;
        let Some(&byte) = buf.first() else {
            return Ok(None);
        };
        self.inner.consume(1);
        self.pos += 1;
        Ok(Some(byte))
    }

    /// Return the next byte without consuming it, or `None` at end of file.
    pub(crate) fn peek_byte(&mut self) -> Result<Option<u8>> {
        let buf = self
            .inner
            .fill_buf()
            .with_context(|| format!("read {}", self.path.display()))?;
        Ok(buf.first().copied())
    }
}
