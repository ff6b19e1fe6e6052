//! Line-delimited reader for CSV and JSONL data files.
//!
//! One line is one record is one table row. The reader works at the byte
//! level: it finds line boundaries without parsing field content, so CSV
//! files whose quoted fields embed line breaks are outside its contract.

use crate::io::{DataReader, FileSource, Record};
use anyhow::Result;
use std::path::Path;

/// Reader over a line-delimited file.
///
/// Blank (whitespace-only) lines are consumed without producing records.
/// When `has_header` is set, the first line of the file is consumed as a
/// header: part of the byte stream, zero rows. The header is recognized by
/// position (it exists only at offset 0), so a reader opened mid-file never
/// mistakes a data line for it.
pub struct LineReader {
    src: FileSource,
    has_header: bool,
    header_pending: bool,
    pending_resync: bool,
}

impl LineReader {
    /// Open a CSV file at `offset`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open_csv(path: &Path, offset: u64, has_header: bool) -> Result<Self> {
        Self::open(path, offset, has_header)
    }

    /// Open a JSONL file at `offset`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open_jsonl(path: &Path, offset: u64) -> Result<Self> {
        Self::open(path, offset, false)
    }

    fn open(path: &Path, offset: u64, has_header: bool) -> Result<Self> {
        let src = FileSource::open(path, offset)?;
        let header_pending = has_header && src.pos() == 0;
        Ok(Self {
            src,
            has_header,
            header_pending,
            pending_resync: false,
        })
    }

    /// Read one line, consuming its terminator. The returned bytes carry no
    /// terminator and no trailing `\r`. A final line that ends at EOF without
    /// a terminator is still returned; `None` means the file is exhausted.
    fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let mut saw_any = false;
        while let Some(byte) = self.src.next_byte()? {
            saw_any = true;
            if byte == b'\n' {
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Some(line));
            }
            line.push(byte);
        }
        if saw_any { Ok(Some(line)) } else { Ok(None) }
    }

    /// Discard bytes through the next line terminator (or end of file).
    fn skip_to_newline(&mut self) -> Result<()> {
        while let Some(byte) = self.src.next_byte()? {
            if byte == b'\n' {
                break;
            }
        }
        Ok(())
    }
}

impl DataReader for LineReader {
    fn seek(&mut self, offset: u64) -> Result<u64> {
        let clamped = self.src.seek(offset)?;
        self.pending_resync = clamped > 0;
        self.header_pending = self.has_header && clamped == 0;
        Ok(clamped)
    }

    fn read(&mut self, max_bytes: u64) -> Result<Option<Vec<Record>>> {
        if self.pending_resync {
            self.skip_to_newline()?;
            self.pending_resync = false;
        }
        if self.header_pending {
            // part of the byte stream, but never a record
            self.next_line()?;
            self.header_pending = false;
        }
        let start = self.src.pos();
        let mut records = Vec::new();
        loop {
            if !records.is_empty() && self.src.pos() - start >= max_bytes {
                break;
            }
            let Some(line) = self.next_line()? else {
                break;
            };
            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            records.push(Record {
                bytes: line,
                rows: 1,
            });
        }
        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(records))
        }
    }

    fn tell(&self) -> u64 {
        self.src.pos()
    }
}
