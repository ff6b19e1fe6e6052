//! Pre-built dump directories and data files for common testing scenarios.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary dump directory that is automatically deleted when dropped.
///
/// Data files written under it with the `write_*` helpers follow the
/// `{db}.{table}.{ext}` naming convention, so the directory can be fed
/// straight to [`crate::discover::discover_tables`].
pub struct DataDir {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl DataDir {
    /// Create a new temporary dump directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    /// Get the path to the directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a file path within this directory.
    ///
    /// # Example
    ///
    /// ```
    /// use ironload::testing::DataDir;
    ///
    /// let dir = DataDir::new().unwrap();
    /// let path = dir.file_path("shop.orders.sql");
    /// assert!(path.starts_with(dir.path()));
    /// ```
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }
}

impl Default for DataDir {
    fn default() -> Self {
        Self::new().expect("Failed to create temporary dump directory")
    }
}

/// Write a mydumper-style SQL dump file.
///
/// The file opens with a session directive (comment plus stray terminator,
/// as real dumps do) followed by `INSERT INTO ... VALUES ...;` statements,
/// each holding at most `rows_per_statement` row tuples.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
///
/// # Example
///
/// ```
/// use ironload::testing::{DataDir, write_sql_dump};
///
/// let dir = DataDir::new().unwrap();
/// let path = dir.file_path("shop.orders.sql");
/// write_sql_dump(&path, "orders", &[vec![1, 10], vec![2, 20]], 2).unwrap();
/// assert!(path.exists());
/// ```
pub fn write_sql_dump(
    path: &Path,
    table: &str,
    rows: &[Vec<i64>],
    rows_per_statement: usize,
) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("create {}", path.display()))?;
    writeln!(file, "/*!40101 SET NAMES binary*/;")?;
    for chunk in rows.chunks(rows_per_statement.max(1)) {
        let tuples = chunk
            .iter()
            .map(|row| {
                let fields = row
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({fields})")
            })
            .collect::<Vec<_>>()
            .join(",");
        writeln!(file, "INSERT INTO `{table}` VALUES {tuples};")?;
    }
    file.flush()?;
    Ok(())
}

/// Write a CSV data file, optionally with a header line.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
///
/// # Example
///
/// ```
/// use ironload::testing::{DataDir, write_csv};
///
/// let dir = DataDir::new().unwrap();
/// let path = dir.file_path("shop.orders.csv");
/// write_csv(&path, Some(&["id", "qty"]), &[vec![1, 2], vec![2, 5]]).unwrap();
/// assert!(path.exists());
/// ```
pub fn write_csv(path: &Path, header: Option<&[&str]>, rows: &[Vec<i64>]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    if let Some(header) = header {
        writer
            .write_record(header)
            .with_context(|| format!("write header to {}", path.display()))?;
    }
    for row in rows {
        writer
            .write_record(row.iter().map(ToString::to_string))
            .with_context(|| format!("write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// Write a JSONL data file: one JSON array of numbers per line.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_jsonl(path: &Path, rows: &[Vec<i64>]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("create {}", path.display()))?;
    for row in rows {
        let line = serde_json::to_string(row)
            .with_context(|| format!("serialize row for {}", path.display()))?;
        writeln!(file, "{line}")?;
    }
    file.flush()?;
    Ok(())
}

/// Generate deterministic row data: `count` rows of `columns` columns, where
/// the first column is the 1-based row number.
///
/// The first column of `sequential_rows(n, _)` sums to `n * (n + 1) / 2`,
/// which makes post-import verification cheap.
///
/// # Example
///
/// ```
/// use ironload::testing::sequential_rows;
///
/// let rows = sequential_rows(4, 2);
/// assert_eq!(rows.len(), 4);
/// assert_eq!(rows[0], vec![1, 100]);
/// assert_eq!(rows.iter().map(|r| r[0]).sum::<i64>(), 10);
/// ```
#[must_use]
pub fn sequential_rows(count: usize, columns: usize) -> Vec<Vec<i64>> {
    (1..=count as i64)
        .map(|i| {
            (0..columns as i64)
                .map(|j| if j == 0 { i } else { i * 100 * j })
                .collect()
        })
        .collect()
}
