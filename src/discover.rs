//! Dump-directory discovery: find a directory's data files and group them
//! into tables.
//!
//! Follows the mydumper naming convention: a data file is named
//! `{db}.{table}.{ext}`, or `{db}.{table}.{part}.{ext}` when the table was
//! dumped in parts. Schema files (`*-schema*.sql` and friends) hold DDL, not
//! rows, and are never grouped.

use crate::io::SourceFormat;
use crate::region::TableMeta;
use anyhow::{Context, Result};
use glob::glob;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Scan `dir` for data files of `format` and group them into one
/// [`TableMeta`] per table.
///
/// Tables come back sorted by `(db, name)` and each table's `data_files`
/// sorted by path, so a directory always discovers to the same plan. Files
/// that do not follow the naming convention (no `{db}.{table}` prefix, or a
/// schema-file suffix) are ignored.
///
/// # Errors
/// Returns an error if the directory cannot be globbed or an entry cannot
/// be read.
pub fn discover_tables(dir: &Path, format: SourceFormat) -> Result<Vec<TableMeta>> {
    let pattern = dir.join(format!("*.{}", format.extension()));
    let pattern = pattern.to_string_lossy().into_owned();
    let entries =
        glob(&pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut tables: BTreeMap<(String, String), Vec<PathBuf>> = BTreeMap::new();
    for entry in entries {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if !path.is_file() {
            continue;
        }
        let Some((db, table)) = parse_data_file_name(&path) else {
            debug!(file = %path.display(), "ignoring file outside the data naming convention");
            continue;
        };
        tables.entry((db, table)).or_default().push(path);
    }

    let mut out = Vec::with_capacity(tables.len());
    for ((db, name), mut data_files) in tables {
        data_files.sort();
        out.push(TableMeta {
            db,
            name,
            data_files,
        });
    }
    Ok(out)
}

/// Extract `(db, table)` from a data file name, or `None` for files outside
/// the convention (including schema files).
fn parse_data_file_name(path: &Path) -> Option<(String, String)> {
    let stem = path.file_stem()?.to_str()?;
    let mut segments = stem.splitn(3, '.');
    let db = segments.next()?;
    let table = segments.next()?;
    if db.is_empty() || table.is_empty() {
        return None;
    }
    // `{db}-schema-create.{ext}` has no table segment and falls out above;
    // `{db}.{table}-schema.{ext}` needs the explicit check
    if table.ends_with("-schema") || table.contains("-schema-") {
        return None;
    }
    Some((db.to_string(), table.to_string()))
}
