//! Region-level import checkpoints for resumable bulk loads.
//!
//! A load that dies halfway should not redo (or worse, double-import) the
//! regions it already finished. This module records completion per region
//! key, which is stable across runs because region identity is a pure
//! function of the source files, so a restarted import can skip straight to
//! the first incomplete region.
//!
//! # Features
//!
//! - **Pluggable backends** - [`CheckpointStore`] is the contract; pick a
//!   backend per deployment
//! - **Durable file store** - [`FileCheckpointStore`] persists one document
//!   per table, replaced atomically on every update
//! - **State verification** - SHA-256 checksums detect corrupted checkpoint
//!   documents on load
//! - **In-memory store** - [`MemoryCheckpointStore`] for tests and embedded
//!   single-process runs
//!
//! # Usage
//!
//! ```no_run
//! use ironload::checkpoint::{CheckpointStore, FileCheckpointStore};
//! use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let store = FileCheckpointStore::new("./ironload_checkpoints")?;
//! let done = store.completed("shop", "orders")?;
//! if !done.contains("shop|orders|0|0") {
//!     // ... import the region, then:
//!     store.mark_complete("shop", "orders", "shop|orders|0|0")?;
//! }
//! // once the whole table is verified:
//! store.clear("shop", "orders")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::fs::{File, create_dir_all, remove_file, rename};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Records which regions of a table have been fully imported.
///
/// Keys are region keys ([`crate::region::TableRegion::key`]). All methods
/// take the owning `db`/`table` pair explicitly so one store can serve many
/// tables at once.
pub trait CheckpointStore: Send + Sync {
    /// Region keys recorded complete for `db`.`table`. Empty when the table
    /// has never checkpointed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or its contents fail
    /// integrity verification.
    fn completed(&self, db: &str, table: &str) -> Result<BTreeSet<String>>;

    /// Record `region_key` as complete. The entry is durable (to the extent
    /// the backend offers durability) before this returns. Marking a key
    /// twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be updated.
    fn mark_complete(&self, db: &str, table: &str, region_key: &str) -> Result<()>;

    /// Forget everything recorded for `db`.`table`. Clearing a table that
    /// was never checkpointed is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be updated.
    fn clear(&self, db: &str, table: &str) -> Result<()>;
}

/// Serialized per-table checkpoint document.
#[derive(Serialize, Deserialize)]
struct TableCheckpoint {
    db: String,
    table: String,
    completed: BTreeSet<String>,
    /// SHA-256 over the identity and completed keys, verified on load.
    checksum: String,
}

impl TableCheckpoint {
    fn new(db: &str, table: &str) -> Self {
        Self {
            db: db.to_string(),
            table: table.to_string(),
            completed: BTreeSet::new(),
            checksum: String::new(),
        }
    }

    fn expected_checksum(&self) -> String {
        let mut material = format!("{}:{}", self.db, self.table);
        for key in &self.completed {
            material.push(':');
            material.push_str(key);
        }
        compute_checksum(material.as_bytes())
    }
}

/// File-backed checkpoint store: one postcard document per table.
///
/// Every update rewrites the table's document to a sibling temp file, syncs
/// it, and renames it into place, so a crash mid-write leaves the previous
/// document intact rather than a torn one.
pub struct FileCheckpointStore {
    directory: PathBuf,
    // serializes load-modify-save so concurrent markers cannot drop
    // each other's keys
    write_lock: Mutex<()>,
}

impl FileCheckpointStore {
    /// Create a store rooted at `directory`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        create_dir_all(&directory)
            .with_context(|| format!("create checkpoint directory {}", directory.display()))?;
        Ok(Self {
            directory,
            write_lock: Mutex::new(()),
        })
    }

    fn table_path(&self, db: &str, table: &str) -> PathBuf {
        self.directory.join(format!("checkpoint_{db}_{table}.bin"))
    }

    fn load(&self, db: &str, table: &str) -> Result<Option<TableCheckpoint>> {
        let path = self.table_path(db, table);
        if !path.exists() {
            return Ok(None);
        }
        let mut encoded = Vec::new();
        File::open(&path)
            .with_context(|| format!("open checkpoint {}", path.display()))?
            .read_to_end(&mut encoded)
            .with_context(|| format!("read checkpoint {}", path.display()))?;
        let document: TableCheckpoint = postcard::from_bytes(&encoded)
            .with_context(|| format!("decode checkpoint {}", path.display()))?;
        if document.expected_checksum() != document.checksum {
            return Err(anyhow!(
                "Checkpoint integrity check failed for {db}.{table}: checksum mismatch"
            ));
        }
        Ok(Some(document))
    }

    fn save(&self, document: &TableCheckpoint) -> Result<()> {
        let path = self.table_path(&document.db, &document.table);
        let encoded = postcard::to_allocvec(document).context("serialize checkpoint")?;
        let tmp = path.with_extension("bin.tmp");
        let mut file =
            File::create(&tmp).with_context(|| format!("create checkpoint {}", tmp.display()))?;
        file.write_all(&encoded)
            .with_context(|| format!("write checkpoint {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("sync checkpoint {}", tmp.display()))?;
        rename(&tmp, &path).with_context(|| format!("replace checkpoint {}", path.display()))?;
        Ok(())
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn completed(&self, db: &str, table: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .load(db, table)?
            .map(|document| document.completed)
            .unwrap_or_default())
    }

    fn mark_complete(&self, db: &str, table: &str, region_key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let mut document = self
            .load(db, table)?
            .unwrap_or_else(|| TableCheckpoint::new(db, table));
        document.completed.insert(region_key.to_string());
        document.checksum = document.expected_checksum();
        self.save(&document)
    }

    fn clear(&self, db: &str, table: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let path = self.table_path(db, table);
        if path.exists() {
            remove_file(&path).with_context(|| format!("remove checkpoint {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory checkpoint store. Completion survives only as long as the
/// process (and the store value) does.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    tables: Mutex<HashMap<(String, String), BTreeSet<String>>>,
}

impl MemoryCheckpointStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn completed(&self, db: &str, table: &str) -> Result<BTreeSet<String>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .get(&(db.to_string(), table.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn mark_complete(&self, db: &str, table: &str, region_key: &str) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables
            .entry((db.to_string(), table.to_string()))
            .or_default()
            .insert(region_key.to_string());
        Ok(())
    }

    fn clear(&self, db: &str, table: &str) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.remove(&(db.to_string(), table.to_string()));
        Ok(())
    }
}

/// Compute the SHA-256 checksum of `data` as lowercase hex.
#[must_use]
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
