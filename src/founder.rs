//! The region founder: splits a table's data files in parallel and merges
//! the results into one finalized region list.

use crate::io::SourceFormat;
use crate::region::{TableMeta, TableRegion, finalize_regions};
use crate::split::{split_exact_regions, split_fuzzy_regions};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error};

/// How files are cut into regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Parse every record while splitting. Regions carry exact row counts,
    /// and finalization allocates each region a contiguous block of global
    /// row IDs.
    RowExact,
    /// Probe for record boundaries near each size threshold. Cheap on IO,
    /// but row counts stay unknown and no row IDs are allocated.
    Fuzzy,
}

impl SplitStrategy {
    /// Whether finalization should allocate starting row IDs.
    #[must_use]
    pub fn allocates_row_ids(self) -> bool {
        matches!(self, SplitStrategy::RowExact)
    }
}

/// What happened to one data file during founding.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was split; `regions` is how many spans it contributed.
    Split { file: PathBuf, regions: usize },
    /// The file could not be split and contributed nothing.
    Skipped { file: PathBuf, error: anyhow::Error },
}

impl FileOutcome {
    /// The data file this outcome describes.
    #[must_use]
    pub fn file(&self) -> &Path {
        match self {
            FileOutcome::Split { file, .. } | FileOutcome::Skipped { file, .. } => file,
        }
    }

    /// Whether the file was skipped.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, FileOutcome::Skipped { .. })
    }
}

/// Finalized regions for one table, plus a per-file account of the run.
///
/// `regions` is always internally consistent (canonically ordered and
/// densely numbered, with contiguous row IDs in row-exact mode) even when
/// some files were skipped. Callers that treat skips as fatal should check
/// [`skipped`](Self::skipped) before using the regions.
#[derive(Debug)]
pub struct FoundRegions {
    /// Finalized regions in canonical order.
    pub regions: Vec<TableRegion>,
    /// One entry per data file, ordered by file path.
    pub outcomes: Vec<FileOutcome>,
}

impl FoundRegions {
    /// Outcomes for files that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_skipped())
    }

    /// Discard the per-file outcomes and keep the regions.
    #[must_use]
    pub fn into_regions(self) -> Vec<TableRegion> {
        self.regions
    }
}

/// Splits data files into regions on a bounded worker pool.
///
/// Each founder owns its pool, so two founders (or the same founder used
/// from different threads) never contend for each other's slots. Founding
/// one table blocks until every file's worker has finished, which is what
/// makes the returned list complete and its numbering final.
pub struct RegionFounder {
    pool: rayon::ThreadPool,
    min_region_size: u64,
}

impl RegionFounder {
    /// Create a founder with the default worker count: half the logical
    /// CPUs, and at least one.
    ///
    /// # Errors
    /// Returns an error if the worker pool cannot be built.
    pub fn new(min_region_size: u64) -> Result<Self> {
        Self::with_concurrency(min_region_size, num_cpus::get() / 2)
    }

    /// Create a founder with an explicit worker count (clamped to at
    /// least one).
    ///
    /// # Errors
    /// Returns an error if the worker pool cannot be built.
    pub fn with_concurrency(min_region_size: u64, workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("region-founder-{i}"))
            .build()
            .context("build region founder worker pool")?;
        Ok(Self {
            pool,
            min_region_size,
        })
    }

    /// Number of worker slots in this founder's pool.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// The minimum region size this founder splits against.
    #[must_use]
    pub fn min_region_size(&self) -> u64 {
        self.min_region_size
    }

    /// Split every data file of `meta` and return the table's finalized
    /// regions.
    ///
    /// Files are dispatched to the worker pool and processed at most
    /// `concurrency()` at a time. A file that fails to split is recorded as
    /// a [`FileOutcome::Skipped`] and the rest of the table proceeds; the
    /// surviving regions are finalized as if the table never had that file.
    /// The result is deterministic for fixed source files regardless of
    /// worker count or completion order.
    pub fn make_table_regions(
        &self,
        meta: &TableMeta,
        strategy: SplitStrategy,
        format: SourceFormat,
    ) -> FoundRegions {
        let collected: Mutex<Vec<TableRegion>> = Mutex::new(Vec::new());
        let file_outcomes: Mutex<Vec<FileOutcome>> = Mutex::new(Vec::new());
        let min_region_size = self.min_region_size;

        self.pool.scope(|scope| {
            for file in &meta.data_files {
                let collected = &collected;
                let file_outcomes = &file_outcomes;
                scope.spawn(move |_| {
                    debug!(
                        table = %meta.name,
                        file = %file.display(),
                        "splitting data file"
                    );
                    let split = match strategy {
                        SplitStrategy::RowExact => {
                            split_exact_regions(&meta.db, &meta.name, file, format, min_region_size)
                        }
                        SplitStrategy::Fuzzy => {
                            split_fuzzy_regions(&meta.db, &meta.name, file, format, min_region_size)
                        }
                    };
                    match split {
                        Ok(regions) => {
                            file_outcomes.lock().unwrap().push(FileOutcome::Split {
                                file: file.clone(),
                                regions: regions.len(),
                            });
                            collected.lock().unwrap().extend(regions);
                        }
                        Err(err) => {
                            error!(
                                table = %meta.name,
                                file = %file.display(),
                                error = format!("{err:#}"),
                                "skipping data file that failed to split"
                            );
                            file_outcomes.lock().unwrap().push(FileOutcome::Skipped {
                                file: file.clone(),
                                error: err,
                            });
                        }
                    }
                });
            }
        });
        // scope returns only once every spawned file task has finished

        let mut regions = collected.into_inner().unwrap();
        finalize_regions(&mut regions, strategy.allocates_row_ids());
        let mut outcomes = file_outcomes.into_inner().unwrap();
        outcomes.sort_by(|a, b| a.file().as_os_str().cmp(b.file().as_os_str()));
        debug!(
            table = %meta.name,
            regions = regions.len(),
            skipped = outcomes.iter().filter(|o| o.is_skipped()).count(),
            "table regions finalized"
        );
        FoundRegions { regions, outcomes }
    }
}
