//! Testing utilities for loaders built on ironload.
//!
//! This module provides fixtures for exercising discovery, splitting, and
//! founding against real files:
//!
//! - **[`DataDir`]**: a self-deleting temporary dump directory
//! - **File writers**: [`write_sql_dump`], [`write_csv`], [`write_jsonl`]
//! - **Row generators**: [`sequential_rows`] for deterministic payloads with
//!   easily verified sums
//!
//! # Quick Start
//!
//! ```
//! use ironload::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = DataDir::new()?;
//! write_sql_dump(
//!     &dir.file_path("shop.orders.sql"),
//!     "orders",
//!     &sequential_rows(100, 3),
//!     10,
//! )?;
//! // dir.path() now discovers as one table with one data file
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::*;
