//! Utilities used by the standalone host once collection has finished.
//!
//! ## Components
//!
//! - **Archive**: ZIP the copy specification, skipping missing paths
//! - **Hashing**: SHA-256 computed while files are archived
//! - **Summary**: JSON report of the collection
//!
//! ### Archiving a Copy Specification
//!
//! ```no_run
//! use pg_collector::utils::archive::archive_copy_spec;
//! use std::path::{Path, PathBuf};
//!
//! # fn example() -> anyhow::Result<()> {
//! let paths = vec![PathBuf::from("/var/lib/pgsql/data/postgresql.conf")];
//! let report = archive_copy_spec(&paths, Path::new("/tmp/out"), "db-01", "20240101-120000")?;
//! println!("Created archive: {}", report.archive_path.display());
//! # Ok(())
//! # }
//! ```

/// ZIP archive creation from a copy specification
pub mod archive;

/// Cryptographic hash calculation utilities
pub mod hash;

/// Collection summary generation and reporting
pub mod summary;
