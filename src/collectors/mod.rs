//! Collection plugins and the pieces they are built from.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             Plugin Host                 │
//! │   options · copy spec · alerts · logs   │
//! ├─────────────────────────────────────────┤
//! │          PostgreSQL Plugin              │
//! │  ┌─────────────┬─────────────────────┐  │
//! │  │  Dump step  │  File discovery     │  │
//! │  │  (pg_dump)  │  (*.log, *.conf)    │  │
//! │  └─────────────┴─────────────────────┘  │
//! ├─────────────────────────────────────────┤
//! │   CommandRunner    │    FileFinder      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! - **finder**: bounded recursive search with `fnmatch`-style patterns
//! - **dump**: pg_dump command construction and execution
//! - **postgresql**: the setup/postproc lifecycle tying them together

pub mod finder;
pub mod dump;
pub mod postgresql;

pub use finder::{find_files, FileFinder};
pub use dump::{CommandOutput, CommandRunner, DumpCommand, SystemCommandRunner};
pub use postgresql::{PgOptions, PostgresqlPlugin};
