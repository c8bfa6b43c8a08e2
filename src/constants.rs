//! Global constants for the pg-collector application.
//!
//! Option defaults, fixed file names and alert texts live here so the
//! plugin, the CLI and the tests agree on them.

// Option names recognised by the PostgreSQL plugin
pub const OPT_PGHOME: &str = "pghome";
pub const OPT_USERNAME: &str = "username";
pub const OPT_PASSWORD: &str = "password";
pub const OPT_DBNAME: &str = "dbname";
pub const OPT_DBHOST: &str = "dbhost";
pub const OPT_DBPORT: &str = "dbport";

// Option defaults
/// Default PostgreSQL server home directory
pub const DEFAULT_PGHOME: &str = "/var/lib/pgsql";

/// Default role used by pg_dump
pub const DEFAULT_USERNAME: &str = "postgres";

/// Default PostgreSQL server port
pub const DEFAULT_DBPORT: u16 = 5432;

// Dump constants
/// External dump program
pub const PG_DUMP_PROGRAM: &str = "pg_dump";

/// Environment variable carrying the libpq password
pub const PGPASSWORD_ENV: &str = "PGPASSWORD";

/// File name of the dump archive inside the staging directory
pub const DUMP_FILE_NAME: &str = "sos_pgdump.tar";

/// Prefix for the per-run staging directory
pub const STAGING_DIR_PREFIX: &str = "pg-collector-";

// Discovery patterns
pub const LOG_FILE_PATTERN: &str = "*.log";
pub const CONF_FILE_PATTERN: &str = "*.conf";

/// Files under `<pghome>/data` that are always registered
pub const FIXED_DATA_FILES: [&str; 2] = ["PG_VERSION", "postmaster.opts"];

// Alert texts
pub const ALERT_DBNAME_MISSING: &str = "dbname must be supplied to dump a database.";
pub const ALERT_PASSWORD_MISSING: &str = "password must be supplied to dump a database.";

// Archive constants
/// Directory name used under the system temp dir when no output is given
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "pg-collector";

/// Name of the JSON summary written next to the archive
pub const SUMMARY_FILE_NAME: &str = "collection_summary.json";

/// Extensions of files that are stored without compression
pub const COMPRESSED_EXTENSIONS: &[&str] = &["gz", "bz2", "xz", "zst", "lz4", "zip"];

/// Buffer size for hashing and archive copies (1MB)
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Files up to this size are read into memory before they are archived;
/// larger ones are spooled to a temporary file (16MB)
pub const SPOOL_MEMORY_LIMIT: usize = 16 * 1024 * 1024;
