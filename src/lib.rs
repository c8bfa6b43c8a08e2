//! # pg-collector
//!
//! A PostgreSQL diagnostic data collector: server configuration, logs and,
//! when credentials are available, a logical dump of one database.
//!
//! ## Overview
//!
//! The collection logic is a plugin that only talks to its host through the
//! [`host::PluginHost`] trait: it reads options, registers paths for
//! archival and raises alerts, but never archives anything itself. The
//! `pg-collector` binary supplies a [`host::LocalHost`] and turns the
//! registered paths into a ZIP archive with a JSON summary.
//!
//! ## Usage
//!
//! ```no_run
//! use pg_collector::collectors::PostgresqlPlugin;
//! use pg_collector::config::PluginOptions;
//! use pg_collector::host::LocalHost;
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = PluginOptions {
//!     dbname: "mydb".to_string(),
//!     password: Some("secret".to_string()),
//!     ..Default::default()
//! };
//!
//! let mut plugin = PostgresqlPlugin::new(LocalHost::new(options));
//! plugin.setup();
//! for path in plugin.host().copy_spec() {
//!     println!("{}", path.display());
//! }
//! plugin.postproc();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and argument parsing
//! - [`collectors`]: File finder, pg_dump invocation and the plugin lifecycle
//! - [`config`]: Plugin options and their YAML representation
//! - [`host`]: Host framework capabilities
//! - [`models`]: Archive metadata records
//! - [`utils`]: Archiving, hashing and summary reporting
//! - [`privileges`]: Root check
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models and structures used throughout the application
pub mod models;

/// Collection plugins and their building blocks
pub mod collectors;

/// Host framework capabilities
pub mod host;

/// Utility functions for archiving, hashing and reporting
pub mod utils;

/// Plugin options management
pub mod config;

/// Platform-specific privilege checks
pub mod privileges;

/// Application constants and configuration values
pub mod constants;
