use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::PluginOptions;

/// Command-line arguments for pg-collector.
///
/// PostgreSQL options given here override the ones loaded from the
/// `--config` file, which in turn override the built-in defaults.
#[derive(Parser, Debug)]
#[clap(name = "pg-collector", about = "PostgreSQL diagnostic data collector")]
pub struct Args {
    /// PostgreSQL server home directory
    #[clap(long)]
    pub pghome: Option<String>,

    /// Username for pg_dump
    #[clap(long)]
    pub username: Option<String>,

    /// Password for pg_dump (password visible in process listings)
    #[clap(long)]
    pub password: Option<String>,

    /// Database name to dump for pg_dump
    #[clap(long)]
    pub dbname: Option<String>,

    /// Database hostname/IP (do not use unix socket)
    #[clap(long)]
    pub dbhost: Option<String>,

    /// Database server port number
    #[clap(long)]
    pub dbport: Option<u16>,

    /// Path to plugin options YAML file
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Archive output directory (default: %TEMP%/pg-collector or /tmp/pg-collector)
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Directory in which the dump staging directory is created
    #[clap(long)]
    pub staging_root: Option<PathBuf>,

    /// Only list the collected paths instead of archiving them
    #[clap(long)]
    pub skip_archive: bool,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

impl Args {
    /// Apply the PostgreSQL options given on the command line.
    pub fn apply_overrides(&self, options: &mut PluginOptions) {
        if let Some(pghome) = &self.pghome {
            options.pghome = pghome.clone();
        }
        if let Some(username) = &self.username {
            options.username = username.clone();
        }
        if let Some(password) = &self.password {
            options.password = Some(password.clone());
        }
        if let Some(dbname) = &self.dbname {
            options.dbname = dbname.clone();
        }
        if let Some(dbhost) = &self.dbhost {
            options.dbhost = dbhost.clone();
        }
        if let Some(dbport) = self.dbport {
            options.dbport = dbport;
        }
    }
}

/// Available subcommands for the collector.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a default plugin options file
    InitConfig {
        /// Path to output options file
        #[clap(default_value = "pg-collector.yaml")]
        path: PathBuf,
    },
}
