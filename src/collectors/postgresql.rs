use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use tempfile::TempDir;

use crate::collectors::dump::{CommandRunner, DumpCommand, SystemCommandRunner};
use crate::collectors::finder::find_files;
use crate::constants::{
    ALERT_DBNAME_MISSING, ALERT_PASSWORD_MISSING, CONF_FILE_PATTERN, DEFAULT_DBPORT,
    DEFAULT_PGHOME, DEFAULT_USERNAME, DUMP_FILE_NAME, FIXED_DATA_FILES, LOG_FILE_PATTERN,
    OPT_DBHOST, OPT_DBNAME, OPT_DBPORT, OPT_PASSWORD, OPT_PGHOME, OPT_USERNAME,
    PGPASSWORD_ENV, STAGING_DIR_PREFIX,
};
use crate::host::PluginHost;

/// Typed view of the plugin's options, read once from the host.
///
/// Empty strings count as "not configured" for every optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgOptions {
    pub pghome: PathBuf,
    pub username: String,
    pub password: Option<String>,
    pub dbname: Option<String>,
    pub dbhost: Option<String>,
    /// Handed to pg_dump untouched; pg_dump judges whether it is a port
    pub dbport: String,
}

impl PgOptions {
    pub fn from_host<H: PluginHost + ?Sized>(host: &H) -> Self {
        let get = |name: &str| host.get_option(name).filter(|value| !value.is_empty());

        PgOptions {
            pghome: PathBuf::from(get(OPT_PGHOME).unwrap_or_else(|| DEFAULT_PGHOME.to_string())),
            username: get(OPT_USERNAME).unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password: get(OPT_PASSWORD),
            dbname: get(OPT_DBNAME),
            dbhost: get(OPT_DBHOST),
            dbport: get(OPT_DBPORT).unwrap_or_else(|| DEFAULT_DBPORT.to_string()),
        }
    }
}

/// PostgreSQL related information: configuration, logs and an optional
/// logical dump of one database.
///
/// The plugin owns its staging directory from [`setup`](Self::setup) until
/// [`postproc`](Self::postproc). Nothing it does is fatal to the run: every
/// problem ends up as a log record plus an alert on the host.
pub struct PostgresqlPlugin<H: PluginHost> {
    host: H,
    options: PgOptions,
    runner: Box<dyn CommandRunner>,
    staging_root: Option<PathBuf>,
    staging_dir: Option<TempDir>,
}

impl<H: PluginHost> PostgresqlPlugin<H> {
    /// Create a plugin that runs pg_dump as a child process.
    pub fn new(host: H) -> Self {
        Self::with_runner(host, Box::new(SystemCommandRunner))
    }

    pub fn with_runner(host: H, runner: Box<dyn CommandRunner>) -> Self {
        let options = PgOptions::from_host(&host);
        debug!(
            "PostgreSQL plugin options: pghome={}, dbname={:?}, dbhost={:?}",
            options.pghome.display(),
            options.dbname,
            options.dbhost
        );

        PostgresqlPlugin {
            host,
            options,
            runner,
            staging_root: None,
            staging_dir: None,
        }
    }

    /// Create the staging directory under `root` instead of the system temp dir.
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn options(&self) -> &PgOptions {
        &self.options
    }

    /// The staging directory, if a dump was attempted and it still exists.
    pub fn staging_dir(&self) -> Option<&Path> {
        self.staging_dir.as_ref().map(TempDir::path)
    }

    /// Dump the configured database if possible, then register logs,
    /// configuration files and version information for archival.
    ///
    /// File registration happens whether or not the dump could run.
    pub fn setup(&mut self) {
        if self.options.dbname.is_some() {
            if self.has_credential() {
                match self.create_staging_dir() {
                    Ok(staging) => self.pg_dump(&staging),
                    Err(e) => self.raise_error(&format!(
                        "Unable to create staging directory ({:#})",
                        e
                    )),
                }
            } else {
                self.raise_warning(ALERT_PASSWORD_MISSING);
            }
        } else {
            self.raise_warning(ALERT_DBNAME_MISSING);
        }

        self.collect_matching(LOG_FILE_PATTERN);
        self.collect_matching(CONF_FILE_PATTERN);

        let data_dir = self.options.pghome.join("data");
        for name in FIXED_DATA_FILES {
            self.host.add_copy_spec(&data_dir.join(name));
        }
    }

    /// Remove the staging directory if one was created. Safe to call twice.
    pub fn postproc(&mut self) {
        let Some(staging) = self.staging_dir.take() else {
            return;
        };

        let path = staging.path().to_path_buf();
        match staging.close() {
            Ok(()) => debug!("Removed staging directory {}", path.display()),
            Err(e) => {
                self.host
                    .log_error(&format!("Unable to remove {}: {}", path.display(), e));
                self.host
                    .add_alert(&format!("ERROR: Unable to remove {}.", path.display()));
            }
        }
    }

    fn has_credential(&self) -> bool {
        self.options.password.is_some() || self.host.env_var(PGPASSWORD_ENV).is_some()
    }

    fn create_staging_dir(&mut self) -> Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_DIR_PREFIX);

        let staging = match &self.staging_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .context("Failed to create staging directory")?;

        let path = staging.path().to_path_buf();
        debug!("Created staging directory {}", path.display());
        self.staging_dir = Some(staging);
        Ok(path)
    }

    fn pg_dump(&mut self, staging: &Path) {
        let dest_file = staging.join(DUMP_FILE_NAME);
        let command = DumpCommand::build(&self.options, &dest_file);

        info!("Dumping PostgreSQL database: {}", command);

        match self.runner.run(&command) {
            Ok(result) if result.success() => {
                info!("Database dump written to {}", dest_file.display());
                self.host.add_copy_spec(&dest_file);
            }
            Ok(result) => self.raise_error(&format!(
                "Unable to execute pg_dump. Error({})",
                result.output.trim_end()
            )),
            Err(e) => self.raise_error(&format!("Unable to execute pg_dump. Error({:#})", e)),
        }
    }

    fn collect_matching(&mut self, pattern: &str) {
        let finder = match find_files(pattern, &self.options.pghome, None, None) {
            Ok(finder) => finder,
            Err(e) => {
                self.host.log_error(&format!("Unable to search for {}: {:#}", pattern, e));
                return;
            }
        };

        let mut count = 0;
        for path in finder {
            self.host.add_copy_spec(&path);
            count += 1;
        }
        debug!("Registered {} {} file(s) under {}", count, pattern, self.options.pghome.display());
    }

    fn raise_warning(&mut self, message: &str) {
        self.host.log_warning(message);
        self.host.add_alert(&format!("WARN: {}", message));
    }

    fn raise_error(&mut self, message: &str) {
        self.host.log_error(message);
        self.host.add_alert(&format!("ERROR: {}", message));
    }
}
