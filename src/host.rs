//! Host framework capabilities.
//!
//! A collection plugin never reaches into global state to read its options,
//! register files or surface problems; it asks its host. [`PluginHost`] is
//! that seam, and [`LocalHost`] is the implementation used by the
//! `pg-collector` binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::config::PluginOptions;

/// Capabilities a host framework provides to a collection plugin.
pub trait PluginHost {
    /// Value of a plugin option, or `None` when the option is unset.
    fn get_option(&self, name: &str) -> Option<String>;

    /// Register a path for archival. The host decides at archive time
    /// whether the path exists.
    fn add_copy_spec(&mut self, path: &Path);

    /// Surface a user-visible, non-fatal notification.
    fn add_alert(&mut self, message: &str);

    fn log_warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn log_error(&self, message: &str) {
        error!("{}", message);
    }

    /// The host's view of the ambient process environment.
    fn env_var(&self, name: &str) -> Option<OsString> {
        std::env::var_os(name)
    }
}

/// Host used when the collector runs standalone.
///
/// Keeps the copy specification and alerts in insertion order so they can
/// be archived and reported once the plugin's setup has finished.
#[derive(Debug, Clone)]
pub struct LocalHost {
    options: PluginOptions,
    copy_spec: Vec<PathBuf>,
    alerts: Vec<String>,
}

impl LocalHost {
    pub fn new(options: PluginOptions) -> Self {
        Self {
            options,
            copy_spec: Vec::new(),
            alerts: Vec::new(),
        }
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Paths registered for archival, in registration order
    pub fn copy_spec(&self) -> &[PathBuf] {
        &self.copy_spec
    }

    /// Alerts raised during the run, in order
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Log every alert raised during the run
    pub fn report_alerts(&self) {
        if self.alerts.is_empty() {
            return;
        }

        info!("{} alert(s) raised during collection:", self.alerts.len());
        for alert in &self.alerts {
            warn!("  {}", alert);
        }
    }
}

impl PluginHost for LocalHost {
    fn get_option(&self, name: &str) -> Option<String> {
        self.options.get(name)
    }

    fn add_copy_spec(&mut self, path: &Path) {
        self.copy_spec.push(path.to_path_buf());
    }

    fn add_alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
