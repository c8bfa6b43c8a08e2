use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DBPORT, DEFAULT_PGHOME, DEFAULT_USERNAME, OPT_DBHOST, OPT_DBNAME, OPT_DBPORT,
    OPT_PASSWORD, OPT_PGHOME, OPT_USERNAME,
};

/// Options recognised by the PostgreSQL plugin.
///
/// This is the host-side record: it is loaded from YAML and the command
/// line, then handed out to the plugin one option at a time through
/// [`crate::host::PluginHost::get_option`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PluginOptions {
    /// PostgreSQL server home directory
    pub pghome: String,
    /// Username for pg_dump
    pub username: String,
    /// Password for pg_dump (visible in process listings when given on the command line)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Database name to dump
    pub dbname: String,
    /// Database hostname/IP (do not use unix socket)
    pub dbhost: String,
    /// Database server port number
    pub dbport: u16,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            pghome: DEFAULT_PGHOME.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: None,
            dbname: String::new(),
            dbhost: String::new(),
            dbport: DEFAULT_DBPORT,
        }
    }
}

impl PluginOptions {
    /// Load options from a YAML file. Missing fields take their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read options file: {}", path.display()))?;

        let options: PluginOptions = serde_yaml::from_str(&content)
            .context("Failed to parse YAML options")?;

        debug!("Loaded plugin options from {}", path.display());
        Ok(options)
    }

    /// Save options to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize options to YAML")?;

        fs::write(path, yaml)
            .context(format!("Failed to write options to {}", path.display()))?;

        info!("Saved plugin options to {}", path.display());
        Ok(())
    }

    /// Create a default options YAML file
    pub fn create_default_config_file(path: &Path) -> Result<()> {
        PluginOptions::default().save_to_yaml_file(path)
    }

    /// Look up an option by its plugin-facing name.
    ///
    /// Returns `None` for unknown names and for an unset password.
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            OPT_PGHOME => Some(self.pghome.clone()),
            OPT_USERNAME => Some(self.username.clone()),
            OPT_PASSWORD => self.password.clone(),
            OPT_DBNAME => Some(self.dbname.clone()),
            OPT_DBHOST => Some(self.dbhost.clone()),
            OPT_DBPORT => Some(self.dbport.to_string()),
            _ => None,
        }
    }
}

/// Load options from the given file, or fall back to defaults.
///
/// A path that is given but cannot be read or parsed is an error.
pub fn load_or_default_options(config_path: Option<&Path>) -> Result<PluginOptions> {
    match config_path {
        Some(path) => PluginOptions::from_yaml_file(path),
        None => {
            info!("No options file provided, using default plugin options");
            Ok(PluginOptions::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let options = PluginOptions::default();
        assert_eq!(options.pghome, "/var/lib/pgsql");
        assert_eq!(options.username, "postgres");
        assert_eq!(options.password, None);
        assert_eq!(options.dbname, "");
        assert_eq!(options.dbhost, "");
        assert_eq!(options.dbport, 5432);
    }

    #[test]
    fn test_get_by_name() {
        let options = PluginOptions {
            dbname: "mydb".to_string(),
            password: Some("secret".to_string()),
            ..Default::default()
        };

        assert_eq!(options.get("dbname"), Some("mydb".to_string()));
        assert_eq!(options.get("password"), Some("secret".to_string()));
        assert_eq!(options.get("dbport"), Some("5432".to_string()));
        assert_eq!(options.get("nonexistent"), None);
    }

    #[test]
    fn test_unset_password_is_none() {
        let options = PluginOptions::default();
        assert_eq!(options.get("password"), None);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "dbname: mydb\ndbport: 5433\n";
        let options: PluginOptions = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(options.dbname, "mydb");
        assert_eq!(options.dbport, 5433);
        assert_eq!(options.pghome, "/var/lib/pgsql");
        assert_eq!(options.username, "postgres");
    }

    #[test]
    fn test_save_and_load_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("options.yaml");

        let options = PluginOptions {
            pghome: "/opt/pgsql".to_string(),
            dbhost: "10.0.0.5".to_string(),
            ..Default::default()
        };
        options.save_to_yaml_file(&path).unwrap();

        let loaded = PluginOptions::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, options);

        // An unset password is not written out at all
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("password"));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "dbport: not-a-port\n").unwrap();

        assert!(PluginOptions::from_yaml_file(&path).is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        let options = load_or_default_options(None).unwrap();
        assert_eq!(options, PluginOptions::default());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.yaml");
        assert!(load_or_default_options(Some(&path)).is_err());
    }
}
