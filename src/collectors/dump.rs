use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use log::debug;

use crate::collectors::postgresql::PgOptions;
use crate::constants::{PGPASSWORD_ENV, PG_DUMP_PROGRAM};

/// A fully-specified external dump invocation.
///
/// `env` is applied on top of the inherited environment of the child only;
/// the collector's own environment is never modified.
#[derive(Clone, PartialEq, Eq)]
pub struct DumpCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl DumpCommand {
    /// Build the pg_dump command writing a tar archive to `dest_file`.
    ///
    /// A configured host selects a TCP connection on `dbport`; otherwise the
    /// local form is used. `-w` keeps pg_dump from prompting, so the
    /// password has to come from `PGPASSWORD`.
    pub fn build(options: &PgOptions, dest_file: &Path) -> Self {
        let dbname = options.dbname.clone().unwrap_or_default();
        let dest = dest_file.to_string_lossy().to_string();

        let mut args: Vec<String> = Vec::new();
        match &options.dbhost {
            Some(host) => {
                args.extend(["-U".to_string(), options.username.clone()]);
                args.extend(["-h".to_string(), host.clone()]);
                args.extend(["-p".to_string(), options.dbport.clone()]);
            }
            None => {
                args.push("-C".to_string());
                args.extend(["-U".to_string(), options.username.clone()]);
            }
        }
        args.push("-w".to_string());
        args.extend(["-f".to_string(), dest]);
        args.extend(["-F".to_string(), "t".to_string()]);
        args.push(dbname);

        let env = options
            .password
            .iter()
            .map(|password| (PGPASSWORD_ENV.to_string(), password.clone()))
            .collect();

        DumpCommand {
            program: PG_DUMP_PROGRAM.to_string(),
            args,
            env,
        }
    }

    /// The command line as it would be typed in a shell.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for DumpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

// Environment values may hold credentials
impl fmt::Debug for DumpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_keys: Vec<&str> = self.env.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("DumpCommand")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &env_keys)
            .finish()
    }
}

/// Exit status and combined output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Executes external commands to completion.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    fn run(&self, command: &DumpCommand) -> Result<CommandOutput>;
}

/// Runs commands as child processes of the collector.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &DumpCommand) -> Result<CommandOutput> {
        debug!("Executing: {}", command);

        let output = Command::new(&command.program)
            .args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()
            .context(format!("Failed to execute {}", command.program))?;

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            status: output.status.code(),
            output: text,
        })
    }
}
