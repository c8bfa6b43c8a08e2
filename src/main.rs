use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{info, warn, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode, ColorChoice};

use pg_collector::cli::{Args, Commands};
use pg_collector::collectors::PostgresqlPlugin;
use pg_collector::config::{load_or_default_options, PluginOptions};
use pg_collector::constants::{DEFAULT_OUTPUT_DIR_NAME, SUMMARY_FILE_NAME};
use pg_collector::host::LocalHost;
use pg_collector::privileges;
use pg_collector::utils::{archive, summary};

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    // Handle subcommands
    if let Some(cmd) = &args.command {
        return handle_subcommand(cmd);
    }

    info!("Starting PostgreSQL collection");

    let options = load_options(&args)?;
    check_privileges();

    let mut plugin = PostgresqlPlugin::new(LocalHost::new(options));
    if let Some(root) = &args.staging_root {
        plugin = plugin.with_staging_root(root);
    }

    plugin.setup();

    let result = if args.skip_archive {
        list_copy_spec(plugin.host());
        Ok(())
    } else {
        archive_and_report(plugin.host(), &args)
    };

    // The staging directory goes away even if archiving failed
    plugin.postproc();
    plugin.host().report_alerts();
    result?;

    info!("PostgreSQL collection completed");
    Ok(())
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

/// Handle subcommands
fn handle_subcommand(cmd: &Commands) -> Result<()> {
    match cmd {
        Commands::InitConfig { path } => {
            info!("Creating default options file at {}", path.display());
            PluginOptions::create_default_config_file(path)?;
            info!("Options file created successfully");
            Ok(())
        }
    }
}

/// Load options from file and apply command-line overrides
fn load_options(args: &Args) -> Result<PluginOptions> {
    let mut options = load_or_default_options(args.config.as_deref())?;
    args.apply_overrides(&mut options);
    Ok(options)
}

fn check_privileges() {
    if !privileges::is_elevated() {
        warn!("Running without elevated privileges - some PostgreSQL files may be inaccessible");
        info!("{}", privileges::get_elevation_instructions());
    }
}

fn list_copy_spec(host: &LocalHost) {
    info!("{} path(s) registered for collection:", host.copy_spec().len());
    for path in host.copy_spec() {
        println!("{}", path.display());
    }
}

/// Archive the copy specification and write the collection summary next to it
fn archive_and_report(host: &LocalHost, args: &Args) -> Result<()> {
    let hostname = hostname::get()
        .map_err(|e| anyhow!("Failed to get hostname: {}", e))?
        .to_string_lossy()
        .to_string();

    let timestamp = chrono::Utc::now().format("%Y%m%d-%H%M%S").to_string();

    let output_dir = match &args.output {
        Some(path) => path.clone(),
        None => env::temp_dir().join(DEFAULT_OUTPUT_DIR_NAME),
    };

    let report = archive::archive_copy_spec(host.copy_spec(), &output_dir, &hostname, &timestamp)?;

    let summary_json = summary::create_collection_summary(
        &hostname,
        &timestamp,
        &report,
        host.alerts(),
    )?;
    let summary_path = write_collection_summary(&output_dir, &summary_json)?;

    info!("Artifact archive: {}", report.archive_path.display());
    info!("Collection summary: {}", summary_path.display());
    Ok(())
}

fn write_collection_summary(output_dir: &Path, summary_json: &str) -> Result<PathBuf> {
    let summary_path = output_dir.join(SUMMARY_FILE_NAME);

    fs::write(&summary_path, summary_json)
        .context("Failed to write collection summary")?;

    Ok(summary_path)
}
