use std::collections::HashSet;
use std::fs;
use std::io::{self, BufReader, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tempfile::{spooled_tempfile, SpooledTempFile};
use walkdir::WalkDir;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::constants::{COMPRESSED_EXTENSIONS, DEFAULT_BUFFER_SIZE, SPOOL_MEMORY_LIMIT};
use crate::models::ArtifactMetadata;
use crate::utils::hash::HashingReader;

/// Outcome of archiving a copy specification.
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub archive_path: PathBuf,
    /// Files written to the archive, in copy-spec order
    pub artifacts: Vec<ArtifactMetadata>,
    /// Registered paths that were missing, unreadable or not regular files
    pub skipped: Vec<PathBuf>,
}

/// Pick ZIP options for a file based on its extension and size.
///
/// Already-compressed files are stored as-is; everything else is deflated.
/// Files too large for a classic ZIP entry get ZIP64 headers.
pub fn get_compression_options(path: &Path, size: u64) -> FileOptions {
    let already_compressed = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| COMPRESSED_EXTENSIONS.contains(&ext));

    let options = if already_compressed {
        FileOptions::default().compression_method(CompressionMethod::Stored)
    } else {
        FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(6))
    };

    options
        .unix_permissions(0o644)
        .large_file(size > u32::MAX as u64)
}

/// Name of a file inside the archive: its path with the root and any
/// `.`/`..` components dropped, joined with `/`.
pub fn archive_name(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Archive every path of a copy specification into one ZIP file.
///
/// Registered paths are checked for existence here, not when they are
/// registered: missing ones are recorded as skipped. Directories are
/// archived recursively, and a file registered twice is written once.
///
/// # Returns
///
/// * `Ok(ArchiveReport)` - Archive location plus per-file metadata
/// * `Err` - If the archive itself cannot be created or written
pub fn archive_copy_spec(
    paths: &[PathBuf],
    output_dir: &Path,
    hostname: &str,
    timestamp: &str,
) -> Result<ArchiveReport> {
    let start = Instant::now();

    fs::create_dir_all(output_dir)
        .context(format!("Failed to create output directory: {}", output_dir.display()))?;

    let archive_path = output_dir.join(format!("{}-pgcollect-{}.zip", hostname, timestamp));
    let zip_file = fs::File::create(&archive_path)
        .context(format!("Failed to create zip file: {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(zip_file);

    let mut report = ArchiveReport {
        archive_path: archive_path.clone(),
        artifacts: Vec::new(),
        skipped: Vec::new(),
    };
    let mut written = HashSet::new();

    info!("Archiving {} registered path(s)...", paths.len());

    for path in paths {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                report.skipped.push(path.clone());
                continue;
            }
        };

        if metadata.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    add_file(&mut zip, entry.path(), &mut written, &mut report)?;
                }
            }
        } else if metadata.is_file() {
            add_file(&mut zip, path, &mut written, &mut report)?;
        } else {
            debug!("Skipping special file {}", path.display());
            report.skipped.push(path.clone());
        }
    }

    zip.finish().context("Failed to finalize zip file")?;

    info!(
        "Archived {} file(s) to {} in {:?}",
        report.artifacts.len(),
        archive_path.display(),
        start.elapsed()
    );
    Ok(report)
}

/// A registered file read in full, with what the report needs to know
/// about it.
struct SpooledFile {
    data: SpooledTempFile,
    file_size: u64,
    sha256: String,
    modified_time: Option<String>,
}

/// Read a file completely before anything is written to the archive, so a
/// read error never leaves a truncated entry behind.
fn spool_file(path: &Path) -> Result<SpooledFile> {
    let file = fs::File::open(path).context(format!("Failed to open {}", path.display()))?;
    let metadata = file
        .metadata()
        .context(format!("Failed to get metadata for {}", path.display()))?;

    let mut reader = HashingReader::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file));
    let mut data = spooled_tempfile(SPOOL_MEMORY_LIMIT);
    io::copy(&mut reader, &mut data).context(format!("Failed to read {}", path.display()))?;
    data.seek(SeekFrom::Start(0)).context("Failed to rewind spooled file")?;

    let (file_size, sha256) = reader.finish();
    Ok(SpooledFile {
        data,
        file_size,
        sha256,
        modified_time: metadata
            .modified()
            .ok()
            .map(|time| DateTime::<Utc>::from(time).to_rfc3339()),
    })
}

fn add_file(
    zip: &mut ZipWriter<fs::File>,
    path: &Path,
    written: &mut HashSet<String>,
    report: &mut ArchiveReport,
) -> Result<()> {
    let name = archive_name(path);
    if name.is_empty() || written.contains(&name) {
        debug!("Already archived: {}", path.display());
        return Ok(());
    }

    let mut spooled = match spool_file(path) {
        Ok(spooled) => spooled,
        Err(e) => {
            warn!("Skipping {}: {:#}", path.display(), e);
            report.skipped.push(path.to_path_buf());
            return Ok(());
        }
    };

    zip.start_file(name.clone(), get_compression_options(path, spooled.file_size))
        .context(format!("Failed to start file entry for {}", name))?;
    io::copy(&mut spooled.data, zip).context(format!("Failed to write {} to zip", name))?;

    debug!("Archived {} ({} bytes)", name, spooled.file_size);

    report.artifacts.push(ArtifactMetadata {
        original_path: path.to_string_lossy().to_string(),
        archive_name: name.clone(),
        collection_time: Utc::now().to_rfc3339(),
        file_size: spooled.file_size,
        modified_time: spooled.modified_time,
        sha256: spooled.sha256,
    });
    written.insert(name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::read::ZipArchive;

    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_archive_name_strips_root() {
        assert_eq!(
            archive_name(Path::new("/var/lib/pgsql/data/PG_VERSION")),
            "var/lib/pgsql/data/PG_VERSION"
        );
        assert_eq!(archive_name(Path::new("relative/file.log")), "relative/file.log");
        assert_eq!(archive_name(Path::new("/a/../b/./c")), "a/b/c");
    }

    #[test]
    fn test_archive_files_and_skip_missing() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let log = source.path().join("server.log");
        let conf = source.path().join("postgresql.conf");
        fs::write(&log, b"LOG: database system is ready").unwrap();
        fs::write(&conf, b"port = 5432").unwrap();
        let missing = source.path().join("data/PG_VERSION");

        let report = archive_copy_spec(
            &[log.clone(), conf.clone(), missing.clone()],
            output.path(),
            "db-host",
            "20240101-120000",
        )
        .unwrap();

        assert_eq!(
            report.archive_path.file_name().unwrap().to_str().unwrap(),
            "db-host-pgcollect-20240101-120000.zip"
        );
        assert_eq!(report.artifacts.len(), 2);
        assert_eq!(report.skipped, vec![missing]);

        let names = entry_names(&report.archive_path);
        assert_eq!(names, vec![archive_name(&log), archive_name(&conf)]);

        let mut archive = ZipArchive::new(fs::File::open(&report.archive_path).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name(&archive_name(&conf))
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "port = 5432");

        let conf_meta = &report.artifacts[1];
        assert_eq!(conf_meta.file_size, 11);
        assert_eq!(conf_meta.sha256.len(), 64);
        assert!(conf_meta.modified_time.is_some());
    }

    #[test]
    fn test_duplicate_paths_written_once() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let log = source.path().join("server.log");
        fs::write(&log, b"log").unwrap();

        let report =
            archive_copy_spec(&[log.clone(), log.clone()], output.path(), "h", "t").unwrap();

        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(entry_names(&report.archive_path).len(), 1);
    }

    #[test]
    fn test_directories_are_archived_recursively() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::create_dir_all(source.path().join("pg_log/old")).unwrap();
        fs::write(source.path().join("pg_log/a.log"), b"a").unwrap();
        fs::write(source.path().join("pg_log/old/b.log"), b"b").unwrap();

        let report = archive_copy_spec(
            &[source.path().join("pg_log")],
            output.path(),
            "h",
            "t",
        )
        .unwrap();

        let mut names = entry_names(&report.archive_path);
        names.sort();
        assert_eq!(
            names,
            vec![
                archive_name(&source.path().join("pg_log/a.log")),
                archive_name(&source.path().join("pg_log/old/b.log")),
            ]
        );
    }

    #[test]
    fn test_empty_copy_spec() {
        let output = TempDir::new().unwrap();
        let report = archive_copy_spec(&[], output.path(), "h", "t").unwrap();

        assert!(report.artifacts.is_empty());
        assert!(report.archive_path.exists());
        assert!(entry_names(&report.archive_path).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_read_failure_skips_file_without_partial_entry() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let log = source.path().join("server.log");
        fs::write(&log, b"log").unwrap();

        // Opening a directory succeeds on unix, reading it does not
        let unreadable = source.path().join("pg_log");
        fs::create_dir(&unreadable).unwrap();

        let archive_path = output.path().join("partial.zip");
        let mut zip = ZipWriter::new(fs::File::create(&archive_path).unwrap());
        let mut written = HashSet::new();
        let mut report = ArchiveReport {
            archive_path: archive_path.clone(),
            artifacts: Vec::new(),
            skipped: Vec::new(),
        };

        add_file(&mut zip, &unreadable, &mut written, &mut report).unwrap();
        add_file(&mut zip, &log, &mut written, &mut report).unwrap();
        zip.finish().unwrap();

        assert_eq!(report.skipped, vec![unreadable]);
        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(entry_names(&archive_path), vec![archive_name(&log)]);
    }
}
