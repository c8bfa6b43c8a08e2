use serde_json::json;
use uuid::Uuid;
use anyhow::{Result, Context};

use crate::utils::archive::ArchiveReport;

/// Create a JSON summary of the collection.
///
/// The summary records what ended up in the archive (with hashes), which
/// registered paths could not be archived, and every alert raised while
/// collecting, so a reader can tell a partial collection from a full one.
///
/// # Example Output
///
/// ```json
/// {
///   "collection_id": "550e8400-e29b-41d4-a716-446655440000",
///   "hostname": "db-01",
///   "collection_time": "20240115-143052",
///   "archive": "/tmp/pg-collector/db-01-pgcollect-20240115-143052.zip",
///   "artifact_count": 12,
///   "artifacts": [...],
///   "skipped_paths": ["/var/lib/pgsql/data/postmaster.opts"],
///   "alerts": ["WARN: dbname must be supplied to dump a database."]
/// }
/// ```
pub fn create_collection_summary(
    hostname: &str,
    timestamp: &str,
    report: &ArchiveReport,
    alerts: &[String],
) -> Result<String> {
    let skipped: Vec<String> = report
        .skipped
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect();

    let summary = json!({
        "collection_id": Uuid::new_v4().to_string(),
        "hostname": hostname,
        "collection_time": timestamp,
        "os_version": std::env::consts::OS,
        "collector_version": env!("CARGO_PKG_VERSION"),
        "archive": report.archive_path.to_string_lossy(),
        "artifact_count": report.artifacts.len(),
        "artifacts": report.artifacts,
        "skipped_paths": skipped,
        "alerts": alerts,
    });

    serde_json::to_string_pretty(&summary)
        .context("Failed to serialize collection summary")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArtifactMetadata;
    use std::path::PathBuf;

    fn report() -> ArchiveReport {
        ArchiveReport {
            archive_path: PathBuf::from("/tmp/out/h-pgcollect-t.zip"),
            artifacts: vec![ArtifactMetadata {
                original_path: "/var/lib/pgsql/data/postgresql.conf".to_string(),
                archive_name: "var/lib/pgsql/data/postgresql.conf".to_string(),
                collection_time: "2024-01-01T00:00:00+00:00".to_string(),
                file_size: 11,
                modified_time: None,
                sha256: "ab".repeat(32),
            }],
            skipped: vec![PathBuf::from("/var/lib/pgsql/data/PG_VERSION")],
        }
    }

    #[test]
    fn test_summary_contents() {
        let alerts = vec!["WARN: dbname must be supplied to dump a database.".to_string()];
        let summary = create_collection_summary("db-01", "20240101-000000", &report(), &alerts)
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(parsed["hostname"], "db-01");
        assert_eq!(parsed["collection_time"], "20240101-000000");
        assert_eq!(parsed["artifact_count"], 1);
        assert_eq!(parsed["artifacts"][0]["file_size"], 11);
        assert_eq!(parsed["skipped_paths"][0], "/var/lib/pgsql/data/PG_VERSION");
        assert_eq!(parsed["alerts"][0], alerts[0].as_str());
        assert_eq!(parsed["archive"], "/tmp/out/h-pgcollect-t.zip");
    }

    #[test]
    fn test_collection_ids_are_unique() {
        let first: serde_json::Value =
            serde_json::from_str(&create_collection_summary("h", "t", &report(), &[]).unwrap())
                .unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&create_collection_summary("h", "t", &report(), &[]).unwrap())
                .unwrap();

        assert_ne!(first["collection_id"], second["collection_id"]);
    }
}
