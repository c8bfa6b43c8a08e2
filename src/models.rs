use serde::{Serialize, Deserialize};

/// What was recorded about one file placed in the archive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub original_path: String,
    pub archive_name: String,
    pub collection_time: String,
    pub file_size: u64,
    pub modified_time: Option<String>,
    pub sha256: String,
}
