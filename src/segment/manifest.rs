//! Segment manifests
//!
//! Each segment has a `meta.json` manifest listing the shard directories that hold
//! its chunk files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::shard::ShardPath;

/// Container holding the change-feed logs; manifest chunk paths are prefixed with it
pub const CHANGE_FEED_CONTAINER: &str = "$blobchangefeed";

/// Publication status of a segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SegmentStatus {
    /// All shards are complete
    Finalized,
    /// Shards may still grow
    Published,
    Other(String),
}

impl From<String> for SegmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Finalized" => Self::Finalized,
            "Published" => Self::Published,
            _ => Self::Other(value),
        }
    }
}

impl From<SegmentStatus> for String {
    fn from(value: SegmentStatus) -> Self {
        match value {
            SegmentStatus::Finalized => "Finalized".to_string(),
            SegmentStatus::Published => "Published".to_string(),
            SegmentStatus::Other(status) => status,
        }
    }
}

/// Decoded `meta.json` of a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentManifest {
    pub version: u32,
    pub begin: DateTime<Utc>,
    pub interval_secs: u64,
    pub status: SegmentStatus,
    /// Service-side log configuration, kept opaque
    #[serde(default)]
    pub config: serde_json::Value,
    /// Shard directories, in shard index order
    pub chunk_file_paths: Vec<String>,
}

impl SegmentManifest {
    /// Decode a manifest, attributing failures to `manifest_path`
    pub fn from_json(manifest_path: &str, json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::manifest(manifest_path, format!("Failed to parse manifest: {}", e)))
    }

    /// Shard paths relative to the change-feed container, in manifest order
    pub fn shard_paths(&self) -> Vec<ShardPath> {
        let prefix = format!("{}/", CHANGE_FEED_CONTAINER);
        self.chunk_file_paths
            .iter()
            .map(|path| path.strip_prefix(&prefix).unwrap_or(path).to_string())
            .collect()
    }

    /// Check if the segment can still receive events
    pub fn is_finalized(&self) -> bool {
        self.status == SegmentStatus::Finalized
    }
}
