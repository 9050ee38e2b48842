//! Resumable change-feed positions
//!
//! A cursor is the only state that leaves the reader. It is serialized as JSON with
//! PascalCase keys so it stays compatible with cursors written by other change-feed
//! clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cursor format version written by this crate
pub const CURSOR_VERSION: u32 = 1;

/// Resume offset inside one shard
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShardCursor {
    /// Path of the chunk holding the last delivered event
    pub current_chunk_path: String,
    /// Offset of the Avro block inside the chunk
    pub block_offset: u64,
    /// Index of the next event to deliver within the block
    pub event_index: u64,
}

impl ShardCursor {
    /// Create a new shard cursor
    pub fn new(current_chunk_path: impl Into<String>, block_offset: u64, event_index: u64) -> Self {
        Self {
            current_chunk_path: current_chunk_path.into(),
            block_offset,
            event_index,
        }
    }

    /// Check if this cursor points into the given shard
    ///
    /// The shard path must end at a path segment boundary, so `log/1` does not
    /// claim chunks of `log/10/`.
    pub fn belongs_to(&self, shard_path: &str) -> bool {
        if shard_path.is_empty() {
            return false;
        }
        match self.current_chunk_path.strip_prefix(shard_path) {
            Some(rest) => shard_path.ends_with('/') || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Position inside one segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SegmentCursor {
    /// Manifest path of the segment
    pub segment_path: String,
    /// Cursors of every shard that has been read at least once
    pub shard_cursors: Vec<ShardCursor>,
    /// Path of the shard the next read starts from
    pub current_shard_path: String,
}

impl SegmentCursor {
    /// Find the cursor of the given shard, if it was ever read
    pub fn shard_cursor_for(&self, shard_path: &str) -> Option<&ShardCursor> {
        self.shard_cursors.iter().find(|cursor| cursor.belongs_to(shard_path))
    }

    /// Encode the cursor as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a cursor from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Position in the change feed as a whole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeFeedCursor {
    pub cursor_version: u32,
    /// Host of the storage account the cursor was issued for
    pub url_host: String,
    /// Exclusive end of the requested time range, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub current_segment_cursor: SegmentCursor,
}

impl ChangeFeedCursor {
    /// Wrap a segment cursor for the given account host
    pub fn new(
        url_host: impl Into<String>,
        end_time: Option<DateTime<Utc>>,
        current_segment_cursor: SegmentCursor,
    ) -> Self {
        Self {
            cursor_version: CURSOR_VERSION,
            url_host: url_host.into(),
            end_time,
            current_segment_cursor,
        }
    }

    /// Encode the cursor as a continuation token
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a continuation token
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
