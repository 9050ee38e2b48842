//! Change-feed event records
//!
//! Events are decoded from the chunk records of a shard and handed to callers
//! unchanged. They are immutable once produced.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of change an event describes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlobChangeFeedEventType {
    /// A blob was created or overwritten
    BlobCreated,
    /// A blob was deleted
    BlobDeleted,
    /// Blob properties changed
    BlobPropertiesUpdated,
    /// A snapshot of a blob was taken
    BlobSnapshotCreated,
    /// Any event kind this crate does not model explicitly
    Other(String),
}

impl BlobChangeFeedEventType {
    /// Get the wire name of the event type
    pub fn name(&self) -> &str {
        match self {
            Self::BlobCreated => "BlobCreated",
            Self::BlobDeleted => "BlobDeleted",
            Self::BlobPropertiesUpdated => "BlobPropertiesUpdated",
            Self::BlobSnapshotCreated => "BlobSnapshotCreated",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for BlobChangeFeedEventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "BlobCreated" => Self::BlobCreated,
            "BlobDeleted" => Self::BlobDeleted,
            "BlobPropertiesUpdated" => Self::BlobPropertiesUpdated,
            "BlobSnapshotCreated" => Self::BlobSnapshotCreated,
            _ => Self::Other(value),
        }
    }
}

impl From<BlobChangeFeedEventType> for String {
    fn from(value: BlobChangeFeedEventType) -> Self {
        match value {
            BlobChangeFeedEventType::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

impl fmt::Display for BlobChangeFeedEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of the blob an event refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlobType {
    BlockBlob,
    PageBlob,
    AppendBlob,
    Other(String),
}

impl From<String> for BlobType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "BlockBlob" => Self::BlockBlob,
            "PageBlob" => Self::PageBlob,
            "AppendBlob" => Self::AppendBlob,
            _ => Self::Other(value),
        }
    }
}

impl From<BlobType> for String {
    fn from(value: BlobType) -> Self {
        match value {
            BlobType::BlockBlob => "BlockBlob".to_string(),
            BlobType::PageBlob => "PageBlob".to_string(),
            BlobType::AppendBlob => "AppendBlob".to_string(),
            BlobType::Other(name) => name,
        }
    }
}

/// Payload of a change-feed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobChangeFeedEventData {
    /// Operation that triggered the event, e.g. `PutBlob`
    pub api: String,
    pub client_request_id: String,
    pub request_id: String,
    pub etag: String,
    pub content_type: String,
    pub content_length: u64,
    pub blob_type: BlobType,
    pub url: String,
    /// Opaque per-blob ordering token
    pub sequencer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
}

/// A single change notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobChangeFeedEvent {
    /// Full resource path of the event source
    pub topic: String,
    /// Publisher-defined path of the event subject
    pub subject: String,
    pub event_type: BlobChangeFeedEventType,
    pub event_time: DateTime<Utc>,
    pub id: Uuid,
    pub data: BlobChangeFeedEventData,
    #[serde(default)]
    pub data_version: String,
    pub metadata_version: String,
}

impl BlobChangeFeedEvent {
    /// Decode an event from a JSON chunk record
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Encode the event as a JSON chunk record
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
