//! Resumable reader for blob change feeds
//!
//! The change feed of a storage account is a series of time-bucketed segments, each
//! split into shards that are appended to independently. This crate reads one
//! segment at a time, merging its shards round-robin into a single stream of
//! [`BlobChangeFeedEvent`]s, and captures the read position as a cursor that can be
//! serialized and used to resume later, possibly in another process.
//!
//! ```no_run
//! use changefeed_rs::{CancellationToken, MemoryShardFactory, SegmentBuilder, SegmentManifest};
//!
//! # async fn run(manifest: SegmentManifest) -> changefeed_rs::Result<()> {
//! let builder = SegmentBuilder::new(MemoryShardFactory::new());
//! let cancel = CancellationToken::new();
//! let path = "idx/segments/2019/02/22/1800/meta.json";
//!
//! let mut segment = builder.build(path, &manifest, None, &cancel).await?;
//! while let Some(event) = segment.get_change(&cancel).await? {
//!     println!("{} {}", event.event_type, event.subject);
//! }
//! let _token = segment.cursor().to_json()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod segment;
pub mod shard;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::ReaderConfig;
pub use error::{Error, Result};
pub use metrics::{MetricsSnapshot, ReaderMetrics};
pub use models::{
    BlobChangeFeedEvent, BlobChangeFeedEventData, BlobChangeFeedEventType, BlobType,
    ChangeFeedCursor, SegmentCursor, ShardCursor,
};
pub use segment::{Segment, SegmentBuilder, SegmentManifest, SegmentPeriod};
pub use shard::{
    MemoryChunk, MemoryShard, MemoryShardFactory, ShardError, ShardFactory, ShardReader,
    ShardResult,
};

/// Re-exported so callers can build cancellation tokens without a direct dependency
pub use tokio_util::sync::CancellationToken;
