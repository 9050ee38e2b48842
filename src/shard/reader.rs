//! Shard reader boundary
//!
//! The segment merger only talks to shards through these traits. Fetching chunks,
//! decoding records and resolving resume offsets all live behind them.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::models::{BlobChangeFeedEvent, ShardCursor};
use crate::shard::ShardResult;

/// A lazy, ordered reader over one shard of a segment
#[async_trait]
pub trait ShardReader: Send {
    /// Path identifying the shard inside its segment
    fn shard_path(&self) -> &str;

    /// Whether the shard may still produce events
    fn has_next(&self) -> bool;

    /// Read the next event, or `None` if the shard had nothing left.
    ///
    /// Implementations must return [`ShardError::Cancelled`](crate::shard::ShardError::Cancelled)
    /// without moving their position when `cancel` fires before the read completes.
    async fn get_change(
        &mut self,
        cancel: &CancellationToken,
    ) -> ShardResult<Option<BlobChangeFeedEvent>>;

    /// Current resume offset, `None` if the shard was never read or resumed
    fn cursor(&self) -> Option<ShardCursor>;
}

/// Builds positioned shard readers for a segment
#[async_trait]
pub trait ShardFactory: Send + Sync {
    /// Reader type produced by this factory
    type Shard: ShardReader;

    /// Create a reader for `shard_path`, resumed from `cursor` when given
    async fn create_shard(
        &self,
        shard_path: &str,
        cursor: Option<&ShardCursor>,
        cancel: &CancellationToken,
    ) -> ShardResult<Self::Shard>;
}

#[async_trait]
impl<S: ShardReader + ?Sized> ShardReader for Box<S> {
    fn shard_path(&self) -> &str {
        (**self).shard_path()
    }

    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    async fn get_change(
        &mut self,
        cancel: &CancellationToken,
    ) -> ShardResult<Option<BlobChangeFeedEvent>> {
        (**self).get_change(cancel).await
    }

    fn cursor(&self) -> Option<ShardCursor> {
        (**self).cursor()
    }
}
