//! Data types exchanged with change-feed callers
//!
//! Events flow out of the reader; cursors flow out and back in to resume reading.

mod cursor;
mod event;

pub use cursor::{ChangeFeedCursor, SegmentCursor, ShardCursor, CURSOR_VERSION};
pub use event::{BlobChangeFeedEvent, BlobChangeFeedEventData, BlobChangeFeedEventType, BlobType};
