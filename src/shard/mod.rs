//! Shard readers
//!
//! A segment of the change feed is split into shards, each an append-only,
//! time-ordered log stored as a sequence of chunk files. This module defines how the
//! segment merger reads them and ships an in-memory reader.

mod error;
mod memory;
mod reader;

pub use error::{ShardError, ShardResult};
pub use memory::{MemoryChunk, MemoryShard, MemoryShardFactory};
pub use reader::{ShardFactory, ShardReader};

/// Shard path type, e.g. `log/00/2019/02/22/1800/`
pub type ShardPath = String;
