//! In-memory shard readers
//!
//! Shards whose chunks are already materialized, e.g. replayed from a local copy of
//! the change-feed container or built by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::models::{BlobChangeFeedEvent, ShardCursor};
use crate::shard::{ShardError, ShardFactory, ShardReader, ShardResult};

/// One chunk file of a shard with its decoded events
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryChunk {
    /// Chunk path, prefixed by the shard path
    pub path: String,
    /// Events in chunk order
    pub events: Vec<BlobChangeFeedEvent>,
}

impl MemoryChunk {
    /// Create a chunk from already decoded events
    pub fn new(path: impl Into<String>, events: Vec<BlobChangeFeedEvent>) -> Self {
        Self {
            path: path.into(),
            events,
        }
    }

    /// Decode a chunk holding one JSON event record per line
    pub fn from_json_lines(path: impl Into<String>, text: &str) -> ShardResult<Self> {
        let events = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(BlobChangeFeedEvent::from_json)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(path, events))
    }
}

/// Shard reader over materialized chunks
#[derive(Debug, Clone)]
pub struct MemoryShard {
    shard_path: String,
    chunks: Vec<MemoryChunk>,
    /// Chunk holding the next event
    chunk_index: usize,
    /// Index of the next event within that chunk
    event_index: usize,
    /// Chunk and next-event index recorded at the last delivered event or resume
    position: Option<(usize, usize)>,
}

impl MemoryShard {
    /// Create a reader positioned at the start of the shard
    pub fn new(shard_path: impl Into<String>, chunks: Vec<MemoryChunk>) -> Self {
        let mut shard = Self {
            shard_path: shard_path.into(),
            chunks,
            chunk_index: 0,
            event_index: 0,
            position: None,
        };
        shard.skip_finished_chunks();
        shard
    }

    /// Create a reader positioned at `cursor`
    pub fn resume(
        shard_path: impl Into<String>,
        chunks: Vec<MemoryChunk>,
        cursor: &ShardCursor,
    ) -> ShardResult<Self> {
        let mut shard = Self::new(shard_path, chunks);

        let chunk_index = shard
            .chunks
            .iter()
            .position(|chunk| chunk.path == cursor.current_chunk_path)
            .ok_or_else(|| {
                ShardError::invalid_cursor(format!(
                    "chunk {} is not part of shard {}",
                    cursor.current_chunk_path, shard.shard_path
                ))
            })?;

        let event_index = usize::try_from(cursor.event_index)
            .ok()
            .filter(|index| *index <= shard.chunks[chunk_index].events.len())
            .ok_or_else(|| {
                ShardError::invalid_cursor(format!(
                    "event index {} is past the end of chunk {}",
                    cursor.event_index, cursor.current_chunk_path
                ))
            })?;

        shard.chunk_index = chunk_index;
        shard.event_index = event_index;
        shard.position = Some((chunk_index, event_index));
        shard.skip_finished_chunks();

        Ok(shard)
    }

    /// Total number of events not yet delivered
    pub fn remaining(&self) -> usize {
        self.chunks
            .iter()
            .enumerate()
            .skip(self.chunk_index)
            .map(|(index, chunk)| {
                if index == self.chunk_index {
                    chunk.events.len() - self.event_index
                } else {
                    chunk.events.len()
                }
            })
            .sum()
    }

    fn skip_finished_chunks(&mut self) {
        while self.chunk_index < self.chunks.len()
            && self.event_index >= self.chunks[self.chunk_index].events.len()
        {
            self.chunk_index += 1;
            self.event_index = 0;
        }
    }
}

#[async_trait]
impl ShardReader for MemoryShard {
    fn shard_path(&self) -> &str {
        &self.shard_path
    }

    fn has_next(&self) -> bool {
        self.chunk_index < self.chunks.len()
    }

    async fn get_change(
        &mut self,
        cancel: &CancellationToken,
    ) -> ShardResult<Option<BlobChangeFeedEvent>> {
        // Give the runtime a chance to observe cancellation, as a network read would.
        tokio::task::yield_now().await;

        if cancel.is_cancelled() {
            return Err(ShardError::cancelled());
        }

        if !self.has_next() {
            return Ok(None);
        }

        let event = self.chunks[self.chunk_index].events[self.event_index].clone();
        self.event_index += 1;
        self.position = Some((self.chunk_index, self.event_index));
        self.skip_finished_chunks();

        Ok(Some(event))
    }

    fn cursor(&self) -> Option<ShardCursor> {
        self.position.map(|(chunk_index, event_index)| {
            ShardCursor::new(self.chunks[chunk_index].path.clone(), 0, event_index as u64)
        })
    }
}

/// Factory serving shards from an in-memory map of shard path to chunks
#[derive(Debug, Clone, Default)]
pub struct MemoryShardFactory {
    shards: HashMap<String, Vec<MemoryChunk>>,
}

impl MemoryShardFactory {
    /// Create an empty factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the chunks of a shard
    pub fn with_shard(mut self, shard_path: impl Into<String>, chunks: Vec<MemoryChunk>) -> Self {
        self.shards.insert(shard_path.into(), chunks);
        self
    }

    /// Register the chunks of a shard in place
    pub fn insert_shard(&mut self, shard_path: impl Into<String>, chunks: Vec<MemoryChunk>) {
        self.shards.insert(shard_path.into(), chunks);
    }
}

#[async_trait]
impl ShardFactory for MemoryShardFactory {
    type Shard = MemoryShard;

    async fn create_shard(
        &self,
        shard_path: &str,
        cursor: Option<&ShardCursor>,
        cancel: &CancellationToken,
    ) -> ShardResult<MemoryShard> {
        if cancel.is_cancelled() {
            return Err(ShardError::cancelled());
        }

        let chunks = self
            .shards
            .get(shard_path)
            .cloned()
            .ok_or_else(|| ShardError::not_found(shard_path))?;

        match cursor {
            Some(cursor) => MemoryShard::resume(shard_path, chunks, cursor),
            None => Ok(MemoryShard::new(shard_path, chunks)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{event, events};

    fn two_chunk_shard() -> MemoryShard {
        MemoryShard::new(
            "log/00/2019/02/22/1800/",
            vec![
                MemoryChunk::new("log/00/2019/02/22/1800/00000.avro", events("a", 2)),
                MemoryChunk::new("log/00/2019/02/22/1800/00001.avro", Vec::new()),
                MemoryChunk::new("log/00/2019/02/22/1800/00002.avro", events("b", 1)),
            ],
        )
    }

    #[tokio::test]
    async fn test_reads_across_chunks() {
        let cancel = CancellationToken::new();
        let mut shard = two_chunk_shard();

        assert!(shard.cursor().is_none());
        assert_eq!(shard.remaining(), 3);

        let first = shard.get_change(&cancel).await.unwrap().unwrap();
        assert_eq!(first.subject, "a-0");
        let cursor = shard.cursor().unwrap();
        assert_eq!(cursor.current_chunk_path, "log/00/2019/02/22/1800/00000.avro");
        assert_eq!(cursor.event_index, 1);

        shard.get_change(&cancel).await.unwrap().unwrap();
        assert!(shard.has_next());
        let last = shard.get_change(&cancel).await.unwrap().unwrap();
        assert_eq!(last.subject, "b-0");
        assert!(!shard.has_next());

        let cursor = shard.cursor().unwrap();
        assert_eq!(cursor.current_chunk_path, "log/00/2019/02/22/1800/00002.avro");
        assert_eq!(cursor.event_index, 1);

        assert!(shard.get_change(&cancel).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resume_from_cursor() {
        let cancel = CancellationToken::new();
        let mut original = two_chunk_shard();
        let chunks = original.chunks.clone();
        original.get_change(&cancel).await.unwrap();
        let cursor = original.cursor().unwrap();

        let mut resumed = MemoryShard::resume("log/00/2019/02/22/1800/", chunks, &cursor).unwrap();
        assert_eq!(resumed.cursor(), Some(cursor));
        assert_eq!(resumed.remaining(), 2);

        let next = resumed.get_change(&cancel).await.unwrap().unwrap();
        assert_eq!(next, original.get_change(&cancel).await.unwrap().unwrap());
    }

    #[test]
    fn test_resume_rejects_foreign_cursor() {
        let cursor = ShardCursor::new("log/07/2019/02/22/1800/00000.avro", 0, 0);
        let err = MemoryShard::resume("log/00/2019/02/22/1800/", two_chunk_shard().chunks, &cursor)
            .unwrap_err();
        assert!(matches!(err, ShardError::InvalidCursor(_)));

        let cursor = ShardCursor::new("log/00/2019/02/22/1800/00000.avro", 0, 9);
        let err = MemoryShard::resume("log/00/2019/02/22/1800/", two_chunk_shard().chunks, &cursor)
            .unwrap_err();
        assert!(matches!(err, ShardError::InvalidCursor(_)));
    }

    #[tokio::test]
    async fn test_cancelled_read_keeps_position() {
        let cancel = CancellationToken::new();
        let mut shard = two_chunk_shard();
        shard.get_change(&cancel).await.unwrap();
        let before = shard.cursor();

        cancel.cancel();
        let err = shard.get_change(&cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(shard.cursor(), before);
        assert_eq!(shard.remaining(), 2);
    }

    #[test]
    fn test_chunk_from_json_lines() {
        let lines = format!(
            "{}\n\n{}\n",
            event("x", 0).to_json().unwrap(),
            event("x", 1).to_json().unwrap()
        );
        let chunk = MemoryChunk::from_json_lines("log/00/x.avro", &lines).unwrap();
        assert_eq!(chunk.events.len(), 2);

        let err = MemoryChunk::from_json_lines("log/00/x.avro", "{not json").unwrap_err();
        assert!(matches!(err, ShardError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_factory_lookup() {
        let cancel = CancellationToken::new();
        let factory = MemoryShardFactory::new()
            .with_shard("log/00/", vec![MemoryChunk::new("log/00/0.avro", events("a", 1))]);

        let shard = factory.create_shard("log/00/", None, &cancel).await.unwrap();
        assert_eq!(shard.shard_path(), "log/00/");

        let err = factory.create_shard("log/01/", None, &cancel).await.unwrap_err();
        assert!(err.is_not_found());

        cancel.cancel();
        let err = factory.create_shard("log/00/", None, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
