//! Fixtures shared by unit tests

use chrono::{TimeZone, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::{BlobChangeFeedEvent, BlobChangeFeedEventData, BlobChangeFeedEventType, BlobType};
use crate::segment::Segment;
use crate::shard::{MemoryChunk, MemoryShard, ShardReader};

/// Event whose subject is `{prefix}-{sequence}`
pub(crate) fn event(prefix: &str, sequence: usize) -> BlobChangeFeedEvent {
    BlobChangeFeedEvent {
        topic: "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct"
            .to_string(),
        subject: format!("{}-{}", prefix, sequence),
        event_type: BlobChangeFeedEventType::BlobCreated,
        event_time: Utc.with_ymd_and_hms(2019, 2, 22, 18, 12, 1).unwrap(),
        id: Uuid::new_v4(),
        data: BlobChangeFeedEventData {
            api: "PutBlob".to_string(),
            client_request_id: Uuid::new_v4().to_string(),
            request_id: Uuid::new_v4().to_string(),
            etag: "0x8D698F3B7D46A1D".to_string(),
            content_type: "application/octet-stream".to_string(),
            content_length: 128,
            blob_type: BlobType::BlockBlob,
            url: format!("https://acct.blob.core.windows.net/data/{}-{}", prefix, sequence),
            sequencer: format!("{:048x}", sequence),
            content_offset: None,
            destination_url: None,
            source_url: None,
            recursive: None,
        },
        data_version: String::new(),
        metadata_version: "1".to_string(),
    }
}

pub(crate) fn events(prefix: &str, count: usize) -> Vec<BlobChangeFeedEvent> {
    (0..count).map(|sequence| event(prefix, sequence)).collect()
}

pub(crate) fn shard_path(index: usize) -> String {
    format!("log/{:02}/2019/02/22/1800/", index)
}

/// Chunks of a test shard, two events per chunk
pub(crate) fn shard_chunks(index: usize, count: usize) -> Vec<MemoryChunk> {
    let events = events(&format!("s{}", index), count);
    events
        .chunks(2)
        .enumerate()
        .map(|(chunk, events)| {
            MemoryChunk::new(format!("{}{:05}.avro", shard_path(index), chunk), events.to_vec())
        })
        .collect()
}

/// Shard `index` holding `count` events with subjects `s{index}-{n}`
pub(crate) fn memory_shard(index: usize, count: usize) -> MemoryShard {
    MemoryShard::new(shard_path(index), shard_chunks(index, count))
}

/// Read a segment to exhaustion, returning event subjects in delivery order
pub(crate) async fn drain<S: ShardReader>(
    segment: &mut Segment<S>,
    cancel: &CancellationToken,
) -> Vec<String> {
    let mut subjects = Vec::new();
    while let Some(event) = segment.get_change(cancel).await.unwrap() {
        subjects.push(event.subject);
    }
    subjects
}
