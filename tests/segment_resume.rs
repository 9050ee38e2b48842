//! Reads a segment part way, hands the cursor token to a fresh builder and checks
//! that the remaining events come out exactly as an uninterrupted read would.

use changefeed_rs::{
    CancellationToken, ChangeFeedCursor, MemoryChunk, MemoryShardFactory, SegmentBuilder,
};

const MANIFEST_PATH: &str = "idx/segments/2019/02/22/1800/meta.json";

const MANIFEST: &str = r#"{
    "version": 0,
    "begin": "2019-02-22T18:00:00.000Z",
    "intervalSecs": 3600,
    "status": "Finalized",
    "config": { "numShards": 3 },
    "chunkFilePaths": [
        "$blobchangefeed/log/00/2019/02/22/1800/",
        "$blobchangefeed/log/01/2019/02/22/1800/",
        "$blobchangefeed/log/02/2019/02/22/1800/"
    ]
}"#;

fn record(subject: &str, sequence: u32) -> String {
    format!(
        r#"{{"topic":"/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct","subject":"{subject}","eventType":"BlobCreated","eventTime":"2019-02-22T18:0{sequence}:00Z","id":"00000000-0000-0000-0000-00000000000{sequence}","data":{{"api":"PutBlob","clientRequestId":"c","requestId":"r","etag":"0x1","contentType":"text/plain","contentLength":1,"blobType":"BlockBlob","url":"","sequencer":"{sequence:048x}"}},"dataVersion":"","metadataVersion":"1"}}"#
    )
}

fn chunk(path: &str, subjects: &[&str]) -> anyhow::Result<MemoryChunk> {
    let lines: Vec<String> = subjects
        .iter()
        .enumerate()
        .map(|(sequence, subject)| record(subject, sequence as u32))
        .collect();
    Ok(MemoryChunk::from_json_lines(path, &lines.join("\n"))?)
}

fn factory() -> anyhow::Result<MemoryShardFactory> {
    Ok(MemoryShardFactory::new()
        .with_shard(
            "log/00/2019/02/22/1800/",
            vec![
                chunk("log/00/2019/02/22/1800/00000.avro", &["a0", "a1"])?,
                chunk("log/00/2019/02/22/1800/00001.avro", &["a2"])?,
            ],
        )
        .with_shard("log/01/2019/02/22/1800/", Vec::new())
        .with_shard(
            "log/02/2019/02/22/1800/",
            vec![chunk("log/02/2019/02/22/1800/00000.avro", &["c0", "c1"])?],
        ))
}

#[tokio::test]
async fn resume_from_token_in_new_reader() -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let first_reader = SegmentBuilder::new(factory()?);
    let mut segment = first_reader
        .build_from_json(MANIFEST_PATH, MANIFEST, None, &cancel)
        .await?;

    let mut seen = Vec::new();
    for _ in 0..2 {
        let event = segment.get_change(&cancel).await?.expect("segment has events");
        seen.push(event.subject);
    }
    assert_eq!(seen, vec!["a0", "c0"]);

    let token = ChangeFeedCursor::new("acct.blob.core.windows.net", None, segment.cursor()).to_json()?;

    let mut uninterrupted = Vec::new();
    while let Some(event) = segment.get_change(&cancel).await? {
        uninterrupted.push(event.subject);
    }
    assert_eq!(uninterrupted, vec!["a1", "c1", "a2"]);

    let cursor = ChangeFeedCursor::from_json(&token)?;
    let second_reader = SegmentBuilder::new(factory()?);
    let mut resumed = second_reader
        .build_from_json(
            MANIFEST_PATH,
            MANIFEST,
            Some(&cursor.current_segment_cursor),
            &cancel,
        )
        .await?;

    let mut remaining = Vec::new();
    while let Some(event) = resumed.get_change(&cancel).await? {
        remaining.push(event.subject);
    }
    assert_eq!(remaining, uninterrupted);
    assert!(!resumed.has_next());

    let metrics = second_reader.metrics().expect("metrics enabled by default").snapshot();
    assert_eq!(metrics.events_read, 3);
    assert_eq!(metrics.segments_built, 1);

    Ok(())
}

#[tokio::test]
async fn cancelled_reader_can_continue_with_fresh_token() -> anyhow::Result<()> {
    let builder = SegmentBuilder::new(factory()?);
    let cancel = CancellationToken::new();
    let mut segment = builder
        .build_from_json(MANIFEST_PATH, MANIFEST, None, &cancel)
        .await?;

    segment.get_change(&cancel).await?;
    let before = segment.cursor();

    cancel.cancel();
    let err = segment.get_change(&cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.to_string(), "The operation was aborted");
    assert_eq!(segment.cursor(), before);

    let retry = CancellationToken::new();
    let next = segment.get_change(&retry).await?.expect("segment has events");
    assert_eq!(next.subject, "c0");

    Ok(())
}
