//! Round-robin merge of the shards of one segment
//!
//! A [`Segment`] interleaves the events of its shards into a single stream, reading
//! one event at a time and moving to the next shard after every read so that no
//! shard starves the others. Its position can be captured at any time as a
//! [`SegmentCursor`] and restored later through
//! [`SegmentBuilder`](crate::segment::SegmentBuilder).
//!
//! A segment is not internally synchronized; callers serialize calls by awaiting
//! each read before issuing the next.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::metrics::ReaderMetrics;
use crate::models::{BlobChangeFeedEvent, SegmentCursor};
use crate::shard::{ShardError, ShardReader};

/// The shards of one time bucket, merged round-robin
#[derive(Debug)]
pub struct Segment<S> {
    /// Shards in shard index order, fixed at construction
    shards: Vec<S>,
    /// Shards that reported exhaustion
    shard_done: Vec<bool>,
    /// Number of `true` entries in `shard_done`
    shard_done_count: usize,
    /// Shard the next read starts from
    shard_index: usize,
    /// Bucket start, rounded to the segment period
    date_time: DateTime<Utc>,
    manifest_path: String,
    metrics: Option<Arc<ReaderMetrics>>,
    log_events: bool,
}

impl<S: ShardReader> Segment<S> {
    /// Create a segment over already positioned shards
    ///
    /// `shard_index` is only checked when reading; an out-of-range index makes every
    /// read fail with [`Error::InvalidState`].
    pub fn new(
        shards: Vec<S>,
        shard_index: usize,
        date_time: DateTime<Utc>,
        manifest_path: impl Into<String>,
    ) -> Self {
        let shard_count = shards.len();
        Self {
            shards,
            shard_done: vec![false; shard_count],
            shard_done_count: 0,
            shard_index,
            date_time,
            manifest_path: manifest_path.into(),
            metrics: None,
            log_events: false,
        }
    }

    /// Record reads into shared metrics
    pub fn with_metrics(mut self, metrics: Arc<ReaderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Trace every delivered event
    pub fn with_event_logging(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }

    /// Whether any shard may still produce events
    pub fn has_next(&self) -> bool {
        self.shards.len() > self.shard_done_count
    }

    /// Read the next event of the segment
    ///
    /// Returns `Ok(None)` once every shard is exhausted. A segment without shards has
    /// no valid round-robin index and fails with [`Error::InvalidState`]. A failed or
    /// cancelled shard read is returned unchanged and leaves the round-robin index,
    /// exhaustion flags and metrics exactly as they were before the call.
    pub async fn get_change(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<BlobChangeFeedEvent>> {
        let shard_count = self.shards.len();
        if self.shard_index >= shard_count {
            return Err(Error::invalid_state(format!(
                "shard index {} out of range for segment {} with {} shards",
                self.shard_index, self.manifest_path, shard_count
            )));
        }

        if cancel.is_cancelled() {
            self.record_cancellation();
            return Err(ShardError::cancelled().into());
        }

        // Bookkeeping is staged locally and committed only if every read succeeds.
        let mut index = self.shard_index;
        let mut exhausted: Vec<usize> = Vec::new();
        let mut reads: Vec<(Duration, bool)> = Vec::new();
        let mut event = None;

        while event.is_none() && self.shard_done_count + exhausted.len() < shard_count {
            if self.shard_done[index] || exhausted.contains(&index) {
                index = (index + 1) % shard_count;
                continue;
            }

            let shard = &mut self.shards[index];
            let started = Instant::now();
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ShardError::cancelled()),
                read = shard.get_change(cancel) => read,
            };

            event = match read {
                Ok(event) => event,
                Err(err) => {
                    if err.is_cancelled() {
                        debug!(segment = %self.manifest_path, shard = %shard.shard_path(), "Shard read cancelled");
                        self.record_cancellation();
                    } else {
                        warn!(segment = %self.manifest_path, shard = %shard.shard_path(), error = %err, "Shard read failed");
                        if let Some(metrics) = &self.metrics {
                            metrics.increment_read_errors();
                        }
                    }
                    return Err(err.into());
                }
            };

            reads.push((started.elapsed(), event.is_some()));

            if !shard.has_next() {
                debug!(segment = %self.manifest_path, shard = %shard.shard_path(), "Shard exhausted");
                exhausted.push(index);
            }

            // Round robin with shards
            index = (index + 1) % shard_count;
        }

        if let Some(metrics) = &self.metrics {
            for (duration, produced_event) in reads {
                metrics.record_read(duration, produced_event);
            }
        }

        for done in exhausted {
            self.shard_done[done] = true;
            self.shard_done_count += 1;
            if let Some(metrics) = &self.metrics {
                metrics.increment_shards_exhausted();
            }
        }
        self.shard_index = index;

        if let Some(event) = &event {
            if self.log_events {
                trace!(segment = %self.manifest_path, id = %event.id, event_type = %event.event_type, subject = %event.subject, "Delivering event");
            }
        }

        Ok(event)
    }

    /// Snapshot the position of the segment
    pub fn cursor(&self) -> SegmentCursor {
        let shard_cursors = self
            .shards
            .iter()
            .filter_map(|shard| shard.cursor())
            .collect();

        let current_shard_path = self
            .shards
            .get(self.shard_index)
            .map(|shard| shard.shard_path().to_string())
            .unwrap_or_default();

        SegmentCursor {
            segment_path: self.manifest_path.clone(),
            shard_cursors,
            current_shard_path,
        }
    }

    /// Start of the time bucket covered by the segment
    pub fn date_time(&self) -> DateTime<Utc> {
        self.date_time
    }

    /// Manifest path identifying the segment
    pub fn manifest_path(&self) -> &str {
        &self.manifest_path
    }

    /// Number of shards in the segment
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Shard the next read starts from
    pub fn shard_index(&self) -> usize {
        self.shard_index
    }

    /// Number of shards marked exhausted
    pub fn exhausted_shards(&self) -> usize {
        self.shard_done_count
    }

    /// Whether the shard at `index` is marked exhausted
    pub fn is_shard_done(&self, index: usize) -> bool {
        self.shard_done.get(index).copied().unwrap_or(false)
    }

    fn record_cancellation(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.increment_cancellations();
        }
    }
}
