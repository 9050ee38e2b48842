//! Segment assembly
//!
//! Turns a segment manifest and an optional cursor into a positioned [`Segment`].
//! Shard resume offsets are resolved by the [`ShardFactory`]; the round-robin
//! position is re-bound by shard path, so a cursor stays valid if the manifest lists
//! its shards in a different order.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::metrics::ReaderMetrics;
use crate::models::SegmentCursor;
use crate::segment::{parse_segment_time, Segment, SegmentManifest};
use crate::shard::ShardFactory;

/// Builds segments whose shards come from one factory
#[derive(Debug)]
pub struct SegmentBuilder<F> {
    factory: F,
    config: ReaderConfig,
    metrics: Option<Arc<ReaderMetrics>>,
}

impl<F: ShardFactory> SegmentBuilder<F> {
    /// Create a builder with the default configuration
    pub fn new(factory: F) -> Self {
        let config = ReaderConfig::default();
        let metrics = config.collect_metrics.then(|| Arc::new(ReaderMetrics::new()));
        Self {
            factory,
            config,
            metrics,
        }
    }

    /// Create a builder with a custom configuration
    pub fn with_config(factory: F, config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        let metrics = config.collect_metrics.then(|| Arc::new(ReaderMetrics::new()));
        Ok(Self {
            factory,
            config,
            metrics,
        })
    }

    /// Metrics shared by every segment this builder creates
    pub fn metrics(&self) -> Option<&Arc<ReaderMetrics>> {
        self.metrics.as_ref()
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Assemble the segment described by `manifest`, resumed from `cursor` when given
    pub async fn build(
        &self,
        manifest_path: &str,
        manifest: &SegmentManifest,
        cursor: Option<&SegmentCursor>,
        cancel: &CancellationToken,
    ) -> Result<Segment<F::Shard>> {
        if let Some(cursor) = cursor {
            if cursor.segment_path != manifest_path {
                return Err(Error::cursor(format!(
                    "cursor for segment {} cannot resume segment {}",
                    cursor.segment_path, manifest_path
                )));
            }
        }

        let shard_paths = manifest.shard_paths();
        if shard_paths.len() > self.config.max_shards_per_segment {
            return Err(Error::manifest(
                manifest_path,
                format!(
                    "{} shards exceeds the limit of {}",
                    shard_paths.len(),
                    self.config.max_shards_per_segment
                ),
            ));
        }

        let date_time = self
            .config
            .segment_period
            .floor(&parse_segment_time(manifest_path)?);

        let shard_index = match cursor {
            Some(cursor) if !shard_paths.is_empty() => shard_paths
                .iter()
                .position(|path| *path == cursor.current_shard_path)
                .ok_or_else(|| {
                    Error::cursor(format!(
                        "shard {} is not part of segment {}",
                        cursor.current_shard_path, manifest_path
                    ))
                })?,
            _ => 0,
        };

        let mut shards = Vec::with_capacity(shard_paths.len());
        for shard_path in &shard_paths {
            let shard_cursor = cursor.and_then(|cursor| cursor.shard_cursor_for(shard_path));
            shards.push(
                self.factory
                    .create_shard(shard_path, shard_cursor, cancel)
                    .await?,
            );
        }

        debug!(
            segment = %manifest_path,
            shards = shards.len(),
            shard_index,
            resumed = cursor.is_some(),
            "Built segment"
        );

        let mut segment = Segment::new(shards, shard_index, date_time, manifest_path)
            .with_event_logging(self.config.log_events);
        if let Some(metrics) = &self.metrics {
            metrics.increment_segments_built();
            segment = segment.with_metrics(metrics.clone());
        }

        Ok(segment)
    }

    /// Decode `manifest_json` and assemble its segment
    pub async fn build_from_json(
        &self,
        manifest_path: &str,
        manifest_json: &str,
        cursor: Option<&SegmentCursor>,
        cancel: &CancellationToken,
    ) -> Result<Segment<F::Shard>> {
        let manifest = SegmentManifest::from_json(manifest_path, manifest_json)?;
        self.build(manifest_path, &manifest, cursor, cancel).await
    }
}
