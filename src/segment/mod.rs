//! Time-bucketed segments of the change feed
//!
//! A segment groups the shards holding one time bucket (an hour by default) of
//! change events. The [`Segment`] type merges its shards into a single ordered
//! stream; [`SegmentBuilder`] assembles segments from their manifests and cursors.

mod builder;
mod manifest;
mod merger;
mod period;

pub use builder::SegmentBuilder;
pub use manifest::{SegmentManifest, SegmentStatus, CHANGE_FEED_CONTAINER};
pub use merger::Segment;
pub use period::{parse_segment_time, segment_manifest_path, SegmentPeriod};
