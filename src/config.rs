//! Configuration for the change-feed reader
//!
//! This module provides the options applied when segments are assembled from their
//! manifests.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::segment::SegmentPeriod;

/// Hard ceiling on shards per segment accepted by [`ReaderConfig::validate`]
pub const MAX_SHARDS_LIMIT: usize = 4096;

/// Configuration options for segment readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct ReaderConfig {
    /// Largest number of shards a segment manifest may list
    pub max_shards_per_segment: usize,
    /// Time bucket covered by one segment
    pub segment_period: SegmentPeriod,
    /// Enable metrics collection
    pub collect_metrics: bool,
    /// Emit a trace record for every delivered event
    pub log_events: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_shards_per_segment: 512,
            segment_period: SegmentPeriod::Hour,
            collect_metrics: true,
            log_events: false,
        }
    }
}

impl ReaderConfig {
    /// Create a new reader configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest number of shards per segment
    pub fn with_max_shards_per_segment(mut self, count: usize) -> Self {
        self.max_shards_per_segment = count;
        self
    }

    /// Set the segment time bucket
    pub fn with_segment_period(mut self, period: SegmentPeriod) -> Self {
        self.segment_period = period;
        self
    }

    /// Set whether to collect metrics
    pub fn with_collect_metrics(mut self, collect: bool) -> Self {
        self.collect_metrics = collect;
        self
    }

    /// Set whether to trace every delivered event
    pub fn with_log_events(mut self, log: bool) -> Self {
        self.log_events = log;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_shards_per_segment < 1 {
            return Err(Error::config(
                "Maximum shards per segment must be at least 1"
            ));
        }

        if self.max_shards_per_segment > MAX_SHARDS_LIMIT {
            return Err(Error::config(format!(
                "Maximum shards per segment must not exceed {}", MAX_SHARDS_LIMIT
            )));
        }

        Ok(())
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Create a human-readable string representation of the configuration
    pub fn to_string_pretty(&self) -> String {
        let mut result = String::new();

        result.push_str("=== Change Feed Reader Configuration ===\n\n");
        result.push_str(&format!("  Max Shards per Segment: {}\n", self.max_shards_per_segment));
        result.push_str(&format!("  Segment Period: {}\n", self.segment_period));
        result.push_str(&format!("  Collect Metrics: {}\n", self.collect_metrics));
        result.push_str(&format!("  Log Events: {}\n", self.log_events));

        result
    }

    /// Load configuration from a TOML file
    #[cfg(feature = "toml")]
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    #[cfg(feature = "toml")]
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize to TOML: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }
}
