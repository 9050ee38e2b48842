//! Segment time buckets
//!
//! Segments cover a fixed time bucket whose start is encoded in the manifest path,
//! e.g. `idx/segments/2019/02/22/1810/meta.json`. Only the hour of that path is
//! significant; reads over a time range are widened to whole buckets.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Time bucket covered by a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentPeriod {
    /// One hour of changes
    Hour,
    /// One day of changes
    Day,
}

impl fmt::Display for SegmentPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentPeriod::Hour => write!(f, "hour"),
            SegmentPeriod::Day => write!(f, "day"),
        }
    }
}

impl FromStr for SegmentPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            _ => Err(Error::config(format!("Unknown segment period: {}", s))),
        }
    }
}

impl SegmentPeriod {
    /// Length of the bucket
    pub fn duration(&self) -> ChronoDuration {
        match self {
            SegmentPeriod::Hour => ChronoDuration::hours(1),
            SegmentPeriod::Day => ChronoDuration::days(1),
        }
    }

    /// Start of the bucket containing `timestamp`
    pub fn floor(&self, timestamp: &DateTime<Utc>) -> DateTime<Utc> {
        let hour = match self {
            SegmentPeriod::Hour => timestamp.hour(),
            SegmentPeriod::Day => 0,
        };

        Utc.with_ymd_and_hms(timestamp.year(), timestamp.month(), timestamp.day(), hour, 0, 0)
            .single()
            .unwrap_or(*timestamp)
    }

    /// Smallest bucket boundary not before `timestamp`
    pub fn ceil(&self, timestamp: &DateTime<Utc>) -> DateTime<Utc> {
        let floor = self.floor(timestamp);
        if floor == *timestamp {
            floor
        } else {
            floor + self.duration()
        }
    }
}

/// Read the bucket start encoded in a segment manifest path
pub fn parse_segment_time(manifest_path: &str) -> Result<DateTime<Utc>> {
    let parts: Vec<&str> = manifest_path.split('/').collect();
    if parts.len() < 6 {
        return Err(Error::timestamp(format!(
            "Segment path has too few components: {}", manifest_path
        )));
    }

    if parts[0] != "idx" || parts[1] != "segments" {
        return Err(Error::timestamp(format!(
            "Segment path is not under idx/segments: {}", manifest_path
        )));
    }

    let year = parts[2].parse::<i32>().map_err(|_| {
        Error::timestamp(format!("Invalid year in segment path: {}", manifest_path))
    })?;

    let month = parts[3].parse::<u32>().map_err(|_| {
        Error::timestamp(format!("Invalid month in segment path: {}", manifest_path))
    })?;

    let day = parts[4].parse::<u32>().map_err(|_| {
        Error::timestamp(format!("Invalid day in segment path: {}", manifest_path))
    })?;

    // "1810" -> hour 18; minutes are not part of the bucket
    let hour = parts[5]
        .get(0..2)
        .and_then(|hour| hour.parse::<u32>().ok())
        .ok_or_else(|| {
            Error::timestamp(format!("Invalid hour in segment path: {}", manifest_path))
        })?;

    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).single().ok_or_else(|| {
        Error::timestamp(format!("Invalid date in segment path: {}", manifest_path))
    })
}

/// Manifest path of the hourly segment starting at `timestamp`
pub fn segment_manifest_path(timestamp: &DateTime<Utc>) -> String {
    format!(
        "idx/segments/{:04}/{:02}/{:02}/{:02}00/meta.json",
        timestamp.year(),
        timestamp.month(),
        timestamp.day(),
        timestamp.hour()
    )
}
