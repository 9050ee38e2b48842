//! Reader metrics
//!
//! Counters shared by every segment built from the same [`SegmentBuilder`](crate::segment::SegmentBuilder).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Performance metrics collector for segment reads
#[derive(Debug)]
pub struct ReaderMetrics {
    // Read outcomes
    /// Events delivered to callers
    events_read: AtomicUsize,
    /// Shard reads that returned no event
    empty_reads: AtomicUsize,
    /// Shards marked exhausted
    shards_exhausted: AtomicUsize,
    /// Shard reads that failed
    read_errors: AtomicUsize,
    /// Shard reads that were cancelled
    cancellations: AtomicUsize,
    /// Segments assembled
    segments_built: AtomicUsize,

    // Timing
    /// Total shard read duration in nanoseconds
    read_duration_ns: AtomicU64,
    /// Number of timed shard reads
    timed_reads: AtomicUsize,
    /// Last shard read duration
    last_read_duration: Mutex<Duration>,

    start_time: Instant,
}

impl Default for ReaderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            events_read: AtomicUsize::new(0),
            empty_reads: AtomicUsize::new(0),
            shards_exhausted: AtomicUsize::new(0),
            read_errors: AtomicUsize::new(0),
            cancellations: AtomicUsize::new(0),
            segments_built: AtomicUsize::new(0),
            read_duration_ns: AtomicU64::new(0),
            timed_reads: AtomicUsize::new(0),
            last_read_duration: Mutex::new(Duration::ZERO),
            start_time: Instant::now(),
        }
    }

    /// Record a completed shard read and whether it produced an event
    pub fn record_read(&self, duration: Duration, produced_event: bool) {
        if produced_event {
            self.events_read.fetch_add(1, Ordering::Relaxed);
        } else {
            self.empty_reads.fetch_add(1, Ordering::Relaxed);
        }

        self.read_duration_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        self.timed_reads.fetch_add(1, Ordering::Relaxed);
        *self.last_read_duration.lock() = duration;
    }

    /// Increment exhausted shard count
    pub fn increment_shards_exhausted(&self) {
        self.shards_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment failed read count
    pub fn increment_read_errors(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment cancelled read count
    pub fn increment_cancellations(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment assembled segment count
    pub fn increment_segments_built(&self) {
        self.segments_built.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_read: self.events_read.load(Ordering::Relaxed),
            empty_reads: self.empty_reads.load(Ordering::Relaxed),
            shards_exhausted: self.shards_exhausted.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            segments_built: self.segments_built.load(Ordering::Relaxed),
            total_read_duration: Duration::from_nanos(self.read_duration_ns.load(Ordering::Relaxed)),
            timed_reads: self.timed_reads.load(Ordering::Relaxed),
            last_read_duration: *self.last_read_duration.lock(),
            uptime: self.start_time.elapsed(),
        }
    }

    /// Reset every counter
    pub fn reset(&self) {
        self.events_read.store(0, Ordering::Relaxed);
        self.empty_reads.store(0, Ordering::Relaxed);
        self.shards_exhausted.store(0, Ordering::Relaxed);
        self.read_errors.store(0, Ordering::Relaxed);
        self.cancellations.store(0, Ordering::Relaxed);
        self.segments_built.store(0, Ordering::Relaxed);
        self.read_duration_ns.store(0, Ordering::Relaxed);
        self.timed_reads.store(0, Ordering::Relaxed);
        *self.last_read_duration.lock() = Duration::ZERO;
    }
}

/// Copy of [`ReaderMetrics`] at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub events_read: usize,
    pub empty_reads: usize,
    pub shards_exhausted: usize,
    pub read_errors: usize,
    pub cancellations: usize,
    pub segments_built: usize,
    pub total_read_duration: Duration,
    pub timed_reads: usize,
    pub last_read_duration: Duration,
    pub uptime: Duration,
}

impl MetricsSnapshot {
    /// Average duration of a completed shard read
    pub fn avg_read_duration(&self) -> Duration {
        if self.timed_reads == 0 {
            return Duration::ZERO;
        }

        self.total_read_duration / self.timed_reads as u32
    }

    /// Create a human-readable report
    pub fn report(&self) -> String {
        let mut result = String::new();

        result.push_str("=== Change Feed Reader Metrics ===\n\n");

        result.push_str("Read Outcomes:\n");
        result.push_str(&format!("  Events Read: {}\n", self.events_read));
        result.push_str(&format!("  Empty Reads: {}\n", self.empty_reads));
        result.push_str(&format!("  Read Errors: {}\n", self.read_errors));
        result.push_str(&format!("  Cancellations: {}\n", self.cancellations));

        result.push_str("\nSegments:\n");
        result.push_str(&format!("  Segments Built: {}\n", self.segments_built));
        result.push_str(&format!("  Shards Exhausted: {}\n", self.shards_exhausted));

        result.push_str("\nTiming:\n");
        result.push_str(&format!("  Avg. Read Duration: {:?}\n", self.avg_read_duration()));
        result.push_str(&format!("  Last Read Duration: {:?}\n", self.last_read_duration));
        result.push_str(&format!("  Uptime: {:?}\n", self.uptime));

        result
    }
}
