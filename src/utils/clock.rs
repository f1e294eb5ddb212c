// src/utils/clock.rs
//! Monotonic tick source for event timestamps
//!
//! Timestamps are written to the stream as absolute ticks; converting them to
//! file-relative times is a reader concern (the trace file records its own
//! open tick as the origin).

use once_cell::sync::Lazy;
use std::time::Instant;

static ORIGIN: Lazy<Instant> = Lazy::new(Instant::now);

/// Nanoseconds elapsed since the process-wide clock origin.
pub fn timestamp_ticks() -> u64 {
    ORIGIN.elapsed().as_nanos() as u64
}
