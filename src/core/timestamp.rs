// LogTrim - core/timestamp.rs
//
// Timestamp resolution for decoded DataFlash records.
//
// The format stores time under several field names depending on message
// type and firmware age: microsecond counters (TimeUS, time_usec) and
// boot-relative millisecond counters (TimeMS, time_boot_ms). The resolver
// tries a fixed, data-driven candidate table in priority order; new log
// dialects are supported by extending the table, not by branching logic.

use crate::core::model::Record;

/// Recognised time fields in priority order, with the divisor that scales
/// the raw counter to seconds.
pub const TIMESTAMP_CANDIDATES: &[(&str, f64)] = &[
    ("TimeUS", 1_000_000.0),
    ("TimeMS", 1_000.0),
    ("time_usec", 1_000_000.0),
    ("time_boot_ms", 1_000.0),
];

/// Resolve a record's timestamp in seconds.
///
/// Returns the first present numeric candidate divided by its scale, or
/// `None` when the record carries no recognised time field.
pub fn resolve(record: &Record) -> Option<f64> {
    for (field, divisor) in TIMESTAMP_CANDIDATES {
        if let Some(raw) = record.numeric(field) {
            return Some(raw / divisor);
        }
    }
    None
}

/// Synthetic fallback clock for logs (or individual records) without a
/// recognised time field.
///
/// Ticks one unit per use, so every record still receives a strictly
/// increasing, comparable timestamp. Streams that ever fall back must be
/// flagged `has_time = false` so callers can warn that ordering is
/// synthetic, not measured.
#[derive(Debug, Default)]
pub struct FallbackClock {
    next: f64,
}

impl FallbackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next synthetic timestamp and advance the counter.
    pub fn tick(&mut self) -> f64 {
        let t = self.next;
        self.next += 1.0;
        t
    }
}
