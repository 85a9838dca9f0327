// LogTrim - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::Serialize;
use std::path::PathBuf;

// =============================================================================
// Decoded record
// =============================================================================

/// One decoded field value from a DataFlash message payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    /// Any numeric column, already scaled to its engineering unit
    /// (e.g. `c`-coded centi-values are divided by 100).
    Float(f64),

    /// A char[4]/char[16]/char[64] column, NUL-trimmed.
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value, `None` for text columns.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

/// One decoded DataFlash message: a type tag plus named fields in
/// column order.
///
/// Records are owned transiently by the stream that produced them and are
/// not retained after iteration advances; anything that must outlive the
/// pass is carried by the envelope's byte range instead.
#[derive(Debug, Clone)]
pub struct Record {
    /// Binary message id from the 3-byte header.
    pub msg_id: u8,

    /// Message name from the FMT definition (e.g. "GPS", "ATT").
    pub name: String,

    /// Decoded `(column, value)` pairs in payload order.
    pub fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Look up a field by column name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Numeric value of a field, `None` if absent or textual.
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(FieldValue::as_f64)
    }
}

/// A decoded record together with its derived stream attributes.
///
/// `byte_start..byte_end` is the exact half-open span of this record in the
/// source file, non-overlapping with adjacent records' spans. Copying that
/// span verbatim reproduces the record byte-for-byte.
#[derive(Debug, Clone)]
pub struct RecordEnvelope {
    /// Monotonic, 0-based position in the stream.
    pub sequence_number: u64,

    /// Timestamp in seconds. Measured when the record carries a recognised
    /// time field, otherwise synthetic (see `LogSummary::has_time`).
    pub timestamp: f64,

    /// First byte of the record in the source file (inclusive).
    pub byte_start: u64,

    /// One past the last byte of the record (exclusive).
    pub byte_end: u64,

    /// The decoded message.
    pub record: Record,
}

// =============================================================================
// Log summary and time index
// =============================================================================

/// Inclusive time range `[start, end]` in seconds. Also used as the log
/// bounds that segment operations validate and invert against.
///
/// Unlike a `Segment`, a `TimeRange` may be degenerate (`start == end`),
/// which is what a single-record log produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Aggregate statistics for a loaded log, computed once per load by a
/// single streaming pass.
#[derive(Debug, Clone, Serialize)]
pub struct LogSummary {
    /// Source log path.
    pub path: PathBuf,

    /// File size in bytes.
    pub size_bytes: u64,

    /// Total number of records in the log.
    pub message_count: u64,

    /// First and last timestamp seen.
    pub time_range: TimeRange,

    /// True when at least one record carried a genuine time field.
    /// False means every timestamp is a synthetic per-record counter and
    /// the caller should warn that ordering is synthetic, not measured.
    pub has_time: bool,
}

/// One decimated sample of the time index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexPoint {
    pub timestamp: f64,
    pub offset: u64,
    pub sequence: u64,
}

/// Stride-decimated `(timestamp, offset)` samples, enough for a UI to
/// render a scrubber without materialising every record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeIndex {
    pub points: Vec<IndexPoint>,
}

impl TimeIndex {
    pub fn start(&self) -> f64 {
        self.points.first().map_or(0.0, |p| p.timestamp)
    }

    pub fn end(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.timestamp)
    }
}

/// Downsampled time series for one plot channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSeries {
    pub label: String,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

// =============================================================================
// Export outcome and progress
// =============================================================================

/// Counters accumulated during an export pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Records read from the source.
    pub records_seen: u64,

    /// Records whose byte ranges were copied to the destination.
    pub records_kept: u64,

    /// Bytes written to the destination.
    pub bytes_written: u64,
}

/// Terminal outcome of an export. Cancellation is cooperative and is a
/// distinct outcome, not an error: the partial destination file has been
/// removed by the time the caller sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Completed(ExportStats),
    Cancelled,
}

/// Progress messages sent by a background export job to its caller.
#[derive(Debug, Clone)]
pub enum ExportProgress {
    /// Export thread started. `total_records` is the indexer's count when
    /// the caller supplied one, enabling a determinate progress bar.
    Started { total_records: Option<u64> },

    /// Periodic counters, sent at a bounded cadence.
    Records(ExportStats),

    /// Export completed successfully.
    Completed(ExportStats),

    /// Export was cancelled; the partial destination has been removed.
    Cancelled,

    /// Export failed. The destination has been removed.
    Failed { error: String },
}
