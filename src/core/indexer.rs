// LogTrim - core/indexer.rs
//
// Single streaming pass over a log to produce aggregate statistics, a
// coarse time index for UI scrubbing, and downsampled per-channel plot
// series. Nothing here retains more than one record in flight; large logs
// cost O(index) memory, not O(records).

use crate::core::model::{ChannelSeries, IndexPoint, LogSummary, TimeIndex, TimeRange};
use crate::core::reader::RecordStream;
use crate::util::error::ParseError;
use std::path::Path;

/// One plot channel: a message type plus the field to sample from it.
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    pub label: String,
    pub message: String,
    pub field: String,
}

impl ChannelSpec {
    pub fn new(label: &str, message: &str, field: &str) -> Self {
        Self {
            label: label.to_string(),
            message: message.to_string(),
            field: field.to_string(),
        }
    }
}

/// The stock flight channels a scrubber UI plots by default.
pub fn default_channels() -> Vec<ChannelSpec> {
    vec![
        ChannelSpec::new("Altitude", "BARO", "Alt"),
        ChannelSpec::new("GPS speed", "GPS", "Spd"),
        ChannelSpec::new("Throttle", "RCOU", "C3"),
        ChannelSpec::new("Roll", "ATT", "Roll"),
        ChannelSpec::new("Pitch", "ATT", "Pitch"),
        ChannelSpec::new("Yaw", "ATT", "Yaw"),
    ]
}

/// Stream the whole log once and compute its summary.
///
/// Fails with `EmptyLog` when the stream yields zero records: an empty or
/// all-unparseable file is not a valid input for editing.
pub fn summarize(path: &Path) -> Result<LogSummary, ParseError> {
    let mut stream = RecordStream::open(path)?;
    let size_bytes = stream.file_size();

    let mut message_count: u64 = 0;
    let mut start_time: Option<f64> = None;
    let mut end_time = 0.0;

    while let Some(env) = stream.next_record()? {
        if start_time.is_none() {
            start_time = Some(env.timestamp);
        }
        end_time = env.timestamp;
        message_count += 1;
    }

    let start_time = start_time.ok_or_else(|| ParseError::EmptyLog {
        path: path.to_path_buf(),
    })?;

    let summary = LogSummary {
        path: path.to_path_buf(),
        size_bytes,
        message_count,
        time_range: TimeRange::new(start_time, end_time),
        has_time: stream.has_time(),
    };

    tracing::info!(
        path = %path.display(),
        records = message_count,
        start = start_time,
        end = end_time,
        has_time = summary.has_time,
        "Log summarised"
    );

    Ok(summary)
}

/// Build a stride-decimated time index: one `(timestamp, offset)` sample
/// every `stride` records, plus the final record so the index always spans
/// the full time range.
pub fn build_index(path: &Path, stride: usize) -> Result<TimeIndex, ParseError> {
    let stride = stride.max(1) as u64;
    let mut stream = RecordStream::open(path)?;

    let mut points = Vec::new();
    let mut last: Option<IndexPoint> = None;

    while let Some(env) = stream.next_record()? {
        let point = IndexPoint {
            timestamp: env.timestamp,
            offset: env.byte_start,
            sequence: env.sequence_number,
        };
        if env.sequence_number % stride == 0 {
            points.push(point);
        }
        last = Some(point);
    }

    let Some(last) = last else {
        return Err(ParseError::EmptyLog {
            path: path.to_path_buf(),
        });
    };
    if points.last().map(|p| p.sequence) != Some(last.sequence) {
        points.push(last);
    }

    tracing::debug!(
        path = %path.display(),
        samples = points.len(),
        stride,
        "Time index built"
    );

    Ok(TimeIndex { points })
}

/// Collect downsampled time series for the given channels in one pass.
///
/// Per channel, one matching sample in every `stride` is kept, up to
/// `max_points`; the pass ends early once every channel is full.
pub fn collect_series(
    path: &Path,
    channels: &[ChannelSpec],
    stride: usize,
    max_points: usize,
) -> Result<Vec<ChannelSeries>, ParseError> {
    let stride = stride.max(1);
    let mut stream = RecordStream::open(path)?;

    let mut series: Vec<ChannelSeries> = channels
        .iter()
        .map(|c| ChannelSeries {
            label: c.label.clone(),
            times: Vec::new(),
            values: Vec::new(),
        })
        .collect();
    let mut seen: Vec<usize> = vec![0; channels.len()];

    while let Some(env) = stream.next_record()? {
        let mut all_full = true;
        for (i, spec) in channels.iter().enumerate() {
            if series[i].times.len() >= max_points {
                continue;
            }
            all_full = false;

            if env.record.name != spec.message {
                continue;
            }
            let Some(value) = env.record.numeric(&spec.field) else {
                continue;
            };
            seen[i] += 1;
            if (seen[i] - 1) % stride != 0 {
                continue;
            }
            series[i].times.push(env.timestamp);
            series[i].values.push(value);
        }
        if all_full {
            break;
        }
    }

    Ok(series)
}
