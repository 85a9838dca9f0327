// LogTrim - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation. All errors preserve the causal
// chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogTrim operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogTrimError {
    /// Log parsing failed.
    Parse(ParseError),

    /// A segment was malformed or outside the log's time bounds.
    Segment(SegmentError),

    /// Export operation failed.
    Export(ExportError),

    /// JSON serialisation error (machine-readable CLI output).
    Json { source: serde_json::Error },

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogTrimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Segment(e) => write!(f, "Segment error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Json { source } => write!(f, "JSON output error: {source}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogTrimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Segment(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Json { source } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Errors produced by the DataFlash record stream and indexer.
#[derive(Debug)]
pub enum ParseError {
    /// The byte offsets of subsequent records can no longer be trusted.
    ///
    /// This is fatal for the whole operation: continuing past the offending
    /// offset would desynchronise the record timeline from the real file and
    /// silently corrupt any export built on it.
    StructuralCorruption {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    /// The log contains no records. An empty or all-unparseable file is not
    /// a valid input for editing.
    EmptyLog { path: PathBuf },

    /// I/O error while opening or reading a log file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuralCorruption {
                path,
                offset,
                reason,
            } => write!(
                f,
                "'{}': structural corruption at byte offset {offset}: {reason}",
                path.display()
            ),
            Self::EmptyLog { path } => {
                write!(f, "'{}': log contains no records", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ParseError> for LogTrimError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Segment errors
// ---------------------------------------------------------------------------

/// Errors related to time-segment construction and validation.
///
/// Invalid segments are rejected at the point of construction, never
/// silently coerced or filtered, so a user-selection bug surfaces
/// immediately rather than masking itself as a smaller edit.
#[derive(Debug)]
pub enum SegmentError {
    /// Segment start is not strictly before its end.
    Invalid { start: f64, end: f64 },

    /// Segment lies partly or wholly outside the log's time bounds.
    OutOfRange {
        start: f64,
        end: f64,
        bounds_start: f64,
        bounds_end: f64,
    },
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { start, end } => {
                write!(f, "segment [{start}, {end}] has start >= end")
            }
            Self::OutOfRange {
                start,
                end,
                bounds_start,
                bounds_end,
            } => write!(
                f,
                "segment [{start}, {end}] is outside log bounds [{bounds_start}, {bounds_end}]"
            ),
        }
    }
}

impl std::error::Error for SegmentError {}

impl From<SegmentError> for LogTrimError {
    fn from(e: SegmentError) -> Self {
        Self::Segment(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to the trimmed-log exporter.
///
/// Cancellation is not an error: it is a distinct terminal outcome reported
/// via `core::model::ExportOutcome::Cancelled`.
#[derive(Debug)]
pub enum ExportError {
    /// The source could not be parsed during the export pass.
    Parse(ParseError),

    /// Destination path refers to the source file. Export always writes to
    /// a distinct destination so the source stays intact for further edits.
    DestinationIsSource { path: PathBuf },

    /// I/O error on the destination file.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::DestinationIsSource { path } => write!(
                f,
                "destination '{}' is the source file itself",
                path.display()
            ),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ParseError> for ExportError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<ExportError> for LogTrimError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for LogTrim results.
pub type Result<T> = std::result::Result<T, LogTrimError>;
