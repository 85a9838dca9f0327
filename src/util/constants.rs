// LogTrim - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogTrim";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogTrim";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Indexing limits
// =============================================================================

/// Default record stride for the scrubber time index: one `(timestamp,
/// offset)` sample is retained every this many records.
pub const DEFAULT_INDEX_STRIDE: usize = 50;

/// Minimum user-configurable index stride.
pub const MIN_INDEX_STRIDE: usize = 1;

/// Maximum user-configurable index stride (prevents configuration mistakes
/// that would leave the scrubber with almost no samples).
pub const MAX_INDEX_STRIDE: usize = 100_000;

/// Default per-channel downsampling stride for plot series: one matching
/// sample in every this many is kept.
pub const DEFAULT_SERIES_STRIDE: usize = 3;

/// Maximum user-configurable series stride.
pub const MAX_SERIES_STRIDE: usize = 10_000;

/// Default cap on retained points per plot channel.
pub const DEFAULT_MAX_SERIES_POINTS: usize = 5_000;

/// Hard upper bound on points per plot channel.
pub const ABSOLUTE_MAX_SERIES_POINTS: usize = 1_000_000;

// =============================================================================
// Export limits
// =============================================================================

/// Default progress-report cadence during export and indexing: the progress
/// callback fires once every this many records. Bounds the message rate seen
/// by an interactive caller regardless of log size.
pub const DEFAULT_PROGRESS_EVERY_RECORDS: u64 = 5_000;

/// Minimum user-configurable progress cadence.
pub const MIN_PROGRESS_EVERY_RECORDS: u64 = 1;

/// Maximum user-configurable progress cadence.
pub const MAX_PROGRESS_EVERY_RECORDS: u64 = 1_000_000;

// =============================================================================
// Edit history limits
// =============================================================================

/// Maximum number of undo snapshots retained. Each snapshot is a full
/// segment set, so the cap bounds memory without changing undo semantics
/// for any realistic editing session.
pub const MAX_HISTORY_DEPTH: usize = 256;

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config specify one.
pub const DEFAULT_LOG_LEVEL: &str = "info";
