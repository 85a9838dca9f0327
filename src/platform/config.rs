// LogTrim - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogTrim data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logtrim/).
    pub config_dir: PathBuf,

    /// Data directory for diagnostic logs.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[index]` section.
    pub index: IndexSection,
    /// `[export]` section.
    pub export: ExportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[index]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct IndexSection {
    /// Record stride for the scrubber time index.
    pub stride: Option<usize>,
    /// Per-channel downsampling stride for plot series.
    pub series_stride: Option<usize>,
    /// Cap on retained points per plot channel.
    pub max_series_points: Option<usize>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Progress callback cadence in records.
    pub progress_every: Option<u64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,

    /// Optional log file; diagnostics go to stderr and this file.
    pub file: Option<PathBuf>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time. Invalid
/// values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Record stride for the scrubber time index.
    pub index_stride: usize,

    /// Per-channel downsampling stride for plot series.
    pub series_stride: usize,

    /// Cap on retained points per plot channel.
    pub max_series_points: usize,

    /// Progress callback cadence in records.
    pub progress_every: u64,

    /// Logging level string (used before tracing is initialised).
    pub log_level: Option<String>,

    /// Optional log file to mirror diagnostics into.
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            index_stride: constants::DEFAULT_INDEX_STRIDE,
            series_stride: constants::DEFAULT_SERIES_STRIDE,
            max_series_points: constants::DEFAULT_MAX_SERIES_POINTS,
            progress_every: constants::DEFAULT_PROGRESS_EVERY_RECORDS,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. If the file does not exist, returns defaults with no warnings
/// (first-run). If the file is unparseable, returns defaults with an error
/// warning -- the application still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    // Validate each field against named constants, accumulating all errors.
    let mut config = AppConfig::default();

    // -- Index: stride --
    if let Some(stride) = raw.index.stride {
        if (constants::MIN_INDEX_STRIDE..=constants::MAX_INDEX_STRIDE).contains(&stride) {
            config.index_stride = stride;
        } else {
            warnings.push(format!(
                "[index] stride = {stride} is out of range ({}-{}). Using default ({}).",
                constants::MIN_INDEX_STRIDE,
                constants::MAX_INDEX_STRIDE,
                constants::DEFAULT_INDEX_STRIDE,
            ));
        }
    }

    // -- Index: series_stride --
    if let Some(stride) = raw.index.series_stride {
        if (1..=constants::MAX_SERIES_STRIDE).contains(&stride) {
            config.series_stride = stride;
        } else {
            warnings.push(format!(
                "[index] series_stride = {stride} is out of range (1-{}). Using default ({}).",
                constants::MAX_SERIES_STRIDE,
                constants::DEFAULT_SERIES_STRIDE,
            ));
        }
    }

    // -- Index: max_series_points --
    if let Some(points) = raw.index.max_series_points {
        if (1..=constants::ABSOLUTE_MAX_SERIES_POINTS).contains(&points) {
            config.max_series_points = points;
        } else {
            warnings.push(format!(
                "[index] max_series_points = {points} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_SERIES_POINTS,
                constants::DEFAULT_MAX_SERIES_POINTS,
            ));
        }
    }

    // -- Export: progress_every --
    if let Some(every) = raw.export.progress_every {
        if (constants::MIN_PROGRESS_EVERY_RECORDS..=constants::MAX_PROGRESS_EVERY_RECORDS)
            .contains(&every)
        {
            config.progress_every = every;
        } else {
            warnings.push(format!(
                "[export] progress_every = {every} is out of range ({}-{}). Using default ({}).",
                constants::MIN_PROGRESS_EVERY_RECORDS,
                constants::MAX_PROGRESS_EVERY_RECORDS,
                constants::DEFAULT_PROGRESS_EVERY_RECORDS,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    // Any path is accepted here; logging::init reports an unopenable file
    // at startup and falls back to stderr only.
    config.log_file = raw.logging.file;

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}
