// LogTrim - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Logging initialisation (debug mode support)
// 3. Config loading and validation
// 4. Command dispatch into the library crate

use clap::{Parser, Subcommand};
use logtrim::core::indexer;
use logtrim::core::model::{ExportOutcome, LogSummary};
use logtrim::core::segments::{self, Segment, SegmentSet};
use logtrim::platform::config::{self, AppConfig};
use logtrim::util::error::{LogTrimError, SegmentError};
use logtrim::util::{constants, logging};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

/// LogTrim - trim time ranges out of ArduPilot DataFlash flight logs.
///
/// Records inside the removed ranges are dropped; everything else is
/// copied byte-exactly, so the exported file is itself a valid log.
#[derive(Parser, Debug)]
#[command(name = "logtrim", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarise a log: record count, time range, timestamp provenance.
    Info {
        /// DataFlash .BIN log to inspect.
        log: PathBuf,

        /// Emit machine-readable JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Build and print the stride-decimated time index.
    Index {
        /// DataFlash .BIN log to index.
        log: PathBuf,

        /// Sample one record in every STRIDE (default from config).
        #[arg(long)]
        stride: Option<usize>,

        /// Emit machine-readable JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Export a trimmed copy of a log.
    Export {
        /// Source DataFlash .BIN log (left untouched).
        source: PathBuf,

        /// Destination path for the trimmed log.
        destination: PathBuf,

        /// Time range to remove, in seconds, as START..END. Repeatable.
        #[arg(long = "remove", value_name = "START..END")]
        remove: Vec<String>,

        /// Keep only this time range, removing everything else.
        /// Combines with --remove.
        #[arg(long = "keep", value_name = "START..END")]
        keep: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let paths = config::PlatformPaths::resolve();
    let (app_config, warnings) = config::load_config(&paths.config_dir);

    logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "LogTrim starting"
    );

    if let Err(e) = run(cli.command, &app_config) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, config: &AppConfig) -> Result<(), LogTrimError> {
    match command {
        Command::Info { log, json } => {
            let summary = indexer::summarize(&log)?;
            if json {
                println!("{}", to_json(&summary)?);
            } else {
                print_summary(&summary);
            }
            Ok(())
        }

        Command::Index { log, stride, json } => {
            let stride = stride.unwrap_or(config.index_stride);
            let index = indexer::build_index(&log, stride)?;
            if json {
                println!("{}", to_json(&index)?);
            } else {
                println!(
                    "{} samples spanning {:.3}s .. {:.3}s (stride {stride})",
                    index.points.len(),
                    index.start(),
                    index.end()
                );
                for p in &index.points {
                    println!("{:>12.3}s  record {:>8}  offset {:>10}", p.timestamp, p.sequence, p.offset);
                }
            }
            Ok(())
        }

        Command::Export {
            source,
            destination,
            remove,
            keep,
        } => {
            let summary = indexer::summarize(&source)?;
            let bounds = summary.time_range;

            let mut remove_set = match keep {
                Some(ref spec) => {
                    let selection = parse_range(spec)?;
                    segments::trim_to_selection(bounds, selection)?
                }
                None => SegmentSet::empty(),
            };
            for spec in &remove {
                // Removes may legitimately overshoot the log bounds
                // ("remove everything after 100s"); clamp instead of
                // rejecting.
                remove_set = remove_set.add(parse_range(spec)?);
            }
            remove_set = remove_set.clamp(bounds);
            remove_set.validate(bounds)?;

            let total = summary.message_count;
            let cancel = AtomicBool::new(false);
            let outcome = logtrim::core::export::export(
                &source,
                &destination,
                &remove_set,
                config.progress_every,
                |stats| {
                    eprintln!(
                        "  {}/{} records scanned, {} kept",
                        stats.records_seen, total, stats.records_kept
                    );
                },
                &cancel,
            )?;

            match outcome {
                ExportOutcome::Completed(stats) => {
                    println!(
                        "Exported {} of {} records ({} bytes) to '{}'",
                        stats.records_kept,
                        stats.records_seen,
                        stats.bytes_written,
                        destination.display()
                    );
                    Ok(())
                }
                ExportOutcome::Cancelled => {
                    println!("Export cancelled; no file written.");
                    Ok(())
                }
            }
        }
    }
}

/// Parse a "START..END" time range in seconds into a segment.
fn parse_range(spec: &str) -> Result<Segment, SegmentError> {
    let invalid = || SegmentError::Invalid {
        start: f64::NAN,
        end: f64::NAN,
    };
    let (start, end) = spec.split_once("..").ok_or_else(invalid)?;
    let start: f64 = start.trim().parse().map_err(|_| invalid())?;
    let end: f64 = end.trim().parse().map_err(|_| invalid())?;
    Segment::new(start, end)
}

fn print_summary(summary: &LogSummary) {
    println!("Path:       {}", summary.path.display());
    println!("Size:       {} bytes", summary.size_bytes);
    println!("Records:    {}", summary.message_count);
    println!(
        "Time range: {:.3}s .. {:.3}s ({:.3}s)",
        summary.time_range.start,
        summary.time_range.end,
        summary.time_range.duration()
    );
    if !summary.has_time {
        println!("Warning:    no time fields found; ordering is synthetic, not measured");
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, LogTrimError> {
    serde_json::to_string_pretty(value).map_err(|source| LogTrimError::Json { source })
}
