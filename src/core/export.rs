// LogTrim - core/export.rs
//
// Single-pass trimmed-log exporter.
//
// Opens a fresh record stream over the source (second, independent pass —
// nothing from the indexing pass is replayed) and copies the exact byte
// range of every record whose timestamp is not covered by the remove set.
// Framing is reproduced verbatim, so the destination is itself a valid
// DataFlash log and re-parses with the same stream type.
//
// Cancellation is cooperative: the flag is checked at record boundaries,
// never mid-copy, and a cancelled or failed export removes the partial
// destination — there is no silent partial success.

use crate::core::dataflash::FMT_MSG_ID;
use crate::core::model::{ExportOutcome, ExportStats};
use crate::core::reader::RecordStream;
use crate::core::segments::SegmentSet;
use crate::util::error::ExportError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Export `source` minus the records covered by `remove` into
/// `destination`.
///
/// Membership uses closed-interval containment (`start <= t <= end`),
/// consistent with how segments are constructed everywhere else.
///
/// `progress` fires once every `progress_every` records so an interactive
/// caller is never flooded; `cancel` is polled between records.
pub fn export<F>(
    source: &Path,
    destination: &Path,
    remove: &SegmentSet,
    progress_every: u64,
    mut progress: F,
    cancel: &AtomicBool,
) -> Result<ExportOutcome, ExportError>
where
    F: FnMut(&ExportStats),
{
    if is_same_file(source, destination) {
        return Err(ExportError::DestinationIsSource {
            path: destination.to_path_buf(),
        });
    }

    let mut stream = RecordStream::open(source)?;

    let out = File::create(destination).map_err(|source| ExportError::Io {
        path: destination.to_path_buf(),
        operation: "create",
        source,
    })?;
    let mut writer = BufWriter::new(out);

    let progress_every = progress_every.max(1);
    let mut stats = ExportStats::default();
    let mut last_reported: u64 = 0;

    tracing::info!(
        source = %source.display(),
        destination = %destination.display(),
        remove_segments = remove.len(),
        "Export started"
    );

    loop {
        if cancel.load(Ordering::SeqCst) {
            drop(writer);
            remove_partial(destination);
            tracing::info!(
                destination = %destination.display(),
                records_seen = stats.records_seen,
                "Export cancelled"
            );
            return Ok(ExportOutcome::Cancelled);
        }

        let env = match stream.next_record() {
            Ok(Some(env)) => env,
            Ok(None) => break,
            Err(e) => {
                drop(writer);
                remove_partial(destination);
                return Err(e.into());
            }
        };

        stats.records_seen += 1;
        // FMT definitions are structural metadata, not telemetry: their
        // synthetic timestamps can land inside a removed range, and
        // dropping one would leave every later record of that type
        // undecodable. They are always kept.
        let keep = env.record.msg_id == FMT_MSG_ID || !remove.contains(env.timestamp);
        if keep {
            let raw = stream.raw_bytes(&env);
            if let Err(source) = writer.write_all(raw) {
                drop(writer);
                remove_partial(destination);
                return Err(ExportError::Io {
                    path: destination.to_path_buf(),
                    operation: "write",
                    source,
                });
            }
            stats.records_kept += 1;
            stats.bytes_written += raw.len() as u64;
        }

        if stats.records_seen % progress_every == 0 {
            progress(&stats);
            last_reported = stats.records_seen;
        }
    }

    if let Err(source) = writer.flush() {
        remove_partial(destination);
        return Err(ExportError::Io {
            path: destination.to_path_buf(),
            operation: "flush",
            source,
        });
    }

    // Final report, unless the loop's last periodic report already
    // carried the final counters.
    if stats.records_seen != last_reported {
        progress(&stats);
    }
    tracing::info!(
        destination = %destination.display(),
        records_kept = stats.records_kept,
        bytes_written = stats.bytes_written,
        "Export completed"
    );

    Ok(ExportOutcome::Completed(stats))
}

/// Best-effort removal of an incomplete destination file.
fn remove_partial(destination: &Path) {
    if let Err(e) = std::fs::remove_file(destination) {
        tracing::warn!(
            path = %destination.display(),
            error = %e,
            "Could not remove partial export file"
        );
    }
}

/// True when the two paths demonstrably refer to one file. The destination
/// usually does not exist yet, in which case canonicalisation fails and a
/// plain path comparison decides.
fn is_same_file(source: &Path, destination: &Path) -> bool {
    if source == destination {
        return true;
    }
    match (source.canonicalize(), destination.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
