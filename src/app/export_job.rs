// LogTrim - app/export_job.rs
//
// Export lifecycle management. Runs the core exporter on a background
// thread, sending progress messages to the caller's thread via an mpsc
// channel.
//
// Architecture:
//   - `ExportManager` lives on the interactive thread; `run_export` runs
//     on a background thread.
//   - An `Arc<AtomicBool>` cancel flag lets the caller stop the export
//     cooperatively; the core checks it between records.
//   - All cross-thread communication is via `ExportProgress` messages.
//
// Two exports of the same source may run concurrently (read-only), but
// the caller must never run two exports with the same destination path;
// this manager enforces that for its own jobs by cancelling any running
// export and joining its thread before starting a new one, so the old
// job's destination writes and partial-file cleanup cannot interleave
// with the replacement's.

use crate::core::export;
use crate::core::model::{ExportOutcome, ExportProgress};
use crate::core::segments::SegmentSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

/// Manages one export operation on a background thread.
pub struct ExportManager {
    /// Channel receiver for the caller to poll progress messages.
    pub progress_rx: Option<mpsc::Receiver<ExportProgress>>,

    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,

    /// Handle of the background thread, joined before a replacement job
    /// may touch the filesystem.
    worker: Option<std::thread::JoinHandle<()>>,
}

impl ExportManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            cancel_flag: None,
            worker: None,
        }
    }

    /// Start exporting `source` minus `remove` into `destination`.
    ///
    /// Spawns a background thread immediately; progress arrives over the
    /// channel. If an export is already running it is cancelled and its
    /// thread joined first — cancellation latency is one record, so the
    /// join is short, and it guarantees the old job has finished writing
    /// (or unlinking) its destination before the new one creates its own.
    /// `total_records` (from the indexer) makes the progress determinate.
    pub fn start_export(
        &mut self,
        source: PathBuf,
        destination: PathBuf,
        remove: SegmentSet,
        progress_every: u64,
        total_records: Option<u64>,
    ) {
        self.cancel_export();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        self.progress_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        self.worker = Some(std::thread::spawn(move || {
            run_export(
                source,
                destination,
                remove,
                progress_every,
                total_records,
                tx,
                cancel,
            );
        }));

        tracing::info!("Export started");
    }

    /// Request cancellation of the running export. The background thread
    /// removes the partial destination and sends `Cancelled` before
    /// exiting.
    pub fn cancel_export(&mut self) {
        if let Some(flag) = &self.cancel_flag {
            flag.store(true, Ordering::SeqCst);
        }
        self.cancel_flag = None;
    }

    /// Poll for progress messages without blocking. Returns all pending
    /// messages.
    pub fn poll_progress(&self) -> Vec<ExportProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while let Ok(msg) = rx.try_recv() {
                messages.push(msg);
            }
        }
        messages
    }
}

impl Default for ExportManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Background export pipeline. Sends `ExportProgress` messages to `tx`;
/// a dropped receiver (caller closed) just silences further reports.
fn run_export(
    source: PathBuf,
    destination: PathBuf,
    remove: SegmentSet,
    progress_every: u64,
    total_records: Option<u64>,
    tx: mpsc::Sender<ExportProgress>,
    cancel: Arc<AtomicBool>,
) {
    let _ = tx.send(ExportProgress::Started { total_records });

    let progress_tx = tx.clone();
    let result = export::export(
        &source,
        &destination,
        &remove,
        progress_every,
        |stats| {
            let _ = progress_tx.send(ExportProgress::Records(*stats));
        },
        &cancel,
    );

    let terminal = match result {
        Ok(ExportOutcome::Completed(stats)) => ExportProgress::Completed(stats),
        Ok(ExportOutcome::Cancelled) => ExportProgress::Cancelled,
        Err(e) => {
            tracing::error!(error = %e, "Export failed");
            ExportProgress::Failed {
                error: e.to_string(),
            }
        }
    };
    let _ = tx.send(terminal);
}
