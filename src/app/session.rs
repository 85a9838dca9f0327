// LogTrim - app/session.rs
//
// One editing session over a loaded log: the summary-derived time bounds,
// the current remove set, and its undo/redo history. The session owns the
// history explicitly; editing operations go through it so every mutation
// is validated against the log bounds and recorded as a snapshot.
//
// The session never touches the source file — export re-streams it
// separately, guided by the remove set held here.

use crate::core::history::EditHistory;
use crate::core::model::{LogSummary, TimeRange};
use crate::core::segments::{self, Segment, SegmentSet};
use crate::util::error::SegmentError;

pub struct EditSession {
    summary: LogSummary,
    history: EditHistory,
}

impl EditSession {
    /// Start a session on a freshly summarised log: nothing removed,
    /// nothing to undo.
    pub fn new(summary: LogSummary) -> Self {
        Self {
            summary,
            history: EditHistory::new(),
        }
    }

    pub fn summary(&self) -> &LogSummary {
        &self.summary
    }

    /// The log's time bounds that all selections are validated against.
    pub fn bounds(&self) -> TimeRange {
        self.summary.time_range
    }

    /// The canonical edit state: what will be removed on export.
    pub fn remove_set(&self) -> &SegmentSet {
        self.history.current()
    }

    /// The complement view: the time ranges that survive an export.
    pub fn keep_ranges(&self) -> SegmentSet {
        self.history.current().invert(self.bounds())
    }

    /// Keep only `selection`, removing everything else.
    pub fn trim_to_selection(&mut self, selection: Segment) -> Result<&SegmentSet, SegmentError> {
        let new_state = segments::trim_to_selection(self.bounds(), selection)?;
        self.history.commit(new_state);
        tracing::debug!(
            start = selection.start(),
            end = selection.end(),
            "Trimmed to selection"
        );
        Ok(self.history.current())
    }

    /// Cut `selection` out: union it into the remove set.
    pub fn add_remove_segment(&mut self, selection: Segment) -> Result<&SegmentSet, SegmentError> {
        selection.validate(self.bounds())?;
        let new_state = self.history.current().add(selection);
        self.history.commit(new_state);
        tracing::debug!(
            start = selection.start(),
            end = selection.end(),
            segments = self.history.current().len(),
            "Remove segment added"
        );
        Ok(self.history.current())
    }

    /// Discard all edits (recorded as an undoable step itself).
    pub fn clear(&mut self) -> &SegmentSet {
        self.history.commit(SegmentSet::empty());
        self.history.current()
    }

    /// Step back one edit; `None` signals "nothing to undo".
    pub fn undo(&mut self) -> Option<&SegmentSet> {
        self.history.undo()
    }

    /// Step forward one undone edit; `None` signals "nothing to redo".
    pub fn redo(&mut self) -> Option<&SegmentSet> {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}
