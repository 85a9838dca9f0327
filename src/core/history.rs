// LogTrim - core/history.rs
//
// Linear undo/redo history of segment-set snapshots.
//
// Snapshots are whole SegmentSet values, not deltas: undo/redo is O(1)
// per step and immune to reordering bugs. Standard editor semantics —
// committing after an undo discards the redo branch.
//
// The history is an explicit value owned by the edit session; there is no
// process-wide singleton.

use crate::core::segments::SegmentSet;
use crate::util::constants::MAX_HISTORY_DEPTH;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct EditHistory {
    undo: VecDeque<SegmentSet>,
    redo: Vec<SegmentSet>,
    current: SegmentSet,
}

impl EditHistory {
    /// Fresh history: empty remove set, nothing to undo or redo.
    pub fn new() -> Self {
        Self::default()
    }

    /// The state all operations read from.
    pub fn current(&self) -> &SegmentSet {
        &self.current
    }

    /// Record an edit: the previous state becomes undoable and any redo
    /// branch is discarded. The undo depth is capped at
    /// `MAX_HISTORY_DEPTH`; the oldest snapshot falls off first.
    pub fn commit(&mut self, new_state: SegmentSet) {
        if self.undo.len() == MAX_HISTORY_DEPTH {
            self.undo.pop_front();
        }
        self.undo.push_back(std::mem::replace(&mut self.current, new_state));
        self.redo.clear();
    }

    /// Step back one edit. Returns `None` when there is nothing to undo;
    /// the current state is unchanged in that case.
    pub fn undo(&mut self) -> Option<&SegmentSet> {
        let previous = self.undo.pop_back()?;
        self.redo.push(std::mem::replace(&mut self.current, previous));
        Some(&self.current)
    }

    /// Step forward one undone edit. Returns `None` when there is nothing
    /// to redo; the current state is unchanged in that case.
    pub fn redo(&mut self) -> Option<&SegmentSet> {
        let next = self.redo.pop()?;
        self.undo.push_back(std::mem::replace(&mut self.current, next));
        Some(&self.current)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}
