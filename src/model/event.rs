use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Selection/cursor state of the active buffer, in byte offsets.
///
/// `selection_start == selection_end` means a plain cursor with no selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CursorState {
    pub selection_start: usize,
    pub selection_end: usize,
}

impl CursorState {
    /// A collapsed cursor at `position`
    pub fn at(position: usize) -> Self {
        Self {
            selection_start: position,
            selection_end: position,
        }
    }

    /// A selection spanning `start..end` (normalized so start <= end)
    pub fn selection(start: usize, end: usize) -> Self {
        Self {
            selection_start: start.min(end),
            selection_end: start.max(end),
        }
    }

    /// Cursor position (the start of the selection, where insertions happen)
    pub fn position(&self) -> usize {
        self.selection_start
    }

    pub fn has_selection(&self) -> bool {
        self.selection_start != self.selection_end
    }

    pub fn selection_range(&self) -> Option<Range<usize>> {
        self.has_selection()
            .then(|| self.selection_start..self.selection_end)
    }
}

/// Kind of a pending code-insertion suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionKind {
    /// HTML5 document skeleton
    Boilerplate,
}

/// A pending, user-confirmable suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionState {
    pub kind: SuggestionKind,
    /// Position just after the trigger character
    pub anchor_position: usize,
}

/// Core edit events produced by the editing engine.
///
/// A keystroke becomes an ordered list of events: text mutations first,
/// then the cursor placement. When several `MoveCursor` events appear in a
/// list, the last one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Insert text at a position of the active buffer
    Insert { position: usize, text: String },

    /// Delete a range of the active buffer
    Delete {
        range: Range<usize>,
        deleted_text: String,
    },

    /// Place the cursor (collapsing any selection)
    MoveCursor {
        old_position: usize,
        new_position: usize,
    },

    /// Show a suggestion popup
    ShowSuggestion { suggestion: SuggestionState },

    /// Hide the pending suggestion, if any
    HideSuggestion,
}

impl Event {
    /// Whether applying this event changes buffer text
    pub fn modifies_buffer(&self) -> bool {
        matches!(self, Event::Insert { .. } | Event::Delete { .. })
    }
}
