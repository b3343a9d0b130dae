//! Editor state: the three buffers, the active-buffer selector, the cursor
//! and any pending suggestion.
//!
//! All mutations go through [`EditorState::apply`], which keeps the cursor
//! valid for the active buffer after every change.

use crate::model::buffer::{Buffer, BufferKind, BufferSet};
use crate::model::event::{CursorState, Event, SuggestionState};

#[derive(Debug, Clone)]
pub struct EditorState {
    buffers: BufferSet,
    active: BufferKind,
    cursor: CursorState,
    suggestion: Option<SuggestionState>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::with_buffers(BufferSet::new())
    }

    pub fn with_buffers(buffers: BufferSet) -> Self {
        Self {
            buffers,
            active: BufferKind::Markup,
            cursor: CursorState::default(),
            suggestion: None,
        }
    }

    pub fn buffers(&self) -> &BufferSet {
        &self.buffers
    }

    pub fn active_kind(&self) -> BufferKind {
        self.active
    }

    pub fn active_buffer(&self) -> &Buffer {
        self.buffers.get(self.active)
    }

    pub fn active_text(&self) -> &str {
        self.active_buffer().text()
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn suggestion(&self) -> Option<SuggestionState> {
        self.suggestion
    }

    /// Whether the cursor is consistent with the active buffer
    pub fn cursor_is_valid(&self) -> bool {
        let buffer = self.active_buffer();
        self.cursor.selection_start <= self.cursor.selection_end
            && buffer.is_valid_position(self.cursor.selection_start)
            && buffer.is_valid_position(self.cursor.selection_end)
    }

    /// Set the cursor/selection. Invalid positions are rejected.
    pub fn set_cursor(&mut self, cursor: CursorState) -> bool {
        let buffer = self.active_buffer();
        if !buffer.is_valid_position(cursor.selection_start)
            || !buffer.is_valid_position(cursor.selection_end)
        {
            tracing::debug!(
                "Rejecting cursor {:?} for {} buffer of length {}",
                cursor,
                self.active,
                buffer.len()
            );
            return false;
        }
        self.cursor = CursorState::selection(cursor.selection_start, cursor.selection_end);
        true
    }

    /// Switch the active buffer. The cursor moves to the end of the new
    /// buffer and any pending suggestion is dismissed.
    pub fn set_active(&mut self, kind: BufferKind) -> bool {
        if kind == self.active {
            return false;
        }
        self.active = kind;
        self.cursor = CursorState::at(self.active_buffer().len());
        self.suggestion = None;
        true
    }

    /// Replace all three buffers (project load). Resets cursor and suggestion.
    pub fn replace_buffers(&mut self, buffers: BufferSet) {
        self.buffers = buffers;
        self.cursor = CursorState::default();
        self.suggestion = None;
    }

    /// Apply a single event to the active buffer.
    ///
    /// Returns false if the event could not be applied (invalid offsets);
    /// the state is left unchanged in that case.
    pub fn apply(&mut self, event: &Event) -> bool {
        match event {
            Event::Insert { position, text } => {
                let buffer = self.buffers.get_mut(self.active);
                if !buffer.insert(*position, text) {
                    tracing::debug!("Ignoring insert at invalid position {}", position);
                    return false;
                }
                self.cursor = CursorState::at(position + text.len());
                true
            }
            Event::Delete { range, .. } => {
                let buffer = self.buffers.get_mut(self.active);
                if buffer.delete(range.clone()).is_none() {
                    tracing::debug!("Ignoring delete of invalid range {:?}", range);
                    return false;
                }
                self.cursor = CursorState::at(range.start);
                true
            }
            Event::MoveCursor { new_position, .. } => self.set_cursor(CursorState::at(*new_position)),
            Event::ShowSuggestion { suggestion } => {
                self.suggestion = Some(*suggestion);
                true
            }
            Event::HideSuggestion => {
                self.suggestion = None;
                true
            }
        }
    }

    /// Apply events in order. Stops at the first event that cannot be
    /// applied. Returns true if any buffer text changed.
    pub fn apply_all(&mut self, events: &[Event]) -> bool {
        let mut modified = false;
        for event in events {
            if !self.apply(event) {
                break;
            }
            modified |= event.modifies_buffer();
        }
        modified
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}
