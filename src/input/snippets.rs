//! Trigger-based snippet expansion.
//!
//! Typing `!` at the start of a line in the markup buffer offers the HTML5
//! document skeleton; Enter accepts it, Escape dismisses it.

use crate::model::buffer::BufferKind;
use crate::model::event::{Event, SuggestionKind, SuggestionState};
use crate::state::EditorState;

/// Character that offers the boilerplate suggestion
pub const BOILERPLATE_TRIGGER: char = '!';

/// The HTML5 document skeleton inserted by the boilerplate suggestion
pub const HTML5_BOILERPLATE: &str = concat!(
    "<!DOCTYPE html>\n",
    "<html lang=\"en\">\n",
    "<head>\n",
    "  <meta charset=\"UTF-8\">\n",
    "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    "  <title>Document</title>\n",
    "</head>\n",
    "<body>\n",
    "  \n",
    "</body>\n",
    "</html>",
);

/// Whether typing the trigger at `position` of the active buffer should
/// offer the boilerplate: markup buffer, and nothing but whitespace before
/// the cursor or the cursor sits right after a newline.
pub fn can_trigger_boilerplate(state: &EditorState, position: usize) -> bool {
    if state.active_kind() != BufferKind::Markup {
        return false;
    }
    match state.active_text().get(..position) {
        Some(before) => before.trim().is_empty() || before.ends_with('\n'),
        None => false,
    }
}

/// Offset into [`HTML5_BOILERPLATE`] where the cursor lands: the blank
/// indented line inside `<body>`.
fn boilerplate_cursor_offset() -> usize {
    const BODY_OPEN: &str = "<body>\n  ";
    HTML5_BOILERPLATE
        .find(BODY_OPEN)
        .map(|i| i + BODY_OPEN.len())
        .unwrap_or(HTML5_BOILERPLATE.len())
}

/// Events that accept `suggestion`: replace the text from the trigger
/// character up to the cursor with the snippet, then hide the suggestion.
pub fn accept_suggestion_events(state: &EditorState, suggestion: SuggestionState) -> Vec<Event> {
    let snippet = match suggestion.kind {
        SuggestionKind::Boilerplate => HTML5_BOILERPLATE,
    };

    let cursor = state.cursor().position();
    let trigger_position = suggestion.anchor_position.saturating_sub(1);
    let start = trigger_position.min(cursor);
    let end = trigger_position.max(cursor);

    let Some(replaced) = state.active_text().get(start..end) else {
        tracing::debug!(
            "Dropping stale suggestion anchored at {} (buffer length {})",
            suggestion.anchor_position,
            state.active_buffer().len()
        );
        return vec![Event::HideSuggestion];
    };

    let mut events = Vec::with_capacity(4);
    if !replaced.is_empty() {
        events.push(Event::Delete {
            range: start..end,
            deleted_text: replaced.to_string(),
        });
    }
    events.push(Event::Insert {
        position: start,
        text: snippet.to_string(),
    });
    events.push(Event::MoveCursor {
        old_position: start + snippet.len(),
        new_position: start + boilerplate_cursor_offset(),
    });
    events.push(Event::HideSuggestion);
    events
}

/// Suggestion created by typing the trigger at `position`
pub fn boilerplate_suggestion(position: usize) -> SuggestionState {
    SuggestionState {
        kind: SuggestionKind::Boilerplate,
        anchor_position: position + BOILERPLATE_TRIGGER.len_utf8(),
    }
}
