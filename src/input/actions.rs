//! Key interpretation for the editing engine.
//!
//! A key event is first offered to the interception rules (indent, snippet
//! trigger/confirm, auto-pair, auto-indent, cancel). Keys no rule claims
//! fall through to the default text-control behavior (plain insertion,
//! deletion and cursor movement).

use crate::config::EditorConfig;
use crate::input::snippets::{
    accept_suggestion_events, boilerplate_suggestion, can_trigger_boilerplate,
    BOILERPLATE_TRIGGER,
};
use crate::model::event::{CursorState, Event};
use crate::state::EditorState;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Get the matching close character for auto-pairing.
pub fn get_auto_close_char(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// Leading whitespace of the line containing `position`, up to `position`.
pub fn current_line_indent(text: &str, position: usize) -> &str {
    let Some(before) = text.get(..position) else {
        return "";
    };
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &before[line_start..];
    let indent_len = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..indent_len]
}

/// Events that replace the current selection (if any) with `text` and
/// place the cursor `cursor_offset` bytes after the insertion point.
fn replace_selection_events(
    state: &EditorState,
    cursor: CursorState,
    text: &str,
    cursor_offset: usize,
) -> Vec<Event> {
    let position = cursor.position();
    let mut events = Vec::with_capacity(3);

    if let Some(range) = cursor.selection_range() {
        let deleted_text = state
            .active_text()
            .get(range.clone())
            .unwrap_or_default()
            .to_string();
        events.push(Event::Delete {
            range,
            deleted_text,
        });
    }

    events.push(Event::Insert {
        position,
        text: text.to_string(),
    });
    events.push(Event::MoveCursor {
        old_position: position + text.len(),
        new_position: position + cursor_offset,
    });
    events
}

/// Whether a key event should be interpreted at all (presses and repeats)
fn is_press(key: &KeyEvent) -> bool {
    matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
}

/// Plain typing: no modifiers, or shift for shifted symbols
fn is_plain(key: &KeyEvent) -> bool {
    key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT
}

/// Apply the interception rules to a key.
///
/// Returns `Some(events)` when a rule claims the key (the events may be
/// empty, e.g. for a malformed cursor) and `None` when the key should fall
/// through to [`default_key_events`].
pub fn intercept_key(
    state: &EditorState,
    key: &KeyEvent,
    config: &EditorConfig,
) -> Option<Vec<Event>> {
    if !is_press(key) || !is_plain(key) {
        return None;
    }

    let cursor = state.cursor();
    if !state.cursor_is_valid() {
        tracing::debug!("Ignoring {:?} with malformed cursor {:?}", key.code, cursor);
        return Some(Vec::new());
    }
    let position = cursor.position();

    match key.code {
        // Indent: always intercepted
        KeyCode::Tab if key.modifiers == KeyModifiers::NONE => Some(replace_selection_events(
            state,
            cursor,
            &config.indent,
            config.indent.len(),
        )),

        // Snippet trigger, checked before auto-pairing and default insertion.
        // The trigger character itself is inserted so accepting the
        // suggestion has something to replace.
        KeyCode::Char(ch)
            if ch == BOILERPLATE_TRIGGER
                && config.snippets
                && can_trigger_boilerplate(state, position) =>
        {
            let mut events =
                replace_selection_events(state, cursor, &ch.to_string(), ch.len_utf8());
            events.push(Event::ShowSuggestion {
                suggestion: boilerplate_suggestion(position),
            });
            Some(events)
        }

        // Confirm a pending suggestion (never also auto-indents)
        KeyCode::Enter if state.suggestion().is_some() => {
            state
                .suggestion()
                .map(|suggestion| accept_suggestion_events(state, suggestion))
        }

        // Auto-pair
        KeyCode::Char(ch) if config.auto_pair => get_auto_close_char(ch).map(|close| {
            let pair = format!("{}{}", ch, close);
            replace_selection_events(state, cursor, &pair, ch.len_utf8())
        }),

        // Newline with auto-indent
        KeyCode::Enter if config.auto_indent => {
            let indent = current_line_indent(state.active_text(), position);
            let text = format!("\n{}", indent);
            let offset = text.len();
            Some(replace_selection_events(state, cursor, &text, offset))
        }

        // Cancel a pending suggestion
        KeyCode::Esc => Some(if state.suggestion().is_some() {
            vec![Event::HideSuggestion]
        } else {
            Vec::new()
        }),

        _ => None,
    }
}

/// Default text-control behavior for keys the interception rules did not
/// claim. Returns `None` for keys the text control ignores.
pub fn default_key_events(state: &EditorState, key: &KeyEvent) -> Option<Vec<Event>> {
    if !is_press(key) || !state.cursor_is_valid() {
        return None;
    }

    let cursor = state.cursor();
    let text = state.active_text();
    let position = cursor.position();

    match key.code {
        KeyCode::Char(ch) if is_plain(key) => Some(replace_selection_events(
            state,
            cursor,
            &ch.to_string(),
            ch.len_utf8(),
        )),

        KeyCode::Enter => Some(replace_selection_events(state, cursor, "\n", 1)),

        KeyCode::Backspace | KeyCode::Delete => {
            let range = match cursor.selection_range() {
                Some(range) => range,
                None if key.code == KeyCode::Backspace => {
                    let start = text[..position].char_indices().next_back()?.0;
                    start..position
                }
                None => {
                    let len = text[position..].chars().next()?.len_utf8();
                    position..position + len
                }
            };
            let start = range.start;
            Some(vec![
                Event::Delete {
                    deleted_text: text[range.clone()].to_string(),
                    range,
                },
                Event::MoveCursor {
                    old_position: start,
                    new_position: start,
                },
            ])
        }

        KeyCode::Left => {
            let new_position = if cursor.has_selection() {
                cursor.selection_start
            } else {
                text[..position]
                    .char_indices()
                    .next_back()
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            };
            Some(vec![Event::MoveCursor {
                old_position: position,
                new_position,
            }])
        }

        KeyCode::Right => {
            let new_position = if cursor.has_selection() {
                cursor.selection_end
            } else {
                text[position..]
                    .chars()
                    .next()
                    .map(|c| position + c.len_utf8())
                    .unwrap_or(position)
            };
            Some(vec![Event::MoveCursor {
                old_position: position,
                new_position,
            }])
        }

        KeyCode::Home => {
            let line_start = text[..position].rfind('\n').map(|i| i + 1).unwrap_or(0);
            Some(vec![Event::MoveCursor {
                old_position: position,
                new_position: line_start,
            }])
        }

        KeyCode::End => {
            let end = cursor.selection_end;
            let line_end = text[end..]
                .find('\n')
                .map(|i| end + i)
                .unwrap_or(text.len());
            Some(vec![Event::MoveCursor {
                old_position: position,
                new_position: line_end,
            }])
        }

        _ => None,
    }
}

/// Interpret a key: interception rules first, then the default behavior.
pub fn key_to_events(
    state: &EditorState,
    key: &KeyEvent,
    config: &EditorConfig,
) -> Option<Vec<Event>> {
    intercept_key(state, key, config).or_else(|| default_key_events(state, key))
}
