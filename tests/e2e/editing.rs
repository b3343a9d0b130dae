use crate::common::harness::PlaygroundHarness;
use crossterm::event::{KeyCode, KeyModifiers};
use playground::config::Config;
use playground::input::snippets::HTML5_BOILERPLATE;
use playground::model::buffer::BufferKind;

/// Auto-pairing inserts opener and closer and leaves the cursor between them
#[test]
fn test_auto_pair_all_pairs_mid_text() {
    for (open, close) in [('(', ')'), ('[', ']'), ('{', '}'), ('"', '"'), ('\'', '\'')] {
        let mut harness = PlaygroundHarness::new();
        harness.set_sources("ab", "", "");
        harness.send_key(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(harness.cursor_position(), 1);

        harness.type_text(&open.to_string());

        harness.assert_buffer_content(&format!("a{}{}b", open, close));
        assert_eq!(harness.cursor_position(), 2, "cursor after {:?}", open);
    }
}

/// Enter carries the leading whitespace of the current line
#[test]
fn test_newline_keeps_indentation() {
    let mut harness = PlaygroundHarness::new();
    harness.set_sources("  foo", "", "");
    harness.send_key(KeyCode::End, KeyModifiers::NONE);

    harness.send_key(KeyCode::Enter, KeyModifiers::NONE);

    harness.assert_buffer_content("  foo\n  ");
    assert_eq!(harness.cursor_position(), "  foo\n  ".len());
}

#[test]
fn test_tab_inserts_indent() {
    let mut harness = PlaygroundHarness::new();
    harness.send_key(KeyCode::Tab, KeyModifiers::NONE);
    harness.type_text("x");
    harness.assert_buffer_content("  x");
}

/// `!` then Enter at the start of the markup buffer yields exactly the skeleton
#[test]
fn test_boilerplate_expansion() {
    let mut harness = PlaygroundHarness::new();

    harness.type_text("!");
    assert!(harness.playground().state().suggestion().is_some());

    harness.send_key(KeyCode::Enter, KeyModifiers::NONE);

    harness.assert_buffer_content(HTML5_BOILERPLATE);
    assert!(harness.playground().state().suggestion().is_none());

    // Typing continues inside <body>
    harness.type_text("hi");
    assert!(harness.buffer_content().contains("<body>\n  hi\n</body>"));
}

#[test]
fn test_escape_dismisses_boilerplate() {
    let mut harness = PlaygroundHarness::new();
    harness.type_text("!");
    harness.send_key(KeyCode::Esc, KeyModifiers::NONE);
    assert!(harness.playground().state().suggestion().is_none());

    harness.send_key(KeyCode::Enter, KeyModifiers::NONE);
    harness.assert_buffer_content("!\n");
}

#[test]
fn test_boilerplate_only_offered_in_markup() {
    let mut harness = PlaygroundHarness::new();
    harness.select_buffer(BufferKind::Style);
    harness.type_text("!");
    assert!(harness.playground().state().suggestion().is_none());
    harness.assert_buffer_content("!");
    assert_eq!(harness.buffer(BufferKind::Markup), "");
}

#[test]
fn test_boilerplate_not_offered_mid_line() {
    let mut harness = PlaygroundHarness::new();
    harness.type_text("<p>!");
    assert!(harness.playground().state().suggestion().is_none());
    harness.assert_buffer_content("<p>!");
}

#[test]
fn test_switching_buffers_dismisses_suggestion() {
    let mut harness = PlaygroundHarness::new();
    harness.set_sources("", "body {}", "");
    harness.type_text("!");

    harness.select_buffer(BufferKind::Style);

    assert!(harness.playground().state().suggestion().is_none());
    assert_eq!(harness.cursor_position(), "body {}".len());
}

#[test]
fn test_disabled_features_fall_through() {
    let mut config = Config::default();
    config.editor.auto_pair = false;
    config.editor.auto_indent = false;
    config.editor.snippets = false;
    let mut harness = PlaygroundHarness::with_config(config);

    harness.type_text("  (!");
    harness.send_key(KeyCode::Enter, KeyModifiers::NONE);

    harness.assert_buffer_content("  (!\n");
    assert!(harness.playground().state().suggestion().is_none());
}

#[test]
fn test_backspace_and_delete() {
    let mut harness = PlaygroundHarness::new();
    harness.set_sources("abc", "", "");
    harness.send_key(KeyCode::Right, KeyModifiers::NONE);
    harness.send_key(KeyCode::Backspace, KeyModifiers::NONE);
    harness.assert_buffer_content("bc");
    harness.send_key(KeyCode::Delete, KeyModifiers::NONE);
    harness.assert_buffer_content("c");
    assert_eq!(harness.cursor_position(), 0);
}

/// Text changes schedule a rebuild; cursor movement does not
#[test]
fn test_only_mutations_schedule_rebuilds() {
    let mut harness = PlaygroundHarness::new();
    harness.playground_mut().set_active(BufferKind::Script);
    assert!(!harness.send_key(KeyCode::Left, KeyModifiers::NONE));
    assert!(!harness.playground().rebuild_pending());

    assert!(harness.send_key(KeyCode::Char('x'), KeyModifiers::NONE));
    assert!(harness.playground().rebuild_pending());
}
