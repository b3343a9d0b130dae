use crate::common::harness::PlaygroundHarness;
use playground::hooks::{HookArgs, REBUILD_FINISHED, REBUILD_STARTED};
use playground::model::buffer::BufferKind;
use playground::model::console::ConsoleLevel;
use playground::model::generation::Generation;
use std::sync::{Arc, Mutex};

/// A burst of keystrokes inside the quiescence window yields one rebuild
/// that sees the final buffer state
#[tokio::test]
async fn test_burst_of_edits_yields_one_rebuild() {
    let mut harness = PlaygroundHarness::new();
    harness.select_buffer(BufferKind::Script);

    for ch in "console.log(42".chars() {
        harness.type_text(&ch.to_string());
        harness.advance_time(100);
        assert_eq!(harness.tick().await, None);
    }
    assert_eq!(harness.buffer(BufferKind::Script), "console.log(42)");

    harness.advance_time(700);
    assert_eq!(harness.tick().await, Some(Generation(1)));
    assert_eq!(harness.tick().await, None);

    harness.assert_console(&[(ConsoleLevel::Log, "42")]);
    assert_eq!(harness.playground().latest_generation(), Some(Generation(1)));
}

#[tokio::test]
async fn test_levels_and_joined_parts() {
    let mut harness = PlaygroundHarness::new();
    harness.set_sources(
        "",
        "",
        "console.log('a', 'b', 3); console.warn('w'); console.error('e', { k: 1 });",
    );
    harness.settle().await;

    harness.assert_console(&[
        (ConsoleLevel::Log, "a b 3"),
        (ConsoleLevel::Warn, "w"),
        (ConsoleLevel::Error, "e {\n  \"k\": 1\n}"),
    ]);
}

/// A throwing script yields exactly one error entry and the pipeline keeps working
#[tokio::test]
async fn test_throwing_script_then_recovery() {
    let mut harness = PlaygroundHarness::new();
    harness.set_sources("", "", "throw new Error('kaboom');");
    harness.settle().await;
    harness.assert_console(&[(ConsoleLevel::Error, "Script Error: kaboom")]);

    harness.playground_mut().clear_console();
    harness.set_sources("", "", "console.log('fixed');");
    assert_eq!(harness.settle().await, Some(Generation(2)));
    harness.assert_console(&[(ConsoleLevel::Log, "fixed")]);
}

#[tokio::test]
async fn test_syntax_error_reported_once() {
    let mut harness = PlaygroundHarness::new();
    harness.set_sources("", "", "let = ;");
    harness.settle().await;

    let messages = harness.console_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, ConsoleLevel::Error);
    assert!(messages[0].1.starts_with("Error: "), "got {:?}", messages[0].1);
}

/// Messages posted by a superseded document never reach the log
#[tokio::test]
async fn test_stale_posted_messages_are_dropped() {
    let mut harness = PlaygroundHarness::new();
    harness.set_sources("<p>hi</p>", "", "");
    harness.settle().await;
    harness.set_sources("<p>bye</p>", "", "");
    harness.settle().await;
    assert_eq!(harness.playground().accepted_generation(), Some(Generation(2)));

    let stale = r#"{"type":"console","level":"log","data":["old"],"generation":1}"#;
    let current = r#"{"type":"console","level":"warn","data":["new","one"],"generation":2}"#;
    assert!(!harness.playground_mut().receive_posted(stale));
    assert!(harness.playground_mut().receive_posted(current));
    assert!(!harness.playground_mut().receive_posted("{\"type\":\"bogus\"}"));

    harness.assert_console(&[(ConsoleLevel::Warn, "new one")]);
}

#[tokio::test]
async fn test_document_reflects_live_generation() {
    let mut harness = PlaygroundHarness::new();
    harness.set_sources("<h1>Title</h1>", "h1 { color: red; }", "console.log('x');");
    harness.settle().await;

    let document = harness.playground().document().unwrap();
    assert!(document.contains("<style>h1 { color: red; }</style>"));
    assert!(document.contains("<h1>Title</h1>"));
    assert!(document.contains("generation: 1"));
}

#[tokio::test]
async fn test_rebuild_hooks_fire_in_order() {
    let mut harness = PlaygroundHarness::new();
    let events = Arc::new(Mutex::new(Vec::new()));

    for name in [REBUILD_STARTED, REBUILD_FINISHED] {
        let events = Arc::clone(&events);
        harness.playground_mut().hooks_mut().add_hook(
            name,
            Box::new(move |args| {
                let label = match args {
                    HookArgs::RebuildStarted { generation } => format!("start {}", generation.0),
                    HookArgs::RebuildFinished {
                        generation,
                        accepted,
                        ..
                    } => format!("finish {} ({})", generation.0, accepted),
                    _ => return,
                };
                events.lock().unwrap().push(label);
            }),
        );
    }

    harness.set_sources("", "", "console.log(1); console.log(2);");
    harness.settle().await;

    assert_eq!(
        *events.lock().unwrap(),
        vec!["start 1".to_string(), "finish 1 (2)".to_string()]
    );
}

#[tokio::test]
async fn test_message_cap_per_run() {
    let mut config = playground::config::Config::default();
    config.sandbox.max_messages_per_run = 3;
    let mut harness = PlaygroundHarness::with_config(config);

    harness.set_sources("", "", "for (let i = 0; i < 10; i++) console.log(i);");
    harness.settle().await;

    let messages = harness.console_messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2], (ConsoleLevel::Log, "2".to_string()));
    assert_eq!(messages[3].0, ConsoleLevel::Warn);
}

#[test]
fn test_harness_routes_tracing_to_test_writer() {
    let _harness = PlaygroundHarness::new();
    assert!(tracing::dispatcher::has_been_set());
    tracing::warn!("visible in test output");
}
