use crate::common::harness::PlaygroundHarness;
use playground::model::buffer::BufferKind;
use playground::model::console::ConsoleLevel;
use playground::model::generation::Generation;

/// Save (m, c, j) as X, change everything, load X: buffers restored exactly,
/// generation acceptance and the console reset
#[tokio::test]
async fn test_save_then_load_restores_buffers() {
    let mut harness = PlaygroundHarness::new();
    harness.set_sources("<p>m</p>", "p { margin: 0 }", "console.log('j');");
    harness.settle().await;
    assert!(harness.playground_mut().save_project("X"));
    assert_eq!(harness.playground().project_name(), "X");

    harness.set_sources("other", "other", "console.log('other');");
    harness.settle().await;
    assert!(!harness.console_messages().is_empty());

    assert!(harness.playground_mut().load_project("X"));

    assert_eq!(harness.buffer(BufferKind::Markup), "<p>m</p>");
    assert_eq!(harness.buffer(BufferKind::Style), "p { margin: 0 }");
    assert_eq!(harness.buffer(BufferKind::Script), "console.log('j');");
    assert_eq!(harness.playground().accepted_generation(), None);
    assert_eq!(harness.playground().live_generation(), None);
    assert!(harness.playground().console().is_empty());
    assert_eq!(
        harness.notifications(),
        vec![
            "Project \"X\" saved successfully!".to_string(),
            "Project \"X\" loaded!".to_string(),
        ]
    );

    // The loaded sources are rebuilt under a generation never used before
    assert_eq!(harness.settle().await, Some(Generation(3)));
    harness.assert_console(&[(ConsoleLevel::Log, "j")]);
}

#[test]
fn test_load_missing_project_leaves_state() {
    let mut harness = PlaygroundHarness::new();
    harness.set_sources("keep", "", "");

    assert!(!harness.playground_mut().load_project("nope"));

    assert_eq!(harness.buffer(BufferKind::Markup), "keep");
    assert_eq!(harness.notifications(), vec!["Project \"nope\" not found".to_string()]);
}

#[test]
fn test_unavailable_store_reports_and_keeps_editing() {
    let mut harness = PlaygroundHarness::with_unavailable_store();
    harness.set_sources("<p>draft</p>", "", "");

    assert!(!harness.playground_mut().save_project("draft"));
    assert!(!harness.playground_mut().load_project("draft"));
    assert!(harness.playground_mut().list_projects().is_empty());

    assert_eq!(harness.buffer(BufferKind::Markup), "<p>draft</p>");
    assert_eq!(harness.playground().project_name(), "Untitled");
    assert!(harness
        .notifications()
        .iter()
        .all(|n| n == "Project store unavailable"));
    assert_eq!(harness.notifications().len(), 3);
}

#[test]
fn test_projects_persist_in_json_store() {
    let mut harness = PlaygroundHarness::with_temp_store();
    harness.set_sources("<b>1</b>", "", "");
    assert!(harness.playground_mut().save_project("first"));
    harness.set_sources("<b>2</b>", "", "");
    assert!(harness.playground_mut().save_project("second"));
    harness.set_sources("<b>1 again</b>", "", "");
    assert!(harness.playground_mut().save_project("first"));

    let mut reopened = harness.reopen_store();
    let projects = reopened.playground_mut().list_projects();
    let mut names: Vec<_> = projects.iter().map(|p| p.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["first", "second"]);

    let first = projects.iter().find(|p| p.name == "first").unwrap();
    let second = projects.iter().find(|p| p.name == "second").unwrap();
    assert_ne!(first.id, second.id);

    assert!(reopened.playground_mut().load_project("first"));
    assert_eq!(reopened.buffer(BufferKind::Markup), "<b>1 again</b>");
}
