// PlaygroundHarness - drives a Playground with a manual clock for E2E testing

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use playground::config::Config;
use playground::model::buffer::{BufferKind, BufferSet};
use playground::model::console::ConsoleLevel;
use playground::model::generation::Generation;
use playground::services::notifications::NotificationLog;
use playground::services::store::{JsonProjectStore, MemoryProjectStore, ProjectStore};
use playground::services::time_source::TestTimeSource;
use playground::Playground;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test writer (RUST_LOG if set, otherwise warn).
/// Later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub struct PlaygroundHarness {
    playground: Playground,
    clock: Arc<TestTimeSource>,
    /// Keeps the project directory alive for JSON-backed harnesses
    _temp_dir: Option<TempDir>,
    store_path: Option<PathBuf>,
}

impl PlaygroundHarness {
    /// Default configuration with an in-memory project store
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, Box::new(MemoryProjectStore::new()), None, None)
    }

    /// Project store that fails every operation
    pub fn with_unavailable_store() -> Self {
        Self::build(
            Config::default(),
            Box::new(MemoryProjectStore::unavailable()),
            None,
            None,
        )
    }

    /// Projects persisted to a JSON file in a fresh temp directory
    pub fn with_temp_store() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("projects.json");
        Self::build(
            Config::default(),
            Box::new(JsonProjectStore::new(&path)),
            Some(temp_dir),
            Some(path),
        )
    }

    /// A second harness over the same project file as this one
    pub fn reopen_store(&self) -> Self {
        let path = self.store_path.clone().expect("harness has no project file");
        Self::with_store_at(&path)
    }

    pub fn with_store_at(path: &Path) -> Self {
        Self::build(
            Config::default(),
            Box::new(JsonProjectStore::new(path)),
            None,
            Some(path.to_path_buf()),
        )
    }

    fn build(
        config: Config,
        store: Box<dyn ProjectStore>,
        temp_dir: Option<TempDir>,
        store_path: Option<PathBuf>,
    ) -> Self {
        init_test_tracing();
        let clock = TestTimeSource::shared();
        let playground = Playground::new(config, store, NotificationLog::new(), clock.clone());
        Self {
            playground,
            clock,
            _temp_dir: temp_dir,
            store_path,
        }
    }

    pub fn playground(&self) -> &Playground {
        &self.playground
    }

    pub fn playground_mut(&mut self) -> &mut Playground {
        &mut self.playground
    }

    /// Send a key press. Returns true if buffer text changed.
    pub fn send_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.playground.handle_key(&KeyEvent::new(code, modifiers))
    }

    /// Type each character as a key press (`\n` as Enter)
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            let code = match ch {
                '\n' => KeyCode::Enter,
                ch => KeyCode::Char(ch),
            };
            self.send_key(code, KeyModifiers::NONE);
        }
    }

    pub fn select_buffer(&mut self, kind: BufferKind) {
        self.playground.set_active(kind);
    }

    pub fn set_sources(&mut self, markup: &str, style: &str, script: &str) {
        self.playground
            .set_sources(BufferSet::from_sources(markup, style, script));
    }

    pub fn buffer_content(&self) -> String {
        self.playground.state().active_text().to_string()
    }

    pub fn buffer(&self, kind: BufferKind) -> String {
        self.playground.state().buffers().get(kind).text().to_string()
    }

    pub fn assert_buffer_content(&self, expected: &str) {
        assert_eq!(
            self.buffer_content(),
            expected,
            "active buffer content mismatch"
        );
    }

    pub fn cursor_position(&self) -> usize {
        self.playground.state().cursor().position()
    }

    pub fn advance_time(&self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
    }

    /// Poll the pipeline once at the current time
    pub async fn tick(&mut self) -> Option<Generation> {
        self.playground.tick().await
    }

    /// Let the debounce window elapse and run the pending rebuild
    pub async fn settle(&mut self) -> Option<Generation> {
        if let Some(remaining) = self.playground.time_until_rebuild() {
            self.clock.advance(remaining);
        }
        self.playground.tick().await
    }

    pub fn console_messages(&self) -> Vec<(ConsoleLevel, String)> {
        self.playground
            .console()
            .list()
            .map(|entry| (entry.level, entry.message.clone()))
            .collect()
    }

    pub fn assert_console(&self, expected: &[(ConsoleLevel, &str)]) {
        let expected: Vec<(ConsoleLevel, String)> = expected
            .iter()
            .map(|(level, message)| (*level, message.to_string()))
            .collect();
        assert_eq!(self.console_messages(), expected, "console log mismatch");
    }

    /// Notification messages received so far
    pub fn notifications(&self) -> Vec<String> {
        self.playground
            .notifications()
            .all()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}
