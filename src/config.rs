use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Editing behavior (indentation, auto-pairing, snippets)
    #[serde(default)]
    pub editor: EditorConfig,

    /// Live rebuild pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Script sandbox settings
    #[serde(default)]
    pub sandbox: SandboxConfig,

    /// Console log settings
    #[serde(default)]
    pub console: ConsoleConfig,

    /// Project store settings
    #[serde(default)]
    pub store: StoreConfig,
}

/// Editing engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EditorConfig {
    /// Text inserted by the Tab key
    #[serde(default = "default_indent")]
    pub indent: String,

    /// Insert the matching closer after ( [ { " '
    #[serde(default = "default_true")]
    pub auto_pair: bool,

    /// Carry the current line's leading whitespace onto new lines
    #[serde(default = "default_true")]
    pub auto_indent: bool,

    /// Offer the HTML5 boilerplate when `!` is typed at the start of a line
    #[serde(default = "default_true")]
    pub snippets: bool,
}

/// Rebuild pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PipelineConfig {
    /// Quiescence window in milliseconds before edits trigger a rebuild
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Script sandbox configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SandboxConfig {
    /// Terminate a script that runs longer than this (milliseconds, 0 = never)
    #[serde(default = "default_script_timeout_ms")]
    pub script_timeout_ms: u64,

    /// Maximum diagnostics accepted from a single run (0 = unlimited).
    /// Once exceeded, one warning is logged and the rest of the run's
    /// output is dropped.
    #[serde(default = "default_max_messages_per_run")]
    pub max_messages_per_run: usize,
}

/// Console log configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConsoleConfig {
    /// Maximum retained console entries, oldest evicted first (0 = unbounded)
    #[serde(default = "default_console_max_entries")]
    pub max_entries: usize,
}

/// Project store configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StoreConfig {
    /// Path of the project file (defaults to the data directory)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_indent() -> String {
    "  ".to_string()
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    800
}

fn default_script_timeout_ms() -> u64 {
    5_000
}

fn default_max_messages_per_run() -> usize {
    1_000
}

fn default_console_max_entries() -> usize {
    5_000
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            auto_pair: true,
            auto_indent: true,
            snippets: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl PipelineConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            script_timeout_ms: default_script_timeout_ms(),
            max_messages_per_run: default_max_messages_per_run(),
        }
    }
}

impl SandboxConfig {
    pub fn script_timeout(&self) -> Option<Duration> {
        (self.script_timeout_ms > 0).then(|| Duration::from_millis(self.script_timeout_ms))
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_entries: default_console_max_entries(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            pipeline: PipelineConfig::default(),
            sandbox: SandboxConfig::default(),
            console: ConsoleConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from `path` if it exists, falling back to defaults
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(
                        "Failed to load config from {}: {}, using defaults",
                        path.display(),
                        e
                    );
                }
            }
        }
        Self::default()
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }
        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.editor.indent.contains('\n') {
            return Err(ConfigError::ValidationError(
                "editor.indent must not contain a newline".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}
