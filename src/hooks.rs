//! Hook System: Event subscription and notification for observers
//!
//! Hooks let a render layer or the CLI react to playground events without
//! the playground knowing about them. Inspired by Emacs' hook system.

use crate::model::buffer::BufferKind;
use crate::model::generation::Generation;
use crate::services::sandbox::host::RunOutcome;
use std::collections::HashMap;

/// Hook name constants
pub const BUFFER_CHANGED: &str = "buffer_changed";
pub const REBUILD_STARTED: &str = "rebuild_started";
pub const REBUILD_FINISHED: &str = "rebuild_finished";
pub const CONSOLE_CLEARED: &str = "console_cleared";
pub const PROJECT_LOADED: &str = "project_loaded";

/// Arguments passed to hook callbacks
#[derive(Debug, Clone)]
pub enum HookArgs {
    /// Buffer text changed through the editing engine
    BufferChanged { kind: BufferKind },

    /// A rebuild is about to run
    RebuildStarted { generation: Generation },

    /// A rebuild ran. `outcome` is `None` when the host failed to build the
    /// environment at all.
    RebuildFinished {
        generation: Generation,
        outcome: Option<RunOutcome>,
        /// Console entries accepted while draining after the run
        accepted: usize,
    },

    /// The console log was cleared
    ConsoleCleared,

    /// A stored project replaced the buffers
    ProjectLoaded { name: String },
}

impl HookArgs {
    /// The hook name these arguments belong to
    pub fn hook_name(&self) -> &'static str {
        match self {
            HookArgs::BufferChanged { .. } => BUFFER_CHANGED,
            HookArgs::RebuildStarted { .. } => REBUILD_STARTED,
            HookArgs::RebuildFinished { .. } => REBUILD_FINISHED,
            HookArgs::ConsoleCleared => CONSOLE_CLEARED,
            HookArgs::ProjectLoaded { .. } => PROJECT_LOADED,
        }
    }
}

/// Type for hook callbacks
pub type HookCallback = Box<dyn Fn(&HookArgs) + Send + Sync>;

/// Registry for managing hooks
pub struct HookRegistry {
    /// Map from hook name to list of callbacks
    hooks: HashMap<String, Vec<HookCallback>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Add a hook callback for a specific hook name (e.g. [`REBUILD_FINISHED`])
    pub fn add_hook(&mut self, name: &str, callback: HookCallback) {
        self.hooks
            .entry(name.to_string())
            .or_insert_with(Vec::new)
            .push(callback);
    }

    /// Remove all hooks for a specific name
    pub fn remove_hooks(&mut self, name: &str) {
        self.hooks.remove(name);
    }

    /// Run every callback registered for the hook `args` belongs to, in
    /// registration order
    pub fn run_hooks(&self, args: &HookArgs) {
        let name = args.hook_name();
        if let Some(hooks) = self.hooks.get(name) {
            tracing::trace!("Running {} hook(s) for '{}'", hooks.len(), name);
            for callback in hooks {
                callback(args);
            }
        }
    }

    /// Get count of registered callbacks for a hook
    pub fn hook_count(&self, name: &str) -> usize {
        self.hooks.get(name).map(|v| v.len()).unwrap_or(0)
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
