//! The playground: single owner of editor state and the live pipeline.
//!
//! Edits go through the editing engine, restart the debounce timer and,
//! once the buffers are quiet, produce a new generation that the sandbox
//! host builds and runs. Diagnostics flow back through the generation gate
//! into the console log. Everything here runs on one thread.

mod input;
mod projects;

use crate::config::Config;
use crate::hooks::{HookArgs, HookRegistry};
use crate::model::console::{ConsoleEntry, ConsoleLevel, ConsoleLog};
use crate::model::generation::{Generation, GenerationCounter};
use crate::services::debounce::DebounceScheduler;
use crate::services::notifications::{NotificationLog, NotificationSink};
use crate::services::sandbox::channel::{parse_posted, DiagnosticChannel, DrainStats};
use crate::services::sandbox::host::{RunOutcome, SandboxHost};
use crate::services::store::ProjectStore;
use crate::services::time_source::SharedTimeSource;
use crate::state::EditorState;
use std::time::Duration;

/// Name of a playground that has never been saved or loaded
pub const UNTITLED: &str = "Untitled";

pub struct Playground<N: NotificationSink = NotificationLog> {
    config: Config,
    state: EditorState,
    debounce: DebounceScheduler,
    generations: GenerationCounter,
    host: SandboxHost,
    channel: DiagnosticChannel,
    console: ConsoleLog,
    store: Box<dyn ProjectStore>,
    notifications: N,
    hooks: HookRegistry,
    project_name: String,
}

impl<N: NotificationSink> Playground<N> {
    pub fn new(
        config: Config,
        store: Box<dyn ProjectStore>,
        notifications: N,
        time_source: SharedTimeSource,
    ) -> Self {
        let channel = DiagnosticChannel::new(config.sandbox.max_messages_per_run);
        let host = SandboxHost::new(channel.sender(), &config.sandbox);
        let debounce = DebounceScheduler::new(config.pipeline.debounce_window(), time_source);
        let console = ConsoleLog::with_capacity_limit(config.console.max_entries);

        Self {
            config,
            state: EditorState::new(),
            debounce,
            generations: GenerationCounter::new(),
            host,
            channel,
            console,
            store,
            notifications,
            hooks: HookRegistry::new(),
            project_name: UNTITLED.to_string(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    pub fn notifications(&self) -> &N {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut N {
        &mut self.notifications
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Generation whose diagnostics currently reach the console
    pub fn accepted_generation(&self) -> Option<Generation> {
        self.channel.accepted_generation()
    }

    /// Generation of the live sandbox session
    pub fn live_generation(&self) -> Option<Generation> {
        self.host.live_generation()
    }

    /// Most recently issued generation
    pub fn latest_generation(&self) -> Option<Generation> {
        self.generations.latest()
    }

    /// Combined HTML document of the live session
    pub fn document(&self) -> Option<&str> {
        self.host.session().map(|s| s.document())
    }

    pub fn rebuild_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Time until the pending rebuild fires
    pub fn time_until_rebuild(&self) -> Option<Duration> {
        self.debounce.time_until_fire()
    }

    /// Drive the pipeline: if the debounce window has elapsed, rebuild.
    /// Returns the generation that was built.
    pub async fn tick(&mut self) -> Option<Generation> {
        let generation = self.debounce.poll(&mut self.generations)?;
        self.rebuild(generation).await;
        Some(generation)
    }

    /// Rebuild immediately, skipping the debounce window
    pub async fn rebuild_now(&mut self) -> Generation {
        self.debounce.cancel();
        let generation = self.generations.advance();
        self.rebuild(generation).await;
        generation
    }

    async fn rebuild(&mut self, generation: Generation) -> Option<RunOutcome> {
        self.channel.accept_generation(generation);
        self.hooks.run_hooks(&HookArgs::RebuildStarted { generation });

        let outcome = match self.host.rebuild(generation, self.state.buffers()).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!("Rebuild {} failed: {:#}", generation, e);
                self.console
                    .append(ConsoleEntry::new(ConsoleLevel::Error, format!("Error: {}", e)));
                None
            }
        };

        let stats = self.pump_diagnostics();
        tracing::debug!("Rebuild {} finished: {:?}", generation, outcome);
        self.hooks.run_hooks(&HookArgs::RebuildFinished {
            generation,
            outcome,
            accepted: stats.accepted,
        });
        outcome
    }

    /// Move queued diagnostics through the generation gate into the log
    pub fn pump_diagnostics(&mut self) -> DrainStats {
        self.channel.drain_into(&mut self.console)
    }

    /// Accept a message posted by a rendered document (see
    /// [`crate::services::sandbox::document::compose_document`]). Malformed
    /// payloads are dropped. Returns true if the message reached the log.
    pub fn receive_posted(&mut self, payload: &str) -> bool {
        let message = match parse_posted(payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Dropping malformed posted message: {}", e);
                return false;
            }
        };
        if self.channel.sender().send(message).is_err() {
            return false;
        }
        self.pump_diagnostics().accepted > 0
    }

    pub fn clear_console(&mut self) {
        self.console.clear();
        self.hooks.run_hooks(&HookArgs::ConsoleCleared);
    }
}
