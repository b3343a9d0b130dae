//! Sandbox Execution Host
//!
//! Owns the single live sandbox session. A rebuild tears the previous
//! session down, builds a fresh script runtime stamped with the new
//! generation, installs the console instrumentation and runs the guarded
//! user script. Console calls leave the runtime through
//! `op_playground_post`; faults that escape the guard are turned into
//! error diagnostics here, so nothing the user script does reaches the
//! caller as a Rust error.

use crate::config::SandboxConfig;
use crate::model::buffer::BufferSet;
use crate::model::console::ConsoleLevel;
use crate::model::generation::Generation;
use crate::services::sandbox::channel::{DiagnosticMessage, DiagnosticSender, SandboxMessage};
use crate::services::sandbox::document::{
    compose_document, guarded_script, instrumentation_script, PostTarget,
};
use anyhow::{anyhow, Result};
use deno_core::{extension, op2, v8, FastString, JsRuntime, OpState, RuntimeOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Per-session state reachable from ops
struct SessionContext {
    generation: Generation,
    sender: DiagnosticSender,
    /// Console messages forwarded by this session so far
    sent: usize,
    max_per_run: Option<usize>,
}

impl SessionContext {
    /// Forward a console message unless the session is over its cap.
    ///
    /// One message past the cap is still forwarded so the channel logs its
    /// limit warning; everything after that is dropped here and never
    /// queued.
    fn forward(&mut self, message: DiagnosticMessage) {
        if let Some(max) = self.max_per_run {
            if self.sent > max {
                return;
            }
            if self.sent == max {
                tracing::warn!(
                    "Sandbox session {} reached {} console messages, dropping the rest",
                    self.generation,
                    max
                );
            }
        }
        self.sent += 1;
        if self.sender.send(message).is_err() {
            tracing::debug!("Diagnostic receiver gone, dropping message from {}", self.generation);
        }
    }
}

/// Console payload from the instrumentation. The generation comes from the
/// session, never from the payload.
#[op2(fast)]
fn op_playground_post(state: &mut OpState, #[string] payload: String) {
    let Some(context) = state.try_borrow_mut::<SessionContext>() else {
        tracing::debug!("Sandbox message outside of a session");
        return;
    };
    match SandboxMessage::parse(&payload) {
        Ok(message) => {
            let diagnostic = message.into_diagnostic(context.generation);
            context.forward(diagnostic);
        }
        Err(e) => tracing::warn!(
            "Dropping malformed sandbox message from {}: {}",
            context.generation,
            e
        ),
    }
}

extension!(playground_sandbox, ops = [op_playground_post]);

/// How a rebuild ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Script ran to completion (a guarded throw still counts)
    Completed,
    /// A fault escaped the guard and was reported as a diagnostic
    Faulted,
    /// The watchdog terminated the script
    TimedOut,
}

/// The one live execution environment
pub struct SandboxSession {
    generation: Generation,
    /// Combined document for a rendered-output consumer
    document: String,
    runtime: JsRuntime,
}

impl SandboxSession {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn document(&self) -> &str {
        &self.document
    }
}

pub struct SandboxHost {
    session: Option<SandboxSession>,
    sender: DiagnosticSender,
    script_timeout: Option<Duration>,
    max_messages_per_run: Option<usize>,
}

impl SandboxHost {
    pub fn new(sender: DiagnosticSender, config: &SandboxConfig) -> Self {
        Self {
            session: None,
            sender,
            script_timeout: config.script_timeout(),
            max_messages_per_run: (config.max_messages_per_run > 0)
                .then_some(config.max_messages_per_run),
        }
    }

    pub fn session(&self) -> Option<&SandboxSession> {
        self.session.as_ref()
    }

    pub fn live_generation(&self) -> Option<Generation> {
        self.session.as_ref().map(|s| s.generation)
    }

    /// Destroy the live session, if any
    pub fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!("Tearing down sandbox session {}", session.generation);
            drop(session);
        }
    }

    /// Replace the live session with one built from `buffers`.
    ///
    /// Errors only when the runtime itself cannot be bootstrapped; faults in
    /// user code are reported through the diagnostic channel.
    pub async fn rebuild(&mut self, generation: Generation, buffers: &BufferSet) -> Result<RunOutcome> {
        if let Some(live) = self.live_generation() {
            if generation <= live {
                return Err(anyhow!(
                    "Rebuild for {} requested while {} is live",
                    generation,
                    live
                ));
            }
        }

        // Isolates must be dropped before the next one is created
        self.teardown();

        let document = compose_document(generation, buffers);
        let mut runtime = JsRuntime::new(RuntimeOptions {
            extensions: vec![playground_sandbox::init()],
            ..Default::default()
        });
        runtime.op_state().borrow_mut().put(SessionContext {
            generation,
            sender: self.sender.clone(),
            sent: 0,
            max_per_run: self.max_messages_per_run,
        });

        let instrumentation: FastString = instrumentation_script(PostTarget::Runtime).into();
        runtime
            .execute_script("<playground_instrumentation>", instrumentation)
            .map_err(|e| anyhow!("Failed to instrument sandbox {}: {}", generation, e))?;

        tracing::debug!("Running sandbox session {}", generation);
        let watchdog = self
            .script_timeout
            .map(|timeout| Watchdog::arm(runtime.v8_isolate().thread_safe_handle(), timeout));

        let fault = run_guarded(&mut runtime, buffers.script()).await;

        let fired = watchdog.map(Watchdog::disarm).unwrap_or(false);
        let outcome = classify_run(fault.is_some(), fired);
        match (outcome, fault) {
            (RunOutcome::TimedOut, _) => {
                let timeout_ms = self.script_timeout.map(|t| t.as_millis()).unwrap_or_default();
                tracing::warn!("Sandbox session {} timed out", generation);
                self.report(
                    generation,
                    format!("Error: script execution timed out after {} ms", timeout_ms),
                );
            }
            (RunOutcome::Faulted, Some(message)) => {
                tracing::debug!("Sandbox session {} faulted: {}", generation, message);
                self.report(generation, format!("Error: {}", message));
            }
            _ => {}
        }

        self.session = Some(SandboxSession {
            generation,
            document,
            runtime,
        });
        Ok(outcome)
    }

    fn report(&self, generation: Generation, message: String) {
        let diagnostic = DiagnosticMessage::new(generation, ConsoleLevel::Error, message);
        if self.sender.send(diagnostic).is_err() {
            tracing::debug!("Diagnostic receiver gone, dropping fault from {}", generation);
        }
    }
}

/// A watchdog that fires after the script already finished terminated
/// nothing, so only a run that also faulted counts as timed out.
fn classify_run(faulted: bool, watchdog_fired: bool) -> RunOutcome {
    match (faulted, watchdog_fired) {
        (true, true) => RunOutcome::TimedOut,
        (true, false) => RunOutcome::Faulted,
        (false, _) => RunOutcome::Completed,
    }
}

/// Run the guarded user script and settle its pending work. Returns the
/// first line of any fault that escaped the guard.
async fn run_guarded(runtime: &mut JsRuntime, script: &str) -> Option<String> {
    let code: FastString = guarded_script(script).into();
    if let Err(e) = runtime.execute_script("<playground_script>", code) {
        return Some(first_line(&e.to_string()));
    }
    if let Err(e) = runtime.run_event_loop(Default::default()).await {
        return Some(first_line(&e.to_string()));
    }
    None
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim().to_string()
}

/// Terminates the isolate if the script is still running after the timeout
struct Watchdog {
    done: Option<mpsc::Sender<()>>,
    fired: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Watchdog {
    fn arm(handle: v8::IsolateHandle, timeout: Duration) -> Self {
        let (done, wait) = mpsc::channel::<()>();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let thread = std::thread::Builder::new()
            .name("sandbox-watchdog".to_string())
            .spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = wait.recv_timeout(timeout) {
                    flag.store(true, Ordering::SeqCst);
                    handle.terminate_execution();
                }
            })
            .map_err(|e| tracing::warn!("Failed to start sandbox watchdog: {}", e))
            .ok();

        Self {
            done: Some(done),
            fired,
            thread,
        }
    }

    /// Stop the watchdog. Returns true if it terminated the script.
    fn disarm(mut self) -> bool {
        drop(self.done.take());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        self.fired.load(Ordering::SeqCst)
    }
}
