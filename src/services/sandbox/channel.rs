//! Diagnostic Channel: messages from the sandbox to the host.
//!
//! The sandbox side holds a cloneable [`DiagnosticSender`]; every message it
//! sends is stamped with the generation of the session that produced it.
//! The host side drains the queue from the main loop and admits a message
//! into the console log only when its generation is the one currently
//! accepted. Anything else is a stale artifact of a torn-down session.

use crate::model::console::{ConsoleEntry, ConsoleLevel, ConsoleLog};
use crate::model::generation::Generation;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Wire shape of a message crossing the sandbox boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SandboxMessage {
    Console {
        level: ConsoleLevel,
        data: Vec<String>,
    },
}

impl SandboxMessage {
    /// Parse a JSON payload posted by the instrumentation
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Stamp with the generation of the session that produced it
    pub fn into_diagnostic(self, generation: Generation) -> DiagnosticMessage {
        match self {
            SandboxMessage::Console { level, data } => DiagnosticMessage {
                generation,
                level,
                parts: data,
            },
        }
    }
}

/// Parse a message posted by a rendered document to its parent window.
/// Those payloads carry the generation of the document that produced them.
pub fn parse_posted(payload: &str) -> Result<DiagnosticMessage, serde_json::Error> {
    use serde::de::Error as _;

    let value: serde_json::Value = serde_json::from_str(payload)?;
    let generation = value
        .get("generation")
        .and_then(serde_json::Value::as_u64)
        .map(Generation)
        .ok_or_else(|| serde_json::Error::custom("missing generation"))?;
    let message: SandboxMessage = serde_json::from_value(value)?;
    Ok(message.into_diagnostic(generation))
}

/// A diagnostic tagged with its generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub generation: Generation,
    pub level: ConsoleLevel,
    pub parts: Vec<String>,
}

impl DiagnosticMessage {
    pub fn new(generation: Generation, level: ConsoleLevel, message: impl Into<String>) -> Self {
        Self {
            generation,
            level,
            parts: vec![message.into()],
        }
    }

    /// Parts joined with a single space
    pub fn text(&self) -> String {
        self.parts.join(" ")
    }
}

/// Sending half handed to sandbox sessions
pub type DiagnosticSender = mpsc::UnboundedSender<DiagnosticMessage>;

/// Counts from one [`DiagnosticChannel::drain_into`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    pub accepted: usize,
    pub stale: usize,
    pub capped: usize,
}

/// Host side of the channel: generation gate plus per-run message cap
pub struct DiagnosticChannel {
    sender: DiagnosticSender,
    receiver: mpsc::UnboundedReceiver<DiagnosticMessage>,
    /// Only messages from this generation reach the log
    accepted: Option<Generation>,
    /// Messages admitted per generation before the rest are dropped
    max_per_run: Option<usize>,
    admitted_this_run: usize,
    cap_reported: bool,
}

impl DiagnosticChannel {
    /// `max_per_run` of 0 disables the cap
    pub fn new(max_per_run: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver,
            accepted: None,
            max_per_run: (max_per_run > 0).then_some(max_per_run),
            admitted_this_run: 0,
            cap_reported: false,
        }
    }

    pub fn sender(&self) -> DiagnosticSender {
        self.sender.clone()
    }

    pub fn accepted_generation(&self) -> Option<Generation> {
        self.accepted
    }

    /// Make `generation` current. Everything older becomes stale.
    pub fn accept_generation(&mut self, generation: Generation) {
        if let Some(previous) = self.accepted {
            if generation <= previous {
                tracing::warn!(
                    "Ignoring out-of-order generation {} (current {})",
                    generation,
                    previous
                );
                return;
            }
        }
        self.accepted = Some(generation);
        self.admitted_this_run = 0;
        self.cap_reported = false;
    }

    /// Stop accepting any generation until the next rebuild
    pub fn invalidate(&mut self) {
        self.accepted = None;
        self.admitted_this_run = 0;
        self.cap_reported = false;
    }

    /// Move every queued message through the gate, in arrival order
    pub fn drain_into(&mut self, log: &mut ConsoleLog) -> DrainStats {
        let mut stats = DrainStats::default();
        while let Ok(message) = self.receiver.try_recv() {
            self.admit(message, log, &mut stats);
        }
        if stats.stale > 0 || stats.capped > 0 {
            tracing::debug!(
                "Diagnostics drained: {} accepted, {} stale, {} over cap",
                stats.accepted,
                stats.stale,
                stats.capped
            );
        }
        stats
    }

    fn admit(&mut self, message: DiagnosticMessage, log: &mut ConsoleLog, stats: &mut DrainStats) {
        if self.accepted != Some(message.generation) {
            stats.stale += 1;
            return;
        }

        if let Some(max) = self.max_per_run {
            if self.admitted_this_run >= max {
                stats.capped += 1;
                if !self.cap_reported {
                    self.cap_reported = true;
                    log.append(ConsoleEntry::new(
                        ConsoleLevel::Warn,
                        format!(
                            "Console output limit of {} messages reached; further output from this run is dropped",
                            max
                        ),
                    ));
                }
                return;
            }
        }

        self.admitted_this_run += 1;
        stats.accepted += 1;
        log.append(ConsoleEntry::new(message.level, message.text()));
    }
}
