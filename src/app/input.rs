use super::Playground;
use crate::hooks::HookArgs;
use crate::input::actions::key_to_events;
use crate::model::buffer::{BufferKind, BufferSet};
use crate::services::notifications::NotificationSink;
use crossterm::event::KeyEvent;

impl<N: NotificationSink> Playground<N> {
    /// Run a key through the editing engine. Returns true if buffer text
    /// changed, in which case a rebuild is scheduled.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let Some(events) = key_to_events(&self.state, key, &self.config.editor) else {
            return false;
        };
        if !self.state.apply_all(&events) {
            return false;
        }

        self.debounce.notify_change();
        self.hooks.run_hooks(&HookArgs::BufferChanged {
            kind: self.state.active_kind(),
        });
        true
    }

    /// Switch the buffer keys apply to
    pub fn set_active(&mut self, kind: BufferKind) {
        if self.state.set_active(kind) {
            tracing::debug!("Active buffer is now {}", kind);
        }
    }

    /// Replace all three buffers directly and schedule a rebuild
    pub fn set_sources(&mut self, buffers: BufferSet) {
        self.state.replace_buffers(buffers);
        self.debounce.notify_change();
        for kind in BufferKind::ALL {
            self.hooks.run_hooks(&HookArgs::BufferChanged { kind });
        }
    }
}
