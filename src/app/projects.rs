use super::Playground;
use crate::hooks::HookArgs;
use crate::model::project::Project;
use crate::services::notifications::{Notification, NotificationSink};
use crate::services::store::StoreError;

impl<N: NotificationSink> Playground<N> {
    /// Save the three buffers under `name`. Failures are reported through
    /// the notification sink and leave the editor untouched.
    pub fn save_project(&mut self, name: &str) -> bool {
        let project = Project::from_buffers(name, self.state.buffers());
        match self.store.put(project) {
            Ok(stored) => {
                tracing::info!("Saved project {:?} as {:?}", stored.name, stored.id);
                self.project_name = stored.name;
                self.notifications
                    .notify(Notification::project_saved(&self.project_name));
                true
            }
            Err(StoreError::Unavailable(reason)) => {
                tracing::error!("Cannot save project {:?}: {}", name, reason);
                self.notifications.notify(Notification::store_unavailable());
                false
            }
            Err(e) => {
                tracing::error!("Failed to save project {:?}: {}", name, e);
                self.notifications.notify(Notification::save_failed());
                false
            }
        }
    }

    /// Replace the buffers with the stored project `name`.
    ///
    /// The live session is torn down, generation acceptance and the console
    /// are reset, and a rebuild of the loaded sources is scheduled. The
    /// generation counter itself keeps counting.
    pub fn load_project(&mut self, name: &str) -> bool {
        let project = match self.store.get(name) {
            Ok(Some(project)) => project,
            Ok(None) => {
                self.notifications
                    .notify(Notification::project_not_found(name));
                return false;
            }
            Err(e) => {
                tracing::error!("Failed to load project {:?}: {}", name, e);
                self.notifications.notify(Notification::store_unavailable());
                return false;
            }
        };

        self.state.replace_buffers(project.to_buffers());
        self.channel.invalidate();
        self.host.teardown();
        self.console.clear();
        self.debounce.notify_change();
        self.project_name = project.name;

        tracing::info!("Loaded project {:?}", self.project_name);
        self.notifications
            .notify(Notification::project_loaded(&self.project_name));
        self.hooks.run_hooks(&HookArgs::ProjectLoaded {
            name: self.project_name.clone(),
        });
        true
    }

    /// Stored projects, newest first. Empty if the store is unavailable.
    pub fn list_projects(&mut self) -> Vec<Project> {
        match self.store.list() {
            Ok(projects) => projects,
            Err(e) => {
                tracing::error!("Failed to list projects: {}", e);
                self.notifications.notify(Notification::store_unavailable());
                Vec::new()
            }
        }
    }
}
