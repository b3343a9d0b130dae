//! Project store: named snapshots of the three buffers.
//!
//! Identifiers are assigned on first save and reused when a project with
//! the same name is saved again.
//!
//! `JsonProjectStore` keeps every project in one JSON file and uses atomic
//! writes (temp file, fsync, rename) so a crash never leaves a truncated
//! file behind.

use crate::model::project::{Project, ProjectId};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Version of the on-disk project file format
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("project store unavailable: {0}")]
    Unavailable(String),

    #[error("project store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("project store is corrupt: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("project file version {version} is newer than supported {max_supported}")]
    VersionTooNew { version: u32, max_supported: u32 },
}

/// Storage for saved projects
pub trait ProjectStore {
    /// All projects, most recently saved first
    fn list(&self) -> Result<Vec<Project>, StoreError>;

    /// Store `project`, assigning an id or reusing the one already held by
    /// a project of the same name. Returns the stored project.
    fn put(&mut self, project: Project) -> Result<Project, StoreError>;

    fn get(&self, name: &str) -> Result<Option<Project>, StoreError>;
}

/// Projects plus id allocation; shared by both store implementations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ProjectTable {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    projects: Vec<Project>,
}

impl ProjectTable {
    fn new() -> Self {
        Self {
            version: STORE_VERSION,
            next_id: 1,
            projects: Vec::new(),
        }
    }

    fn list(&self) -> Vec<Project> {
        let mut projects = self.projects.clone();
        projects.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        projects
    }

    fn get(&self, name: &str) -> Option<Project> {
        self.projects.iter().find(|p| p.name == name).cloned()
    }

    fn put(&mut self, mut project: Project) -> Project {
        if let Some(existing) = self.projects.iter_mut().find(|p| p.name == project.name) {
            project.id = existing.id;
            *existing = project.clone();
            return project;
        }

        let id = ProjectId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        project.id = Some(id);
        self.projects.push(project.clone());
        project
    }
}

/// Volatile store, for tests and for running without a data directory
#[derive(Debug, Clone)]
pub struct MemoryProjectStore {
    table: ProjectTable,
    available: bool,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self {
            table: ProjectTable::new(),
            available: true,
        }
    }

    /// A store whose every operation fails with [`StoreError::Unavailable`]
    pub fn unavailable() -> Self {
        Self {
            table: ProjectTable::new(),
            available: false,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store is offline".to_string()))
        }
    }
}

impl Default for MemoryProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore for MemoryProjectStore {
    fn list(&self) -> Result<Vec<Project>, StoreError> {
        self.check()?;
        Ok(self.table.list())
    }

    fn put(&mut self, project: Project) -> Result<Project, StoreError> {
        self.check()?;
        Ok(self.table.put(project))
    }

    fn get(&self, name: &str) -> Result<Option<Project>, StoreError> {
        self.check()?;
        Ok(self.table.get(name))
    }
}

/// Store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonProjectStore {
    path: PathBuf,
}

impl JsonProjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<ProjectTable, StoreError> {
        if !self.path.exists() {
            tracing::debug!("Project file {:?} does not exist yet", self.path);
            return Ok(ProjectTable::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let table: ProjectTable = serde_json::from_str(&content)?;
        if table.version > STORE_VERSION {
            tracing::warn!(
                "Project file version {} is newer than supported {}",
                table.version,
                STORE_VERSION
            );
            return Err(StoreError::VersionTooNew {
                version: table.version,
                max_supported: STORE_VERSION,
            });
        }
        Ok(table)
    }

    fn save(&self, table: &ProjectTable) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(table)?;
        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&temp_path, &self.path)?;
        tracing::debug!("Saved {} project(s) to {:?}", table.projects.len(), self.path);
        Ok(())
    }
}

impl ProjectStore for JsonProjectStore {
    fn list(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.load()?.list())
    }

    fn put(&mut self, project: Project) -> Result<Project, StoreError> {
        let mut table = self.load()?;
        table.version = STORE_VERSION;
        let stored = table.put(project);
        self.save(&table)?;
        Ok(stored)
    }

    fn get(&self, name: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.load()?.get(name))
    }
}
