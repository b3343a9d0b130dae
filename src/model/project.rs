use crate::model::buffer::BufferSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by a project store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub u64);

/// A saved playground: the three sources under a user-chosen name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Assigned by the store; `None` until the project has been stored once
    #[serde(default)]
    pub id: Option<ProjectId>,
    pub name: String,
    pub markup: String,
    pub style: String,
    pub script: String,
    pub timestamp: DateTime<Utc>,
}

impl Project {
    /// Snapshot the current buffers under `name`
    pub fn from_buffers(name: impl Into<String>, buffers: &BufferSet) -> Self {
        Self {
            id: None,
            name: name.into(),
            markup: buffers.markup().to_string(),
            style: buffers.style().to_string(),
            script: buffers.script().to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn to_buffers(&self) -> BufferSet {
        BufferSet::from_sources(
            self.markup.clone(),
            self.style.clone(),
            self.script.clone(),
        )
    }
}
