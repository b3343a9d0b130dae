//! Runtime configuration I/O.
//!
//! System directory detection lives here so the rest of the crate only
//! ever receives paths by parameter.

use crate::config::Config;
use std::path::{Path, PathBuf};

/// Directory paths used by the playground
///
/// Only the top-level `main` function should use `dirs::*` to construct this;
/// everything else receives it by construction/parameter passing so tests
/// can point it at a temp directory.
#[derive(Debug, Clone)]
pub struct DirectoryContext {
    /// Data directory for saved projects
    /// e.g., ~/.local/share/fresh-playground on Linux
    pub data_dir: PathBuf,

    /// Config directory for user configuration
    /// e.g., ~/.config/fresh-playground on Linux
    pub config_dir: PathBuf,
}

impl DirectoryContext {
    /// Create a DirectoryContext from the system directories
    /// This should ONLY be called from main()
    pub fn from_system() -> std::io::Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine data directory",
                )
            })?
            .join("fresh-playground");

        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine config directory",
                )
            })?
            .join("fresh-playground");

        Ok(Self {
            data_dir,
            config_dir,
        })
    }

    /// Create a DirectoryContext for testing with a temp directory
    pub fn for_testing(temp_dir: &Path) -> Self {
        Self {
            data_dir: temp_dir.join("data"),
            config_dir: temp_dir.join("config"),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Default location of the project file
    pub fn projects_path(&self) -> PathBuf {
        self.data_dir.join("projects.json")
    }

    /// Project file to use for `config`, honoring `store.path`
    pub fn resolve_projects_path(&self, config: &Config) -> PathBuf {
        config
            .store
            .path
            .clone()
            .unwrap_or_else(|| self.projects_path())
    }
}

/// Load the effective configuration: an explicit `--config` path wins,
/// then the user config file, then built-in defaults.
pub fn load_config(dirs: &DirectoryContext, explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Ok(Config::load_from_file(path)?),
        None => Ok(Config::load_or_default(&dirs.config_path())),
    }
}
