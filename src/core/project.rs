//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::storage::JsonDirStore;

/// Name of the marker directory holding configuration and data
pub const PROJECT_DIR: &str = ".labdesk";

/// Represents a labdesk project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .labdesk/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::create_structure(root)
    }

    /// Re-create the configuration even if .labdesk/ exists; data is kept
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(root)
    }

    fn create_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.data_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# labdesk project configuration

# Days ahead of today within which an open order is urgent (default: 3)
# urgent_days: 3

# Currency suffix printed after amounts (default: zł)
# currency: "zł"

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# Log filter when LABDESK_LOG is unset (default: warn)
# log_level: warn
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .labdesk configuration directory
    pub fn labdesk_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.labdesk_dir().join("config.yaml")
    }

    /// Directory holding one JSON file per collection
    pub fn data_dir(&self) -> PathBuf {
        self.labdesk_dir().join("data")
    }

    /// Storage backed by this project's data directory
    pub fn store(&self) -> JsonDirStore {
        JsonDirStore::new(self.data_dir())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a labdesk project (searched from {searched_from:?}). Run 'labdesk init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("labdesk project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.labdesk_dir().is_dir());
        assert!(project.config_path().exists());
        assert!(project.data_dir().is_dir());
        assert_eq!(project.store().dir(), project.data_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_init_force_keeps_data() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let orders = project.data_dir().join("orders.json");
        std::fs::write(&orders, "[]").unwrap();

        Project::init_force(tmp.path()).unwrap();
        assert!(orders.exists());
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();
        let nested = tmp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let project = Project::discover_from(&nested).unwrap();
        assert_eq!(project.root(), tmp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_discover_fails_outside_project() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
