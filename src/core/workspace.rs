//! Workspace discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker directory that identifies a workspace root
pub const WORKSPACE_DIR: &str = ".qat";

/// Default database file inside the marker directory
pub const DATABASE_FILE: &str = "qat.db";

/// Represents a QAT workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .qat/)
    root: PathBuf,
}

impl Workspace {
    /// Find workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace at the given path
    ///
    /// With `force`, an existing `.qat/` is reused and its config rewritten;
    /// the database is never deleted.
    pub fn init(path: &Path, force: bool) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let qat_dir = root.join(WORKSPACE_DIR);
        if qat_dir.exists() && !force {
            return Err(WorkspaceError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(&qat_dir).map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        std::fs::write(qat_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# QAT Workspace Configuration

# Actor recorded in the audit log (default: git user.name, then $USER)
# author: ""

# Database file, relative to this workspace root (default: .qat/qat.db)
# database: ""

# Default output format (auto, json, tsv, csv)
# default_format: auto
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .qat configuration directory
    pub fn qat_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Resolve the database path, honoring a configured override
    pub fn database_path(&self, configured: Option<&str>) -> PathBuf {
        match configured {
            Some(path) if !path.trim().is_empty() => {
                let path = Path::new(path);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.root.join(path)
                }
            }
            _ => self.qat_dir().join(DATABASE_FILE),
        }
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a QAT workspace (searched from {searched_from:?}). Run 'qat init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("QAT workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path(), false).unwrap();

        assert!(workspace.qat_dir().is_dir());
        assert!(workspace.qat_dir().join("config.yaml").exists());
    }

    #[test]
    fn test_workspace_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), false).unwrap();

        let err = Workspace::init(tmp.path(), false).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
        assert!(Workspace::init(tmp.path(), true).is_ok());
    }

    #[test]
    fn test_workspace_discover_walks_up() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), false).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let workspace = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            workspace.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_workspace_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }

    #[test]
    fn test_database_path_override() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path(), false).unwrap();

        assert_eq!(
            workspace.database_path(None),
            workspace.qat_dir().join(DATABASE_FILE)
        );
        assert_eq!(
            workspace.database_path(Some("data/qa.db")),
            workspace.root().join("data/qa.db")
        );
    }
}
