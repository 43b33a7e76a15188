// ABOUTME: Ephemeral workspace holding one project's rendered output for one install
// ABOUTME: Each workspace gets a fresh unique path and is removed on every exit path

use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};
use tracing::{debug, warn};

use super::error::{DeployError, Result};

const WORKSPACE_PREFIX: &str = "stevedore-";

/// A uniquely named scratch directory with a nested directory for one project.
///
/// [`Workspace::close`] removes it and logs any failure. If the owner never gets
/// to call it (an early return, a panic, a dropped future) the directory is
/// still removed when the value drops.
#[derive(Debug)]
pub struct Workspace {
    root: TempDir,
    project_dir: PathBuf,
}

impl Workspace {
    /// Create a workspace under `parent`, or the system temp dir when `None`.
    pub fn create(parent: Option<&Path>, project: &str) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let root = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(DeployError::Workspace)?;

        let project_dir = root.path().join(project);
        std::fs::create_dir(&project_dir).map_err(DeployError::Workspace)?;

        debug!("Created workspace {}", project_dir.display());

        Ok(Self { root, project_dir })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Directory the project is rendered into.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Remove the workspace. Failures are logged, never returned.
    pub fn close(self) {
        let path = self.root.path().to_path_buf();
        match self.root.close() {
            Ok(()) => debug!("Removed workspace {}", path.display()),
            Err(e) => warn!("Failed to remove workspace {}: {}", path.display(), e),
        }
    }
}
