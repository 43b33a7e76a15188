// ABOUTME: Error types for project discovery and layout validation
// ABOUTME: Distinguishes walk failures, path resolution failures, and non-conforming layouts

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Scan root is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Cannot resolve absolute path for {path}: {source}")]
    AbsolutePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Project directory has no usable name: {0}")]
    UnnamedProject(PathBuf),

    #[error("Project '{name}' cannot be rendered: {source}")]
    Layout {
        name: String,
        #[source]
        source: LayoutError,
    },
}

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Project path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("No docker-compose.yml or compose.yml found in {0} or its subdirectories")]
    MissingComposeFile(PathBuf),

    #[error("Values file not found: {0}")]
    MissingValuesFile(PathBuf),
}

pub type Result<T> = std::result::Result<T, ScanError>;
