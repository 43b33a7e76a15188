// ABOUTME: Error types for install and lifecycle operations
// ABOUTME: Surfaces lookup, render, runtime, and external command failures to the caller verbatim

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

use crate::runtime::RuntimeError;
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Unknown project: {0}")]
    UnknownProject(String),

    #[error("Container '{0}' has no template directory and cannot be installed")]
    NoTemplate(String),

    #[error("Cannot find container `{0}`")]
    ContainerNotFound(String),

    #[error("Failed to lock project '{project}': {source}")]
    Lock {
        project: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("No docker-compose.yml or compose.yml in rendered project {0}")]
    NoComposeFile(PathBuf),

    #[error("Render failed: {0}")]
    Render(#[from] TemplateError),

    #[error("Failed to spawn `{shell}`: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Deployment of '{project}' failed: {status}")]
    CommandFailed { project: String, status: ExitStatus },

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, DeployError>;
