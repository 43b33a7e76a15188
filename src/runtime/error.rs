// ABOUTME: Error types for container runtime queries and actions
// ABOUTME: Wraps the Docker client errors behind a runtime-agnostic enum

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Cannot connect to container runtime at {host}: {message}")]
    Connection { host: String, message: String },

    #[error("Unsupported docker host '{0}' (expected unix://, tcp:// or http://)")]
    UnsupportedHost(String),

    #[error("Container runtime request failed: {0}")]
    Api(String),

    #[error("Container '{0}' reported no state")]
    MissingStatus(String),
}

impl From<bollard::errors::Error> for RuntimeError {
    fn from(err: bollard::errors::Error) -> Self {
        RuntimeError::Api(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
