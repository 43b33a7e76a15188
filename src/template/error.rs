// ABOUTME: Error types for manifest rendering
// ABOUTME: Every variant carries the file it concerns so failures point at the offending template

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Error reading template file {path}: {source}")]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Values file not found: {0}")]
    ValuesNotFound(PathBuf),

    #[error("Error reading values file {path}: {source}")]
    ReadValues {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing values YAML {path}: {message}")]
    ValuesParse { path: PathBuf, message: String },

    #[error("Manifest {0} is not inside a project directory")]
    NoProjectRoot(PathBuf),

    #[error("Template syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("Error executing template {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: handlebars::RenderError,
    },

    #[error("Include file not found: {0}")]
    IncludeNotFound(PathBuf),

    #[error("Error creating directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing output file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error copying {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot access template directory {0}")]
    DirNotFound(PathBuf),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
