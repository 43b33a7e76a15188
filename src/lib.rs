// ABOUTME: Main library module for stevedore, a templated docker compose deployer
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod deploy;
pub mod project;
pub mod registry;
pub mod runtime;
pub mod template;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use deploy::{DeployCommand, DeployError, DeploySettings, Installer, Lifecycle};
pub use project::{scan_projects, ProjectMap, TemplateProject};
pub use registry::{ContainerRecord, ReconcileReport, Registry};
pub use runtime::{ContainerRuntime, DockerRuntime, RuntimeContainer};
pub use template::{RenderSummary, TemplateError, TemplateRenderer};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
