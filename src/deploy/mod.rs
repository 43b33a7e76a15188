// ABOUTME: Deployment module for stevedore
// ABOUTME: Install/update transactions and container lifecycle actions, serialized per project

pub mod command;
pub mod error;
pub mod installer;
pub mod lifecycle;
pub mod workspace;

pub use command::{DeployCommand, DEFAULT_DEPLOY_SCRIPT};
pub use error::{DeployError, Result};
pub use installer::{DeploySettings, Installer};
pub use lifecycle::{Lifecycle, DEFAULT_STOP_TIMEOUT};
pub use workspace::Workspace;
