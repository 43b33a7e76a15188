// ABOUTME: Project discovery module for stevedore
// ABOUTME: Finds compose projects on disk and describes the layout they must follow

pub mod error;
pub mod layout;
pub mod scanner;

pub use error::{LayoutError, Result, ScanError};
pub use scanner::{scan_projects, ProjectMap, TemplateProject};
