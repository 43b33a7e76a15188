// ABOUTME: Template rendering module for stevedore
// ABOUTME: Renders compose manifests against per-project values with shared include fragments

pub mod error;
pub mod helpers;
pub mod include;
pub mod renderer;
pub mod values;

pub use error::{Result, TemplateError};
pub use include::IncludeHelper;
pub use renderer::{RenderSummary, TemplateRenderer};
pub use values::{load_values, strip_values_marker, ValuesMap, VALUES_MARKER};
