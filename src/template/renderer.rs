// ABOUTME: Manifest renderer for single files and whole project trees
// ABOUTME: Renders *.yml manifests against values.yml and copies every other file verbatim

use handlebars::Handlebars;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::error::{Result, TemplateError};
use super::helpers;
use super::include::IncludeHelper;
use super::values::{load_values, strip_values_marker, ValuesMap};
use crate::project::layout::{is_manifest, values_root, VALUES_FILE_NAME};

/// Counts of what a directory render produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub rendered: usize,
    pub copied: usize,
}

#[derive(Clone)]
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Create a renderer with the helper library registered.
    ///
    /// Strict mode is on: a manifest referencing a key that the values file does
    /// not define fails instead of rendering an empty string.
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        handlebars.set_strict_mode(true);
        handlebars.set_dev_mode(false);

        // Output is YAML, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        helpers::register_helpers(&mut handlebars);

        Self { handlebars }
    }

    /// Render manifest text against `values`, resolving includes from `project_root`.
    ///
    /// `source` is used only to label errors.
    pub fn render_str(
        &self,
        template: &str,
        values: &ValuesMap,
        project_root: &Path,
        source: &Path,
    ) -> Result<String> {
        let template = strip_values_marker(template);

        let mut registry = self.handlebars.clone();
        registry.register_helper("include", Box::new(IncludeHelper::new(project_root)));

        let name = source.to_string_lossy();
        registry
            .register_template_string(&name, template)
            .map_err(|e| TemplateError::Syntax {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?;

        registry
            .render(&name, values)
            .map_err(|e| TemplateError::Render {
                path: source.to_path_buf(),
                source: e,
            })
    }

    /// Render one manifest to `output_path`.
    ///
    /// Values are read from `values.yml` in the parent of the manifest's directory.
    /// Missing parent directories of the output are created.
    pub fn render_file(&self, template_path: &Path, output_path: &Path) -> Result<()> {
        let template =
            fs::read_to_string(template_path).map_err(|source| TemplateError::ReadTemplate {
                path: template_path.to_path_buf(),
                source,
            })?;

        let project_root = values_root(template_path)
            .ok_or_else(|| TemplateError::NoProjectRoot(template_path.to_path_buf()))?;

        let values = load_values(&project_root.join(VALUES_FILE_NAME))?;

        let rendered = self.render_str(&template, &values, project_root, template_path)?;

        write_output(output_path, rendered.as_bytes())?;

        debug!(
            "Rendered {} -> {} ({} bytes)",
            template_path.display(),
            output_path.display(),
            rendered.len()
        );

        Ok(())
    }

    /// Mirror `template_dir` into `output_dir`, rendering manifests on the way.
    ///
    /// Every `*.yml` file other than `values.yml` is rendered; everything else is
    /// copied byte for byte. The first failure aborts the whole operation.
    pub fn render_dir(&self, template_dir: &Path, output_dir: &Path) -> Result<RenderSummary> {
        let metadata = fs::metadata(template_dir)
            .map_err(|_| TemplateError::DirNotFound(template_dir.to_path_buf()))?;
        if !metadata.is_dir() {
            return Err(TemplateError::NotADirectory(template_dir.to_path_buf()));
        }

        info!(
            "Rendering {} into {}",
            template_dir.display(),
            output_dir.display()
        );

        let mut summary = RenderSummary::default();

        for entry in WalkDir::new(template_dir).sort_by_file_name() {
            let entry = entry.map_err(|source| TemplateError::Walk {
                root: template_dir.to_path_buf(),
                source,
            })?;

            let relative = match entry.path().strip_prefix(template_dir) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let output_path = output_dir.join(relative);

            if entry.file_type().is_dir() {
                create_dir(&output_path)?;
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if is_manifest(&file_name) {
                self.render_file(entry.path(), &output_path)?;
                summary.rendered += 1;
            } else {
                copy_file(entry.path(), &output_path)?;
                summary.copied += 1;
            }
        }

        info!(
            "Rendered {} manifests and copied {} files",
            summary.rendered, summary.copied
        );

        Ok(summary)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| TemplateError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(output_path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        create_dir(parent)?;
    }

    fs::write(output_path, contents).map_err(|source| TemplateError::Write {
        path: output_path.to_path_buf(),
        source,
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        create_dir(parent)?;
    }

    fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| TemplateError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}
