// ABOUTME: The `include` template helper that inlines shared fragments from includes.template
// ABOUTME: Each call re-reads the include file and renders it as an independent template

use handlebars::{Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

use super::error::{Result, TemplateError};
use crate::project::layout::INCLUDES_FILE_NAME;

/// `{{include "name" data}}`
///
/// Loads `includes.template` from the project root, executes it against `data`
/// and writes the result inline. When the file defines an inline partial called
/// `name` (`{{#*inline "name"}}...{{/inline}}`) only that fragment is emitted;
/// otherwise the whole file is rendered.
pub struct IncludeHelper {
    project_root: PathBuf,
}

impl IncludeHelper {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn include_path(&self) -> PathBuf {
        self.project_root.join(INCLUDES_FILE_NAME)
    }

    /// Render fragment `name` of the include file against `data`.
    pub fn render(&self, registry: &Handlebars, name: &str, data: &JsonValue) -> Result<String> {
        let path = self.include_path();
        let source = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TemplateError::IncludeNotFound(path.clone())
            } else {
                TemplateError::ReadTemplate {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let render = |template: &str| {
            registry
                .render_template(template, data)
                .map_err(|source| TemplateError::Render {
                    path: path.clone(),
                    source,
                })
        };

        if !defines_fragment(&source, name) {
            return render(&source);
        }

        // Fragment definitions emit nothing, so whatever the file renders to on
        // its own is the text outside the definitions; drop it from the output.
        let surrounding = render(&source)?;
        let with_fragment = render(&format!("{}{{{{> {}}}}}", source, name))?;

        Ok(with_fragment
            .strip_prefix(&surrounding)
            .unwrap_or(&with_fragment)
            .to_string())
    }
}

fn defines_fragment(source: &str, name: &str) -> bool {
    source.contains(&format!("{{{{#*inline \"{}\"}}}}", name))
        || source.contains(&format!("{{{{~#*inline \"{}\"}}}}", name))
}

impl HelperDef for IncludeHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let name = h
            .param(0)
            .and_then(|v| v.value().as_str())
            .ok_or_else(|| RenderError::new("include helper requires a fragment name"))?;

        let data = h
            .param(1)
            .map(|v| v.value().clone())
            .unwrap_or(JsonValue::Null);

        let rendered = self
            .render(r, name, &data)
            .map_err(|e| RenderError::new(format!("include \"{}\": {}", name, e)))?;

        out.write(&rendered)?;
        Ok(())
    }
}
