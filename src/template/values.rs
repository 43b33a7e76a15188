// ABOUTME: Loading of per-project values files and the values-marker preprocessing pass
// ABOUTME: Values are parsed fresh for every render and never cached

use serde_json::{Map, Value as JsonValue};
use std::path::Path;

use super::error::{Result, TemplateError};

/// Parsed contents of a project's `values.yml`.
pub type ValuesMap = Map<String, JsonValue>;

/// Literal prefix that manifests may use to address the values object.
///
/// `{{Values.image.tag}}` and `{{image.tag}}` render identically because this
/// prefix is removed from the raw text before the template is parsed.
pub const VALUES_MARKER: &str = "Values.";

/// Remove every literal occurrence of [`VALUES_MARKER`] from template text.
///
/// This is a purely textual pass that runs before parsing. It is not aware of
/// template syntax: the marker is removed wherever it appears, including in
/// literal text outside of expressions.
pub fn strip_values_marker(template: &str) -> String {
    template.replace(VALUES_MARKER, "")
}

/// Load and parse a values file as a mapping.
///
/// A missing file is reported as [`TemplateError::ValuesNotFound`]. An empty
/// document yields an empty map; any other non-mapping document is a parse error.
pub fn load_values(path: &Path) -> Result<ValuesMap> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            TemplateError::ValuesNotFound(path.to_path_buf())
        } else {
            TemplateError::ReadValues {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_values(&contents).map_err(|message| TemplateError::ValuesParse {
        path: path.to_path_buf(),
        message,
    })
}

fn parse_values(contents: &str) -> std::result::Result<ValuesMap, String> {
    if contents.trim().is_empty() {
        return Ok(ValuesMap::new());
    }

    let document: serde_yaml::Value =
        serde_yaml::from_str(contents).map_err(|e| e.to_string())?;

    match serde_json::to_value(document).map_err(|e| e.to_string())? {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(ValuesMap::new()),
        other => Err(format!(
            "expected a mapping at the top level, found {}",
            json_kind(&other)
        )),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a sequence",
        JsonValue::Object(_) => "a mapping",
    }
}
