// ABOUTME: Handlebars helper library available to every manifest and include fragment
// ABOUTME: String, list, encoding, and environment helpers in the style of chart templating

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderError,
};
use serde_json::Value as JsonValue;
use std::env;
use uuid::Uuid;

/// Render a JSON value the way it should appear inside a manifest.
///
/// Strings are written without quotes, null becomes empty, everything else uses
/// its JSON form.
pub fn value_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn text_param(h: &Helper, index: usize, helper: &str) -> Result<String, RenderError> {
    h.param(index)
        .map(|v| value_to_text(v.value()))
        .ok_or_else(|| {
            RenderError::new(format!(
                "{} helper requires parameter {}",
                helper,
                index + 1
            ))
        })
}

/// Uppercase helper
pub fn upper_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = text_param(h, 0, "upper")?;
    out.write(&input.to_uppercase())?;
    Ok(())
}

/// Lowercase helper
pub fn lower_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = text_param(h, 0, "lower")?;
    out.write(&input.to_lowercase())?;
    Ok(())
}

pub fn trim_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = text_param(h, 0, "trim")?;
    out.write(input.trim())?;
    Ok(())
}

/// Quote helper - wraps the value in double quotes, escaping embedded quotes
pub fn quote_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = text_param(h, 0, "quote")?;
    let escaped = input.replace('\\', "\\\\").replace('"', "\\\"");
    out.write(&format!("\"{}\"", escaped))?;
    Ok(())
}

/// Replace helper - `{{replace text "from" "to"}}`
pub fn replace_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = text_param(h, 0, "replace")?;
    let from = text_param(h, 1, "replace")?;
    let to = text_param(h, 2, "replace")?;
    out.write(&input.replace(&from, &to))?;
    Ok(())
}

/// Indent helper - `{{indent 4 text}}` prefixes every non-empty line with spaces
pub fn indent_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let width = h
        .param(0)
        .and_then(|v| v.value().as_u64())
        .ok_or_else(|| RenderError::new("indent helper requires a numeric width"))?;
    let input = text_param(h, 1, "indent")?;

    let pad = " ".repeat(width as usize);
    let indented: Vec<String> = input
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect();

    out.write(&indented.join("\n"))?;
    Ok(())
}

/// Join helper - joins array elements with separator
pub fn join_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let separator = h.param(0).and_then(|v| v.value().as_str()).unwrap_or(",");

    let array = h
        .param(1)
        .and_then(|v| v.value().as_array())
        .ok_or_else(|| RenderError::new("join helper requires array parameter"))?;

    let joined = array
        .iter()
        .map(value_to_text)
        .collect::<Vec<_>>()
        .join(separator);
    out.write(&joined)?;
    Ok(())
}

/// Default helper - provides default value if variable is empty
pub fn default_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .map(|v| value_to_text(v.value()))
        .unwrap_or_default();

    let default_value = text_param(h, 1, "default")?;

    let result = if value.is_empty() {
        default_value
    } else {
        value
    };

    out.write(&result)?;
    Ok(())
}

/// Environment variable helper - gets environment variable value
pub fn env_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let var_name = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("env helper requires variable name parameter"))?;

    let default_value = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("");

    let value = env::var(var_name).unwrap_or_else(|_| default_value.to_string());
    out.write(&value)?;
    Ok(())
}

/// Base64 encode helper
pub fn base64_encode_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = text_param(h, 0, "base64_encode")?;
    out.write(&BASE64.encode(input.as_bytes()))?;
    Ok(())
}

/// Base64 decode helper
pub fn base64_decode_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = text_param(h, 0, "base64_decode")?;

    let decoded_bytes = BASE64
        .decode(input)
        .map_err(|e| RenderError::new(format!("Base64 decode error: {}", e)))?;

    let decoded_str = String::from_utf8(decoded_bytes)
        .map_err(|e| RenderError::new(format!("UTF-8 decode error: {}", e)))?;

    out.write(&decoded_str)?;
    Ok(())
}

/// Timestamp helper - current UTC time with an optional strftime format.
/// Output changes between renders.
pub fn timestamp_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let format = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .unwrap_or("%Y-%m-%dT%H:%M:%SZ");

    out.write(&Utc::now().format(format).to_string())?;
    Ok(())
}

/// UUID helper - a fresh v4 UUID per call
pub fn uuid_helper(
    _h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&Uuid::new_v4().to_string())?;
    Ok(())
}

/// Register all built-in helpers with a Handlebars instance
pub fn register_helpers(handlebars: &mut Handlebars) {
    handlebars.register_helper("upper", Box::new(upper_helper));
    handlebars.register_helper("lower", Box::new(lower_helper));
    handlebars.register_helper("trim", Box::new(trim_helper));
    handlebars.register_helper("quote", Box::new(quote_helper));
    handlebars.register_helper("replace", Box::new(replace_helper));
    handlebars.register_helper("indent", Box::new(indent_helper));
    handlebars.register_helper("join", Box::new(join_helper));
    handlebars.register_helper("default", Box::new(default_helper));
    handlebars.register_helper("env", Box::new(env_helper));
    handlebars.register_helper("base64_encode", Box::new(base64_encode_helper));
    handlebars.register_helper("base64_decode", Box::new(base64_decode_helper));
    handlebars.register_helper("timestamp", Box::new(timestamp_helper));
    handlebars.register_helper("uuid", Box::new(uuid_helper));
}
