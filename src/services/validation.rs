use crate::errors::ToolError;
use serde_json::{Map, Value};

/// Reads typed fields out of tool arguments. The catalog schema has already
/// run for MCP calls, so these mostly guard library callers that bypass it.
/// Every failure is `InvalidParams` and names the field.
#[derive(Clone, Default)]
pub struct Validation;

fn field<'a>(args: &'a Value, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|value| !value.is_null())
}

fn invalid(name: &str, expected: &str) -> ToolError {
    ToolError::invalid_params(format!("{} must be {}", name, expected))
        .with_details(serde_json::json!({ "field": name }))
}

impl Validation {
    pub fn new() -> Self {
        Self
    }

    /// Trimmed, non-empty string.
    pub fn required_string(&self, args: &Value, name: &str) -> Result<String, ToolError> {
        field(args, name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| invalid(name, "a non-empty string"))
    }

    /// Non-empty strings; an empty array is allowed.
    pub fn string_list(&self, args: &Value, name: &str) -> Result<Vec<String>, ToolError> {
        let items = field(args, name)
            .and_then(Value::as_array)
            .ok_or_else(|| invalid(name, "an array of strings"))?;
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                item.as_str()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| invalid(&format!("{}[{}]", name, idx), "a non-empty string"))
            })
            .collect()
    }

    /// Absent and `null` read as `false`.
    pub fn flag(&self, args: &Value, name: &str) -> Result<bool, ToolError> {
        match field(args, name) {
            None => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(_) => Err(invalid(name, "a boolean")),
        }
    }

    pub fn optional_object(&self, args: &Value, name: &str) -> Result<Option<Map<String, Value>>, ToolError> {
        match field(args, name) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(_) => Err(invalid(name, "an object")),
        }
    }

    /// Header map with string values. Null values and blank names are
    /// dropped; other scalars are rendered as JSON text.
    pub fn header_map(&self, args: &Value, name: &str) -> Result<Map<String, Value>, ToolError> {
        let Some(map) = self.optional_object(args, name)? else {
            return Ok(Map::new());
        };
        Ok(map
            .into_iter()
            .filter(|(key, value)| !key.trim().is_empty() && !value.is_null())
            .map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (key.trim().to_string(), Value::String(text))
            })
            .collect())
    }
}
