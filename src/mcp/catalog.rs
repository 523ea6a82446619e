use crate::config::PicaConfig;
use crate::errors::{ErrorCode, McpError};
use crate::utils::suggest::suggest;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const SEARCH_TOOL: &str = "searchPlatformActions";
pub const KNOWLEDGE_TOOL: &str = "getActionsKnowledge";
pub const EXECUTE_TOOL: &str = "execute";
pub const CONNECTIONS_TOOL: &str = "listPicaConnections";
pub const INTEGRATIONS_TOOL: &str = "listPicaIntegrations";
pub const AUTHKIT_TOOL: &str = "promptToConnectIntegration";

const KNOWLEDGE_EXECUTE_DESCRIPTION: &str = "Generate request configuration for an action without executing it. Returns the complete request config that can be used to create Edge Function code. Automatically fetches method and path from the knowledge endpoint using actionSystemId.";

const MAX_REPORTED_VIOLATIONS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).unwrap_or_default()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static [ToolDef] {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_CATALOG.iter().find(|tool| tool.name == name)
}

/// Whether a configured client offers `name` at all.
pub fn is_tool_visible(name: &str, config: &PicaConfig) -> bool {
    match name {
        SEARCH_TOOL | KNOWLEDGE_TOOL | EXECUTE_TOOL => true,
        CONNECTIONS_TOOL => config.connectors.is_all() && !config.knowledge_agent,
        INTEGRATIONS_TOOL => config.knowledge_agent,
        AUTHKIT_TOOL => config.authkit,
        _ => false,
    }
}

/// Tools offered to this client, in catalog order, with descriptions adjusted
/// for knowledge-agent mode.
pub fn visible_tools(config: &PicaConfig) -> Vec<ToolDef> {
    TOOL_CATALOG
        .iter()
        .filter(|tool| is_tool_visible(&tool.name, config))
        .map(|tool| {
            let mut tool = tool.clone();
            if tool.name == EXECUTE_TOOL && config.knowledge_agent {
                tool.description = KNOWLEDGE_EXECUTE_DESCRIPTION.to_string();
            }
            tool
        })
        .collect()
}

pub fn visible_tool_names(config: &PicaConfig) -> Vec<String> {
    visible_tools(config).into_iter().map(|tool| tool.name).collect()
}

/// Checks `args` against the tool's input schema and reports every violation.
pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), McpError> {
    let (Some(tool), Some(schema)) = (tool_by_name(tool_name), TOOL_VALIDATORS.get(tool_name)) else {
        return Ok(());
    };
    if let Err(errors) = schema.validate(args) {
        let message = format_schema_errors(tool_name, errors, &tool.input_schema);
        return Err(McpError::new(ErrorCode::InvalidParams, message));
    }
    Ok(())
}

fn format_schema_errors(tool_name: &str, errors: jsonschema::ErrorIterator, schema: &Value) -> String {
    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();

    for err in errors.take(MAX_REPORTED_VIOLATIONS) {
        let instance_path = if err.instance_path.to_string().is_empty() {
            "(root)".to_string()
        } else {
            err.instance_path.to_string()
        };
        match &err.kind {
            jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
                let known: Vec<String> = schema_parent_at(schema, &err.schema_path.to_string())
                    .and_then(|parent| parent.get("properties").and_then(|v| v.as_object()).cloned())
                    .map(|props| props.keys().cloned().collect())
                    .unwrap_or_default();
                for unknown in unexpected {
                    rendered.push(format!("{}: unknown field '{}'", instance_path, unknown));
                    let suggestions = suggest(unknown, &known, 3);
                    if !suggestions.is_empty() {
                        did_you_means.push(format!("'{}' -> {}", unknown, suggestions.join(", ")));
                    }
                }
            }
            jsonschema::error::ValidationErrorKind::Required { property } => {
                let prop = property
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!("{}: missing required field '{}'", instance_path, prop));
            }
            jsonschema::error::ValidationErrorKind::Type { kind } => {
                rendered.push(format!("{}: expected {}", instance_path, format_type_kind(kind)));
            }
            _ => {
                rendered.push(format!("{}: {}", instance_path, err));
            }
        }
    }

    let mut lines = vec![format!("Invalid arguments for {}", tool_name)];
    lines.extend(rendered.iter().map(|line| format!("- {}", line)));
    if !did_you_means.is_empty() {
        lines.push(format!("Did you mean: {}", did_you_means.join(" | ")));
    }
    lines.join("\n")
}

fn format_type_kind(kind: &jsonschema::error::TypeKind) -> String {
    match kind {
        jsonschema::error::TypeKind::Single(primitive) => primitive.to_string(),
        jsonschema::error::TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            if list.is_empty() {
                "unknown".to_string()
            } else {
                list.join(" | ")
            }
        }
    }
}

/// Walks a schema path such as `/additionalProperties` back to the object
/// schema that owns the failing keyword.
fn schema_parent_at<'a>(schema: &'a Value, schema_path: &str) -> Option<&'a Value> {
    let mut segments: Vec<&str> = schema_path.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();
    let mut current = schema;
    for segment in segments {
        current = match current {
            Value::Object(obj) => obj.get(segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
