use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

pub mod codes {
    pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
    pub const FORMAT_ERROR: &str = "FORMAT_ERROR";
    pub const MISSING_VARIABLE: &str = "MISSING_VARIABLE";
    pub const ACCESS_DENIED: &str = "ACCESS_DENIED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const UNKNOWN_ACTION: &str = "UNKNOWN_ACTION";
    pub const UNKNOWN_TOOL: &str = "UNKNOWN_TOOL";
    pub const REMOTE_ERROR: &str = "REMOTE_ERROR";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const INTERNAL: &str = "INTERNAL";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    InvalidParams,
    Denied,
    NotFound,
    Remote,
    Timeout,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code == code
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidParams, codes::INVALID_PARAMS, message)
    }

    /// Malformed identifier or key. `field` names the part that failed.
    pub fn format_error(field: &str, message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidParams, codes::FORMAT_ERROR, message)
            .with_details(serde_json::json!({ "field": field }))
    }

    /// Lists every unresolved placeholder at once.
    pub fn missing_variables(names: &[String]) -> Self {
        Self::new(
            ToolErrorKind::InvalidParams,
            codes::MISSING_VARIABLE,
            format!(
                "Missing required path variables: {}. Please provide values for these variables.",
                names.join(", ")
            ),
        )
        .with_details(serde_json::json!({ "missing": names }))
    }

    pub fn access_denied(connection_key: &str) -> Self {
        Self::new(
            ToolErrorKind::Denied,
            codes::ACCESS_DENIED,
            format!(
                "Connection key '{}' does not exist or is not accessible.",
                connection_key
            ),
        )
        .with_hint("Use listPicaConnections to see the connection keys available to this client.")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, codes::NOT_FOUND, message)
    }

    pub fn unknown_action(action_id: &str) -> Self {
        Self::new(
            ToolErrorKind::NotFound,
            codes::UNKNOWN_ACTION,
            format!(
                "Could not fetch knowledge for action system ID: {}",
                action_id
            ),
        )
        .with_details(serde_json::json!({ "action_id": action_id }))
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Remote, codes::REMOTE_ERROR, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, codes::TIMEOUT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, codes::INTERNAL, message)
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ToolError {}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variables_lists_every_name() {
        let err = ToolError::missing_variables(&["userId".to_string(), "orgId".to_string()]);
        assert_eq!(err.code, codes::MISSING_VARIABLE);
        assert!(err.message.contains("userId, orgId"));
        assert_eq!(
            err.details.as_ref().and_then(|d| d.get("missing")),
            Some(&serde_json::json!(["userId", "orgId"]))
        );
    }

    #[test]
    fn format_error_names_the_field() {
        let err = ToolError::format_error("environment", "bad env");
        assert_eq!(err.kind, ToolErrorKind::InvalidParams);
        assert_eq!(
            err.details.as_ref().and_then(|d| d.get("field")).and_then(Value::as_str),
            Some("environment")
        );
    }
}
