use super::{ToolError, ToolErrorKind};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    RequestTimeout = -32001,
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    fn for_kind(kind: ToolErrorKind) -> Self {
        match kind {
            ToolErrorKind::InvalidParams => ErrorCode::InvalidParams,
            ToolErrorKind::Timeout => ErrorCode::RequestTimeout,
            ToolErrorKind::Denied | ToolErrorKind::NotFound => ErrorCode::InvalidRequest,
            ToolErrorKind::Remote | ToolErrorKind::Internal => ErrorCode::InternalError,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct McpError {
    pub code: ErrorCode,
    pub message: String,
}

impl McpError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Renders a tool failure as a line-oriented block the agent can read back.
    pub fn from_tool_error(tool: &str, error: &ToolError) -> Self {
        let mut lines = vec![
            "PicaError".to_string(),
            format!("tool: {}", tool),
            format!("kind: {:?}", error.kind).to_lowercase(),
            format!("code: {}", error.code),
            format!("message: {}", error.message),
        ];
        if let Some(hint) = &error.hint {
            lines.push(format!("hint: {}", hint));
        }
        if let Some(details) = &error.details {
            lines.push(format!("details: {}", details));
        }
        Self::new(ErrorCode::for_kind(error.kind), lines.join("\n"))
    }
}

impl fmt::Display for McpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for McpError {}
