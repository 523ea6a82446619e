use crate::app::App;
use crate::errors::{ErrorCode, McpError, ToolError};
use crate::mcp::catalog::{is_tool_visible, validate_tool_args, visible_tool_names, visible_tools};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "pica-toolkit";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub async fn new() -> Result<Self, ToolError> {
        let app = App::initialize()?;
        Ok(Self::from_app(app))
    }

    pub fn from_app(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": visible_tools(&self.app.config) })
    }

    async fn handle_tools_call(&self, name: &str, raw_args: Value) -> Result<Value, McpError> {
        if !is_tool_visible(name, &self.app.config) {
            let err = unknown_tool_error(name, &visible_tool_names(&self.app.config));
            return Err(McpError::from_tool_error(name, &err));
        }

        let args = if raw_args.is_null() {
            Value::Object(Default::default())
        } else {
            raw_args
        };
        validate_tool_args(name, &args)?;

        let output = self
            .app
            .tool_executor
            .execute(name, args)
            .await
            .map_err(|err| McpError::from_tool_error(name, &err))?;

        let text = serde_json::to_string(&output)
            .map_err(|err| McpError::new(ErrorCode::InternalError, err.to_string()))?;
        Ok(serde_json::json!({
            "content": [ { "type": "text", "text": text } ]
        }))
    }

    /// Answers one line of input. Notifications and blank lines produce nothing.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let Ok(parsed) = serde_json::from_str::<Value>(trimmed) else {
            return Some(JsonRpcResponse::failure(
                Value::Null,
                ErrorCode::ParseError.as_i32(),
                "Parse error",
            ));
        };
        let Ok(request) = serde_json::from_value::<JsonRpcRequest>(parsed) else {
            return Some(JsonRpcResponse::failure(
                Value::Null,
                ErrorCode::InvalidRequest.as_i32(),
                "Invalid request",
            ));
        };
        if request.is_notification() {
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.handle_initialize()),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.handle_tools_list()),
            "tools/call" => {
                let params = request.params.as_object().cloned().unwrap_or_default();
                let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
                if name.is_empty() {
                    JsonRpcResponse::failure(
                        id,
                        ErrorCode::InvalidParams.as_i32(),
                        "Missing tool name",
                    )
                } else {
                    let args = params.get("arguments").cloned().unwrap_or(Value::Null);
                    match self.handle_tools_call(name, args).await {
                        Ok(result) => JsonRpcResponse::success(id, result),
                        Err(err) => JsonRpcResponse::from_error(id, err),
                    }
                }
            }
            _ => JsonRpcResponse::failure(
                id,
                ErrorCode::MethodNotFound.as_i32(),
                "Method not found",
            ),
        };
        Some(response)
    }

    /// Serves newline-delimited JSON-RPC until `reader` hits EOF.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), ToolError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut writer = BufWriter::new(writer);

        while let Some(line) = lines.next_line().await? {
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let payload = serde_json::to_string(&response)
                .map_err(|err| ToolError::internal(err.to_string()))?;
            writer.write_all(payload.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}

pub async fn run_stdio() -> Result<(), ToolError> {
    let server = McpServer::new().await?;
    server.app.logger.debug("serving on stdio", None);
    server.run_stdio().await
}
