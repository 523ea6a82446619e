use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::constants::limits::LOG_ARGS_MAX_STRING;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::redact::redact_object;
use crate::utils::tool_errors::unknown_tool_error;

use serde_json::Value;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
    secrets: Vec<String>,
}

impl ToolExecutor {
    /// `secrets` are scrubbed from logged arguments.
    pub fn new(
        logger: Logger,
        handlers: HashMap<String, Arc<dyn ToolHandler>>,
        secrets: Vec<String>,
    ) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
            secrets,
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    pub async fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let Some(handler) = self.handlers.get(tool) else {
            return Err(unknown_tool_error(tool, &self.tool_names()));
        };

        let trace_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        self.logger.debug(
            tool,
            Some(&serde_json::json!({
                "trace_id": trace_id,
                "args": redact_object(&args, LOG_ARGS_MAX_STRING, Some(&self.secrets)),
            })),
        );

        let result = match handler.handle(args).await {
            Ok(result) => result,
            Err(err) => {
                self.logger.warn(
                    tool,
                    Some(&serde_json::json!({
                        "trace_id": trace_id,
                        "code": err.code,
                        "duration_ms": started.elapsed().as_millis() as u64,
                    })),
                );
                return Err(err);
            }
        };

        Ok(serde_json::json!({
            "result": result,
            "meta": {
                "tool": tool,
                "trace_id": trace_id,
                "duration_ms": started.elapsed().as_millis() as u64,
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::codes;
    use crate::services::logger::{LogLevel, MemorySink};

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn handle(&self, args: Value) -> Result<Value, ToolError> {
            Ok(args)
        }
    }

    fn executor(sink: &MemorySink) -> ToolExecutor {
        let logger = Logger::with_sink("test", Arc::new(sink.clone())).with_level(LogLevel::Debug);
        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert("echo".to_string(), Arc::new(Echo));
        ToolExecutor::new(logger, handlers, vec!["sk_live_hidden".to_string()])
    }

    #[tokio::test]
    async fn wraps_result_with_meta() {
        let sink = MemorySink::new();
        let out = executor(&sink)
            .execute("echo", serde_json::json!({"x": 1}))
            .await
            .expect("execute");
        assert_eq!(out["result"], serde_json::json!({"x": 1}));
        assert_eq!(out["meta"]["tool"], "echo");
        assert!(out["meta"]["trace_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn logged_args_never_carry_the_secret() {
        let sink = MemorySink::new();
        executor(&sink)
            .execute("echo", serde_json::json!({"note": "use sk_live_hidden"}))
            .await
            .expect("execute");
        assert!(!sink.lines().is_empty());
        assert!(!sink.contains("sk_live_hidden"));
    }

    #[tokio::test]
    async fn unknown_tool_suggests_alternatives() {
        let sink = MemorySink::new();
        let err = executor(&sink)
            .execute("ecoh", Value::Null)
            .await
            .expect_err("must fail");
        assert_eq!(err.code, codes::UNKNOWN_TOOL);
    }
}
