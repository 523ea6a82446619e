use crate::errors::ToolError;
use crate::services::connections::ConnectionService;
use crate::services::tool_executor::ToolHandler;
use serde_json::Value;
use std::sync::Arc;

/// `listPicaConnections`
pub struct ConnectionsManager {
    connections: Arc<ConnectionService>,
}

impl ConnectionsManager {
    pub fn new(connections: Arc<ConnectionService>) -> Self {
        Self { connections }
    }
}

#[async_trait::async_trait]
impl ToolHandler for ConnectionsManager {
    async fn handle(&self, _args: Value) -> Result<Value, ToolError> {
        let references = self.connections.list_connection_references().await?;
        serde_json::to_value(references).map_err(|err| ToolError::internal(err.to_string()))
    }
}
