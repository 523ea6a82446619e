use crate::errors::ToolError;
use crate::services::catalog::CatalogService;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use serde_json::Value;
use std::sync::Arc;

/// `listPicaIntegrations`, offered to knowledge agents.
pub struct IntegrationsManager {
    catalog: Arc<CatalogService>,
}

impl IntegrationsManager {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self { catalog }
    }
}

#[async_trait::async_trait]
impl ToolHandler for IntegrationsManager {
    async fn handle(&self, _args: Value) -> Result<Value, ToolError> {
        let integrations = self.catalog.integrations().await?;
        serde_json::to_value(integrations).map_err(|err| ToolError::internal(err.to_string()))
    }
}

/// `promptToConnectIntegration`. The host UI opens AuthKit; this only echoes
/// the platform back.
pub struct AuthKitManager {
    validation: Validation,
}

impl AuthKitManager {
    pub fn new(validation: Validation) -> Self {
        Self { validation }
    }

    pub fn prompt(&self, args: &Value) -> Result<Value, ToolError> {
        let platform = self.validation.required_string(args, "platformName")?;
        Ok(serde_json::json!({ "response": platform }))
    }
}

#[async_trait::async_trait]
impl ToolHandler for AuthKitManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.prompt(&args)
    }
}
