use crate::config::{AccessList, PicaConfig};
use crate::errors::ToolError;
use crate::managers;
use crate::mcp::catalog::{
    visible_tool_names, AUTHKIT_TOOL, CONNECTIONS_TOOL, EXECUTE_TOOL, INTEGRATIONS_TOOL,
    KNOWLEDGE_TOOL, SEARCH_TOOL,
};
use crate::services::action_resolver::ActionResolver;
use crate::services::catalog::CatalogService;
use crate::services::connections::ConnectionService;
use crate::services::logger::Logger;
use crate::services::passthrough::PassthroughExecutor;
use crate::services::pica_client::PicaClient;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::validation::Validation;
use crate::utils::text::pluralize;
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: Arc<PicaConfig>,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(
        config: &PicaConfig,
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        let mut missing: Vec<String> = visible_tool_names(config)
            .into_iter()
            .filter(|name| !handlers.contains_key(name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("Every visible tool in tool_catalog.json needs a handler.")
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    /// Builds the app from `PICA_*` environment variables.
    pub fn initialize() -> Result<Self, ToolError> {
        let config = PicaConfig::from_env()?;
        Self::from_config(config, Logger::new("pica"))
    }

    pub fn from_config(config: PicaConfig, logger: Logger) -> Result<Self, ToolError> {
        let config = Arc::new(config);
        let validation = Validation::new();

        let client = Arc::new(PicaClient::new(config.clone(), &logger)?);
        let resolver = Arc::new(ActionResolver::new(&logger, client.clone()));
        let connections = Arc::new(ConnectionService::new(&logger, client.clone()));
        let catalog = Arc::new(CatalogService::new(client.clone()));
        let passthrough = Arc::new(PassthroughExecutor::new(
            &logger,
            client.clone(),
            resolver.clone(),
            connections.clone(),
        ));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert(
            SEARCH_TOOL.to_string(),
            Arc::new(managers::actions::SearchActionsManager::new(
                logger.clone(),
                validation.clone(),
                client.clone(),
                resolver.clone(),
            )),
        );
        handlers.insert(
            KNOWLEDGE_TOOL.to_string(),
            Arc::new(managers::actions::KnowledgeManager::new(
                validation.clone(),
                resolver,
            )),
        );
        handlers.insert(
            EXECUTE_TOOL.to_string(),
            Arc::new(managers::execute::ExecuteManager::new(
                logger.clone(),
                validation.clone(),
                passthrough,
                config.knowledge_agent,
            )),
        );
        handlers.insert(
            CONNECTIONS_TOOL.to_string(),
            Arc::new(managers::connections::ConnectionsManager::new(connections)),
        );
        handlers.insert(
            INTEGRATIONS_TOOL.to_string(),
            Arc::new(managers::integrations::IntegrationsManager::new(catalog)),
        );
        handlers.insert(
            AUTHKIT_TOOL.to_string(),
            Arc::new(managers::integrations::AuthKitManager::new(validation)),
        );

        Self::validate_tool_wiring(&config, &handlers)?;

        let tool_executor = Arc::new(ToolExecutor::new(
            logger.clone(),
            handlers,
            vec![config.secret().to_string()],
        ));

        log_startup(&logger, &config);

        Ok(Self {
            logger,
            config,
            tool_executor,
        })
    }
}

fn log_startup(logger: &Logger, config: &PicaConfig) {
    if config.knowledge_agent {
        logger.info("[Pica] 🧠 Knowledge Agent Mode Initialized", None);
        logger.info("[Pica] Agent has access to all actions for knowledge discovery", None);
        logger.info("[Pica] Execute tool returns request configurations without execution", None);
        logger.info("[Pica] Connection management tools are disabled in knowledge mode", None);
        logger.info(
            "[Pica] The `listPicaIntegrations` tool is enabled for platform discovery",
            None,
        );
    } else {
        match &config.connectors {
            AccessList::All => {
                logger.info("[Pica] Initialized client with access to all connectors", None);
                logger.info("[Pica] The `listPicaConnections` tool is enabled", None);
            }
            AccessList::Only(keys) => {
                logger.info(&access_message(keys.len(), "connector"), None);
                logger.info("[Pica] The `listPicaConnections` tool is disabled", None);
            }
        }
        match &config.actions {
            AccessList::All => {
                logger.info("[Pica] Initialized client with access to all actions", None)
            }
            AccessList::Only(ids) => logger.info(&access_message(ids.len(), "action"), None),
        }
    }

    if config.authkit {
        logger.info(
            "[Pica] 🔗 AuthKit enabled - The `promptToConnectIntegration` tool is available",
            None,
        );
    }
}

fn access_message(count: usize, singular: &str) -> String {
    format!(
        "[Pica] Initialized client with access to {} {}",
        count,
        pluralize(count, singular)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::logger::MemorySink;

    fn build(config: PicaConfig) -> (App, MemorySink) {
        let sink = MemorySink::new();
        let logger = Logger::with_sink("pica", Arc::new(sink.clone()));
        let app = App::from_config(config, logger).expect("app");
        (app, sink)
    }

    #[test]
    fn standard_mode_reports_counts() {
        let config = PicaConfig::new("sk_test_secret_value")
            .expect("config")
            .with_connectors(["test::gmail::default::abc"])
            .with_actions(["conn_mod_def::A::B", "conn_mod_def::C::D"]);
        let (app, sink) = build(config);
        assert!(sink.contains("access to 1 connector"));
        assert!(sink.contains("access to 2 actions"));
        assert!(sink.contains("`listPicaConnections` tool is disabled"));
        assert!(!sink.contains("sk_test_secret_value"));
        assert!(app.tool_executor.has_tool(CONNECTIONS_TOOL));
    }

    #[test]
    fn knowledge_mode_skips_access_messages() {
        let config = PicaConfig::new("sk_test")
            .expect("config")
            .with_knowledge_agent(true)
            .with_authkit(true);
        let (_app, sink) = build(config);
        assert!(sink.contains("Knowledge Agent Mode Initialized"));
        assert!(sink.contains("AuthKit enabled"));
        assert!(!sink.contains("Initialized client with access to"));
    }
}
