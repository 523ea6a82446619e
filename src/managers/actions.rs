use crate::errors::ToolError;
use crate::services::action_resolver::{ActionResolver, SearchFilters};
use crate::services::logger::Logger;
use crate::services::pica_client::PicaClient;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use serde_json::Value;
use std::sync::Arc;

pub const NO_ACTIONS_MESSAGE: &str =
    "No actions are available. Please initialize the client with specific action ids or ['*'] for all actions.";

/// `searchPlatformActions`
pub struct SearchActionsManager {
    logger: Logger,
    validation: Validation,
    client: Arc<PicaClient>,
    resolver: Arc<ActionResolver>,
}

impl SearchActionsManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        client: Arc<PicaClient>,
        resolver: Arc<ActionResolver>,
    ) -> Self {
        Self {
            logger: logger.child("search"),
            validation,
            client,
            resolver,
        }
    }

    fn filters(&self) -> Result<SearchFilters, ToolError> {
        let config = self.client.config();
        if !config.knowledge_agent && config.actions.is_empty() {
            return Err(ToolError::invalid_params(NO_ACTIONS_MESSAGE)
                .with_hint("Set PICA_ACTIONS to a comma-separated list of action ids, or '*'."));
        }
        Ok(SearchFilters {
            permissions: config.permissions,
            actions: config.discovery_actions(),
        })
    }

    pub async fn search(&self, args: &Value) -> Result<Value, ToolError> {
        let filters = self.filters()?;
        let platform = self.validation.required_string(args, "platform")?;
        let query = self.validation.required_string(args, "query")?;

        let actions = self.resolver.search_actions(&platform, &query, &filters).await?;
        self.logger.debug(
            "search complete",
            Some(&serde_json::json!({ "platform": platform, "count": actions.len() })),
        );
        serde_json::to_value(actions).map_err(|err| ToolError::internal(err.to_string()))
    }
}

#[async_trait::async_trait]
impl ToolHandler for SearchActionsManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.search(&args).await
    }
}

/// `getActionsKnowledge`
pub struct KnowledgeManager {
    validation: Validation,
    resolver: Arc<ActionResolver>,
}

impl KnowledgeManager {
    pub fn new(validation: Validation, resolver: Arc<ActionResolver>) -> Self {
        Self {
            validation,
            resolver,
        }
    }

    pub async fn knowledge(&self, args: &Value) -> Result<Value, ToolError> {
        let system_ids = self.validation.string_list(args, "systemIds")?;
        let knowledge = self.resolver.get_actions_knowledge(&system_ids).await?;
        serde_json::to_value(knowledge).map_err(|err| ToolError::internal(err.to_string()))
    }
}

#[async_trait::async_trait]
impl ToolHandler for KnowledgeManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.knowledge(&args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PicaConfig;
    use crate::errors::codes;

    fn manager(config: PicaConfig) -> SearchActionsManager {
        let logger = Logger::new("test");
        let client = Arc::new(PicaClient::new(Arc::new(config), &logger).expect("client"));
        let resolver = Arc::new(ActionResolver::new(&logger, client.clone()));
        SearchActionsManager::new(logger, Validation::new(), client, resolver)
    }

    #[tokio::test]
    async fn empty_action_list_refuses_to_search() {
        let config = PicaConfig::new("sk_test").expect("config").with_actions(Vec::<String>::new());
        let err = manager(config)
            .search(&serde_json::json!({"platform": "gmail", "query": "send"}))
            .await
            .expect_err("must fail");
        assert_eq!(err.code, codes::INVALID_PARAMS);
        assert_eq!(err.message, NO_ACTIONS_MESSAGE);
    }

    #[test]
    fn knowledge_mode_searches_every_action() {
        let config = PicaConfig::new("sk_test")
            .expect("config")
            .with_actions(Vec::<String>::new())
            .with_knowledge_agent(true);
        let filters = manager(config).filters().expect("filters");
        assert!(filters.actions.is_all());
    }
}
