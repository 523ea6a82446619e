use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::passthrough::{ExecuteRequest, PassthroughExecutor, PayloadEncoding};
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use serde_json::Value;
use std::sync::Arc;

/// `execute`. Knowledge agents only ever get a preview.
pub struct ExecuteManager {
    logger: Logger,
    validation: Validation,
    executor: Arc<PassthroughExecutor>,
    preview_only: bool,
}

impl ExecuteManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        executor: Arc<PassthroughExecutor>,
        preview_only: bool,
    ) -> Self {
        Self {
            logger: logger.child("execute"),
            validation,
            executor,
            preview_only,
        }
    }

    pub fn parse_request(&self, args: &Value) -> Result<ExecuteRequest, ToolError> {
        let action_id = self.validation.required_string(args, "actionSystemId")?;
        let connection_key = self.validation.required_string(args, "connectionKey")?;
        let path_variables = self.validation.optional_object(args, "pathVariables")?;
        let query_params = self.validation.optional_object(args, "queryParams")?;
        let headers = self.validation.header_map(args, "headers")?;
        let is_form_data = self.validation.flag(args, "isFormData")?;
        let is_form_url_encoded = self.validation.flag(args, "isFormUrlEncoded")?;

        Ok(ExecuteRequest {
            action_id,
            connection_key,
            data: args.get("data").cloned().unwrap_or(Value::Null),
            path_variables,
            query_params,
            headers,
            encoding: PayloadEncoding::from_flags(is_form_data, is_form_url_encoded),
            preview_only: self.preview_only,
        })
    }

    pub async fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let request = self.parse_request(args)?;
        let outcome = self.executor.execute(request).await?;
        if let Some(config) = outcome.request_config() {
            self.logger
                .debug("request config", Some(&serde_json::json!({ "url": config.url })));
        }
        Ok(outcome.to_value())
    }
}

#[async_trait::async_trait]
impl ToolHandler for ExecuteManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.execute(&args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PicaConfig;
    use crate::errors::codes;
    use crate::services::action_resolver::ActionResolver;
    use crate::services::connections::ConnectionService;
    use crate::services::pica_client::PicaClient;
    use serde_json::json;

    fn manager(preview_only: bool) -> ExecuteManager {
        let logger = Logger::new("test");
        let config = Arc::new(PicaConfig::new("sk_test").expect("config"));
        let client = Arc::new(PicaClient::new(config, &logger).expect("client"));
        let resolver = Arc::new(ActionResolver::new(&logger, client.clone()));
        let connections = Arc::new(ConnectionService::new(&logger, client.clone()));
        let executor = Arc::new(PassthroughExecutor::new(&logger, client, resolver, connections));
        ExecuteManager::new(logger, Validation::new(), executor, preview_only)
    }

    #[test]
    fn parses_every_field() {
        let request = manager(true)
            .parse_request(&json!({
                "actionSystemId": "conn_mod_def::A::B",
                "connectionKey": "test::gmail::default::abc",
                "data": {"to": "a@b.c"},
                "pathVariables": {"id": 7},
                "queryParams": {"q": "x"},
                "headers": {"X-Trace": 1},
                "isFormData": true,
                "isFormUrlEncoded": true
            }))
            .expect("request");
        assert_eq!(request.action_id, "conn_mod_def::A::B");
        assert_eq!(request.data, json!({"to": "a@b.c"}));
        assert_eq!(request.path_variables.expect("vars")["id"], json!(7));
        assert_eq!(request.headers["X-Trace"], json!("1"));
        assert_eq!(request.encoding, PayloadEncoding::Multipart);
        assert!(request.preview_only);
    }

    #[test]
    fn missing_data_is_null() {
        let request = manager(false)
            .parse_request(&json!({
                "actionSystemId": "A::B",
                "connectionKey": "live::slack::default::def"
            }))
            .expect("request");
        assert!(request.data.is_null());
        assert_eq!(request.encoding, PayloadEncoding::Json);
        assert!(!request.preview_only);
    }

    #[test]
    fn connection_key_is_required() {
        let err = manager(false)
            .parse_request(&json!({"actionSystemId": "A::B"}))
            .expect_err("must fail");
        assert_eq!(err.code, codes::INVALID_PARAMS);
    }
}
