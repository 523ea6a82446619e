use crate::config::AccessList;
use crate::constants::api::CONNECTIONS_PATH;
use crate::constants::pagination::PAGE_SIZE;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::pica_client::PicaClient;
use crate::types::{Connection, ConnectionKeyRef, ConnectionReference};
use crate::utils::identifiers::ConnectionKey;
use crate::utils::pagination::drain;
use std::sync::Arc;

pub struct ConnectionService {
    logger: Logger,
    client: Arc<PicaClient>,
}

impl ConnectionService {
    pub fn new(logger: &Logger, client: Arc<PicaClient>) -> Self {
        Self {
            logger: logger.child("connections"),
            client,
        }
    }

    fn listing_query(&self) -> Option<Vec<(String, String)>> {
        let config = self.client.config();
        let mut query = Vec::new();
        match &config.connectors {
            AccessList::All => {}
            AccessList::Only(keys) if keys.is_empty() => return None,
            AccessList::Only(keys) => query.push(("keys".to_string(), keys.join(","))),
        }
        if let Some(identity_type) = config.identity_type {
            query.push(("identityType".to_string(), identity_type.as_str().to_string()));
        }
        if let Some(identity) = &config.identity {
            query.push(("identity".to_string(), identity.clone()));
        }
        Some(query)
    }

    /// Every connection visible to this client. An explicit empty connector
    /// list sees nothing and makes no request.
    pub async fn list_connections(&self) -> Result<Vec<Connection>, ToolError> {
        let Some(query) = self.listing_query() else {
            return Ok(Vec::new());
        };
        let client = &self.client;
        let query = &query;
        let connections = drain(
            |page, limit| async move { client.get_page(CONNECTIONS_PATH, query, page, limit).await },
            PAGE_SIZE,
        )
        .await?;
        self.logger.debug(
            "listed connections",
            Some(&serde_json::json!({ "count": connections.len() })),
        );
        Ok(connections)
    }

    pub async fn assert_connection_accessible(&self, key: &ConnectionKey) -> Result<(), ToolError> {
        let connections = self.list_connections().await?;
        if connections.iter().any(|conn| conn.key == key.as_str()) {
            return Ok(());
        }
        self.logger.warn(
            "connection not accessible",
            Some(&serde_json::json!({ "platform": key.platform() })),
        );
        Err(ToolError::access_denied(key.as_str()))
    }

    pub async fn list_connection_references(&self) -> Result<Vec<ConnectionReference>, ToolError> {
        let connections = self.list_connections().await?;
        connection_references(&connections)
    }
}

/// Active connections only, each key parsed into its parts.
pub fn connection_references(connections: &[Connection]) -> Result<Vec<ConnectionReference>, ToolError> {
    connections
        .iter()
        .filter(|conn| conn.active)
        .map(|conn| {
            let key = ConnectionKey::parse(&conn.key)?;
            Ok(ConnectionReference {
                platform: key.platform().to_string(),
                key: ConnectionKeyRef::from(&key),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn connection(key: &str, active: bool) -> Connection {
        serde_json::from_value(json!({"key": key, "platform": "x", "active": active}))
            .expect("connection")
    }

    #[test]
    fn references_skip_inactive_and_parse_keys() {
        let refs = connection_references(&[
            connection("test::gmail::default::abc|user-1", true),
            connection("live::slack::default::def", false),
        ])
        .expect("references");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].platform, "gmail");
        assert_eq!(
            serde_json::to_value(&refs[0].key).expect("serialize"),
            json!({
                "fullKey": "test::gmail::default::abc|user-1",
                "parts": {
                    "environment": "test",
                    "platform": "gmail",
                    "namespace": "default",
                    "id": "abc",
                    "identity": "user-1"
                }
            })
        );
    }

    #[test]
    fn malformed_active_key_is_a_format_error() {
        let err = connection_references(&[connection("prod::gmail::default::abc", true)])
            .expect_err("must fail");
        assert_eq!(err.code, crate::errors::codes::FORMAT_ERROR);
    }
}
