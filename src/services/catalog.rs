use crate::constants::api::{AVAILABLE_ACTIONS_PATH, AVAILABLE_CONNECTORS_PATH};
use crate::constants::pagination::PAGE_SIZE;
use crate::errors::ToolError;
use crate::services::pica_client::{encode_segment, PicaClient};
use crate::types::{AvailableAction, Connector, Integration};
use crate::utils::pagination::drain;
use std::sync::Arc;

/// Read-only browsing of the platform catalog.
pub struct CatalogService {
    client: Arc<PicaClient>,
}

impl CatalogService {
    pub fn new(client: Arc<PicaClient>) -> Self {
        Self { client }
    }

    pub async fn available_actions(&self, platform: &str) -> Result<Vec<AvailableAction>, ToolError> {
        let path = format!("{}/{}", AVAILABLE_ACTIONS_PATH, encode_segment(platform));
        let client = &self.client;
        let path = path.as_str();
        drain(
            |page, limit| async move { client.get_page(path, &[], page, limit).await },
            PAGE_SIZE,
        )
        .await
    }

    pub async fn available_connectors(&self) -> Result<Vec<Connector>, ToolError> {
        let client = &self.client;
        drain(
            |page, limit| async move {
                client
                    .get_page(AVAILABLE_CONNECTORS_PATH, &[], page, limit)
                    .await
            },
            PAGE_SIZE,
        )
        .await
    }

    pub async fn integrations(&self) -> Result<Vec<Integration>, ToolError> {
        let connectors = self.available_connectors().await?;
        Ok(connectors
            .into_iter()
            .map(|connector| Integration {
                name: connector.name,
                platform: connector.platform,
            })
            .collect())
    }
}
