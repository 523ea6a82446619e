//! Shapes exchanged with the remote API and returned to tool callers.

use crate::utils::identifiers::{ActionId, ActionIdParts, ConnectionKey, ConnectionKeyParts};
use serde::{Deserialize, Serialize};

/// A search hit from `/v1/available-actions/search/{platform}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAction {
    pub system_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One row of `/v1/knowledge`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMetadata {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub connection_platform: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub knowledge: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl ActionMetadata {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeRows {
    #[serde(default)]
    pub rows: Vec<ActionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSystemId {
    #[serde(rename = "fullId")]
    pub full_id: String,
    pub parts: ActionIdParts,
}

impl From<&ActionId> for ActionSystemId {
    fn from(id: &ActionId) -> Self {
        Self {
            full_id: id.full_id(),
            parts: id.parts().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReference {
    pub title: String,
    pub method: String,
    pub path: String,
    pub system_id: ActionSystemId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub title: String,
    pub knowledge: String,
    pub platform: String,
}

/// A row of `/v1/vault/connections`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub identity_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionKeyRef {
    #[serde(rename = "fullKey")]
    pub full_key: String,
    pub parts: ConnectionKeyParts,
}

impl From<&ConnectionKey> for ConnectionKeyRef {
    fn from(key: &ConnectionKey) -> Self {
        Self {
            full_key: key.as_str().to_string(),
            parts: key.parts().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionReference {
    pub platform: String,
    pub key: ConnectionKeyRef,
}

/// A row of `/v1/available-actions/{platform}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableAction {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub platform: String,
}

/// A row of `/v1/available-connectors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Integration {
    pub name: String,
    pub platform: String,
}

fn default_true() -> bool {
    true
}
