use crate::config::{AccessList, Permission};
use crate::constants::api::{KNOWLEDGE_PATH, SEARCH_ACTIONS_PATH};
use crate::constants::pagination::SEARCH_LIMIT;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::pica_client::{encode_segment, PicaClient};
use crate::types::{
    ActionMetadata, ActionReference, ActionSystemId, KnowledgeEntry, KnowledgeRows, PlatformAction,
};
use crate::utils::identifiers::{normalize_action_id, ActionId};
use futures::future::try_join_all;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Filters applied to search hits, in this order.
#[derive(Debug, Clone)]
pub struct SearchFilters {
    pub permissions: Permission,
    pub actions: AccessList,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    List(Vec<PlatformAction>),
    Rows { rows: Vec<PlatformAction> },
}

impl SearchResponse {
    fn into_actions(self) -> Vec<PlatformAction> {
        match self {
            SearchResponse::List(actions) => actions,
            SearchResponse::Rows { rows } => rows,
        }
    }
}

pub struct ActionResolver {
    logger: Logger,
    client: Arc<PicaClient>,
}

impl ActionResolver {
    pub fn new(logger: &Logger, client: Arc<PicaClient>) -> Self {
        Self {
            logger: logger.child("actions"),
            client,
        }
    }

    /// Metadata for one action, or `None` when the knowledge store has no row.
    pub async fn get_action_spec(&self, action_id: &str) -> Result<Option<ActionMetadata>, ToolError> {
        let normalized = normalize_action_id(action_id);
        let response: KnowledgeRows = self
            .client
            .get_json(KNOWLEDGE_PATH, &[("_id".to_string(), normalized.clone())])
            .await
            .map_err(|err| {
                self.logger.warn(
                    "knowledge lookup failed",
                    Some(&serde_json::json!({ "action_id": normalized, "error": err.message })),
                );
                err
            })?;
        Ok(response.rows.into_iter().next())
    }

    pub async fn search_actions(
        &self,
        platform: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<ActionReference>, ToolError> {
        let path = format!("{}/{}", SEARCH_ACTIONS_PATH, encode_segment(platform));
        let response: SearchResponse = self
            .client
            .get_json(
                &path,
                &[
                    ("query".to_string(), query.to_string()),
                    ("limit".to_string(), SEARCH_LIMIT.to_string()),
                ],
            )
            .await?;
        let hits = response.into_actions();
        let hit_count = hits.len();
        let cleaned = clean(hits, filters)?;
        self.logger.debug(
            "search",
            Some(&serde_json::json!({
                "platform": platform,
                "hits": hit_count,
                "kept": cleaned.len(),
            })),
        );

        if cleaned.is_empty() && !filters.actions.is_all() {
            return self.action_references(platform, filters.actions.items()).await;
        }
        Ok(cleaned)
    }

    /// Resolves allow-listed ids one at a time and keeps those owned by `platform`.
    async fn action_references(
        &self,
        platform: &str,
        action_ids: &[String],
    ) -> Result<Vec<ActionReference>, ToolError> {
        let mut out = Vec::new();
        for action_id in action_ids {
            let Some(metadata) = self.get_action_spec(action_id).await? else {
                continue;
            };
            if metadata.connection_platform != platform {
                continue;
            }
            let id = ActionId::parse(&metadata.id)?;
            out.push(ActionReference {
                title: metadata.title,
                method: metadata.method,
                path: metadata.path,
                system_id: ActionSystemId::from(&id),
            });
        }
        Ok(out)
    }

    /// Knowledge for every id, fetched concurrently. One failure fails the batch.
    /// Ids without a knowledge row are left out of the map.
    pub async fn get_actions_knowledge(
        &self,
        action_ids: &[String],
    ) -> Result<BTreeMap<String, KnowledgeEntry>, ToolError> {
        let lookups = action_ids.iter().map(|action_id| async move {
            let metadata = self.get_action_spec(action_id).await?;
            Ok::<_, ToolError>(metadata.map(|m| {
                (
                    action_id.clone(),
                    KnowledgeEntry {
                        title: m.title,
                        knowledge: m.knowledge,
                        platform: m.connection_platform,
                    },
                )
            }))
        });
        let results = try_join_all(lookups).await?;
        Ok(results.into_iter().flatten().collect())
    }
}

pub fn filter_by_permissions(actions: Vec<PlatformAction>, permissions: Permission) -> Vec<PlatformAction> {
    actions
        .into_iter()
        .filter(|action| permissions.allows(&action.method))
        .collect()
}

pub fn filter_by_allowed_actions(actions: Vec<PlatformAction>, allowed: &AccessList) -> Vec<PlatformAction> {
    actions
        .into_iter()
        .filter(|action| allowed.allows_action(&action.system_id))
        .collect()
}

/// Permission filter, then allow-list filter, then projection to references.
pub fn clean(actions: Vec<PlatformAction>, filters: &SearchFilters) -> Result<Vec<ActionReference>, ToolError> {
    let permitted = filter_by_permissions(actions, filters.permissions);
    let allowed = filter_by_allowed_actions(permitted, &filters.actions);
    allowed
        .into_iter()
        .map(|action| {
            let id = ActionId::parse(&action.system_id)?;
            Ok(ActionReference {
                title: action.title,
                method: action.method,
                path: action.path,
                system_id: ActionSystemId::from(&id),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(id: &str, method: &str) -> PlatformAction {
        PlatformAction {
            system_id: id.to_string(),
            title: format!("{} action", method),
            key: String::new(),
            method: method.to_string(),
            path: "/x".to_string(),
            tags: Vec::new(),
        }
    }

    fn sample() -> Vec<PlatformAction> {
        vec![
            action("conn_mod_def::a::get", "GET"),
            action("conn_mod_def::a::post", "POST"),
            action("conn_mod_def::a::put", "PUT"),
            action("conn_mod_def::a::patch", "PATCH"),
            action("conn_mod_def::a::delete", "DELETE"),
        ]
    }

    fn methods(actions: &[PlatformAction]) -> Vec<&str> {
        actions.iter().map(|a| a.method.as_str()).collect()
    }

    #[test]
    fn read_keeps_only_get() {
        assert_eq!(methods(&filter_by_permissions(sample(), Permission::Read)), vec!["GET"]);
    }

    #[test]
    fn write_keeps_post_put_patch() {
        assert_eq!(
            methods(&filter_by_permissions(sample(), Permission::Write)),
            vec!["POST", "PUT", "PATCH"]
        );
    }

    #[test]
    fn admin_keeps_everything() {
        assert_eq!(filter_by_permissions(sample(), Permission::Admin).len(), 5);
    }

    #[test]
    fn allow_list_semantics() {
        assert_eq!(filter_by_allowed_actions(sample(), &AccessList::All).len(), 5);
        assert!(filter_by_allowed_actions(sample(), &AccessList::default()).is_empty());
        let only = AccessList::from_items(["a::post"]);
        let kept = filter_by_allowed_actions(sample(), &only);
        assert_eq!(methods(&kept), vec!["POST"]);
    }

    #[test]
    fn clean_applies_both_filters_and_parses_ids() {
        let filters = SearchFilters {
            permissions: Permission::Write,
            actions: AccessList::from_items(["conn_mod_def::a::get", "conn_mod_def::a::put"]),
        };
        let refs = clean(sample(), &filters).expect("clean");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].system_id.full_id, "conn_mod_def::a::put");
        assert_eq!(refs[0].system_id.parts.suffix, "put");
    }

    #[test]
    fn clean_rejects_malformed_ids() {
        let filters = SearchFilters {
            permissions: Permission::Admin,
            actions: AccessList::All,
        };
        assert!(clean(vec![action("broken", "GET")], &filters).is_err());
    }

    #[test]
    fn search_response_accepts_both_shapes() {
        let list: SearchResponse = serde_json::from_value(serde_json::json!([
            {"systemId": "p::m::s", "method": "GET"}
        ]))
        .expect("list");
        assert_eq!(list.into_actions().len(), 1);
        let rows: SearchResponse = serde_json::from_value(serde_json::json!({"rows": []}))
            .expect("rows");
        assert!(rows.into_actions().is_empty());
    }
}
