#![allow(dead_code)]

use once_cell::sync::Lazy;
use pica_toolkit::services::logger::{Logger, MemorySink};
use pica_toolkit::{App, PicaConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub const SECRET: &str = "sk_test_1234567890abcdef";
pub const GMAIL_KEY: &str = "test::gmail::default::abc123";

pub fn config_for(server: &MockServer) -> PicaConfig {
    PicaConfig::new(SECRET)
        .expect("config")
        .with_base_url(&server.uri())
        .expect("base url")
        .with_connectors(["*"])
        .with_actions(["*"])
}

pub fn quiet_logger() -> (Logger, MemorySink) {
    let sink = MemorySink::new();
    (Logger::with_sink("test", Arc::new(sink.clone())), sink)
}

pub fn app_for(config: PicaConfig) -> (App, MemorySink) {
    let (logger, sink) = quiet_logger();
    (App::from_config(config, logger).expect("app"), sink)
}

pub fn page(rows: Value, page: u64, pages: u64) -> Value {
    let total = rows.as_array().map(|r| r.len()).unwrap_or(0);
    json!({ "rows": rows, "total": total, "page": page, "pages": pages })
}

pub async fn mount_connections(server: &MockServer, keys: &[&str]) {
    let rows: Vec<Value> = keys
        .iter()
        .map(|key| {
            let platform = key.split("::").nth(1).unwrap_or("");
            json!({ "key": key, "platform": platform, "active": true })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/v1/vault/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(Value::Array(rows), 1, 1)))
        .mount(server)
        .await;
}

/// Mounts a knowledge row for `id`, matched on the normalized `_id` query.
pub async fn mount_action(server: &MockServer, id: &str, row: Value) {
    let normalized = if id.starts_with("conn_mod_def::") {
        id.to_string()
    } else {
        format!("conn_mod_def::{}", id)
    };
    Mock::given(method("GET"))
        .and(path("/v1/knowledge"))
        .and(query_param("_id", normalized.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rows": [row] })))
        .mount(server)
        .await;
}

pub fn action_row(id: &str, platform: &str, method: &str, action_path: &str, tags: &[&str]) -> Value {
    json!({
        "_id": id,
        "connectionPlatform": platform,
        "title": format!("{} {}", method, action_path),
        "path": action_path,
        "knowledge": format!("Docs for {}", id),
        "method": method,
        "tags": tags,
    })
}
