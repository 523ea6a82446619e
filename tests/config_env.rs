mod common;
use common::ENV_LOCK;

use pica_toolkit::config::{AccessList, IdentityType, Permission};
use pica_toolkit::errors::codes;
use pica_toolkit::{App, PicaConfig};

const VARS: &[&str] = &[
    "PICA_SECRET",
    "PICA_SERVER_URL",
    "PICA_CONNECTORS",
    "PICA_ACTIONS",
    "PICA_PERMISSIONS",
    "PICA_IDENTITY",
    "PICA_IDENTITY_TYPE",
    "PICA_AUTHKIT",
    "PICA_KNOWLEDGE_AGENT",
    "PICA_HEADERS",
    "PICA_TIMEOUT_MS",
];

/// Clears every PICA_* variable, applies `values`, and restores the previous
/// environment on drop.
struct EnvScope {
    previous: Vec<(&'static str, Option<String>)>,
}

impl EnvScope {
    fn new(values: &[(&str, &str)]) -> Self {
        let previous = VARS.iter().map(|key| (*key, std::env::var(key).ok())).collect();
        for key in VARS {
            std::env::remove_var(key);
        }
        for (key, value) in values {
            std::env::set_var(key, value);
        }
        Self { previous }
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[tokio::test]
async fn reads_every_pica_variable() {
    let _guard = ENV_LOCK.lock().await;
    let _env = EnvScope::new(&[
        ("PICA_SECRET", "sk_test_env"),
        ("PICA_SERVER_URL", "https://pica.example.com/?x=1"),
        ("PICA_CONNECTORS", "*"),
        ("PICA_ACTIONS", "GMAIL::send, conn_mod_def::SLACK::post"),
        ("PICA_PERMISSIONS", "write"),
        ("PICA_IDENTITY", "user-1"),
        ("PICA_IDENTITY_TYPE", "user"),
        ("PICA_AUTHKIT", "yes"),
        ("PICA_KNOWLEDGE_AGENT", "0"),
        ("PICA_HEADERS", r#"{"X-Tenant": "acme"}"#),
        ("PICA_TIMEOUT_MS", "5000"),
    ]);

    let config = PicaConfig::from_env().expect("config");
    assert_eq!(config.secret(), "sk_test_env");
    assert_eq!(config.base_url, "https://pica.example.com");
    assert!(config.connectors.is_all());
    assert_eq!(
        config.actions,
        AccessList::Only(vec!["GMAIL::send".to_string(), "conn_mod_def::SLACK::post".to_string()])
    );
    assert_eq!(config.permissions, Permission::Write);
    assert_eq!(config.identity.as_deref(), Some("user-1"));
    assert_eq!(config.identity_type, Some(IdentityType::User));
    assert!(config.authkit);
    assert!(!config.knowledge_agent);
    assert_eq!(config.headers, vec![("X-Tenant".to_string(), "acme".to_string())]);
    assert_eq!(config.request_timeout_ms, 5000);
    assert!(!format!("{:?}", config).contains("sk_test_env"));
}

#[tokio::test]
async fn missing_secret_stops_startup() {
    let _guard = ENV_LOCK.lock().await;
    let _env = EnvScope::new(&[]);

    let err = App::initialize().err().expect("must fail");
    assert_eq!(err.code, codes::INVALID_PARAMS);
    assert!(err.message.starts_with("A valid Pica API key must be provided"));
}

#[tokio::test]
async fn invalid_values_name_their_variable() {
    let _guard = ENV_LOCK.lock().await;
    let _env = EnvScope::new(&[("PICA_SECRET", "sk"), ("PICA_PERMISSIONS", "root")]);

    let err = PicaConfig::from_env().expect_err("must fail");
    assert_eq!(err.details.expect("details")["env"], "PICA_PERMISSIONS");
}
