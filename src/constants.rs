pub mod api {
    pub const DEFAULT_BASE_URL: &str = "https://api.picaos.com";
    pub const SEARCH_ACTIONS_PATH: &str = "/v1/available-actions/search";
    pub const KNOWLEDGE_PATH: &str = "/v1/knowledge";
    pub const AVAILABLE_ACTIONS_PATH: &str = "/v1/available-actions";
    pub const AVAILABLE_CONNECTORS_PATH: &str = "/v1/available-connectors";
    pub const CONNECTIONS_PATH: &str = "/v1/vault/connections";
    pub const PASSTHROUGH_PATH: &str = "/v1/passthrough";
    pub const USER_AGENT: &str = "pica-toolkit/0.1";
}

pub mod headers {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const SECRET: &str = "x-pica-secret";
    pub const CONNECTION_KEY: &str = "x-pica-connection-key";
    pub const ACTION_ID: &str = "x-pica-action-id";
    pub const JSON: &str = "application/json";
    pub const MULTIPART: &str = "multipart/form-data";
    pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
}

pub mod redaction {
    /// Shown in preview descriptors in place of the secret.
    pub const PREVIEW_PLACEHOLDER: &str = "YOUR_PICA_SECRET_KEY_HERE";
    /// Shown in executed descriptors in place of the secret.
    pub const EXECUTED_MASK: &str = "****REDACTED****";
    pub const DEFAULT_REDACTION: &str = "[REDACTED]";
}

pub mod identifiers {
    pub const ACTION_ID_PREFIX: &str = "conn_mod_def";
    pub const SEPARATOR: &str = "::";
    pub const IDENTITY_SEPARATOR: char = '|';
    pub const WILDCARD: &str = "*";
    pub const CUSTOM_TAG: &str = "custom";
}

pub mod network {
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
}

pub mod pagination {
    pub const PAGE_SIZE: usize = 100;
    pub const SEARCH_LIMIT: usize = 5;
}

pub mod limits {
    pub const ERROR_TEXT_MAX_BYTES: usize = 16 * 1024;
    pub const LOG_ARGS_MAX_STRING: usize = 2048;
}
