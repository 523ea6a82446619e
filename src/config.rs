//! Client configuration.
//!
//! A [`PicaConfig`] is built once (from the environment or with the builder
//! methods) and shared read-only behind an `Arc` by every service.

use crate::constants::api::DEFAULT_BASE_URL;
use crate::constants::identifiers::WILDCARD;
use crate::constants::network::TIMEOUT_API_REQUEST_MS;
use crate::errors::ToolError;
use crate::utils::feature_flags::is_truthy;
use crate::utils::identifiers::normalize_action_id;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use url::Url;

pub const MISSING_SECRET_MESSAGE: &str = "A valid Pica API key must be provided. You can obtain your API key from the Pica dashboard: https://app.picaos.com/settings/api-keys";

/// The API key. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(raw: impl Into<String>) -> Result<Self, ToolError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ToolError::invalid_params(MISSING_SECRET_MESSAGE));
        }
        Ok(Self(raw))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(****)")
    }
}

/// Which connectors or actions a client may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessList {
    All,
    Only(Vec<String>),
}

impl Default for AccessList {
    fn default() -> Self {
        AccessList::Only(Vec::new())
    }
}

impl AccessList {
    /// Blank entries are dropped. Any `*` entry grants everything.
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for item in items {
            let item = item.as_ref().trim();
            if item.is_empty() {
                continue;
            }
            if item == WILDCARD {
                return AccessList::All;
            }
            out.push(item.to_string());
        }
        AccessList::Only(out)
    }

    pub fn parse_csv(raw: &str) -> Self {
        Self::from_items(raw.split(','))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, AccessList::All)
    }

    /// True for an explicit empty set, which grants nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, AccessList::Only(items) if items.is_empty())
    }

    pub fn items(&self) -> &[String] {
        match self {
            AccessList::All => &[],
            AccessList::Only(items) => items,
        }
    }

    /// Membership test for action ids. Both sides are normalized so bare and
    /// prefixed spellings of the same id match.
    pub fn allows_action(&self, action_id: &str) -> bool {
        match self {
            AccessList::All => true,
            AccessList::Only(items) => {
                let wanted = normalize_action_id(action_id);
                items.iter().any(|item| normalize_action_id(item) == wanted)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    Read,
    Write,
    #[default]
    Admin,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Admin => "admin",
        }
    }

    pub fn allows(self, method: &str) -> bool {
        let method = method.trim().to_ascii_uppercase();
        match self {
            Permission::Admin => true,
            Permission::Read => method == "GET",
            Permission::Write => matches!(method.as_str(), "POST" | "PUT" | "PATCH"),
        }
    }
}

impl FromStr for Permission {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "admin" | "" => Ok(Permission::Admin),
            other => Err(ToolError::invalid_params(format!(
                "Invalid permissions '{}'. Must be 'read', 'write' or 'admin'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityType {
    User,
    Team,
    Organization,
    Project,
}

impl IdentityType {
    pub fn as_str(self) -> &'static str {
        match self {
            IdentityType::User => "user",
            IdentityType::Team => "team",
            IdentityType::Organization => "organization",
            IdentityType::Project => "project",
        }
    }
}

impl FromStr for IdentityType {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(IdentityType::User),
            "team" => Ok(IdentityType::Team),
            "organization" => Ok(IdentityType::Organization),
            "project" => Ok(IdentityType::Project),
            other => Err(ToolError::invalid_params(format!(
                "Invalid identity type '{}'. Must be one of user, team, organization, project",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PicaConfig {
    secret: SecretString,
    pub base_url: String,
    pub connectors: AccessList,
    pub actions: AccessList,
    pub permissions: Permission,
    pub identity: Option<String>,
    pub identity_type: Option<IdentityType>,
    pub authkit: bool,
    pub knowledge_agent: bool,
    /// Extra headers sent with every request, in insertion order.
    pub headers: Vec<(String, String)>,
    pub request_timeout_ms: u64,
}

impl PicaConfig {
    pub fn new(secret: impl Into<String>) -> Result<Self, ToolError> {
        Ok(Self {
            secret: SecretString::new(secret)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            connectors: AccessList::default(),
            actions: AccessList::default(),
            permissions: Permission::default(),
            identity: None,
            identity_type: None,
            authkit: false,
            knowledge_agent: false,
            headers: Vec::new(),
            request_timeout_ms: TIMEOUT_API_REQUEST_MS,
        })
    }

    pub fn from_env() -> Result<Self, ToolError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key/value source shaped like the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ToolError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret = read("PICA_SECRET").unwrap_or_default();
        let mut config = Self::new(secret)?;

        if let Some(raw) = read("PICA_SERVER_URL") {
            config = config.with_base_url(&raw)?;
        }
        if let Some(raw) = read("PICA_CONNECTORS") {
            config.connectors = AccessList::parse_csv(&raw);
        }
        if let Some(raw) = read("PICA_ACTIONS") {
            config.actions = AccessList::parse_csv(&raw);
        }
        if let Some(raw) = read("PICA_PERMISSIONS") {
            config.permissions = raw.parse().map_err(|err: ToolError| {
                err.with_details(serde_json::json!({ "env": "PICA_PERMISSIONS" }))
            })?;
        }
        config.identity = read("PICA_IDENTITY").map(|v| v.trim().to_string());
        if let Some(raw) = read("PICA_IDENTITY_TYPE") {
            config.identity_type = Some(raw.parse().map_err(|err: ToolError| {
                err.with_details(serde_json::json!({ "env": "PICA_IDENTITY_TYPE" }))
            })?);
        }
        config.authkit = read("PICA_AUTHKIT").map(is_truthy).unwrap_or(false);
        config.knowledge_agent = read("PICA_KNOWLEDGE_AGENT").map(is_truthy).unwrap_or(false);
        if let Some(raw) = read("PICA_HEADERS") {
            config.headers = parse_headers_json(&raw)?;
        }
        if let Some(raw) = read("PICA_TIMEOUT_MS") {
            let timeout = raw.trim().parse::<u64>().ok().filter(|ms| *ms > 0).ok_or_else(|| {
                ToolError::invalid_params("PICA_TIMEOUT_MS must be a positive integer")
                    .with_details(serde_json::json!({ "env": "PICA_TIMEOUT_MS", "value": raw }))
            })?;
            config.request_timeout_ms = timeout;
        }
        Ok(config)
    }

    pub fn secret(&self) -> &str {
        self.secret.expose()
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ToolError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    pub fn with_connectors<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.connectors = AccessList::from_items(items);
        self
    }

    pub fn with_actions<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.actions = AccessList::from_items(items);
        self
    }

    pub fn with_permissions(mut self, permissions: Permission) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>, identity_type: Option<IdentityType>) -> Self {
        self.identity = Some(identity.into());
        self.identity_type = identity_type;
        self
    }

    pub fn with_identity_type(mut self, identity_type: IdentityType) -> Self {
        self.identity_type = Some(identity_type);
        self
    }

    pub fn with_authkit(mut self, enabled: bool) -> Self {
        self.authkit = enabled;
        self
    }

    pub fn with_knowledge_agent(mut self, enabled: bool) -> Self {
        self.knowledge_agent = enabled;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// The action allow-list discovery calls should use. Knowledge agents may
    /// look up any action.
    pub fn discovery_actions(&self) -> AccessList {
        if self.knowledge_agent {
            AccessList::All
        } else {
            self.actions.clone()
        }
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, ToolError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_BASE_URL.to_string());
    }
    let mut url = Url::parse(raw).map_err(|_| {
        ToolError::invalid_params("Invalid server URL")
            .with_hint("Expected a valid URL, e.g. \"https://api.picaos.com\".")
            .with_details(serde_json::json!({ "server_url": raw }))
    })?;
    url.set_fragment(None);
    url.set_query(None);
    let normalized = format!("{}{}", url.origin().ascii_serialization(), url.path());
    Ok(normalized.trim_end_matches('/').to_string())
}

fn parse_headers_json(raw: &str) -> Result<Vec<(String, String)>, ToolError> {
    let parsed: Value = serde_json::from_str(raw).map_err(|err| {
        ToolError::invalid_params(format!("PICA_HEADERS must be a JSON object: {}", err))
    })?;
    let map = parsed
        .as_object()
        .ok_or_else(|| ToolError::invalid_params("PICA_HEADERS must be a JSON object"))?;
    Ok(map
        .iter()
        .filter(|(name, value)| !name.trim().is_empty() && !value.is_null())
        .map(|(name, value)| {
            let rendered = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            (name.trim().to_string(), rendered)
        })
        .collect())
}
