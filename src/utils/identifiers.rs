//! Typed views over the two opaque identifier families the remote API hands out.
//!
//! Action ids look like `prefix::metadata::suffix`; connection keys look like
//! `environment::platform::namespace::id[|identity]`. Both are parsed once at the
//! edge and carried as values afterwards.

use crate::constants::identifiers::{ACTION_ID_PREFIX, IDENTITY_SEPARATOR, SEPARATOR};
use crate::errors::ToolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prepends the canonical prefix to `metadata::suffix` style ids.
///
/// Strings without any `::` come back untouched so already-canonical or custom
/// identifiers can pass through.
pub fn normalize_action_id(raw: &str) -> String {
    let canonical = format!("{}{}", ACTION_ID_PREFIX, SEPARATOR);
    if raw.contains(SEPARATOR) && !raw.starts_with(&canonical) {
        return format!("{}{}", canonical, raw);
    }
    raw.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ActionIdParts {
    pub prefix: String,
    pub metadata: String,
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionId {
    parts: ActionIdParts,
}

impl ActionId {
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        if raw.is_empty() {
            return Err(ToolError::format_error(
                "action_id",
                "Action system ID must be a non-empty string",
            ));
        }
        let segments: Vec<&str> = raw.split(SEPARATOR).collect();
        if segments.len() != 3 {
            return Err(ToolError::format_error(
                "action_id",
                "Invalid action system ID format. Expected: prefix::metadata::suffix",
            ));
        }
        let labels = ["prefix", "metadata", "suffix"];
        for (segment, label) in segments.iter().zip(labels) {
            if segment.is_empty() {
                return Err(ToolError::format_error(
                    label,
                    format!("{} cannot be empty in action system ID", capitalize(label)),
                ));
            }
        }
        Ok(Self {
            parts: ActionIdParts {
                prefix: segments[0].to_string(),
                metadata: segments[1].to_string(),
                suffix: segments[2].to_string(),
            },
        })
    }

    /// Normalizes first, so a bare `metadata::suffix` pair gains the canonical prefix.
    pub fn parse_normalized(raw: &str) -> Result<Self, ToolError> {
        Self::parse(&normalize_action_id(raw))
    }

    pub fn prefix(&self) -> &str {
        &self.parts.prefix
    }

    pub fn metadata(&self) -> &str {
        &self.parts.metadata
    }

    pub fn suffix(&self) -> &str {
        &self.parts.suffix
    }

    pub fn parts(&self) -> &ActionIdParts {
        &self.parts
    }

    pub fn full_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.parts.prefix,
            self.parts.metadata,
            self.parts.suffix,
            sep = SEPARATOR
        )
    }
}

impl FromStr for ActionId {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Live,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Live => "live",
            Environment::Test => "test",
        }
    }
}

impl FromStr for Environment {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Environment::Live),
            "test" => Ok(Environment::Test),
            other => Err(ToolError::format_error(
                "environment",
                format!("Invalid environment '{}'. Must be 'live' or 'test'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionKeyParts {
    pub environment: Environment,
    pub platform: String,
    pub namespace: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

/// A parsed connection key. Keeps the caller's raw string so comparisons against
/// the vault listing stay byte-exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    raw: String,
    parts: ConnectionKeyParts,
}

impl ConnectionKey {
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        if raw.is_empty() {
            return Err(ToolError::format_error(
                "connection_key",
                "Connection key must be a non-empty string",
            ));
        }
        let segments: Vec<&str> = raw.split(SEPARATOR).collect();
        if segments.len() != 4 {
            return Err(ToolError::format_error(
                "connection_key",
                "Invalid connection key format. Expected: environment::platform::namespace::id[|identity]",
            ));
        }

        let environment: Environment = segments[0].parse()?;
        let platform = segments[1];
        let namespace = segments[2];
        if platform.is_empty() {
            return Err(ToolError::format_error(
                "platform",
                "Platform cannot be empty in connection key",
            ));
        }
        if namespace.is_empty() {
            return Err(ToolError::format_error(
                "namespace",
                "Namespace cannot be empty in connection key",
            ));
        }

        let (id, identity) = match segments[3].split_once(IDENTITY_SEPARATOR) {
            Some((id, identity)) => (id, Some(identity)),
            None => (segments[3], None),
        };
        if id.is_empty() {
            return Err(ToolError::format_error(
                "id",
                "ID cannot be empty in connection key",
            ));
        }
        if identity.is_some_and(str::is_empty) {
            return Err(ToolError::format_error(
                "identity",
                "Identity cannot be empty in connection key when '|' is present",
            ));
        }

        Ok(Self {
            raw: raw.to_string(),
            parts: ConnectionKeyParts {
                environment,
                platform: platform.to_string(),
                namespace: namespace.to_string(),
                id: id.to_string(),
                identity: identity.map(str::to_string),
            },
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn environment(&self) -> Environment {
        self.parts.environment
    }

    pub fn platform(&self) -> &str {
        &self.parts.platform
    }

    pub fn namespace(&self) -> &str {
        &self.parts.namespace
    }

    pub fn id(&self) -> &str {
        &self.parts.id
    }

    pub fn identity(&self) -> Option<&str> {
        self.parts.identity.as_deref()
    }

    pub fn parts(&self) -> &ConnectionKeyParts {
        &self.parts
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ConnectionKey {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
