//! Builds, previews and sends passthrough calls.

use crate::constants::api::PASSTHROUGH_PATH;
use crate::constants::headers::{
    ACTION_ID, CONNECTION_KEY, CONTENT_TYPE, FORM_URLENCODED, JSON, MULTIPART, SECRET,
};
use crate::constants::identifiers::CUSTOM_TAG;
use crate::constants::limits::ERROR_TEXT_MAX_BYTES;
use crate::constants::redaction::{EXECUTED_MASK, PREVIEW_PLACEHOLDER};
use crate::errors::ToolError;
use crate::services::action_resolver::ActionResolver;
use crate::services::connections::ConnectionService;
use crate::services::logger::Logger;
use crate::services::pica_client::{HttpResponse, OutboundBody, OutboundRequest, PicaClient};
use crate::utils::headers::HeaderList;
use crate::utils::identifiers::{normalize_action_id, ConnectionKey};
use crate::utils::redact::{mask_secret_header, scrub_text, scrub_value};
use crate::utils::template::{resolve_path_template, stringify_value, value_is_truthy};
use crate::utils::text::truncate_utf8_prefix;
use reqwest::multipart::Form;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadEncoding {
    #[default]
    Json,
    Multipart,
    UrlEncoded,
}

impl PayloadEncoding {
    /// Multipart wins when both flags are set.
    pub fn from_flags(is_form_data: bool, is_form_url_encoded: bool) -> Self {
        if is_form_data {
            PayloadEncoding::Multipart
        } else if is_form_url_encoded {
            PayloadEncoding::UrlEncoded
        } else {
            PayloadEncoding::Json
        }
    }

    fn content_type(self) -> Option<&'static str> {
        match self {
            PayloadEncoding::Json => None,
            PayloadEncoding::Multipart => Some(MULTIPART),
            PayloadEncoding::UrlEncoded => Some(FORM_URLENCODED),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecuteRequest {
    pub action_id: String,
    pub connection_key: String,
    pub data: Value,
    pub path_variables: Option<Map<String, Value>>,
    pub query_params: Option<Map<String, Value>>,
    pub headers: Map<String, Value>,
    pub encoding: PayloadEncoding,
    pub preview_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: String,
    pub headers: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RequestDescriptor {
    /// Copy with the secret header set to `mask` and every other occurrence of
    /// the secret scrubbed.
    fn redacted(&self, secret: &str, mask: &str) -> Self {
        let mut headers = self.headers.clone();
        mask_secret_header(&mut headers, mask);
        let headers = match scrub_value(&Value::Object(headers), secret, mask) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let params = self.params.as_ref().and_then(|params| {
            match scrub_value(&Value::Object(params.clone()), secret, mask) {
                Value::Object(map) => Some(map),
                _ => None,
            }
        });
        Self {
            url: scrub_text(&self.url, secret, mask),
            method: self.method.clone(),
            headers,
            params,
            data: self.data.as_ref().map(|data| scrub_value(data, secret, mask)),
        }
    }
}

/// Outcome of one `execute` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Preview {
        request_config: RequestDescriptor,
    },
    Success {
        response_data: Value,
        request_config: RequestDescriptor,
        platform: String,
    },
    Failure {
        error: String,
        platform: String,
    },
}

impl ExecutionResult {
    pub fn to_value(&self) -> Value {
        match self {
            ExecutionResult::Preview { request_config } => serde_json::json!({
                "outcome": "preview",
                "executed": false,
                "requestConfig": request_config,
            }),
            ExecutionResult::Success {
                response_data,
                request_config,
                platform,
            } => serde_json::json!({
                "outcome": "success",
                "success": true,
                "responseData": response_data,
                "requestConfig": request_config,
                "platform": platform,
            }),
            ExecutionResult::Failure { error, platform } => serde_json::json!({
                "outcome": "failure",
                "success": false,
                "error": error,
                "platform": platform,
            }),
        }
    }

    pub fn request_config(&self) -> Option<&RequestDescriptor> {
        match self {
            ExecutionResult::Preview { request_config }
            | ExecutionResult::Success { request_config, .. } => Some(request_config),
            ExecutionResult::Failure { .. } => None,
        }
    }
}

impl Serialize for ExecutionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Inputs to [`build_request`] once the action and template are resolved.
pub struct PassthroughInput<'a> {
    pub base_url: &'a str,
    pub secret: &'a str,
    pub action_id: &'a str,
    pub connection_key: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub data: &'a Value,
    pub query_params: Option<&'a Map<String, Value>>,
    pub global_headers: &'a [(String, String)],
    pub call_headers: &'a Map<String, Value>,
    pub encoding: PayloadEncoding,
}

pub struct PreparedRequest {
    pub descriptor: RequestDescriptor,
    pub headers: HeaderList,
    pub body: OutboundBody,
}

pub fn build_request(input: &PassthroughInput<'_>) -> PreparedRequest {
    let mut headers = HeaderList::new();
    headers.set(CONTENT_TYPE, JSON);
    headers.set(SECRET, input.secret);
    headers.set(CONNECTION_KEY, input.connection_key);
    headers.set(ACTION_ID, normalize_action_id(input.action_id));
    if let Some(content_type) = input.encoding.content_type() {
        headers.set(CONTENT_TYPE, content_type);
    }
    headers.extend(input.global_headers.iter().cloned());
    headers.extend_from_map(input.call_headers);
    // Routing headers always carry the validated values.
    headers.set(SECRET, input.secret);
    headers.set(CONNECTION_KEY, input.connection_key);
    headers.set(ACTION_ID, normalize_action_id(input.action_id));
    if !value_is_truthy(input.data) {
        headers.remove(CONTENT_TYPE);
    }

    let path = if input.path.starts_with('/') {
        input.path.to_string()
    } else {
        format!("/{}", input.path)
    };
    let url = format!("{}{}{}", input.base_url, PASSTHROUGH_PATH, path);

    let (data, body) = if input.method.eq_ignore_ascii_case("get") {
        (None, OutboundBody::Empty)
    } else {
        match input.encoding {
            PayloadEncoding::Multipart => {
                let fields = form_fields(input.data);
                let mut form = Form::new();
                for (key, value) in &fields {
                    form = form.text(key.clone(), value.clone());
                }
                headers.set(
                    CONTENT_TYPE,
                    format!("{}; boundary={}", MULTIPART, form.boundary()),
                );
                let data: Map<String, Value> = fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect();
                (Some(Value::Object(data)), OutboundBody::Multipart(form))
            }
            PayloadEncoding::UrlEncoded => {
                let encoded = serde_urlencoded::to_string(form_fields(input.data)).unwrap_or_default();
                (
                    Some(Value::String(encoded.clone())),
                    OutboundBody::UrlEncoded(encoded),
                )
            }
            PayloadEncoding::Json => {
                let body = if !value_is_truthy(input.data) {
                    OutboundBody::Empty
                } else {
                    OutboundBody::Json(input.data.clone())
                };
                (Some(input.data.clone()), body)
            }
        }
    };

    PreparedRequest {
        descriptor: RequestDescriptor {
            url,
            method: input.method.to_string(),
            headers: headers.to_map(),
            params: input.query_params.cloned(),
            data,
        },
        headers,
        body,
    }
}

/// Per-field form rendering: strings as-is, scalars stringified, anything
/// structured (or null) JSON-encoded. Non-object payloads contribute no fields.
fn form_fields(data: &Value) -> Vec<(String, String)> {
    let Some(map) = data.as_object() else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(text) => text.clone(),
                Value::Number(_) | Value::Bool(_) => stringify_value(value),
                _ => serde_json::to_string(value).unwrap_or_default(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

/// Arrays repeat their key, strings go verbatim, other values are JSON-rendered.
pub fn query_pairs(params: Option<&Map<String, Value>>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let Some(params) = params else {
        return out;
    };
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|item| !item.is_null()) {
                    out.push((key.clone(), stringify_value(item)));
                }
            }
            other => out.push((key.clone(), stringify_value(other))),
        }
    }
    out
}

/// Puts the connection key into the body. Objects gain a field, arrays are
/// spread into an index-keyed object, anything else is replaced.
pub fn inject_connection_key(data: Value, connection_key: &str) -> Value {
    let mut out = match data {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| (idx.to_string(), item))
            .collect(),
        _ => Map::new(),
    };
    out.insert(
        "connectionKey".to_string(),
        Value::String(connection_key.to_string()),
    );
    Value::Object(out)
}

pub struct PassthroughExecutor {
    logger: Logger,
    client: Arc<PicaClient>,
    resolver: Arc<ActionResolver>,
    connections: Arc<ConnectionService>,
}

impl PassthroughExecutor {
    pub fn new(
        logger: &Logger,
        client: Arc<PicaClient>,
        resolver: Arc<ActionResolver>,
        connections: Arc<ConnectionService>,
    ) -> Self {
        Self {
            logger: logger.child("execute"),
            client,
            resolver,
            connections,
        }
    }

    pub async fn execute(&self, request: ExecuteRequest) -> Result<ExecutionResult, ToolError> {
        let key = ConnectionKey::parse(&request.connection_key)?;
        self.connections.assert_connection_accessible(&key).await?;

        let action = self
            .resolver
            .get_action_spec(&request.action_id)
            .await?
            .ok_or_else(|| ToolError::unknown_action(&request.action_id))?;

        let payload = if action.has_tag(CUSTOM_TAG) {
            inject_connection_key(request.data, key.as_str())
        } else {
            request.data
        };

        let resolved = resolve_path_template(&action.path, &payload, request.path_variables.as_ref())?;

        let secret = self.client.secret();
        let prepared = build_request(&PassthroughInput {
            base_url: self.client.base_url(),
            secret,
            action_id: &request.action_id,
            connection_key: key.as_str(),
            method: &action.method,
            path: &resolved.resolved_path,
            data: &resolved.cleaned_payload,
            query_params: request.query_params.as_ref(),
            global_headers: &self.client.config().headers,
            call_headers: &request.headers,
            encoding: request.encoding,
        });

        let platform = action.connection_platform.clone();
        self.logger.info(
            "execute",
            Some(&serde_json::json!({
                "action_id": normalize_action_id(&request.action_id),
                "platform": platform,
                "method": action.method,
                "preview": request.preview_only,
            })),
        );

        if request.preview_only {
            return Ok(ExecutionResult::Preview {
                request_config: prepared.descriptor.redacted(secret, PREVIEW_PLACEHOLDER),
            });
        }

        let echoed = prepared.descriptor.redacted(secret, EXECUTED_MASK);
        let outbound = OutboundRequest {
            method: action.method.clone(),
            url: prepared.descriptor.url.clone(),
            headers: prepared.headers,
            query: query_pairs(request.query_params.as_ref()),
            body: prepared.body,
        };

        match self.client.send(outbound).await {
            Ok(response) if response.is_success() => Ok(ExecutionResult::Success {
                response_data: scrub_value(&response.data, secret, EXECUTED_MASK),
                request_config: echoed,
                platform,
            }),
            Ok(response) => {
                self.logger.warn(
                    "passthrough returned an error status",
                    Some(&serde_json::json!({ "status": response.status, "platform": platform })),
                );
                Ok(ExecutionResult::Failure {
                    error: failure_text(&status_failure(&response), secret),
                    platform,
                })
            }
            Err(err) => {
                self.logger.warn(
                    "passthrough transport failure",
                    Some(&serde_json::json!({ "error": scrub_text(&err.message, secret, EXECUTED_MASK) })),
                );
                Ok(ExecutionResult::Failure {
                    error: failure_text(&serde_json::json!({ "message": err.message }), secret),
                    platform,
                })
            }
        }
    }
}

fn status_failure(response: &HttpResponse) -> Value {
    serde_json::json!({
        "message": format!("Request failed with status code {}", response.status),
        "status": response.status,
        "data": response.data,
    })
}

/// Renders a failure as JSON text of at most `ERROR_TEXT_MAX_BYTES`. An
/// oversized `data` is replaced by a truncated string so the text still parses.
fn failure_text(error: &Value, secret: &str) -> String {
    let scrubbed = scrub_value(error, secret, EXECUTED_MASK);
    let text = serde_json::to_string(&scrubbed).unwrap_or_default();
    if text.len() <= ERROR_TEXT_MAX_BYTES {
        return text;
    }
    let Value::Object(mut envelope) = scrubbed else {
        return serde_json::to_string(&truncate_utf8_prefix(&text, ERROR_TEXT_MAX_BYTES / 2))
            .unwrap_or_default();
    };
    if let Some(Value::String(message)) = envelope.get_mut("message") {
        *message = truncate_utf8_prefix(message, ERROR_TEXT_MAX_BYTES / 4);
    }
    let rendered = match envelope.remove("data") {
        Some(Value::String(data)) => data,
        Some(other) => other.to_string(),
        None => return serde_json::to_string(&envelope).unwrap_or_default(),
    };

    let mut budget = ERROR_TEXT_MAX_BYTES;
    loop {
        let mut candidate = envelope.clone();
        candidate.insert(
            "data".to_string(),
            Value::String(format!("{}...", truncate_utf8_prefix(&rendered, budget))),
        );
        let text = serde_json::to_string(&candidate).unwrap_or_default();
        if text.len() <= ERROR_TEXT_MAX_BYTES || budget == 0 {
            return text;
        }
        budget = budget.saturating_sub(text.len() - ERROR_TEXT_MAX_BYTES);
    }
}
