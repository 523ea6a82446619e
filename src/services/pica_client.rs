use crate::config::PicaConfig;
use crate::constants::api::USER_AGENT;
use crate::constants::headers::{CONTENT_TYPE, JSON, SECRET};
use crate::constants::redaction::DEFAULT_REDACTION;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::headers::HeaderList;
use crate::utils::pagination::Page;
use crate::utils::redact::scrub_value;
use reqwest::multipart::Form;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Body of an outbound passthrough call.
pub enum OutboundBody {
    Empty,
    Json(Value),
    Multipart(Form),
    UrlEncoded(String),
}

pub struct OutboundRequest {
    pub method: String,
    pub url: String,
    pub headers: HeaderList,
    pub query: Vec<(String, String)>,
    pub body: OutboundBody,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub data: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Thin wrapper over one `reqwest::Client` bound to a [`PicaConfig`].
#[derive(Clone)]
pub struct PicaClient {
    logger: Logger,
    config: Arc<PicaConfig>,
    client: Client,
}

impl PicaClient {
    pub fn new(config: Arc<PicaConfig>, logger: &Logger) -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            logger: logger.child("http"),
            config,
            client,
        })
    }

    pub fn config(&self) -> &PicaConfig {
        &self.config
    }

    pub fn secret(&self) -> &str {
        self.config.secret()
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Headers for discovery calls: JSON content type, the secret, then the
    /// configured extras.
    pub fn discovery_headers(&self) -> HeaderList {
        let mut headers = HeaderList::new();
        headers.set(CONTENT_TYPE, JSON);
        headers.set(SECRET, self.secret());
        headers.extend(self.config.headers.iter().cloned());
        headers
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ToolError> {
        let url = self.endpoint(path);
        let headers = self.discovery_headers().to_header_map()?;
        self.logger.debug(
            "GET",
            Some(&serde_json::json!({ "path": path, "query": query_for_log(query) })),
        );

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(query)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_reqwest_error)?;
        let data = parse_body(&text);

        if !(200..300).contains(&status) {
            let scrubbed = scrub_value(&data, self.secret(), DEFAULT_REDACTION);
            return Err(ToolError::remote(format!(
                "Pica API request to {} failed ({})",
                path, status
            ))
            .with_details(serde_json::json!({ "status": status, "data": scrubbed })));
        }

        serde_json::from_value(data).map_err(|err| {
            ToolError::remote(format!("Unexpected response shape from {}: {}", path, err))
        })
    }

    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        page: u64,
        limit: usize,
    ) -> Result<Page<T>, ToolError> {
        let mut params = query.to_vec();
        params.push(("page".to_string(), page.to_string()));
        params.push(("limit".to_string(), limit.to_string()));
        self.get_json(path, &params).await
    }

    /// Sends a passthrough call. Any HTTP status is returned as a response;
    /// only transport and request-building problems are errors.
    pub async fn send(&self, request: OutboundRequest) -> Result<HttpResponse, ToolError> {
        let method = Method::from_bytes(request.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| ToolError::invalid_params(format!("Invalid HTTP method: {}", request.method)))?;
        let headers = request.headers.to_header_map()?;

        let mut builder = self.client.request(method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            OutboundBody::Empty => builder,
            OutboundBody::Json(value) => builder.json(&value),
            OutboundBody::Multipart(form) => builder.multipart(form),
            OutboundBody::UrlEncoded(encoded) => builder.body(encoded),
        };
        // Applied after the body so the descriptor's content type is the one on the wire.
        builder = builder.headers(headers);

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_reqwest_error)?;
        self.logger
            .debug("passthrough response", Some(&serde_json::json!({ "status": status })));
        Ok(HttpResponse {
            status,
            data: parse_body(&text),
        })
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        return ToolError::timeout("HTTP request timed out");
    }
    ToolError::remote(err.to_string())
}

/// Percent-encodes one path segment.
pub fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// JSON when it parses, text otherwise, `null` when empty.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn query_for_log(query: &[(String, String)]) -> Value {
    Value::Object(
        query
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}
