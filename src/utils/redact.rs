use crate::constants::headers::SECRET;
use crate::constants::redaction::DEFAULT_REDACTION;
use crate::utils::text::truncate_utf8_prefix;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

const INLINE_MASK: &str = "***REDACTED***";

/// Argument keys whose values never reach a log line.
const SENSITIVE_KEYS: &[&str] = &["password", "apikey", "api_key", "authorization", "cookie"];

/// Header names masked wherever a `headers` map shows up in logged arguments.
const CREDENTIAL_HEADERS: &[&str] = &["authorization", "proxy-authorization", "x-api-key", SECRET];

static API_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sk_(live|test)_[A-Za-z0-9_-]{10,}").expect("api key regex"));
static BEARER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Bearer)\s+[A-Za-z0-9._~+/=-]{10,}").expect("bearer regex"));

/// Keys that look like they hold credentials: the fixed list plus anything
/// mentioning a secret or token.
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.trim().to_ascii_lowercase();
    !key.is_empty()
        && (SENSITIVE_KEYS.contains(&key.as_str()) || key.contains("secret") || key.contains("token"))
}

/// Masks Pica API keys, bearer tokens and any of `extra_secrets`, then cuts the
/// result to `max_bytes` (marked with `...`).
pub fn redact_text(value: &str, max_bytes: usize, extra_secrets: Option<&[String]>) -> String {
    let mut out = API_KEY.replace_all(value, "sk_${1}_***REDACTED***").into_owned();
    out = BEARER.replace_all(&out, "$1 ***REDACTED***").into_owned();
    for secret in extra_secrets.unwrap_or_default() {
        out = scrub_text(&out, secret.trim(), INLINE_MASK);
    }
    if out.len() <= max_bytes {
        return out;
    }
    format!("{}...", truncate_utf8_prefix(&out, max_bytes))
}

/// Log-oriented redaction of tool arguments. Sensitive keys and credential
/// headers are replaced outright; every other string goes through
/// [`redact_text`].
pub fn redact_object(value: &Value, max_bytes: usize, extra_secrets: Option<&[String]>) -> Value {
    match value {
        Value::String(text) => Value::String(redact_text(text, max_bytes, extra_secrets)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| redact_object(item, max_bytes, extra_secrets))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, entry) in map {
                let masked = if key == "headers" {
                    redact_header_map(entry, max_bytes, extra_secrets)
                } else if is_sensitive_key(key) {
                    Value::String(DEFAULT_REDACTION.to_string())
                } else {
                    redact_object(entry, max_bytes, extra_secrets)
                };
                out.insert(key.clone(), masked);
            }
            Value::Object(out)
        }
        _ => value.clone(),
    }
}

fn redact_header_map(value: &Value, max_bytes: usize, extra_secrets: Option<&[String]>) -> Value {
    let Some(map) = value.as_object() else {
        return redact_object(value, max_bytes, extra_secrets);
    };
    let out = map
        .iter()
        .map(|(name, entry)| {
            let lowered = name.to_ascii_lowercase();
            let masked = if CREDENTIAL_HEADERS.contains(&lowered.as_str()) {
                Value::String(DEFAULT_REDACTION.to_string())
            } else {
                redact_object(entry, max_bytes, extra_secrets)
            };
            (name.clone(), masked)
        })
        .collect();
    Value::Object(out)
}

/// Replaces every occurrence of `secret` in `text` with `mask`.
pub fn scrub_text(text: &str, secret: &str, mask: &str) -> String {
    if secret.is_empty() || !text.contains(secret) {
        return text.to_string();
    }
    text.replace(secret, mask)
}

/// Walks a JSON value and scrubs the secret out of every string and key.
/// Unlike [`redact_object`] nothing else is touched, so caller-visible payloads
/// keep their shape and content.
pub fn scrub_value(value: &Value, secret: &str, mask: &str) -> Value {
    match value {
        Value::String(text) => Value::String(scrub_text(text, secret, mask)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| scrub_value(item, secret, mask))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, entry)| (scrub_text(key, secret, mask), scrub_value(entry, secret, mask)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Sets every header named like the secret header (any case) to `mask`.
pub fn mask_secret_header(headers: &mut Map<String, Value>, mask: &str) {
    for (key, entry) in headers.iter_mut() {
        if key.eq_ignore_ascii_case(SECRET) {
            *entry = Value::String(mask.to_string());
        }
    }
}
