use crate::errors::ToolError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

/// Ordered header set with case-insensitive names. Setting an existing name
/// replaces the earlier entry and takes the new spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.0.push((name, value.into()));
    }

    pub fn extend<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in entries {
            self.set(name, value);
        }
    }

    /// Merges a JSON object of headers. Non-string values are rendered as JSON.
    pub fn extend_from_map(&mut self, map: &Map<String, Value>) {
        for (name, value) in map {
            if value.is_null() {
                continue;
            }
            let rendered = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            self.set(name.clone(), rendered);
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }

    pub fn to_header_map(&self) -> Result<HeaderMap, ToolError> {
        let mut map = HeaderMap::new();
        for (key, value) in &self.0 {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                ToolError::invalid_params(format!("Invalid header name: {}", key))
            })?;
            let val = HeaderValue::from_str(value).map_err(|_| {
                ToolError::invalid_params(format!("Invalid value for header {}", key))
            })?;
            map.insert(name, val);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_set_wins_regardless_of_case() {
        let mut headers = HeaderList::new();
        headers.set("Content-Type", "application/json");
        headers.set("x-pica-secret", "s");
        headers.set("content-type", "text/plain");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(headers.iter().last(), Some(("content-type", "text/plain")));
    }

    #[test]
    fn map_values_are_rendered_as_strings() {
        let mut headers = HeaderList::new();
        headers.extend_from_map(json!({"X-Count": 2, "X-Skip": null}).as_object().expect("object"));
        assert_eq!(headers.to_map(), json!({"X-Count": "2"}).as_object().cloned().expect("object"));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let mut headers = HeaderList::new();
        headers.set("bad header", "v");
        assert!(headers.to_header_map().is_err());
    }
}
