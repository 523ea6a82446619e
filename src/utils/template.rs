use crate::errors::ToolError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub resolved_path: String,
    pub cleaned_payload: Value,
    pub resolved_vars: Map<String, Value>,
}

/// Loose truthiness used by the existence checks: null, `false`, `0` and `""`
/// count as absent. Objects and arrays are always present.
pub fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(num) => num.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Renders a value the way it appears when interpolated into a path or form field.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(text) => text.clone(),
        Value::Number(num) => num.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Placeholder names in order of appearance, duplicates kept.
pub fn placeholder_names(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn is_present(pool: &Map<String, Value>, name: &str) -> bool {
    pool.get(name).map(value_is_truthy).unwrap_or(false)
}

pub fn resolve_path_template(
    template: &str,
    payload: &Value,
    explicit: Option<&Map<String, Value>>,
) -> Result<ResolvedTemplate, ToolError> {
    let required = placeholder_names(template);
    if required.is_empty() {
        return Ok(ResolvedTemplate {
            resolved_path: template.to_string(),
            cleaned_payload: payload.clone(),
            resolved_vars: Map::new(),
        });
    }

    let mut pool = payload.as_object().cloned().unwrap_or_default();
    if let Some(explicit) = explicit {
        for (key, value) in explicit {
            pool.insert(key.clone(), value.clone());
        }
    }

    let mut missing: Vec<String> = Vec::new();
    for name in &required {
        if !is_present(&pool, name) && !missing.contains(name) {
            missing.push(name.clone());
        }
    }
    if !missing.is_empty() {
        return Err(ToolError::missing_variables(&missing));
    }

    let mut resolved_vars = explicit.cloned().unwrap_or_default();
    let mut cleaned_payload = payload.clone();
    if let Value::Object(fields) = &mut cleaned_payload {
        for name in &required {
            let supplied_explicitly = explicit.map(|vars| is_present(vars, name)).unwrap_or(false);
            if supplied_explicitly || !is_present(fields, name) {
                continue;
            }
            if let Some(value) = fields.remove(name) {
                resolved_vars.insert(name.clone(), value);
            }
        }
    }

    let mut unresolved: Vec<String> = Vec::new();
    let resolved_path = PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match resolved_vars.get(name).filter(|v| value_is_truthy(v)) {
                Some(value) => stringify_value(value),
                None => {
                    unresolved.push(name.to_string());
                    String::new()
                }
            }
        })
        .into_owned();
    if !unresolved.is_empty() {
        return Err(ToolError::missing_variables(&unresolved));
    }

    Ok(ResolvedTemplate {
        resolved_path,
        cleaned_payload,
        resolved_vars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::codes;
    use serde_json::json;

    fn vars(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn moves_payload_field_into_path() {
        let out = resolve_path_template(
            "/api/users/{{userId}}",
            &json!({"userId": "123", "title": "t"}),
            None,
        )
        .expect("resolve");
        assert_eq!(out.resolved_path, "/api/users/123");
        assert_eq!(out.cleaned_payload, json!({"title": "t"}));
        assert_eq!(out.resolved_vars, vars(json!({"userId": "123"})));
    }

    #[test]
    fn missing_variable_is_reported() {
        let err = resolve_path_template("/api/users/{{userId}}", &json!({}), None)
            .expect_err("must fail");
        assert_eq!(err.code, codes::MISSING_VARIABLE);
        assert!(err.message.contains("userId"));
    }

    #[test]
    fn every_missing_name_is_listed() {
        let err = resolve_path_template("/orgs/{{orgId}}/users/{{userId}}", &json!({"x": 1}), None)
            .expect_err("must fail");
        assert_eq!(
            err.message,
            "Missing required path variables: orgId, userId. Please provide values for these variables."
        );
    }

    #[test]
    fn no_placeholders_leaves_everything_untouched() {
        let payload = json!({"a": 1});
        let explicit = vars(json!({"unused": "x"}));
        let out = resolve_path_template("/plain", &payload, Some(&explicit)).expect("resolve");
        assert_eq!(out.resolved_path, "/plain");
        assert_eq!(out.cleaned_payload, payload);
        assert!(out.resolved_vars.is_empty());
    }

    #[test]
    fn explicit_value_wins_and_payload_keeps_field() {
        let explicit = vars(json!({"id": 7}));
        let out = resolve_path_template("/items/{{id}}", &json!({"id": "9", "name": "n"}), Some(&explicit))
            .expect("resolve");
        assert_eq!(out.resolved_path, "/items/7");
        assert_eq!(out.cleaned_payload, json!({"id": "9", "name": "n"}));
        assert_eq!(out.resolved_vars, vars(json!({"id": 7})));
    }

    #[test]
    fn array_payload_is_not_a_variable_source() {
        let err = resolve_path_template("/x/{{id}}", &json!([{"id": 1}]), None).expect_err("must fail");
        assert_eq!(err.code, codes::MISSING_VARIABLE);

        let explicit = vars(json!({"id": true}));
        let out = resolve_path_template("/x/{{id}}", &json!([1, 2]), Some(&explicit)).expect("resolve");
        assert_eq!(out.resolved_path, "/x/true");
        assert_eq!(out.cleaned_payload, json!([1, 2]));
    }

    #[test]
    fn falsy_values_count_as_missing() {
        for value in [json!(0), json!(false), json!(""), Value::Null] {
            let err = resolve_path_template("/p/{{v}}", &json!({"v": value}), None)
                .expect_err("falsy must be missing");
            assert_eq!(err.code, codes::MISSING_VARIABLE);
        }
    }

    #[test]
    fn failure_does_not_touch_input_payload() {
        let payload = json!({"a": "1"});
        let _ = resolve_path_template("/{{a}}/{{b}}", &payload, None);
        assert_eq!(payload, json!({"a": "1"}));
    }

    #[test]
    fn repeated_placeholder_substitutes_everywhere() {
        let out = resolve_path_template("/{{id}}/copy/{{id}}", &json!({"id": 5}), None)
            .expect("resolve");
        assert_eq!(out.resolved_path, "/5/copy/5");
        assert_eq!(out.cleaned_payload, json!({}));
    }

    #[test]
    fn placeholder_names_are_collected_in_order() {
        assert_eq!(
            placeholder_names("/a/{{first}}/b/{{second}}"),
            vec!["first".to_string(), "second".to_string()]
        );
        assert!(placeholder_names("/a/{b}/{{}}").is_empty());
    }

    #[test]
    fn truthiness_matches_loose_rules() {
        assert!(!value_is_truthy(&json!(0.0)));
        assert!(value_is_truthy(&json!(-1)));
        assert!(value_is_truthy(&json!({})));
        assert!(value_is_truthy(&json!([])));
        assert!(value_is_truthy(&json!("0")));
    }
}
