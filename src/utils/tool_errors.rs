use crate::errors::{codes, ToolError, ToolErrorKind};
use crate::utils::suggest::suggest;

pub fn unknown_tool_error(tool: &str, known_tools: &[String]) -> ToolError {
    let suggestions = if !tool.is_empty() {
        suggest(tool, known_tools, 3)
    } else {
        Vec::new()
    };
    let list_hint = if !known_tools.is_empty() {
        format!("Available tools: {}.", known_tools.join(", "))
    } else {
        String::new()
    };
    let did_you_mean = if !suggestions.is_empty() {
        format!("Did you mean: {}?", suggestions.join(", "))
    } else {
        String::new()
    };
    let hint = [did_you_mean, list_hint]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut err = ToolError::new(
        ToolErrorKind::NotFound,
        codes::UNKNOWN_TOOL,
        format!("Unknown tool: {}", tool),
    );
    if !hint.is_empty() {
        err = err.with_hint(hint);
    }
    if !suggestions.is_empty() {
        err = err.with_details(serde_json::json!({ "did_you_mean": suggestions }));
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_tool_names() {
        let known = vec![
            "searchPlatformActions".to_string(),
            "getActionsKnowledge".to_string(),
            "execute".to_string(),
        ];
        let err = unknown_tool_error("executte", &known);
        assert_eq!(err.kind, ToolErrorKind::NotFound);
        assert!(err.hint.as_deref().unwrap_or("").contains("Did you mean: execute?"));
    }
}
