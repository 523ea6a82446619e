pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> String {
    if max_bytes == 0 {
        return String::new();
    }
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// `1 connector`, `2 connectors`.
pub fn pluralize(count: usize, singular: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        format!("{}s", singular)
    }
}

#[cfg(test)]
mod tests {
    use super::{pluralize, truncate_utf8_prefix};

    #[test]
    fn truncate_utf8_prefix_handles_ascii() {
        assert_eq!(truncate_utf8_prefix("hello", 3), "hel");
    }

    #[test]
    fn truncate_utf8_prefix_does_not_split_utf8() {
        assert_eq!(truncate_utf8_prefix("a\u{1F600}b", 2), "a");
        assert_eq!(truncate_utf8_prefix("a\u{1F600}b", 5), "a\u{1F600}");
    }

    #[test]
    fn pluralize_counts() {
        assert_eq!(pluralize(1, "action"), "action");
        assert_eq!(pluralize(0, "action"), "actions");
        assert_eq!(pluralize(3, "connector"), "connectors");
    }
}
