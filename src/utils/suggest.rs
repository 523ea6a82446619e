/// Lowercased ASCII letters and digits only.
fn fold(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn edit_distance(a: &[u8], b: &[u8]) -> usize {
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, &ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }
    row[b.len()]
}

/// Distance after folding. Containment counts as one edit so prefixes and
/// abbreviations still match.
fn distance(input: &str, candidate: &str) -> Option<usize> {
    if input.is_empty() || candidate.is_empty() {
        return None;
    }
    if input == candidate {
        return Some(0);
    }
    if input.contains(candidate) || candidate.contains(input) {
        return Some(1);
    }
    Some(edit_distance(input.as_bytes(), candidate.as_bytes()))
}

fn tolerance(len: usize) -> usize {
    match len {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        _ => (len * 35 / 100).max(3),
    }
}

/// Close spellings of `input` among `candidates`, best first. Case and
/// punctuation are ignored, so `connection_key` finds `connectionKey`.
pub fn suggest(input: &str, candidates: &[String], limit: usize) -> Vec<String> {
    let folded = fold(input);
    let allowed = tolerance(folded.len());
    if allowed == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(usize, &String)> = candidates
        .iter()
        .filter_map(|candidate| {
            distance(&folded, &fold(candidate))
                .filter(|d| *d <= allowed)
                .map(|d| (d, candidate))
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.len().cmp(&b.1.len()))
            .then_with(|| a.1.cmp(b.1))
    });
    ranked.dedup_by(|a, b| a.1 == b.1);
    ranked
        .into_iter()
        .take(limit.max(1))
        .map(|(_, candidate)| candidate.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ignores_case_and_separators() {
        let fields = names(&["actionSystemId", "connectionKey", "pathVariables"]);
        assert_eq!(suggest("connection_key", &fields, 3), vec!["connectionKey"]);
    }

    #[test]
    fn typos_within_distance_are_ranked_first() {
        let tools = names(&["execute", "searchPlatformActions", "getActionsKnowledge"]);
        assert_eq!(suggest("exeucte", &tools, 3), vec!["execute"]);
        assert!(suggest("zzz", &tools, 3).is_empty());
    }

    #[test]
    fn edit_distance_counts_single_edits() {
        assert_eq!(edit_distance(b"kitten", b"sitting"), 3);
        assert_eq!(edit_distance(b"", b"abc"), 3);
    }
}
