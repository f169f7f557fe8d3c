/// Normalize a user question into the canonical form every rule matcher
/// operates on: internal whitespace collapsed to single spaces, trimmed,
/// lowercased. Total and idempotent.
pub fn normalize_question(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
