/// Clean a display name coming out of the graph.
///
/// KEGG names arrive with ragged whitespace and a trailing semicolon from the
/// flat-file format. Collapses whitespace, strips the trailing `;`, and maps
/// an empty result to `None`.
pub fn clean_name(value: Option<String>) -> Option<String> {
    let raw = value?;
    let joined = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = joined.trim_end_matches(';').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
