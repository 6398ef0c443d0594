//! Text tokenization for search indexing.

/// Characters that glue alphanumeric runs into one identifier
/// (`storage-api`, `run_id`, `keboola.ex-db`).
const JOINERS: &[char] = &['-', '_', '.'];

/// Tokenizes text into lower-case search terms.
///
/// Text is split on runs of non-alphanumeric characters. An identifier whose
/// parts are joined by `-`, `_` or `.` yields each part and then the whole
/// identifier:
/// - "storage-api" → ["storage", "api", "storage-api"]
/// - "GET /v2/tables" → ["get", "v2", "tables"]
///
/// Identical input always yields identical output, and case never matters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();

    for word in lowered.split(|c: char| !c.is_alphanumeric() && !JOINERS.contains(&c)) {
        let word = word.trim_matches(JOINERS);
        if word.is_empty() {
            continue;
        }

        let mut parts = word.split(JOINERS).filter(|part| !part.is_empty()).peekable();
        let first = parts.next();
        if parts.peek().is_none() {
            // Plain word, no joiners inside.
            tokens.extend(first.map(str::to_string));
            continue;
        }

        tokens.extend(first.into_iter().chain(parts).map(str::to_string));
        tokens.push(word.to_string());
    }

    tokens
}

/// Tokenizes a query, keeping only the first occurrence of each term.
pub fn query_terms(text: &str) -> Vec<String> {
    let mut seen = ahash::AHashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}
