//! Frequency-ranked keyword extraction

use std::collections::HashMap;

/// Default number of keywords kept per page
pub const DEFAULT_KEYWORD_LIMIT: usize = 10;

/// Minimum token length considered a keyword
const MIN_KEYWORD_LEN: usize = 4;

/// Common English function words that never count as keywords
pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "that", "with", "this", "from", "are", "was", "were", "have", "has",
    "will", "been", "they", "their", "about", "into", "more", "also", "than", "when", "where",
    "what", "which", "your", "you", "our", "its", "can", "may", "not", "use", "using",
];

/// Returns true if the word is in the stopword set
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Extracts the `limit` most frequent keywords from text
///
/// The text is lowercased and split into maximal runs of alphanumeric
/// characters. A run is a candidate only if it consists entirely of ASCII
/// letters and is at least four characters long; runs with digits or
/// non-ASCII letters are dropped whole rather than split. Stopwords are
/// removed, then candidates are ranked by descending frequency with ties
/// broken by first occurrence.
///
/// # Examples
///
/// ```
/// use canopy_crawl::extract::extract_keywords;
///
/// let keywords = extract_keywords("Graph Graph graph theory theory algorithms", 3);
/// assert_eq!(keywords, vec!["graph", "theory", "algorithms"]);
/// ```
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let lowered = text.to_lowercase();

    // token -> (count, first occurrence)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, token) in candidate_tokens(&lowered).enumerate() {
        counts.entry(token).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(token, _, _)| token.to_string())
        .collect()
}

/// Yields keyword candidates in text order
fn candidate_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|run| run.len() >= MIN_KEYWORD_LEN)
        .filter(|run| run.bytes().all(|b| b.is_ascii_alphabetic()))
        .filter(|run| !is_stopword(run))
}
