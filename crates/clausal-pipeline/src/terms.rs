//! Question analysis

use std::collections::HashSet;

/// Words ignored when extracting key terms
const STOP_WORDS: &[&str] = &[
    "what", "is", "the", "does", "do", "are", "and", "or", "for", "in", "on", "at", "to", "of",
    "with", "by", "how", "which", "this", "that", "there", "under", "any", "can", "will", "was",
    "were", "has", "have", "from",
];

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Lower-cased terms longer than two characters, stop words removed
///
/// Order of first appearance is kept; duplicates are dropped.
pub fn extract_key_terms(question: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens(question)
        .filter(|t| t.chars().count() > 2 && !STOP_WORDS.contains(&t.as_str()))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Fraction of `terms` that occur as words in `text`, in `[0, 1]`
pub fn keyword_overlap(terms: &[String], text: &str) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let words: HashSet<String> = tokens(text).collect();
    let hits = terms.iter().filter(|t| words.contains(t.as_str())).count();
    hits as f64 / terms.len() as f64
}
