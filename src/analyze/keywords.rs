//! Keyword extraction by frequency count.

use std::collections::HashMap;

/// Words ignored when counting keywords.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "and", "any", "are", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "could", "did", "does",
    "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "her", "here", "hers", "herself", "him", "himself", "his", "how", "into", "its",
    "itself", "just", "may", "more", "most", "must", "nor", "not", "now", "off", "once", "only",
    "other", "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "she", "should",
    "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "too", "under", "until", "upon", "very",
    "was", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Shortest token counted as a keyword, in characters.
const MIN_KEYWORD_CHARS: usize = 3;

/// Returns up to `limit` keywords, most frequent first.
///
/// Ties keep the order of first appearance, so the result is deterministic.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 {
        return Vec::new();
    }

    // word -> (count, first position)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, token) in tokenize(text).enumerate() {
        if !is_significant(&token) {
            continue;
        }
        counts
            .entry(token)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _, _)| word)
        .collect()
}

/// Lowercased alphanumeric runs. Apostrophes inside words are dropped so
/// that "document's" counts as "documents".
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|raw| {
            raw.chars()
                .filter(|c| *c != '\'')
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
}

fn is_significant(token: &str) -> bool {
    token.chars().count() >= MIN_KEYWORD_CHARS
        && !token.chars().all(|c| c.is_ascii_digit())
        && !STOP_WORDS.contains(&token)
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_by_frequency() {
        let text = "Rust is fast. Rust is safe. Cargo builds Rust and cargo tests.";
        let keywords = extract_keywords(text, 3);
        assert_eq!(keywords, vec!["rust", "cargo", "fast"]);
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let keywords = extract_keywords("zebra apple mango", 10);
        assert_eq!(keywords, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_skips_stop_words_short_tokens_and_numbers() {
        let keywords = extract_keywords("The cat and the dog ate 2024 of these ox", 10);
        assert_eq!(keywords, vec!["cat", "dog", "ate"]);
    }

    #[test]
    fn test_case_insensitive_and_apostrophes() {
        let keywords = extract_keywords("Budget BUDGET budget's budgets", 10);
        assert_eq!(keywords, vec!["budget", "budgets"]);
    }

    #[test]
    fn test_unicode_words() {
        let keywords = extract_keywords("Café café résumé", 10);
        assert_eq!(keywords, vec!["café", "résumé"]);
    }

    #[test]
    fn test_limit() {
        assert!(extract_keywords("alpha beta gamma", 0).is_empty());
        assert_eq!(extract_keywords("alpha beta gamma", 2).len(), 2);
        assert!(extract_keywords("", 5).is_empty());
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\nthree\t four "), 4);
        assert_eq!(word_count(""), 0);
    }
}
