//! Shared-keyword extraction for recommendation explanations.
//!
//! The ranking itself is embedding-driven; these tokens exist purely so a
//! human can see *why* a book surfaced ("you asked about dragons, this book
//! mentions dragons"). Tokens shared between the query and the book's text
//! fields are intersected, stop words dropped, and the survivors capped and
//! sorted for a stable display order.

use std::collections::BTreeSet;

use crate::book::Book;

/// Maximum shared terms returned per book.
const MAX_SHARED: usize = 5;

/// Minimum token length considered a keyword.
const MIN_TOKEN_LEN: usize = 3;

/// Common English stopwords.
const STOP_WORDS: &[&str] = &[
    "about", "after", "all", "and", "are", "because", "been", "before", "but", "can",
    "could", "did", "does", "for", "from", "had", "has", "have", "her", "him", "his",
    "how", "into", "its", "just", "like", "more", "most", "not", "one", "other", "our",
    "out", "over", "she", "should", "some", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "was", "were", "what", "when", "where",
    "which", "who", "will", "with", "would", "you", "your",
];

/// Terms shared between the query and the book's text fields.
///
/// Lowercase alphanumeric tokenization on both sides, set intersection,
/// stop words removed, up to 5 terms in sorted order.
pub fn shared_keywords(query: &str, book: &Book) -> Vec<String> {
    let query_tokens = tokenize(query);
    let book_tokens = tokenize(&book_text(book));

    query_tokens
        .intersection(&book_tokens)
        .take(MAX_SHARED)
        .cloned()
        .collect()
}

/// Concatenated searchable text of a book.
fn book_text(book: &Book) -> String {
    let mut parts = vec![book.title.as_str(), book.author.as_str()];
    for field in [&book.description, &book.subjects, &book.genres] {
        if let Some(text) = field {
            parts.push(text);
        }
    }
    parts.join(" ")
}

/// Lowercase word set with stop words and short tokens removed.
fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}
