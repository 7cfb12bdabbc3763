//! Nearest-neighbor lookup between books.
//!
//! "More like this": pairwise cosine similarity between one target book and
//! every other embedded book, exact and recomputed per call. At a personal
//! library's scale the O(n) scan beats maintaining an index.

use serde::Serialize;

use crate::book::Book;
use crate::metrics::cosine_similarity;

/// One neighbor of the target book.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarBook {
    /// Book id.
    pub book_id: String,
    /// Cosine similarity to the target, in [-1, 1].
    pub similarity: f32,
    /// Reader's rating, if rated.
    pub rating: Option<u8>,
    /// Genre labels, if known.
    pub genres: Option<String>,
}

/// The `limit` books most similar to `target_id`, best first.
///
/// The target itself is excluded. A missing target, a target without a
/// decodable embedding, or a corpus with no other embedded books all yield
/// an empty list; lookups never error.
pub fn similar_books(books: &[Book], target_id: &str, limit: usize) -> Vec<SimilarBook> {
    let Some(target) = books.iter().find(|b| b.id == target_id) else {
        return Vec::new();
    };
    let Some(target_embedding) = target.decoded_embedding() else {
        return Vec::new();
    };

    let mut neighbors: Vec<SimilarBook> = books
        .iter()
        .filter(|b| b.id != target_id)
        .filter_map(|book| {
            let embedding = book.decoded_embedding()?;
            Some(SimilarBook {
                book_id: book.id.clone(),
                similarity: cosine_similarity(&target_embedding, &embedding),
                rating: book.rating,
                genres: book.genres.clone(),
            })
        })
        .collect();

    neighbors.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    neighbors.truncate(limit);
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf() -> Vec<Book> {
        vec![
            Book::new("target", "T", "x").with_embedding(&[1.0, 0.0, 0.0]),
            Book::new("close", "C", "x")
                .with_embedding(&[0.9, 0.1, 0.0])
                .with_rating(4),
            Book::new("far", "F", "x").with_embedding(&[0.0, 1.0, 0.0]),
            Book::new("opposite", "O", "x").with_embedding(&[-1.0, 0.0, 0.0]),
            Book::new("unembedded", "U", "x"),
        ]
    }

    #[test]
    fn neighbors_sorted_by_similarity() {
        let books = shelf();
        let similar = similar_books(&books, "target", 10);

        assert_eq!(similar.len(), 3);
        assert_eq!(similar[0].book_id, "close");
        assert_eq!(similar[1].book_id, "far");
        assert_eq!(similar[2].book_id, "opposite");
        assert_eq!(similar[0].rating, Some(4));
    }

    #[test]
    fn target_excluded_and_limit_applied() {
        let books = shelf();
        let similar = similar_books(&books, "target", 1);

        assert_eq!(similar.len(), 1);
        assert_ne!(similar[0].book_id, "target");
    }

    #[test]
    fn missing_target_yields_empty() {
        // Scenario D: target without an embedding -> []
        assert!(similar_books(&shelf(), "ghost", 5).is_empty());
    }

    #[test]
    fn unembedded_target_yields_empty() {
        assert!(similar_books(&shelf(), "unembedded", 5).is_empty());
    }
}
