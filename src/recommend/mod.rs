//! Recommendation: query ranking and similar-book lookup.
//!
//! Two read paths over the same embedded corpus:
//!
//! - [`Scorer`] ranks every book against a free-text query's embedding by a
//!   weighted similarity/rating/novelty blend, each component reported
//!   alongside the composite score so a caller can explain the ranking.
//! - [`similar_books`] answers "more like this one" by pairwise cosine
//!   against a target book.
//!
//! Neither path errors on missing data. An unembeddable query, an unknown
//! target, or an embedding-free corpus all degrade to an empty list.
//!
//! ```rust
//! use folio::book::Book;
//! use folio::recommend::{Scorer, Weights};
//!
//! let books = vec![
//!     Book::new("b1", "A Memory of Light", "Robert Jordan").with_embedding(&[1.0, 0.0]),
//!     Book::new("b2", "Gardens of the Moon", "Steven Erikson").with_embedding(&[0.0, 1.0]),
//! ];
//!
//! let scorer = Scorer::new(Weights::default()).unwrap().with_seed(7);
//! let ranked = scorer.recommend("epic fantasy", &[1.0, 0.1], &books, 5);
//! assert_eq!(ranked[0].book_id, "b1");
//! ```

mod keywords;
mod scorer;
mod similar;

pub use keywords::shared_keywords;
pub use scorer::{Recommendation, Scorer, Weights};
pub use similar::{similar_books, SimilarBook};
