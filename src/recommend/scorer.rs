//! Embedding-based recommendation ranking.
//!
//! Ranks every embedded book against a free-text query by a weighted blend
//! of three components, each carried through to the output so the ranking
//! stays auditable:
//!
//! ```text
//! score = w_sim · cosine(query, book)
//!       + w_rat · (rating - 1) / 4        (0.5 when unrated)
//!       + w_nov · U[0, 1)                 (fresh draw per call)
//! ```
//!
//! The novelty term is deliberately non-deterministic: without it, a
//! repeated query always resurfaces the same tail. Tests pin it down with
//! [`Scorer::with_seed`].
//!
//! Weights are renormalized to sum to 1 at construction, so callers express
//! relative emphasis without pre-normalizing: `(3, 1, 1)` behaves exactly
//! like `(0.6, 0.2, 0.2)`.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use super::keywords::shared_keywords;
use crate::book::Book;
use crate::error::{Error, Result};
use crate::metrics::cosine_similarity;

/// Neutral rating component for unrated books.
const NEUTRAL_RATING: f32 = 0.5;

/// Relative emphasis of the three score components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Semantic closeness of book to query.
    pub similarity: f32,
    /// Reader's own rating.
    pub rating: f32,
    /// Random novelty.
    pub novelty: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            rating: 0.3,
            novelty: 0.1,
        }
    }
}

impl Weights {
    /// Renormalize so the three weights sum to 1.
    ///
    /// Rejects negative or non-finite weights, and the all-zero triple.
    pub fn normalized(self) -> Result<Self> {
        let parts = [self.similarity, self.rating, self.novelty];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::InvalidParameter {
                name: "weights",
                message: "must be finite and non-negative",
            });
        }
        let total: f32 = parts.iter().sum();
        if total <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "weights",
                message: "must not all be zero",
            });
        }
        Ok(Self {
            similarity: self.similarity / total,
            rating: self.rating / total,
            novelty: self.novelty / total,
        })
    }
}

/// One ranked recommendation with its score decomposition.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    /// Book id.
    pub book_id: String,
    /// Composite score the ranking sorts by.
    pub score: f32,
    /// Cosine similarity component, in [-1, 1].
    pub similarity: f32,
    /// Rating mapped to [0, 1], or the neutral 0.5.
    pub normalized_rating: f32,
    /// Novelty draw, in [0, 1).
    pub novelty: f32,
    /// Terms the query shares with the book's text fields.
    pub shared_keywords: Vec<String>,
}

/// Weighted similarity/rating/novelty ranking over a book snapshot.
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: Weights,
    seed: Option<u64>,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(Weights::default()).expect("default weights are valid")
    }
}

impl Scorer {
    /// Create a scorer; weights are renormalized here, once.
    pub fn new(weights: Weights) -> Result<Self> {
        Ok(Self {
            weights: weights.normalized()?,
            seed: None,
        })
    }

    /// Pin the novelty draws for reproducible tests.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The effective (renormalized) weights.
    pub fn weights(&self) -> Weights {
        self.weights
    }

    /// Rank `books` against an embedded query, best first.
    ///
    /// `query` is the raw text (used only for the keyword explainer);
    /// `query_embedding` is its vector from the external embedding producer.
    /// An empty embedding, an empty candidate set, or a candidate set with
    /// no decodable embeddings all yield an empty list.
    pub fn recommend(
        &self,
        query: &str,
        query_embedding: &[f32],
        books: &[Book],
        limit: usize,
    ) -> Vec<Recommendation> {
        if query_embedding.is_empty() {
            return Vec::new();
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut ranked: Vec<Recommendation> = books
            .iter()
            .filter_map(|book| {
                let embedding = book.decoded_embedding()?;
                let similarity = cosine_similarity(query_embedding, &embedding);
                let normalized_rating = book
                    .rating
                    .map_or(NEUTRAL_RATING, |r| (f32::from(r) - 1.0) / 4.0);
                let novelty = rng.random::<f32>();

                let score = self.weights.similarity * similarity
                    + self.weights.rating * normalized_rating
                    + self.weights.novelty * novelty;

                Some(Recommendation {
                    book_id: book.id.clone(),
                    score,
                    similarity,
                    normalized_rating,
                    novelty,
                    shared_keywords: shared_keywords(query, book),
                })
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded_book(id: &str, embedding: &[f32]) -> Book {
        Book::new(id, format!("Title {id}"), "Author").with_embedding(embedding)
    }

    #[test]
    fn weights_renormalize_to_unit_sum() {
        let w = Weights {
            similarity: 3.0,
            rating: 1.0,
            novelty: 1.0,
        }
        .normalized()
        .unwrap();

        assert!((w.similarity - 0.6).abs() < 1e-6);
        assert!((w.rating - 0.2).abs() < 1e-6);
        assert!((w.novelty - 0.2).abs() < 1e-6);
        assert!((w.similarity + w.rating + w.novelty - 1.0).abs() < 1e-6);
    }

    #[test]
    fn default_weights_already_sum_to_one() {
        let w = Scorer::default().weights();
        assert!((w.similarity + w.rating + w.novelty - 1.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_weights_rejected() {
        for bad in [
            Weights { similarity: -1.0, rating: 1.0, novelty: 1.0 },
            Weights { similarity: f32::NAN, rating: 1.0, novelty: 1.0 },
            Weights { similarity: 0.0, rating: 0.0, novelty: 0.0 },
        ] {
            assert!(Scorer::new(bad).is_err());
        }
    }

    #[test]
    fn exact_match_ranks_first() {
        // Scenario: one book's embedding equals the query embedding exactly
        let query = [0.3f32, 0.7, 0.1, 0.9];
        let books = vec![
            embedded_book("far1", &[-0.3, -0.7, -0.1, -0.9]),
            embedded_book("near", &query),
            embedded_book("far2", &[0.9, -0.1, 0.3, -0.7]),
            embedded_book("far3", &[-0.5, 0.5, -0.5, 0.5]),
            embedded_book("far4", &[0.0, 0.0, 1.0, 0.0]),
        ];

        let ranked = Scorer::default().with_seed(11).recommend("q", &query, &books, 5);
        assert_eq!(ranked[0].book_id, "near");
        assert!((ranked[0].similarity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn higher_rating_wins_on_average() {
        // Identical embeddings, ratings 5 vs 1; average over novelty draws
        let embedding = [1.0f32, 0.0, 1.0];
        let books = vec![
            embedded_book("loved", &embedding).with_rating(5),
            embedded_book("hated", &embedding).with_rating(1),
        ];

        let mut loved_first = 0;
        for seed in 0..50 {
            let ranked = Scorer::default()
                .with_seed(seed)
                .recommend("q", &embedding, &books, 2);
            if ranked[0].book_id == "loved" {
                loved_first += 1;
            }
        }
        assert!(loved_first > 40, "rating should dominate: {loved_first}/50");
    }

    #[test]
    fn unrated_book_gets_neutral_midpoint() {
        let embedding = [1.0f32, 1.0];
        let books = vec![embedded_book("unrated", &embedding)];
        let ranked = Scorer::default().with_seed(1).recommend("q", &embedding, &books, 1);
        assert_eq!(ranked[0].normalized_rating, 0.5);
    }

    #[test]
    fn empty_candidates_yield_empty_list() {
        let ranked = Scorer::default().recommend("q", &[1.0, 0.0], &[], 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn unembedded_candidates_yield_empty_list() {
        let books = vec![Book::new("a", "A", "x"), Book::new("b", "B", "x")];
        let ranked = Scorer::default().recommend("q", &[1.0, 0.0], &books, 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn unembeddable_query_yields_empty_list() {
        let books = vec![embedded_book("a", &[1.0, 0.0])];
        let ranked = Scorer::default().recommend("q", &[], &books, 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn limit_truncates() {
        let books: Vec<Book> = (0..10)
            .map(|i| embedded_book(&format!("b{i}"), &[i as f32, 1.0]))
            .collect();
        let ranked = Scorer::default().with_seed(3).recommend("q", &[1.0, 1.0], &books, 3);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn components_recombine_into_score() {
        let books = vec![embedded_book("a", &[0.5, 0.5]).with_rating(4)];
        let ranked = Scorer::default().with_seed(9).recommend("q", &[1.0, 0.0], &books, 1);

        let r = &ranked[0];
        let w = Scorer::default().weights();
        let expected =
            w.similarity * r.similarity + w.rating * r.normalized_rating + w.novelty * r.novelty;
        assert!((r.score - expected).abs() < 1e-6);
    }
}
