//! Book records and the seams around the external store.
//!
//! The engine never talks to a database. It reads a snapshot of [`Book`]
//! records through [`BookSource`] and writes computed cluster fields back
//! through [`ClusterSink`], one record at a time. Both seams are small traits
//! so tests (and the demo) can substitute [`MemoryShelf`], an in-memory
//! implementation of both.
//!
//! A book's embedding arrives in its storage encoding: a JSON array of reals
//! serialized to text, produced by an external embedding model. Decoding (and
//! the skip-malformed policy around it) lives in [`crate::matrix`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Snapshot of a single book as handed over by the external store.
///
/// The engine reads `id`, `rating`, `embedding`, and the free-text fields;
/// it writes `cluster_id`, `centroid_distance`, and the projection
/// coordinates (via [`ClusterSink`], not by mutating the snapshot).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Reader's rating in 1..=5, if rated.
    pub rating: Option<u8>,
    /// JSON-encoded embedding vector, if the book has been embedded.
    pub embedding: Option<String>,
    /// Description text.
    pub description: Option<String>,
    /// Subject headings (free text).
    pub subjects: Option<String>,
    /// Genre labels (free text).
    pub genres: Option<String>,
    /// Cluster label from the most recent clustering run.
    pub cluster_id: Option<usize>,
    /// Distance to the assigned cluster's centroid.
    pub centroid_distance: Option<f32>,
    /// 2-D layout x coordinate.
    pub projection_x: Option<f32>,
    /// 2-D layout y coordinate.
    pub projection_y: Option<f32>,
}

impl Book {
    /// Create a book with the given identity fields and nothing else set.
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    /// Attach an embedding vector, stored in its JSON text encoding.
    #[must_use]
    pub fn with_embedding(mut self, vector: &[f32]) -> Self {
        self.embedding = Some(serde_json::to_string(vector).expect("a float slice encodes"));
        self
    }

    /// Attach a rating.
    #[must_use]
    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Decode the stored embedding into a numeric vector.
    ///
    /// Returns `None` when the book has no embedding or the stored text does
    /// not decode to an array of reals. Callers that care about the
    /// difference check [`Book::embedding`] for presence first.
    pub fn decoded_embedding(&self) -> Option<Vec<f32>> {
        let raw = self.embedding.as_deref()?;
        serde_json::from_str(raw).ok()
    }
}

/// Per-book write-back payload of a clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterUpdate {
    /// Assigned cluster label, dense in `[0, k)`.
    pub cluster_id: usize,
    /// Distance to the assigned centroid (standardized space, >= 0).
    pub centroid_distance: f32,
    /// Layout x coordinate.
    pub projection_x: f32,
    /// Layout y coordinate.
    pub projection_y: f32,
}

/// Source of book snapshots.
pub trait BookSource {
    /// Return the full collection as of now. The engine treats the returned
    /// vector as an immutable snapshot for the duration of one call.
    fn books(&self) -> Vec<Book>;
}

/// Sink that persists computed cluster fields onto a single book record.
pub trait ClusterSink {
    /// Apply `update` to the record identified by `book_id`.
    fn apply(&mut self, book_id: &str, update: &ClusterUpdate) -> Result<()>;
}

/// In-memory book store implementing both seams.
#[derive(Debug, Clone, Default)]
pub struct MemoryShelf {
    books: Vec<Book>,
}

impl MemoryShelf {
    /// Create an empty shelf.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a book.
    pub fn insert(&mut self, book: Book) {
        self.books.push(book);
    }

    /// Look up a book by id.
    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Number of books on the shelf.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether the shelf is empty.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl BookSource for MemoryShelf {
    fn books(&self) -> Vec<Book> {
        self.books.clone()
    }
}

impl ClusterSink for MemoryShelf {
    fn apply(&mut self, book_id: &str, update: &ClusterUpdate) -> Result<()> {
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or_else(|| Error::Persistence(format!("unknown book id: {book_id}")))?;

        book.cluster_id = Some(update.cluster_id);
        book.centroid_distance = Some(update.centroid_distance);
        book.projection_x = Some(update.projection_x);
        book.projection_y = Some(update.projection_y);
        Ok(())
    }
}
