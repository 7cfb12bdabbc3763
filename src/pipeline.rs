//! The clustering pipeline: matrix → k search → assignment → layout → sink.
//!
//! [`Orchestrator`] is the one-call entry point the surrounding application
//! layer triggers on demand. It snapshots the book collection from its
//! [`BookSource`], runs the four computation stages, and writes each book's
//! `(cluster_id, centroid_distance, projection_x, projection_y)` back
//! through its [`ClusterSink`] one record at a time.
//!
//! Failure semantics follow the per-item-absorb policy: an individual write
//! failure is logged and counted as not-updated, and the run still returns a
//! summary. Only "no usable embeddings at all" fails the run, and even that
//! is a `success: false` summary with a reason, never a panic.
//!
//! Everything here is a synchronous, CPU-bound batch recomputed from scratch
//! per call; the summary and histogram are returned to the caller and never
//! persisted.

use log::{error, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::book::{Book, BookSource, ClusterSink, ClusterUpdate};
use crate::cluster::{Assigner, KSelector, DEFAULT_MAX_K, DEFAULT_MIN_K};
use crate::error::Result;
use crate::matrix::build_embedding_matrix;
use crate::project::{NeighborProjection, ProjectionConfig};

/// Configuration shared by one clustering run.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterConfig {
    /// Inclusive lower bound of the k search.
    pub min_k: usize,
    /// Inclusive upper bound of the k search.
    pub max_k: usize,
    /// Neighborhood size for the layout graph.
    pub n_neighbors: usize,
    /// Minimum layout spacing between tightly coupled points.
    pub min_dist: f32,
    /// Layout dimensionality.
    pub n_components: usize,
    /// Seed shared by the search, the final fit, and the layout.
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_k: DEFAULT_MIN_K,
            max_k: DEFAULT_MAX_K,
            n_neighbors: 15,
            min_dist: 0.1,
            n_components: 2,
            seed: 42,
        }
    }
}

/// Outcome of one clustering run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Whether the run produced and persisted assignments.
    pub success: bool,
    /// Chosen cluster count, when the run got that far.
    pub optimal_k: Option<usize>,
    /// Number of books that entered the matrix.
    pub total_books: usize,
    /// Number of books whose update was persisted.
    pub updated_books: usize,
    /// Cluster label → member count.
    pub cluster_sizes: BTreeMap<usize, usize>,
    /// Failure reason, when `success` is false.
    pub error: Option<String>,
}

impl RunSummary {
    fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            optimal_k: None,
            total_books: 0,
            updated_books: 0,
            cluster_sizes: BTreeMap::new(),
            error: Some(reason.into()),
        }
    }
}

/// Batch clustering orchestrator over an injected source and sink.
#[derive(Debug)]
pub struct Orchestrator<S, K> {
    source: S,
    sink: K,
    config: ClusterConfig,
}

impl<S: BookSource, K: ClusterSink> Orchestrator<S, K> {
    /// Create an orchestrator with default configuration.
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            sink,
            config: ClusterConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ClusterConfig) -> Self {
        self.config = config;
        self
    }

    /// Consume the orchestrator and hand back the sink (useful in tests).
    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Run the full pipeline once and persist the results.
    pub fn run(&mut self) -> RunSummary {
        let books = self.source.books();

        let embedding = match build_embedding_matrix(&books) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("clustering run aborted: {e}");
                return RunSummary::failure("no embeddings available");
            }
        };
        let total_books = embedding.n_books();
        info!(
            "clustering {} embedded books ({} dims)",
            total_books,
            embedding.dim()
        );

        match self.cluster_and_persist(&embedding.matrix, &embedding.book_ids) {
            Ok(summary) => summary,
            Err(e) => {
                error!("clustering run failed: {e}");
                RunSummary::failure(e.to_string())
            }
        }
    }

    fn cluster_and_persist(
        &mut self,
        matrix: &ndarray::Array2<f32>,
        book_ids: &[String],
    ) -> Result<RunSummary> {
        let optimal_k = KSelector::new()
            .with_bounds(self.config.min_k, self.config.max_k)
            .with_seed(self.config.seed)
            .select(matrix);

        let assignments = Assigner::new(optimal_k)
            .with_seed(self.config.seed)
            .assign(matrix)?;

        let coords = NeighborProjection::with_config(ProjectionConfig {
            n_neighbors: self.config.n_neighbors,
            min_dist: self.config.min_dist,
            n_components: self.config.n_components,
            seed: self.config.seed,
            ..Default::default()
        })
        .project(matrix)?;

        let mut updated_books = 0;
        let mut cluster_sizes: BTreeMap<usize, usize> = BTreeMap::new();

        for (i, book_id) in book_ids.iter().enumerate() {
            let assignment = &assignments[i];
            *cluster_sizes.entry(assignment.label).or_insert(0) += 1;

            let update = ClusterUpdate {
                cluster_id: assignment.label,
                centroid_distance: assignment.centroid_distance,
                projection_x: coords[[i, 0]],
                projection_y: if coords.ncols() > 1 { coords[[i, 1]] } else { 0.0 },
            };

            match self.sink.apply(book_id, &update) {
                Ok(()) => updated_books += 1,
                Err(e) => warn!("failed to update book {book_id}: {e}"),
            }
        }

        info!(
            "clustering complete: k={optimal_k}, updated {updated_books}/{} books",
            book_ids.len()
        );

        Ok(RunSummary {
            success: true,
            optimal_k: Some(optimal_k),
            total_books: book_ids.len(),
            updated_books,
            cluster_sizes,
            error: None,
        })
    }
}

/// Snapshot statistics over persisted cluster assignments.
#[derive(Debug, Clone, Serialize)]
pub struct ClusteringStats {
    /// Books in the snapshot.
    pub total_books: usize,
    /// Books carrying a cluster label.
    pub clustered_books: usize,
    /// Percentage of books clustered, rounded to two decimals.
    pub clustering_rate: f32,
    /// Distinct cluster labels present.
    pub num_clusters: usize,
    /// Cluster label → member count.
    pub cluster_sizes: BTreeMap<usize, usize>,
}

/// Compute clustering coverage over a book snapshot.
pub fn clustering_stats(books: &[Book]) -> ClusteringStats {
    let mut cluster_sizes: BTreeMap<usize, usize> = BTreeMap::new();
    let mut clustered_books = 0;

    for book in books {
        if let Some(cluster) = book.cluster_id {
            clustered_books += 1;
            *cluster_sizes.entry(cluster).or_insert(0) += 1;
        }
    }

    let clustering_rate = if books.is_empty() {
        0.0
    } else {
        (clustered_books as f32 / books.len() as f32 * 10_000.0).round() / 100.0
    };

    ClusteringStats {
        total_books: books.len(),
        clustered_books,
        clustering_rate,
        num_clusters: cluster_sizes.len(),
        cluster_sizes,
    }
}

/// A cluster's exemplar: a member close to the centroid.
#[derive(Debug, Clone, Serialize)]
pub struct Exemplar {
    /// Book id.
    pub book_id: String,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Reader's rating, if rated.
    pub rating: Option<u8>,
    /// Distance to the cluster centroid.
    pub centroid_distance: Option<f32>,
    /// Genre labels, if known.
    pub genres: Option<String>,
}

/// The `limit` books of a cluster closest to its centroid.
///
/// Books without a stored distance sort last.
pub fn cluster_exemplars(books: &[Book], cluster_id: usize, limit: usize) -> Vec<Exemplar> {
    let mut members: Vec<&Book> = books
        .iter()
        .filter(|b| b.cluster_id == Some(cluster_id))
        .collect();

    members.sort_by(|a, b| {
        let da = a.centroid_distance.unwrap_or(f32::INFINITY);
        let db = b.centroid_distance.unwrap_or(f32::INFINITY);
        da.total_cmp(&db)
    });

    members
        .into_iter()
        .take(limit)
        .map(|b| Exemplar {
            book_id: b.id.clone(),
            title: b.title.clone(),
            author: b.author.clone(),
            rating: b.rating,
            centroid_distance: b.centroid_distance,
            genres: b.genres.clone(),
        })
        .collect()
}
