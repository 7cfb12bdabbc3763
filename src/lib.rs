//! # folio
//!
//! Embedding-driven topic discovery and recommendation for a personal
//! reading history. Books arrive with externally produced embedding vectors;
//! `folio` turns them into unsupervised topical clusters with a 2-D layout
//! for visualization, and into ranked, explainable recommendations for a
//! free-text query.
//!
//! The whole engine is synchronous, in-memory, and recomputed per call.
//! It assumes a moderate-N corpus (one person's library), not a search
//! service.
//!
//! ## Pipeline
//!
//! ```text
//! BookSource → EmbeddingMatrix → KSelector → Assigner ─┐
//!                           └───→ NeighborProjection ──┴→ ClusterSink
//! ```
//!
//! ## Example
//!
//! ```rust
//! use folio::{Book, ClusterConfig, MemoryShelf, Orchestrator};
//!
//! // Two obvious topical groups.
//! let mut shelf = MemoryShelf::new();
//! for i in 0..5 {
//!     let x = i as f32 * 0.05;
//!     shelf.insert(
//!         Book::new(format!("sf{i}"), "Starship", "A").with_embedding(&[10.0 + x, 0.0, x]),
//!     );
//!     shelf.insert(
//!         Book::new(format!("hf{i}"), "Hearth", "B").with_embedding(&[0.0, 10.0 + x, x]),
//!     );
//! }
//!
//! let config = ClusterConfig { min_k: 2, max_k: 4, n_neighbors: 3, ..Default::default() };
//! let mut orchestrator = Orchestrator::new(shelf.clone(), shelf).with_config(config);
//! let summary = orchestrator.run();
//!
//! assert!(summary.success);
//! assert_eq!(summary.total_books, 10);
//! assert_eq!(summary.updated_books, 10);
//! ```

pub mod book;
pub mod cluster;
pub mod error;
pub mod matrix;
pub mod metrics;
pub mod pipeline;
pub mod project;
pub mod recommend;
pub mod scale;

pub use book::{Book, BookSource, ClusterSink, ClusterUpdate, MemoryShelf};
pub use cluster::{Assigner, Assignment, KSelector, Kmeans, KmeansFit};
pub use error::{Error, Result};
pub use matrix::{build_embedding_matrix, EmbeddingMatrix};
pub use metrics::{cosine_similarity, silhouette_score};
pub use pipeline::{
    cluster_exemplars, clustering_stats, ClusterConfig, ClusteringStats, Exemplar, Orchestrator,
    RunSummary,
};
pub use project::{NeighborProjection, ProjectionConfig};
pub use recommend::{shared_keywords, similar_books, Recommendation, Scorer, SimilarBook, Weights};
pub use scale::StandardScaler;
