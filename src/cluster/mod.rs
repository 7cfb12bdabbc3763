//! Clustering: k-means partitioning, cluster-count search, final assignment.
//!
//! The engine clusters in three steps, each its own type so they can be
//! exercised (and replaced) independently:
//!
//! 1. [`KSelector`] scans candidate cluster counts and keeps the one with
//!    the best silhouette score.
//! 2. [`Kmeans`] is the shared partitioner underneath: Lloyd's algorithm
//!    with k-means++ initialization and lowest-inertia restarts.
//! 3. [`Assigner`] runs the final fit at the chosen k on the standardized
//!    matrix and records each point's distance to its own centroid.
//!
//! All three take the same fixed seed, so a full run is reproducible.
//!
//! ```rust
//! use folio::cluster::{Assigner, KSelector};
//! use ndarray::array;
//!
//! let data = array![
//!     [0.0_f32, 0.0],
//!     [0.1, 0.1],
//!     [10.0, 10.0],
//!     [10.1, 10.1],
//!     [20.0, 0.0],
//!     [20.1, 0.1],
//!     [0.0, 20.0],
//!     [0.1, 20.1],
//! ];
//!
//! let k = KSelector::new().with_bounds(2, 4).select(&data);
//! let assignments = Assigner::new(k).assign(&data).unwrap();
//! assert_eq!(assignments.len(), 8);
//! ```

mod assign;
mod kmeans;
mod optimal_k;

pub use assign::{Assigner, Assignment};
pub use kmeans::{Kmeans, KmeansFit};
pub use optimal_k::{KSelector, DEFAULT_MAX_K, DEFAULT_MIN_K};
