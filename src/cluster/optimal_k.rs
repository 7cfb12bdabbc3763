//! Optimal cluster-count search.
//!
//! No supervision is available for a personal library, so the cluster count
//! is chosen by scanning a bounded range of candidate k values and keeping
//! the one with the highest silhouette score.
//!
//! # Candidate range
//!
//! For N points with configured bounds `[min_k, max_k]`, the scan covers
//! `min_k ..= min(max_k, N/2 - 1)`; the upper bound is clamped so tiny
//! corpora are not over-partitioned. An empty range is not an error: the
//! selector falls back to `min_k`, so a chosen k always exists.
//!
//! # Skips
//!
//! Two per-candidate conditions are expected and non-fatal:
//!
//! - a candidate collapses to a single cluster → the silhouette is undefined
//!   (`None`) and the candidate is skipped
//! - the fit itself fails (degenerate matrix) → logged and skipped
//!
//! Ties keep the smallest k, because only a strictly higher score replaces
//! the incumbent.

use log::{debug, info, warn};
use ndarray::Array2;

use super::kmeans::Kmeans;
use crate::metrics::silhouette_score;

/// Default lower bound of the k search range.
pub const DEFAULT_MIN_K: usize = 3;
/// Default upper bound of the k search range.
pub const DEFAULT_MAX_K: usize = 12;

/// Silhouette-guided search for the number of clusters.
#[derive(Debug, Clone)]
pub struct KSelector {
    /// Inclusive lower bound.
    min_k: usize,
    /// Inclusive upper bound (clamped by corpus size at search time).
    max_k: usize,
    /// Seed shared by every candidate fit, for reproducibility.
    seed: u64,
    /// Restarts per candidate fit.
    n_init: usize,
}

impl Default for KSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl KSelector {
    /// Create a selector with the default bounds `[3, 12]` and seed 42.
    pub fn new() -> Self {
        Self {
            min_k: DEFAULT_MIN_K,
            max_k: DEFAULT_MAX_K,
            seed: 42,
            n_init: 10,
        }
    }

    /// Set the inclusive search bounds.
    pub fn with_bounds(mut self, min_k: usize, max_k: usize) -> Self {
        self.min_k = min_k;
        self.max_k = max_k;
        self
    }

    /// Set the seed used for every candidate fit.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set restarts per candidate fit.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Pick the k in range with the highest silhouette score.
    ///
    /// Falls back to `min_k` when every candidate was skipped or scored
    /// non-positively, so the returned k is always defined.
    pub fn select(&self, data: &Array2<f32>) -> usize {
        let n = data.nrows();
        info!(
            "searching optimal k in [{}, {}] over {} points",
            self.min_k, self.max_k, n
        );

        let mut best_k = self.min_k;
        let mut best_score = 0.0f32;

        let upper = (self.max_k + 1).min(n / 2);
        for k in self.min_k..upper {
            let fit = match Kmeans::new(k)
                .with_seed(self.seed)
                .with_n_init(self.n_init)
                .fit(data)
            {
                Ok(fit) => fit,
                Err(e) => {
                    warn!("candidate k={k} failed: {e}");
                    continue;
                }
            };

            let Some(score) = silhouette_score(data, &fit.labels) else {
                debug!("candidate k={k} collapsed to one cluster, skipping");
                continue;
            };
            debug!("k={k}, silhouette score: {score:.3}");

            if score > best_score {
                best_score = score;
                best_k = k;
            }
        }

        info!("optimal k: {best_k} (silhouette score: {best_score:.3})");
        best_k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::prelude::*;

    /// `blobs` well-separated groups of 8-dimensional points.
    fn synthetic(blobs: usize, per_blob: usize) -> Array2<f32> {
        let mut rng = StdRng::seed_from_u64(9);
        let mut rows = Vec::new();
        for b in 0..blobs {
            for _ in 0..per_blob {
                for j in 0..8 {
                    let center = if j == b % 8 { 20.0 * (b as f32 + 1.0) } else { 0.0 };
                    rows.push(center + rng.random::<f32>());
                }
            }
        }
        Array2::from_shape_vec((blobs * per_blob, 8), rows).unwrap()
    }

    #[test]
    fn selected_k_stays_in_bounds() {
        // Scenario: 20 synthetic 8-dimensional vectors, bounds [3, 6]
        let data = synthetic(4, 5);
        let selector = KSelector::new().with_bounds(3, 6);

        let k = selector.select(&data);
        assert!((3..=6).contains(&k), "k={k} out of bounds");

        let labels = Kmeans::new(k).with_seed(42).fit_predict(&data).unwrap();
        let distinct: std::collections::HashSet<_> = labels.iter().collect();
        assert!(distinct.len() <= k);
    }

    #[test]
    fn recovers_obvious_cluster_count() {
        let data = synthetic(4, 8);
        let k = KSelector::new().with_bounds(2, 8).select(&data);
        assert_eq!(k, 4);
    }

    #[test]
    fn small_corpus_falls_back_to_min_k() {
        // n/2 clamps the range to nothing: 4 points, min_k 3 -> upper = 2
        let data = synthetic(2, 2);
        let k = KSelector::new().with_bounds(3, 12).select(&data);
        assert_eq!(k, 3);
    }

    #[test]
    fn selection_is_deterministic() {
        let data = synthetic(3, 6);
        let a = KSelector::new().with_bounds(2, 6).select(&data);
        let b = KSelector::new().with_bounds(2, 6).select(&data);
        assert_eq!(a, b);
    }
}
