//! Cluster assignment at a chosen k.
//!
//! Runs the final partitioning once the cluster count has been picked:
//! standardize the embedding matrix (so no single dimension dominates the
//! distance geometry), fit k-means with the same seed/restart policy the
//! search used, and record each point's distance to its own centroid. That
//! distance doubles as an outlier signal downstream (exemplar queries sort
//! by it).
//!
//! Standardization parameters are fit on this batch alone and discarded
//! with it.

use ndarray::Array2;

use super::kmeans::Kmeans;
use crate::error::Result;
use crate::scale::StandardScaler;

/// One row's clustering outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    /// Cluster label, dense in `[0, k)`.
    pub label: usize,
    /// Euclidean distance to the assigned centroid, in standardized space.
    pub centroid_distance: f32,
}

/// Final-pass cluster assigner.
#[derive(Debug, Clone)]
pub struct Assigner {
    k: usize,
    seed: u64,
    n_init: usize,
}

impl Assigner {
    /// Create an assigner for the chosen cluster count.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            seed: 42,
            n_init: 10,
        }
    }

    /// Set the seed (keep it equal to the selector's for consistency).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set restarts for the fit.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Standardize, cluster, and return per-row assignments.
    ///
    /// Output order matches the input row order, so index `i` lines up with
    /// the matrix builder's `book_ids[i]`.
    pub fn assign(&self, data: &Array2<f32>) -> Result<Vec<Assignment>> {
        let scaled = StandardScaler::new().fit_transform(data);

        let fit = Kmeans::new(self.k)
            .with_seed(self.seed)
            .with_n_init(self.n_init)
            .fit(&scaled)?;

        let distances = fit.centroid_distances(&scaled)?;

        Ok(fit
            .labels
            .iter()
            .enumerate()
            .map(|(i, &label)| Assignment {
                label,
                centroid_distance: distances[[i, label]],
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn labels_dense_and_distances_nonnegative() {
        let data = array![
            [0.0_f32, 0.0],
            [0.2, 0.1],
            [10.0, 10.0],
            [10.2, 10.1],
            [-10.0, 10.0],
            [-10.2, 10.1],
        ];

        let assignments = Assigner::new(3).assign(&data).unwrap();
        assert_eq!(assignments.len(), 6);
        for a in &assignments {
            assert!(a.label < 3);
            assert!(a.centroid_distance >= 0.0);
        }
    }

    #[test]
    fn tight_pairs_land_together() {
        let data = array![
            [0.0_f32, 0.0],
            [0.1, 0.0],
            [8.0, 8.0],
            [8.1, 8.0],
        ];

        let assignments = Assigner::new(2).assign(&data).unwrap();
        assert_eq!(assignments[0].label, assignments[1].label);
        assert_eq!(assignments[2].label, assignments[3].label);
        assert_ne!(assignments[0].label, assignments[2].label);
    }

    #[test]
    fn assignment_is_deterministic() {
        let data = array![
            [0.0_f32, 1.0],
            [0.5, 1.5],
            [5.0, 5.0],
            [5.5, 5.5],
            [9.0, 0.0],
            [9.5, 0.5],
        ];

        let a = Assigner::new(3).assign(&data).unwrap();
        let b = Assigner::new(3).assign(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn k_above_n_errors() {
        let data = array![[0.0_f32, 0.0], [1.0, 1.0]];
        assert!(Assigner::new(5).assign(&data).is_err());
    }
}
