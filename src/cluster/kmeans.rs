//! K-means clustering.
//!
//! Partitions data into k clusters by minimizing **within-cluster sum of
//! squares** (WCSS). The foundational clustering algorithm, dating to 1957
//! (Lloyd).
//!
//! # The Objective
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! Sum of squared distances from each point to its cluster centroid.
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k centroids via k-means++
//! 2. **Assign**: Each point → nearest centroid
//! 3. **Update**: Each centroid → mean of assigned points
//! 4. Repeat until convergence
//!
//! **Why it converges**: WCSS decreases monotonically. Each step either
//! decreases WCSS or leaves it unchanged. Bounded below by 0 → must converge.
//!
//! # Restarts
//!
//! The problem is NP-hard and Lloyd only finds a local minimum, so the fit
//! runs `n_init` times from different k-means++ draws and keeps the labeling
//! with the lowest WCSS. With a fixed seed the restart seeds are derived
//! deterministically, so the whole fit is reproducible.
//!
//! ## K-means++ Initialization
//!
//! 1. Choose first centroid uniformly at random
//! 2. Choose next centroid with probability proportional to D(x)²
//!    (squared distance to nearest existing centroid)
//!
//! Provides provable O(log k) approximation to optimal WCSS.

use ndarray::{Array2, ArrayView1};
use rand::prelude::*;

use crate::error::{Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum iterations per restart.
    max_iter: usize,
    /// Convergence tolerance (centroid shift).
    tol: f64,
    /// Number of restarts; the lowest-inertia fit wins.
    n_init: usize,
    /// Random seed.
    seed: Option<u64>,
}

/// A fitted k-means model: labels, centroids, and the achieved WCSS.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Cluster label per input row, dense in `[0, k)`.
    pub labels: Vec<usize>,
    /// k×D centroid matrix.
    pub centroids: Array2<f32>,
    /// Within-cluster sum of squares of the final labeling.
    pub inertia: f32,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-4,
            n_init: 10,
            seed: None,
        }
    }

    /// Set maximum iterations per restart.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the number of restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit the model and return labels, centroids, and inertia.
    pub fn fit(&self, data: &Array2<f32>) -> Result<KmeansFit> {
        let n = data.nrows();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        let mut best: Option<KmeansFit> = None;
        for restart in 0..self.n_init.max(1) as u64 {
            let mut rng: Box<dyn RngCore> = match self.seed {
                Some(s) => Box::new(StdRng::seed_from_u64(s.wrapping_add(restart))),
                None => Box::new(rand::rng()),
            };

            let fit = self.fit_once(data, &mut rng);
            match &best {
                Some(b) if b.inertia <= fit.inertia => {}
                _ => best = Some(fit),
            }
        }

        Ok(best.expect("n_init >= 1 produced a fit"))
    }

    /// Fit and return only the labels.
    pub fn fit_predict(&self, data: &Array2<f32>) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    /// One Lloyd run from a fresh k-means++ initialization.
    fn fit_once(&self, data: &Array2<f32>, rng: &mut impl Rng) -> KmeansFit {
        let n = data.nrows();
        let d = data.ncols();

        let mut centroids = self.init_centroids(data, rng);

        for _iter in 0..self.max_iter {
            let (labels, _) = assign_to_nearest(data, &centroids);

            // Update step
            let mut new_centroids = Array2::zeros((self.k, d));
            let mut counts = vec![0usize; self.k];

            for (i, &label) in labels.iter().enumerate() {
                for j in 0..d {
                    new_centroids[[label, j]] += data[[i, j]];
                }
                counts[label] += 1;
            }

            for k in 0..self.k {
                if counts[k] > 0 {
                    for j in 0..d {
                        new_centroids[[k, j]] /= counts[k] as f32;
                    }
                } else {
                    // Empty cluster: reinitialize from a random point
                    let idx = rng.random_range(0..n);
                    new_centroids.row_mut(k).assign(&data.row(idx));
                }
            }

            // Check convergence
            let shift: f32 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();

            centroids = new_centroids;

            if shift < self.tol as f32 {
                break;
            }
        }

        // Final labeling against the converged centroids
        let (labels, inertia) = assign_to_nearest(data, &centroids);
        KmeansFit {
            labels,
            centroids,
            inertia,
        }
    }

    /// Initialize centroids using the k-means++ algorithm.
    fn init_centroids(&self, data: &Array2<f32>, rng: &mut impl Rng) -> Array2<f32> {
        let n = data.nrows();
        let d = data.ncols();
        let mut centroids = Array2::zeros((self.k, d));

        // First centroid: random point
        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        // Remaining centroids: k-means++ selection
        for i in 1..self.k {
            let mut distances: Vec<f32> = Vec::with_capacity(n);

            for j in 0..n {
                let point = data.row(j);
                let min_dist = (0..i)
                    .map(|c| squared_distance(&point, &centroids.row(c)))
                    .fold(f32::MAX, f32::min);
                distances.push(min_dist);
            }

            // Sample proportional to squared distance
            let total: f32 = distances.iter().sum();
            if total == 0.0 {
                let idx = rng.random_range(0..n);
                centroids.row_mut(i).assign(&data.row(idx));
                continue;
            }

            let threshold = rng.random::<f32>() * total;
            let mut cumsum = 0.0;
            let mut selected = 0;

            for (j, &dist) in distances.iter().enumerate() {
                cumsum += dist;
                if cumsum >= threshold {
                    selected = j;
                    break;
                }
            }

            centroids.row_mut(i).assign(&data.row(selected));
        }

        centroids
    }
}

impl KmeansFit {
    /// Euclidean distance from every row of `data` to every centroid.
    ///
    /// Returns an n×k matrix; row minima are the distance of each point to
    /// its own centroid when `data` is the matrix the model was fitted on.
    pub fn centroid_distances(&self, data: &Array2<f32>) -> Result<Array2<f32>> {
        if data.ncols() != self.centroids.ncols() {
            return Err(Error::DimensionMismatch {
                expected: self.centroids.ncols(),
                found: data.ncols(),
            });
        }

        let n = data.nrows();
        let k = self.centroids.nrows();
        let mut out = Array2::zeros((n, k));
        for i in 0..n {
            let point = data.row(i);
            for c in 0..k {
                out[[i, c]] = squared_distance(&point, &self.centroids.row(c)).sqrt();
            }
        }
        Ok(out)
    }

    /// Number of distinct labels actually present in the fit.
    pub fn n_distinct_labels(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for &label in &self.labels {
            seen.insert(label);
        }
        seen.len()
    }
}

/// Assign each row to its nearest centroid; returns labels and total WCSS.
fn assign_to_nearest(data: &Array2<f32>, centroids: &Array2<f32>) -> (Vec<usize>, f32) {
    let n = data.nrows();
    let k = centroids.nrows();
    let mut labels = vec![0usize; n];

    #[cfg(feature = "parallel")]
    let inertia: f32 = {
        labels
            .par_iter_mut()
            .enumerate()
            .map(|(i, label)| {
                let (best_cluster, best_dist) = nearest_centroid(&data.row(i), centroids, k);
                *label = best_cluster;
                best_dist
            })
            .sum()
    };

    #[cfg(not(feature = "parallel"))]
    let inertia: f32 = {
        let mut total = 0.0;
        for (i, label) in labels.iter_mut().enumerate() {
            let (best_cluster, best_dist) = nearest_centroid(&data.row(i), centroids, k);
            *label = best_cluster;
            total += best_dist;
        }
        total
    };

    (labels, inertia)
}

fn nearest_centroid(point: &ArrayView1<'_, f32>, centroids: &Array2<f32>, k: usize) -> (usize, f32) {
    let mut best_cluster = 0;
    let mut best_dist = f32::MAX;
    for c in 0..k {
        let dist = squared_distance(point, &centroids.row(c));
        if dist < best_dist {
            best_dist = dist;
            best_cluster = c;
        }
    }
    (best_cluster, best_dist)
}

/// Compute squared Euclidean distance.
fn squared_distance(a: &ArrayView1<'_, f32>, b: &ArrayView1<'_, f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_blobs() -> Array2<f32> {
        array![
            [0.0, 0.0],
            [0.1, 0.1],
            [10.0, 10.0],
            [10.1, 10.1],
        ]
    }

    #[test]
    fn test_kmeans_basic() {
        let data = two_blobs();
        let fit = Kmeans::new(2).with_seed(42).fit(&data).unwrap();

        // Points 0,1 should be in same cluster, points 2,3 in another
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[2], fit.labels[3]);
        assert_ne!(fit.labels[0], fit.labels[2]);
    }

    #[test]
    fn test_kmeans_all_points_assigned() {
        // Property: every point assigned, all labels in [0, k)
        let data = Array2::from_shape_fn((50, 2), |(i, j)| {
            if j == 0 {
                i as f32 * 0.1
            } else {
                (i % 5) as f32
            }
        });

        let labels = Kmeans::new(5).with_seed(123).fit_predict(&data).unwrap();

        assert_eq!(labels.len(), 50);
        for &label in &labels {
            assert!(label < 5, "label {} out of range", label);
        }
    }

    #[test]
    fn test_kmeans_k_equals_n() {
        // Edge case: k = n (each point its own cluster)
        let data = array![[0.0_f32, 0.0], [1.0, 0.0], [0.0, 1.0]];

        let fit = Kmeans::new(3).with_seed(42).fit(&data).unwrap();
        assert_eq!(fit.n_distinct_labels(), 3);
        assert!(fit.inertia < 1e-6);
    }

    #[test]
    fn test_kmeans_deterministic_with_seed() {
        let data = two_blobs();

        let labels1 = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
        let labels2 = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();

        assert_eq!(labels1, labels2, "same seed should give same result");
    }

    #[test]
    fn test_kmeans_empty_input_error() {
        let data = Array2::<f32>::zeros((0, 2));
        assert!(Kmeans::new(2).fit(&data).is_err());
    }

    #[test]
    fn test_kmeans_k_larger_than_n_error() {
        let data = array![[0.0_f32, 0.0], [1.0, 1.0]];
        assert!(Kmeans::new(5).fit(&data).is_err());
    }

    #[test]
    fn test_kmeans_zero_k_error() {
        let data = array![[0.0_f32, 0.0]];
        assert!(Kmeans::new(0).fit(&data).is_err());
    }

    #[test]
    fn test_centroid_distances_shape_and_consistency() {
        let data = two_blobs();
        let fit = Kmeans::new(2).with_seed(42).fit(&data).unwrap();

        let distances = fit.centroid_distances(&data).unwrap();
        assert_eq!(distances.shape(), &[4, 2]);

        for i in 0..4 {
            let own = distances[[i, fit.labels[i]]];
            let other = distances[[i, 1 - fit.labels[i]]];
            assert!(own >= 0.0);
            assert!(own <= other, "own-centroid distance is the row minimum");
        }
    }

    #[test]
    fn test_restarts_never_hurt() {
        let data = two_blobs();

        let single = Kmeans::new(2).with_seed(7).with_n_init(1).fit(&data).unwrap();
        let multi = Kmeans::new(2).with_seed(7).with_n_init(10).fit(&data).unwrap();

        assert!(multi.inertia <= single.inertia + 1e-6);
    }
}
