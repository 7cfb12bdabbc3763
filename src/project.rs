//! Neighborhood-graph 2-D layout for visualization.
//!
//! Reduces the embedding matrix to a low-dimensional layout the UI can
//! scatter-plot, independently of the cluster labels. The layout is a
//! parallel view of the same geometry, not derived from the assignment.
//!
//! # Algorithm
//!
//! UMAP-style, in four stages:
//!
//! ```text
//! 1. Standardize, then build an exact cosine kNN graph
//! 2. Calibrate per-point bandwidths (smooth-kNN) and turn distances
//!    into fuzzy membership weights
//! 3. Symmetrize by fuzzy union: w = w_ij + w_ji - w_ij * w_ji
//! 4. Optimize a seeded layout by SGD over edges: attraction along
//!    edges, repulsion against negative samples
//! ```
//!
//! The attraction/repulsion curve `1 / (1 + a·d^(2b))` is fit from the
//! `min_dist` parameter, so tighter `min_dist` packs neighbors closer.
//! The corpus here is moderate-N and recomputed per request, so the kNN
//! search is exact O(n²) rather than an approximate index.
//!
//! Everything downstream of the seed is deterministic: same matrix, same
//! configuration, same coordinates.
//!
//! # References
//!
//! - McInnes, Healy, Melville (2018). "UMAP: Uniform Manifold
//!   Approximation and Projection for Dimension Reduction"

use log::debug;
use ndarray::Array2;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::prelude::*;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::metrics::cosine_similarity;
use crate::scale::StandardScaler;

/// Gradient clip bound, per UMAP reference implementation.
const GRAD_CLIP: f32 = 4.0;
/// Negative samples per attractive update.
const NEG_SAMPLES: usize = 5;

/// Layout configuration.
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Neighborhood size of the kNN graph.
    pub n_neighbors: usize,
    /// Minimum spacing between tightly coupled points in the layout.
    pub min_dist: f32,
    /// Output dimensionality.
    pub n_components: usize,
    /// SGD epochs.
    pub n_epochs: usize,
    /// Random seed.
    pub seed: u64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 15,
            min_dist: 0.1,
            n_components: 2,
            n_epochs: 300,
            seed: 42,
        }
    }
}

/// Neighborhood-graph nonlinear projection.
#[derive(Debug, Clone, Default)]
pub struct NeighborProjection {
    config: ProjectionConfig,
}

impl NeighborProjection {
    /// Create a projection with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a projection with explicit configuration.
    pub fn with_config(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Project `data` to `(N, n_components)` layout coordinates.
    ///
    /// Row order is preserved, so row `i` of the output belongs to row `i`
    /// of the input.
    pub fn project(&self, data: &Array2<f32>) -> Result<Array2<f32>> {
        let n = data.nrows();
        let c = self.config.n_components;
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if c == 0 {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be at least 1",
            });
        }
        if n == 1 {
            // A single point has no neighborhood; pin it at the origin.
            return Ok(Array2::zeros((1, c)));
        }

        let scaled = StandardScaler::new().fit_transform(data);

        let graph = self.fuzzy_graph(&scaled);
        debug!(
            "fuzzy neighbor graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        let (a, b) = fit_curve_params(self.config.min_dist, 1.0);
        debug!("layout curve: a={a:.3}, b={b:.3}");

        Ok(self.optimize_layout(&graph, n, a, b))
    }

    /// Build the symmetrized fuzzy neighbor graph.
    fn fuzzy_graph(&self, scaled: &Array2<f32>) -> UnGraph<(), f32> {
        let n = scaled.nrows();
        let k = self.config.n_neighbors.clamp(1, n - 1);
        let target = (k as f32).log2().max(f32::MIN_POSITIVE);

        // Directed membership strengths, keyed (source, neighbor).
        let mut directed: BTreeMap<(usize, usize), f32> = BTreeMap::new();

        for i in 0..n {
            let mut dists: Vec<(usize, f32)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| {
                    let d = 1.0
                        - cosine_similarity(
                            scaled.row(i).as_slice().expect("row is contiguous"),
                            scaled.row(j).as_slice().expect("row is contiguous"),
                        );
                    (j, d.max(0.0))
                })
                .collect();
            dists.sort_by(|x, y| x.1.total_cmp(&y.1));
            dists.truncate(k);

            let rho = dists.first().map_or(0.0, |&(_, d)| d);
            let sigma = calibrate_bandwidth(&dists, rho, target);

            for &(j, d) in &dists {
                let w = (-((d - rho).max(0.0) / sigma)).exp();
                directed.insert((i, j), w);
            }
        }

        // Fuzzy union of the two directions.
        let mut graph = UnGraph::<(), f32>::new_undirected();
        let nodes: Vec<NodeIndex> = (0..n).map(|_| graph.add_node(())).collect();

        for (&(i, j), &w_ij) in &directed {
            if i > j {
                continue;
            }
            let w_ji = directed.get(&(j, i)).copied().unwrap_or(0.0);
            let w = w_ij + w_ji - w_ij * w_ji;
            if w > 0.0 {
                graph.update_edge(nodes[i], nodes[j], w);
            }
        }
        // Catch pairs present only in the higher-index direction.
        for (&(i, j), &w) in &directed {
            if i < j || directed.contains_key(&(j, i)) {
                continue;
            }
            graph.update_edge(nodes[j], nodes[i], w);
        }

        graph
    }

    /// SGD layout over the fuzzy graph edges.
    fn optimize_layout(&self, graph: &UnGraph<(), f32>, n: usize, a: f32, b: f32) -> Array2<f32> {
        let c = self.config.n_components;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut coords = Array2::from_shape_fn((n, c), |_| rng.random_range(-10.0..10.0));

        let edges: Vec<(usize, usize, f32)> = graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
            .collect();
        if edges.is_empty() {
            return coords;
        }
        let max_w = edges.iter().map(|&(_, _, w)| w).fold(f32::MIN, f32::max);

        for epoch in 0..self.config.n_epochs {
            let alpha = 1.0 - epoch as f32 / self.config.n_epochs as f32;

            for &(i, j, w) in &edges {
                // Stronger edges pull every epoch, weak ones occasionally.
                if rng.random::<f32>() > w / max_w {
                    continue;
                }

                apply_attraction(&mut coords, i, j, a, b, alpha);

                for _ in 0..NEG_SAMPLES {
                    let l = rng.random_range(0..n);
                    if l == i {
                        continue;
                    }
                    apply_repulsion(&mut coords, i, l, a, b, alpha);
                }
            }
        }

        coords
    }
}

/// Binary-search the bandwidth so neighbor weights sum to `target`.
fn calibrate_bandwidth(neighbors: &[(usize, f32)], rho: f32, target: f32) -> f32 {
    let mut lo = 0.0f32;
    let mut hi = f32::INFINITY;
    let mut mid = 1.0f32;

    for _ in 0..64 {
        let sum: f32 = neighbors
            .iter()
            .map(|&(_, d)| (-((d - rho).max(0.0) / mid)).exp())
            .sum();

        if (sum - target).abs() < 1e-5 {
            break;
        }
        if sum > target {
            hi = mid;
            mid = (lo + hi) / 2.0;
        } else {
            lo = mid;
            mid = if hi.is_infinite() { mid * 2.0 } else { (lo + hi) / 2.0 };
        }
    }

    mid.max(1e-3)
}

/// Fit `(a, b)` so `1 / (1 + a·d^(2b))` tracks the target membership curve
/// `exp(-(d - min_dist) / spread)` past `min_dist` (and 1 before it).
///
/// Two-stage deterministic grid search; plenty for layout purposes.
fn fit_curve_params(min_dist: f32, spread: f32) -> (f32, f32) {
    let xs: Vec<f32> = (1..=300).map(|i| i as f32 * spread * 3.0 / 300.0).collect();
    let target = |d: f32| -> f32 {
        if d <= min_dist {
            1.0
        } else {
            (-(d - min_dist) / spread).exp()
        }
    };

    let loss = |a: f32, b: f32| -> f32 {
        xs.iter()
            .map(|&d| {
                let y = 1.0 / (1.0 + a * d.powf(2.0 * b));
                let t = target(d);
                (y - t) * (y - t)
            })
            .sum()
    };

    let mut best = (1.0f32, 1.0f32);
    let mut best_loss = f32::INFINITY;

    // Coarse pass over a log-spaced a and linear b.
    for ai in 0..60 {
        let a = 0.05 * 1.13f32.powi(ai);
        for bi in 0..60 {
            let b = 0.25 + bi as f32 * 0.035;
            let l = loss(a, b);
            if l < best_loss {
                best_loss = l;
                best = (a, b);
            }
        }
    }

    // Local refinement around the coarse optimum.
    let (ca, cb) = best;
    for ai in -10i32..=10 {
        let a = ca * (1.0 + ai as f32 * 0.02);
        for bi in -10i32..=10 {
            let b = cb + bi as f32 * 0.005;
            let l = loss(a, b);
            if l < best_loss {
                best_loss = l;
                best = (a, b);
            }
        }
    }

    best
}

fn apply_attraction(coords: &mut Array2<f32>, i: usize, j: usize, a: f32, b: f32, alpha: f32) {
    let c = coords.ncols();
    let d2: f32 = (0..c)
        .map(|m| {
            let diff = coords[[i, m]] - coords[[j, m]];
            diff * diff
        })
        .sum();
    if d2 <= 0.0 {
        return;
    }

    let grad_coeff = (-2.0 * a * b * d2.powf(b - 1.0)) / (1.0 + a * d2.powf(b));
    for m in 0..c {
        let g = (grad_coeff * (coords[[i, m]] - coords[[j, m]])).clamp(-GRAD_CLIP, GRAD_CLIP);
        coords[[i, m]] += alpha * g;
        coords[[j, m]] -= alpha * g;
    }
}

fn apply_repulsion(coords: &mut Array2<f32>, i: usize, l: usize, a: f32, b: f32, alpha: f32) {
    let c = coords.ncols();
    let d2: f32 = (0..c)
        .map(|m| {
            let diff = coords[[i, m]] - coords[[l, m]];
            diff * diff
        })
        .sum();

    let grad_coeff = (2.0 * b) / ((0.001 + d2) * (1.0 + a * d2.powf(b)));
    for m in 0..c {
        let g = (grad_coeff * (coords[[i, m]] - coords[[l, m]])).clamp(-GRAD_CLIP, GRAD_CLIP);
        coords[[i, m]] += alpha * g;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn grouped_data(groups: usize, per_group: usize, dim: usize) -> Array2<f32> {
        Array2::from_shape_fn((groups * per_group, dim), |(i, j)| {
            let g = i / per_group;
            let base = if j == g % dim { 10.0 } else { 0.0 };
            base + (i % per_group) as f32 * 0.01
        })
    }

    #[test]
    fn output_shape_matches_config() {
        let data = grouped_data(3, 6, 5);
        let coords = NeighborProjection::new().project(&data).unwrap();
        assert_eq!(coords.shape(), &[18, 2]);
    }

    #[test]
    fn three_components_when_configured() {
        let data = grouped_data(2, 5, 4);
        let config = ProjectionConfig {
            n_components: 3,
            n_epochs: 50,
            ..Default::default()
        };
        let coords = NeighborProjection::with_config(config).project(&data).unwrap();
        assert_eq!(coords.shape(), &[10, 3]);
    }

    #[test]
    fn coordinates_are_finite() {
        let data = grouped_data(3, 5, 8);
        let coords = NeighborProjection::new().project(&data).unwrap();
        for &v in coords.iter() {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn projection_is_deterministic() {
        let data = grouped_data(2, 6, 4);
        let a = NeighborProjection::new().project(&data).unwrap();
        let b = NeighborProjection::new().project(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_point_pins_to_origin() {
        let data = Array2::from_shape_vec((1, 4), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let coords = NeighborProjection::new().project(&data).unwrap();
        assert_eq!(coords.shape(), &[1, 2]);
        assert_eq!(coords[[0, 0]], 0.0);
        assert_eq!(coords[[0, 1]], 0.0);
    }

    #[test]
    fn empty_input_errors() {
        let data = Array2::<f32>::zeros((0, 4));
        assert!(NeighborProjection::new().project(&data).is_err());
    }

    #[test]
    fn curve_params_near_reference_values() {
        // umap-learn fits roughly a=1.58, b=0.90 for min_dist=0.1
        let (a, b) = fit_curve_params(0.1, 1.0);
        assert!((1.0..2.5).contains(&a), "a={a}");
        assert!((0.6..1.2).contains(&b), "b={b}");
    }
}
