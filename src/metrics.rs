//! Clustering quality and vector similarity metrics.
//!
//! Two measures drive the engine:
//!
//! | Metric | Range | Best | Used by |
//! |--------|-------|------|---------|
//! | [`silhouette_score`] | [-1, 1] | 1 | optimal-k search |
//! | [`cosine_similarity`] | [-1, 1] | 1 | recommendation, similar-book lookup |
//!
//! # Silhouette
//!
//! For each point `i` with intra-cluster mean distance `a(i)` and nearest
//! other-cluster mean distance `b(i)`:
//!
//! ```text
//! s(i) = (b(i) - a(i)) / max(a(i), b(i))
//! ```
//!
//! The score is the mean of `s(i)` over all points. It rewards tight,
//! well-separated clusters and is undefined for fewer than two clusters.
//! That case is an `Option::None`, not an error, because the optimal-k
//! search treats it as an expected skip.
//!
//! # References
//!
//! - Rousseeuw (1987). "Silhouettes: a graphical aid to the interpretation
//!   and validation of cluster analysis"

use ndarray::Array2;

/// Cosine similarity between two vectors, in [-1, 1].
///
/// Magnitude-independent: collinear vectors score 1 regardless of length.
/// Mismatched dimensions or a zero-norm side score 0.0, so degenerate pairs
/// never rank above real matches.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-12 {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0)
}

/// Mean silhouette score for a labeling of `data`.
///
/// Returns `None` when fewer than two distinct labels are present (the
/// metric is undefined there) or when `data` has fewer than two rows.
/// Distances are Euclidean in the space the labels were computed in.
#[must_use]
pub fn silhouette_score(data: &Array2<f32>, labels: &[usize]) -> Option<f32> {
    let n = data.nrows();
    if n < 2 || labels.len() != n {
        return None;
    }

    let n_clusters = labels.iter().max().map_or(0, |&m| m + 1);
    let mut sizes = vec![0usize; n_clusters];
    for &label in labels {
        sizes[label] += 1;
    }
    if sizes.iter().filter(|&&s| s > 0).count() < 2 {
        return None;
    }

    let mut total = 0.0f32;
    for i in 0..n {
        // Distance sums from point i to each cluster; the point itself is
        // left out of its own cluster's mean.
        let mut dist_sum = vec![0.0f32; n_clusters];
        for j in 0..n {
            if i == j {
                continue;
            }
            dist_sum[labels[j]] += euclidean(data, i, j);
        }

        let own = labels[i];
        let a_i = if sizes[own] > 1 {
            dist_sum[own] / (sizes[own] - 1) as f32
        } else {
            // Singleton cluster: s(i) is defined as 0, contributes nothing.
            continue;
        };

        let b_i = (0..n_clusters)
            .filter(|&c| c != own && sizes[c] > 0)
            .map(|c| dist_sum[c] / sizes[c] as f32)
            .fold(f32::INFINITY, f32::min);

        let max_ab = a_i.max(b_i);
        if max_ab > 0.0 {
            total += (b_i - a_i) / max_ab;
        }
    }

    Some(total / n as f32)
}

fn euclidean(data: &Array2<f32>, i: usize, j: usize) -> f32 {
    data.row(i)
        .iter()
        .zip(data.row(j).iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [1.0_f32, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_is_magnitude_independent() {
        let a = [1.0_f32, 2.0];
        let b = [10.0_f32, 20.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = [1.0_f32, 0.0];
        let b = [0.0_f32, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_minus_one() {
        let a = [1.0_f32, 1.0];
        let b = [-1.0_f32, -1.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_guards_mismatch_and_zero_norm() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn silhouette_rewards_separated_clusters() {
        let data = array![
            [0.0_f32, 0.0],
            [0.1, 0.1],
            [5.0, 5.0],
            [5.1, 5.1],
        ];
        let labels = vec![0, 0, 1, 1];

        let score = silhouette_score(&data, &labels).unwrap();
        assert!(score > 0.8, "well-separated clusters score high, got {score}");
    }

    #[test]
    fn silhouette_undefined_for_single_cluster() {
        let data = array![[0.0_f32, 0.0], [1.0, 1.0], [2.0, 2.0]];
        let labels = vec![0, 0, 0];
        assert_eq!(silhouette_score(&data, &labels), None);
    }

    #[test]
    fn silhouette_undefined_for_single_point() {
        let data = array![[0.0_f32, 0.0]];
        let labels = vec![0];
        assert_eq!(silhouette_score(&data, &labels), None);
    }

    #[test]
    fn silhouette_poor_for_interleaved_labels() {
        let data = array![
            [0.0_f32, 0.0],
            [0.1, 0.0],
            [0.2, 0.0],
            [0.3, 0.0],
        ];
        // Labels cut straight through one tight group.
        let labels = vec![0, 1, 0, 1];

        let score = silhouette_score(&data, &labels).unwrap();
        assert!(score < 0.25, "interleaved labels score low, got {score}");
    }
}
