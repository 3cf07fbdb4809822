//! Nearest-centroid assignment.

use cluster_core::{squared_euclidean, Vector};
use rayon::prelude::*;

/// Index of the closest centroid and its squared distance.
///
/// Scans in index order with a strict comparison, so ties resolve to the
/// lowest index.
pub fn nearest_centroid(sample: &[f32], centroids: &[Vector]) -> (usize, f32) {
    let mut min_dist = f32::INFINITY;
    let mut nearest_idx = 0;

    for (idx, centroid) in centroids.iter().enumerate() {
        let dist = squared_euclidean(sample, centroid);
        if dist < min_dist {
            min_dist = dist;
            nearest_idx = idx;
        }
    }

    (nearest_idx, min_dist)
}

/// Labels every sample with its nearest centroid.
///
/// Rows are processed in parallel; each row's scan is sequential, so the
/// output matches a single-threaded pass exactly.
pub fn assign_labels(samples: &[Vector], centroids: &[Vector]) -> Vec<usize> {
    samples
        .par_iter()
        .map(|sample| nearest_centroid(sample, centroids).0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_closest_centroid() {
        let centroids = vec![vec![0.0, 0.0], vec![10.0, 0.0]];
        let (idx, dist) = nearest_centroid(&[9.0, 1.0], &centroids);
        assert_eq!(idx, 1);
        assert!((dist - 2.0).abs() < 1e-6);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let centroids = vec![vec![1.0], vec![-1.0], vec![1.0]];
        assert_eq!(nearest_centroid(&[0.0], &centroids).0, 0);
        assert_eq!(nearest_centroid(&[1.0], &centroids).0, 0);
    }

    #[test]
    fn labels_every_sample() {
        let samples = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]];
        let centroids = vec![vec![10.0, 0.5], vec![0.0, 0.5]];
        assert_eq!(assign_labels(&samples, &centroids), vec![1, 1, 0, 0]);
    }

    #[test]
    fn parallel_labels_match_sequential_scan() {
        let samples: Vec<Vector> = (0..500)
            .map(|i| vec![(i % 17) as f32 * 0.37, (i % 23) as f32 * 0.11])
            .collect();
        let centroids = vec![vec![0.0, 0.0], vec![3.0, 1.0], vec![5.0, 2.5], vec![1.5, 2.0]];

        let sequential: Vec<usize> = samples
            .iter()
            .map(|sample| nearest_centroid(sample, &centroids).0)
            .collect();
        assert_eq!(assign_labels(&samples, &centroids), sequential);
    }
}
