use cluster_core::{squared_euclidean, Vector};

/// Total squared distance of every sample to the centroid it is labeled with.
///
/// Accumulates sequentially in `f64` so the same inputs always give the same
/// value.
pub fn inertia(samples: &[Vector], labels: &[usize], centroids: &[Vector]) -> f64 {
    debug_assert_eq!(samples.len(), labels.len());
    samples
        .iter()
        .zip(labels)
        .map(|(sample, &label)| f64::from(squared_euclidean(sample, &centroids[label])))
        .sum()
}
