//! Centroid update step.

use cluster_core::Vector;
use rand::Rng;
use tracing::debug;

/// New centroids plus the clusters that had no members and were reseeded.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidUpdate {
    pub centroids: Vec<Vector>,
    pub reseeded: Vec<usize>,
}

/// Recomputes every centroid as the per-feature mean of its members.
///
/// Sums run in `f64` and in sample order. A cluster without members takes a
/// uniformly drawn sample row instead; the draw uses the caller's `rng` so the
/// whole run stays reproducible from one seed.
pub fn update_centroids<R: Rng + ?Sized>(
    samples: &[Vector],
    labels: &[usize],
    k: usize,
    rng: &mut R,
) -> CentroidUpdate {
    debug_assert_eq!(samples.len(), labels.len());
    let dimension = samples.first().map_or(0, Vec::len);

    let mut sums = vec![vec![0.0_f64; dimension]; k];
    let mut counts = vec![0usize; k];
    for (sample, &label) in samples.iter().zip(labels) {
        counts[label] += 1;
        for (acc, &value) in sums[label].iter_mut().zip(sample) {
            *acc += f64::from(value);
        }
    }

    let mut reseeded = Vec::new();
    let centroids = sums
        .into_iter()
        .zip(&counts)
        .enumerate()
        .map(|(cluster, (sum, &count))| {
            if count == 0 {
                let row = rng.gen_range(0..samples.len());
                debug!(cluster, row, "empty cluster reseeded from a random sample");
                reseeded.push(cluster);
                samples[row].clone()
            } else {
                let count = count as f64;
                sum.into_iter().map(|total| (total / count) as f32).collect()
            }
        })
        .collect();

    CentroidUpdate {
        centroids,
        reseeded,
    }
}

/// Frobenius norm of the difference between two centroid sets.
pub fn centroid_shift(previous: &[Vector], next: &[Vector]) -> f64 {
    previous
        .iter()
        .zip(next)
        .flat_map(|(old, new)| old.iter().zip(new))
        .map(|(&old, &new)| {
            let diff = f64::from(new) - f64::from(old);
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}
