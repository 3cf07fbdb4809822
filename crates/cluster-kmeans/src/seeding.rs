//! k-means++ seeding.
//!
//! The first centroid is drawn uniformly; every following one is drawn with
//! probability proportional to the squared distance of each sample to its
//! nearest centroid chosen so far.

use cluster_core::{squared_euclidean, Vector};
use rand::Rng;
use tracing::debug;

use crate::error::{KMeansError, Result};

/// Initial centroids together with the sample rows they were copied from.
#[derive(Debug, Clone, PartialEq)]
pub struct Seeding {
    pub centroids: Vec<Vector>,
    pub indices: Vec<usize>,
}

/// Picks `k` distinct sample rows as initial centroids.
///
/// All randomness comes from `rng`, so a seeded generator yields the same
/// picks for the same data. When every remaining sample coincides with an
/// already chosen centroid the weights are all zero; the next pick is then
/// uniform over the rows not yet chosen.
pub fn kmeans_plus_plus<R: Rng + ?Sized>(
    samples: &[Vector],
    k: usize,
    rng: &mut R,
) -> Result<Seeding> {
    let n_samples = samples.len();
    if n_samples == 0 {
        return Err(KMeansError::EmptyInput);
    }
    if k == 0 || k > n_samples {
        return Err(KMeansError::InvalidK { k, n_samples });
    }

    let mut indices = Vec::with_capacity(k);
    let mut selected = vec![false; n_samples];

    let first = rng.gen_range(0..n_samples);
    indices.push(first);
    selected[first] = true;

    let mut min_dist = vec![f64::INFINITY; n_samples];

    while indices.len() < k {
        // Only the newest centroid can lower a running minimum.
        let latest = &samples[indices[indices.len() - 1]];
        for (slot, sample) in min_dist.iter_mut().zip(samples) {
            let dist = f64::from(squared_euclidean(sample, latest));
            if dist < *slot {
                *slot = dist;
            }
        }

        let total: f64 = min_dist.iter().sum();
        let next = if total > 0.0 {
            draw_proportional(&min_dist, total, rng)
        } else {
            debug!(
                chosen = indices.len(),
                "all remaining distances are zero, falling back to a uniform pick"
            );
            draw_unselected(&selected, rng)
        };

        indices.push(next);
        selected[next] = true;
    }

    let centroids = indices.iter().map(|&idx| samples[idx].clone()).collect();
    Ok(Seeding { centroids, indices })
}

/// Inverse-CDF draw over `weights / total`.
///
/// Takes the first index whose cumulative probability exceeds the uniform
/// draw, so zero-weight rows (the chosen centroids among them) are never
/// returned.
fn draw_proportional<R: Rng + ?Sized>(weights: &[f64], total: f64, rng: &mut R) -> usize {
    let r: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (idx, weight) in weights.iter().enumerate() {
        cumulative += weight / total;
        if cumulative > r {
            return idx;
        }
    }

    // Rounding left the cumulative sum just under `r`.
    weights
        .iter()
        .rposition(|&weight| weight > 0.0)
        .unwrap_or(weights.len() - 1)
}

fn draw_unselected<R: Rng + ?Sized>(selected: &[bool], rng: &mut R) -> usize {
    let candidates: Vec<usize> = selected
        .iter()
        .enumerate()
        .filter_map(|(idx, &taken)| (!taken).then_some(idx))
        .collect();
    candidates[rng.gen_range(0..candidates.len())]
}
