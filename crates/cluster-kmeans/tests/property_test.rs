//! Property-based tests for the clustering invariants

use cluster_kmeans::{inertia::inertia, KMeans, KMeansConfig};
use proptest::prelude::*;

/// Matrix of `rows` samples with `dim` features each
fn arb_matrix() -> impl Strategy<Value = (Vec<Vec<f32>>, usize)> {
    (1usize..6, 2usize..40).prop_flat_map(|(dim, rows)| {
        (
            prop::collection::vec(prop::collection::vec(-10.0f32..10.0f32, dim), rows),
            1usize..=rows.min(8),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: labels are valid cluster indices and centroids have the data's shape
    #[test]
    fn prop_output_shape((samples, k) in arb_matrix(), seed in any::<u64>()) {
        let config = KMeansConfig::new(k).with_n_init(2).with_max_iters(30).with_seed(seed);
        let fit = KMeans::new(config).unwrap().fit(&samples).unwrap();

        prop_assert_eq!(fit.labels.len(), samples.len());
        prop_assert!(fit.labels.iter().all(|&label| label < k));
        prop_assert_eq!(fit.centroids.len(), k);
        prop_assert!(fit.centroids.iter().all(|centroid| centroid.len() == samples[0].len()));
    }

    /// Property: reported inertia equals an independent recomputation
    #[test]
    fn prop_inertia_is_consistent((samples, k) in arb_matrix(), seed in any::<u64>()) {
        let config = KMeansConfig::new(k).with_n_init(3).with_max_iters(30).with_seed(seed);
        let fit = KMeans::new(config).unwrap().fit(&samples).unwrap();

        prop_assert!(fit.inertia >= 0.0);
        prop_assert_eq!(fit.inertia, inertia(&samples, &fit.labels, &fit.centroids));
        for summary in &fit.restarts {
            prop_assert!(fit.inertia <= summary.inertia);
        }
    }

    /// Property: a fixed seed reproduces the fit exactly
    #[test]
    fn prop_seeded_runs_are_identical((samples, k) in arb_matrix(), seed in any::<u64>()) {
        let config = KMeansConfig::new(k).with_n_init(2).with_max_iters(20).with_seed(seed);
        let first = KMeans::new(config.clone()).unwrap().fit(&samples).unwrap();
        let second = KMeans::new(config).unwrap().fit(&samples).unwrap();

        prop_assert_eq!(first, second);
    }
}
