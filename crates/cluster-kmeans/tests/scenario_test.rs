//! End-to-end clustering scenarios with known answers

use cluster_core::{generate_gaussian_blobs, squared_euclidean, Vector};
use cluster_kmeans::{inertia::inertia, KMeans, KMeansConfig, Termination};

#[test]
fn test_two_separated_pairs() {
    let samples = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![10.0, 0.0],
        vec![10.0, 1.0],
    ];
    let config = KMeansConfig::new(2)
        .with_max_iters(10)
        .with_tol(1e-6)
        .with_n_init(3);
    let fit = KMeans::new(config).unwrap().fit(&samples).unwrap();

    // Pairs share a label, up to permutation of cluster ids
    assert_eq!(fit.labels[0], fit.labels[1]);
    assert_eq!(fit.labels[2], fit.labels[3]);
    assert_ne!(fit.labels[0], fit.labels[2]);

    let left = &fit.centroids[fit.labels[0]];
    let right = &fit.centroids[fit.labels[2]];
    assert!(squared_euclidean(left, &[0.0, 0.5]) < 1e-10);
    assert!(squared_euclidean(right, &[10.0, 0.5]) < 1e-10);

    // 0.5 per cluster
    assert!((fit.inertia - 1.0).abs() < 1e-9);
    assert_eq!(fit.restarts[fit.best_restart].termination, Termination::Converged);
}

#[test]
fn test_k_equals_n_samples() {
    let samples: Vec<Vector> = (0..8)
        .map(|i| vec![i as f32 * 3.0, (i % 3) as f32])
        .collect();
    let fit = KMeans::new(KMeansConfig::new(8).with_n_init(2))
        .unwrap()
        .fit(&samples)
        .unwrap();

    assert_eq!(fit.inertia, 0.0);
    for (sample, &label) in samples.iter().zip(&fit.labels) {
        assert_eq!(&fit.centroids[label], sample);
    }
    let mut labels = fit.labels.clone();
    labels.sort_unstable();
    labels.dedup();
    assert_eq!(labels.len(), 8);
}

#[test]
fn test_four_gaussian_blobs() {
    let centers = vec![
        vec![-20.0, -20.0],
        vec![-20.0, 20.0],
        vec![20.0, -20.0],
        vec![20.0, 20.0],
    ];
    let dataset = generate_gaussian_blobs(&centers, 100, 1.0, 2024).unwrap();
    let truths = dataset.truths.clone().unwrap();

    let fit = KMeans::new(KMeansConfig::new(4).with_n_init(5).with_seed(17))
        .unwrap()
        .fit(&dataset.samples)
        .unwrap();

    // Every recovered cluster is a single blob
    for cluster in 0..4 {
        let members: Vec<usize> = truths
            .iter()
            .zip(&fit.labels)
            .filter(|(_, &label)| label == cluster)
            .map(|(&truth, _)| truth)
            .collect();
        assert_eq!(members.len(), 100);
        assert!(members.iter().all(|&truth| truth == members[0]));
    }

    // Optimal inertia is the within-blob scatter around the blob means
    let blob_means: Vec<Vector> = (0..4)
        .map(|blob| {
            let rows: Vec<&Vector> = dataset
                .samples
                .iter()
                .zip(&truths)
                .filter(|(_, &truth)| truth == blob)
                .map(|(row, _)| row)
                .collect();
            (0..2)
                .map(|d| (rows.iter().map(|row| f64::from(row[d])).sum::<f64>() / rows.len() as f64) as f32)
                .collect()
        })
        .collect();
    let expected = inertia(&dataset.samples, &truths, &blob_means);

    assert!(
        (fit.inertia - expected).abs() / expected < 1e-3,
        "inertia {} too far from {}",
        fit.inertia,
        expected
    );
    // Roughly n * d * sigma^2
    assert!(expected > 600.0 && expected < 1000.0);
}

#[test]
fn test_duplicate_points_do_not_break_seeding() {
    let mut samples = vec![vec![1.0, 1.0]; 6];
    samples.push(vec![5.0, 5.0]);
    let fit = KMeans::new(KMeansConfig::new(4).with_n_init(3))
        .unwrap()
        .fit(&samples)
        .unwrap();

    assert_eq!(fit.centroids.len(), 4);
    assert!(fit.labels.iter().all(|&label| label < 4));
    assert!(fit.inertia.abs() < 1e-9);
}

#[test]
fn test_from_centroids_runs_single_restart() {
    let samples = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![10.0, 0.0],
        vec![10.0, 1.0],
    ];
    let model = KMeans::new(KMeansConfig::new(2).with_tol(1e-6)).unwrap();
    let fit = model
        .fit_from_centroids(&samples, vec![vec![10.0, 1.0], vec![0.0, 0.0]])
        .unwrap();

    assert_eq!(fit.labels, vec![1, 1, 0, 0]);
    assert_eq!(fit.restarts.len(), 1);
    assert!((fit.inertia - 1.0).abs() < 1e-9);
}
