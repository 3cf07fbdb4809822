//! k-means clustering with k-means++ seeding and multiple restarts.
//!
//! A run is a sequence of `n_init` restarts. Each restart seeds centroids
//! with [`seeding::kmeans_plus_plus`], then alternates
//! [`assign::assign_labels`] and [`update::update_centroids`] until the
//! centroid shift falls below `tol` or `max_iters` is reached, and is scored
//! with [`inertia::inertia`]. The restart with the strictly lowest inertia
//! wins.
//!
//! All randomness flows through one generator, so a fixed seed reproduces a
//! run exactly.

pub mod assign;
mod config;
mod error;
pub mod inertia;
pub mod seeding;
pub mod update;

pub use config::KMeansConfig;
pub use error::{KMeansError, Result};

use cluster_core::{inspect_matrix, Vector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use assign::assign_labels;
use update::{centroid_shift, update_centroids};

/// How a restart's iteration loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Centroid shift dropped below `tol`.
    Converged,
    /// `max_iters` iterations ran without converging; the last state is kept.
    ExhaustedIterations,
}

/// Per-restart diagnostics kept alongside the winning result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartSummary {
    pub restart: usize,
    pub inertia: f64,
    pub iterations: usize,
    pub termination: Termination,
    pub empty_cluster_reseeds: usize,
}

/// Best clustering found across all restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Vec<Vector>,
    pub inertia: f64,
    /// Index into `restarts` of the run that produced this result.
    pub best_restart: usize,
    pub restarts: Vec<RestartSummary>,
}

impl KMeansFit {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    pub fn dimension(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }

    /// Number of samples assigned to each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Labels new samples with their nearest fitted centroid.
    pub fn predict(&self, samples: &[Vector]) -> Result<Vec<usize>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        let width = inspect_matrix(samples)?;
        if width != self.dimension() {
            return Err(KMeansError::DimensionMismatch {
                row: 0,
                expected: self.dimension(),
                actual: width,
            });
        }
        Ok(assign_labels(samples, &self.centroids))
    }
}

/// Final state of a single restart.
#[derive(Debug, Clone, PartialEq)]
struct RestartOutcome {
    labels: Vec<usize>,
    centroids: Vec<Vector>,
    inertia: f64,
    iterations: usize,
    termination: Termination,
    empty_cluster_reseeds: usize,
}

impl RestartOutcome {
    fn summary(&self, restart: usize) -> RestartSummary {
        RestartSummary {
            restart,
            inertia: self.inertia,
            iterations: self.iterations,
            termination: self.termination,
            empty_cluster_reseeds: self.empty_cluster_reseeds,
        }
    }
}

/// Lowest-inertia restart seen so far.
#[derive(Debug)]
struct BestRecord {
    restart: usize,
    outcome: RestartOutcome,
}

impl BestRecord {
    /// Keeps the incumbent unless the challenger is strictly better.
    fn consider(best: Option<Self>, restart: usize, outcome: RestartOutcome) -> Option<Self> {
        match best {
            Some(current) if current.outcome.inertia <= outcome.inertia => Some(current),
            _ => Some(Self { restart, outcome }),
        }
    }
}

/// k-means estimator.
#[derive(Debug, Clone)]
pub struct KMeans {
    config: KMeansConfig,
}

impl KMeans {
    /// Creates an estimator after validating the data-independent settings.
    pub fn new(config: KMeansConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Creates an estimator for `k` clusters with default settings.
    pub fn with_defaults(k: usize) -> Result<Self> {
        Self::new(KMeansConfig::new(k))
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Clusters `samples` using a generator seeded from the configuration.
    pub fn fit(&self, samples: &[Vector]) -> Result<KMeansFit> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.fit_with_rng(samples, &mut rng)
    }

    /// Clusters `samples`, drawing every random number from `rng`.
    ///
    /// Restarts run in order and share the stream, so restart `i` sees the
    /// generator as left by restart `i - 1`.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &self,
        samples: &[Vector],
        rng: &mut R,
    ) -> Result<KMeansFit> {
        let dimension = self.validate_samples(samples)?;
        let KMeansConfig {
            k,
            max_iters,
            tol,
            n_init,
            ..
        } = self.config;

        info!(
            k,
            n_samples = samples.len(),
            dimension,
            n_init,
            "starting k-means"
        );

        let mut summaries = Vec::with_capacity(n_init);
        let mut best = None;
        for restart in 0..n_init {
            let seeding = seeding::kmeans_plus_plus(samples, k, rng)?;
            let outcome = run_restart(samples, seeding.centroids, max_iters, tol, rng);
            debug!(
                restart,
                iterations = outcome.iterations,
                termination = ?outcome.termination,
                inertia = outcome.inertia,
                "restart finished"
            );
            summaries.push(outcome.summary(restart));
            best = BestRecord::consider(best, restart, outcome);
        }

        let best = best.ok_or_else(|| KMeansError::InvalidConfig("n_init must be > 0".to_string()))?;
        info!(
            k,
            best_restart = best.restart,
            inertia = best.outcome.inertia,
            "k-means complete"
        );

        Ok(KMeansFit {
            labels: best.outcome.labels,
            centroids: best.outcome.centroids,
            inertia: best.outcome.inertia,
            best_restart: best.restart,
            restarts: summaries,
        })
    }

    /// Runs a single restart from caller-supplied centroids instead of seeding.
    ///
    /// Empty clusters are still reseeded from the configured seed's stream.
    pub fn fit_from_centroids(&self, samples: &[Vector], initial: Vec<Vector>) -> Result<KMeansFit> {
        let dimension = self.validate_samples(samples)?;
        if initial.len() != self.config.k {
            return Err(KMeansError::CentroidCountMismatch {
                expected: self.config.k,
                actual: initial.len(),
            });
        }
        if let Some((row, centroid)) = initial
            .iter()
            .enumerate()
            .find(|(_, centroid)| centroid.len() != dimension)
        {
            return Err(KMeansError::DimensionMismatch {
                row,
                expected: dimension,
                actual: centroid.len(),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let outcome = run_restart(samples, initial, self.config.max_iters, self.config.tol, &mut rng);
        Ok(KMeansFit {
            restarts: vec![outcome.summary(0)],
            labels: outcome.labels,
            centroids: outcome.centroids,
            inertia: outcome.inertia,
            best_restart: 0,
        })
    }

    fn validate_samples(&self, samples: &[Vector]) -> Result<usize> {
        let dimension = inspect_matrix(samples)?;
        self.config.validate_for(samples.len())?;
        Ok(dimension)
    }
}

/// Iterates assignment and update from `centroids` until convergence or the
/// iteration cap, then scores the final state.
fn run_restart<R: Rng + ?Sized>(
    samples: &[Vector],
    mut centroids: Vec<Vector>,
    max_iters: usize,
    tol: f64,
    rng: &mut R,
) -> RestartOutcome {
    let k = centroids.len();
    let mut labels = Vec::new();
    let mut iterations = 0;
    let mut termination = Termination::ExhaustedIterations;
    let mut empty_cluster_reseeds = 0;

    for iteration in 0..max_iters {
        labels = assign_labels(samples, &centroids);
        let update = update_centroids(samples, &labels, k, rng);
        let shift = centroid_shift(&centroids, &update.centroids);

        empty_cluster_reseeds += update.reseeded.len();
        centroids = update.centroids;
        iterations = iteration + 1;
        trace!(iteration, shift, "centroids updated");

        if shift < tol {
            termination = Termination::Converged;
            break;
        }
    }

    let inertia = inertia::inertia(samples, &labels, &centroids);
    RestartOutcome {
        labels,
        centroids,
        inertia,
        iterations,
        termination,
        empty_cluster_reseeds,
    }
}
