use serde::{Deserialize, Serialize};

use crate::error::{KMeansError, Result};

/// Knobs for a k-means run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Iteration cap per restart
    pub max_iters: usize,

    /// A restart converges once the Frobenius norm of the centroid shift
    /// drops below this value
    pub tol: f64,

    /// Independent restarts; the lowest-inertia one wins
    pub n_init: usize,

    /// Seed for the single RNG stream shared by seeding and empty-cluster reseeding
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 8,
            max_iters: 100,
            tol: 1e-4,
            n_init: 5,
            seed: 42,
        }
    }
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the data-independent parts of the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_iters == 0 {
            return Err(KMeansError::InvalidConfig(
                "max_iters must be > 0".to_string(),
            ));
        }

        if self.n_init == 0 {
            return Err(KMeansError::InvalidConfig("n_init must be > 0".to_string()));
        }

        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(KMeansError::InvalidConfig(
                "tol must be finite and >= 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate the configuration against a dataset of `n_samples` rows
    pub fn validate_for(&self, n_samples: usize) -> Result<()> {
        self.validate()?;

        if self.k == 0 || self.k > n_samples {
            return Err(KMeansError::InvalidK {
                k: self.k,
                n_samples,
            });
        }

        Ok(())
    }
}
