use cluster_core::MatrixDefect;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KMeansError {
    #[error("input matrix is empty, nothing to cluster")]
    EmptyInput,

    #[error("samples have zero features")]
    ZeroDimension,

    #[error("vector dimension mismatch at row {row}: expected {expected}, got {actual}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("non-finite value at row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize },

    #[error("k = {k} is invalid for {n_samples} samples (need 1 <= k <= n_samples)")]
    InvalidK { k: usize, n_samples: usize },

    #[error("expected {expected} starting centroids, got {actual}")]
    CentroidCountMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<MatrixDefect> for KMeansError {
    fn from(defect: MatrixDefect) -> Self {
        match defect {
            MatrixDefect::Empty => KMeansError::EmptyInput,
            MatrixDefect::ZeroWidth => KMeansError::ZeroDimension,
            MatrixDefect::Ragged {
                row,
                expected,
                actual,
            } => KMeansError::DimensionMismatch {
                row,
                expected,
                actual,
            },
            MatrixDefect::NonFinite { row, column } => KMeansError::NonFiniteValue { row, column },
        }
    }
}

pub type Result<T> = std::result::Result<T, KMeansError>;
