//! Shared building blocks for the clustering workspace.
//! This crate defines the vector representation, the squared Euclidean
//! distance kernel, matrix validation and the dataset sources that feed the
//! clustering engine.

pub mod dataset;

pub use dataset::{
    generate_gaussian_blobs, generate_uniform_dataset, load_csv_dataset, CsvOptions,
    LabeledDataset,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Canonical vector representation used throughout the workspace.
pub type Vector = Vec<f32>;

/// Squared Euclidean distance between two equally sized vectors.
///
/// Callers are expected to have validated dimensions up front; the kernel
/// only zips the two slices.
#[inline]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(lhs, rhs)| {
            let diff = lhs - rhs;
            diff * diff
        })
        .sum()
}

/// Shape problems found by [`inspect_matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixDefect {
    Empty,
    ZeroWidth,
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },
    NonFinite {
        row: usize,
        column: usize,
    },
}

/// Walks a row-major matrix once and reports the first defect, or the
/// common row width when the matrix is well formed.
pub fn inspect_matrix(rows: &[Vector]) -> std::result::Result<usize, MatrixDefect> {
    let first = rows.first().ok_or(MatrixDefect::Empty)?;
    let width = first.len();
    if width == 0 {
        return Err(MatrixDefect::ZeroWidth);
    }

    for (row, values) in rows.iter().enumerate() {
        if values.len() != width {
            return Err(MatrixDefect::Ragged {
                row,
                expected: width,
                actual: values.len(),
            });
        }
        if let Some(column) = values.iter().position(|value| !value.is_finite()) {
            return Err(MatrixDefect::NonFinite { row, column });
        }
    }

    Ok(width)
}

/// Saves any serializable value to a pretty-printed JSON file.
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("failed to create JSON file at {}", path.as_ref().display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).context("failed to serialize value to JSON")?;
    Ok(())
}

/// Loads a deserializable value from a JSON file.
pub fn load_json<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("failed to open JSON file at {}", path.as_ref().display()))?;
    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("failed to deserialize JSON from {}", path.as_ref().display()))?;
    Ok(value)
}
