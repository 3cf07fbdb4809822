//! Dataset sources: synthetic generators and a CSV loader.

use anyhow::{anyhow, ensure, Context, Result};
use rand::{distributions::Uniform, prelude::*};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Vector;

/// Sample matrix together with optional ground-truth class labels.
///
/// The labels are only ever used to evaluate a clustering, never to train it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledDataset {
    pub samples: Vec<Vector>,
    pub truths: Option<Vec<usize>>,
}

impl LabeledDataset {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Row width of the first sample, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.samples.first().map(Vec::len)
    }

    /// Number of distinct classes implied by the labels (`max + 1`).
    pub fn class_count(&self) -> Option<usize> {
        self.truths
            .as_ref()
            .and_then(|truths| truths.iter().max().map(|max| max + 1))
    }
}

/// Generates a deterministic set of dense vectors uniformly sampled within the given range.
pub fn generate_uniform_dataset(
    dimension: usize,
    count: usize,
    bounds: std::ops::Range<f32>,
    seed: u64,
) -> Vec<Vector> {
    let mut rng = StdRng::seed_from_u64(seed);
    let distribution = Uniform::from(bounds);

    (0..count)
        .map(|_| {
            (0..dimension)
                .map(|_| rng.sample(distribution))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Draws `per_blob` isotropic Gaussian samples around every center.
///
/// Samples are grouped by blob and labeled with the index of their center.
pub fn generate_gaussian_blobs(
    centers: &[Vector],
    per_blob: usize,
    std_dev: f32,
    seed: u64,
) -> Result<LabeledDataset> {
    ensure!(!centers.is_empty(), "at least one blob center is required");
    let dimension = centers[0].len();
    ensure!(
        centers.iter().all(|center| center.len() == dimension),
        "all blob centers must share the same dimension"
    );

    let noise = Normal::new(0.0_f32, std_dev)
        .map_err(|err| anyhow!("invalid blob standard deviation {std_dev}: {err}"))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut samples = Vec::with_capacity(centers.len() * per_blob);
    let mut truths = Vec::with_capacity(centers.len() * per_blob);
    for (label, center) in centers.iter().enumerate() {
        for _ in 0..per_blob {
            samples.push(
                center
                    .iter()
                    .map(|coordinate| coordinate + rng.sample(noise))
                    .collect(),
            );
            truths.push(label);
        }
    }

    Ok(LabeledDataset {
        samples,
        truths: Some(truths),
    })
}

/// How a CSV file maps onto a [`LabeledDataset`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Skip the first record.
    pub has_header: bool,
    /// Column holding the integer class label; excluded from the features.
    pub label_column: Option<usize>,
    /// Multiplier applied to every feature (e.g. `1/255` for raw pixel bytes).
    pub scale: f32,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: false,
            label_column: None,
            scale: 1.0,
        }
    }
}

/// Loads a numeric CSV file, one sample per record.
pub fn load_csv_dataset(path: impl AsRef<Path>, options: &CsvOptions) -> Result<LabeledDataset> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open CSV dataset at {}", path.display()))?;

    let mut samples = Vec::new();
    let mut truths = options.label_column.map(|_| Vec::new());

    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("failed to read CSV record {row}"))?;
        let mut features = Vec::with_capacity(record.len());

        for (column, field) in record.iter().enumerate() {
            if Some(column) == options.label_column {
                let label = field.parse::<usize>().with_context(|| {
                    format!("invalid label '{field}' at row {row}, column {column}")
                })?;
                if let Some(truths) = truths.as_mut() {
                    truths.push(label);
                }
                continue;
            }
            let value = field.parse::<f32>().with_context(|| {
                format!("invalid number '{field}' at row {row}, column {column}")
            })?;
            features.push(value * options.scale);
        }

        if let Some(label_column) = options.label_column {
            ensure!(
                label_column < record.len(),
                "label column {label_column} out of range at row {row} ({} columns)",
                record.len()
            );
        }
        samples.push(features);
    }

    ensure!(!samples.is_empty(), "CSV dataset {} contains no samples", path.display());
    Ok(LabeledDataset { samples, truths })
}
