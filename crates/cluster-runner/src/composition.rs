//! Cluster-versus-class composition used to judge how well clusters recover
//! the known labels.

use anyhow::{ensure, Context, Result};
use serde::Serialize;
use std::path::Path;

/// `k × classes` matrix; row `c` holds the percentage of cluster `c` that
/// carries each ground-truth class. Empty clusters are all-zero rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionMatrix {
    pub percentages: Vec<Vec<f64>>,
    pub cluster_sizes: Vec<usize>,
}

pub fn composition_matrix(
    labels: &[usize],
    truths: &[usize],
    k: usize,
    classes: usize,
) -> Result<CompositionMatrix> {
    ensure!(
        labels.len() == truths.len(),
        "label count {} does not match ground-truth count {}",
        labels.len(),
        truths.len()
    );

    let mut counts = vec![vec![0usize; classes]; k];
    for (&label, &truth) in labels.iter().zip(truths) {
        ensure!(label < k, "cluster label {label} out of range for k={k}");
        ensure!(truth < classes, "class {truth} out of range for {classes} classes");
        counts[label][truth] += 1;
    }

    let cluster_sizes: Vec<usize> = counts.iter().map(|row| row.iter().sum()).collect();
    let percentages = counts
        .iter()
        .zip(&cluster_sizes)
        .map(|(row, &size)| {
            row.iter()
                .map(|&count| {
                    if size == 0 {
                        0.0
                    } else {
                        count as f64 / size as f64 * 100.0
                    }
                })
                .collect()
        })
        .collect();

    Ok(CompositionMatrix {
        percentages,
        cluster_sizes,
    })
}

impl CompositionMatrix {
    pub fn classes(&self) -> usize {
        self.percentages.first().map_or(0, Vec::len)
    }

    /// Share of samples that belong to their cluster's majority class.
    pub fn purity(&self) -> f64 {
        let total: usize = self.cluster_sizes.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let majority: f64 = self
            .percentages
            .iter()
            .zip(&self.cluster_sizes)
            .map(|(row, &size)| {
                let best = row.iter().copied().fold(0.0, f64::max);
                best / 100.0 * size as f64
            })
            .sum();
        majority / total as f64
    }

    /// Fixed-width text table, one row per cluster.
    pub fn render_table(&self) -> String {
        let mut out = String::from("cluster   size |");
        for class in 0..self.classes() {
            out.push_str(&format!(" {class:>5}"));
        }
        out.push('\n');

        for (cluster, (row, size)) in self.percentages.iter().zip(&self.cluster_sizes).enumerate() {
            out.push_str(&format!("{cluster:>7} {size:>6} |"));
            for value in row {
                out.push_str(&format!(" {value:>5.1}"));
            }
            out.push('\n');
        }
        out
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create composition CSV at {}", path.display()))?;

        let mut header = vec!["cluster".to_string(), "size".to_string()];
        header.extend((0..self.classes()).map(|class| format!("class_{class}")));
        writer.write_record(&header)?;

        for (cluster, (row, size)) in self.percentages.iter().zip(&self.cluster_sizes).enumerate() {
            let mut record = vec![cluster.to_string(), size.to_string()];
            record.extend(row.iter().map(|value| format!("{value:.4}")));
            writer.write_record(&record)?;
        }

        writer.flush().context("failed to flush composition CSV")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_sum_to_one_hundred() {
        let labels = [0, 0, 0, 1, 1, 2];
        let truths = [3, 3, 1, 0, 0, 2];
        let matrix = composition_matrix(&labels, &truths, 4, 4).unwrap();

        assert_eq!(matrix.cluster_sizes, vec![3, 2, 1, 0]);
        for (row, &size) in matrix.percentages.iter().zip(&matrix.cluster_sizes) {
            let sum: f64 = row.iter().sum();
            if size > 0 {
                assert!((sum - 100.0).abs() < 1e-9);
            } else {
                assert_eq!(sum, 0.0);
            }
        }
        assert!((matrix.percentages[0][3] - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn purity_counts_majority_members() {
        let labels = [0, 0, 0, 1, 1, 1];
        let truths = [1, 1, 2, 0, 0, 0];
        let matrix = composition_matrix(&labels, &truths, 2, 3).unwrap();
        assert!((matrix.purity() - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_range_inputs() {
        assert!(composition_matrix(&[0, 1], &[0], 2, 2).is_err());
        assert!(composition_matrix(&[2], &[0], 2, 2).is_err());
        assert!(composition_matrix(&[0], &[5], 2, 2).is_err());
    }

    #[test]
    fn table_has_header_and_one_line_per_cluster() {
        let matrix = composition_matrix(&[0, 1], &[1, 0], 2, 2).unwrap();
        let table = matrix.render_table();
        assert_eq!(table.lines().count(), 3);
        assert!(table.lines().nth(1).unwrap().contains("100.0"));
    }

    #[test]
    fn csv_export_writes_every_cluster() {
        let matrix = composition_matrix(&[0, 1, 1], &[0, 1, 1], 2, 2).unwrap();
        let path = std::env::temp_dir().join(format!("composition_{}.csv", std::process::id()));
        matrix.write_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "cluster,size,class_0,class_1");
        assert_eq!(lines[2], "1,2,0.0000,100.0000");
        let _ = std::fs::remove_file(&path);
    }
}
