use anyhow::Result;
use clap::ValueEnum;
use cluster_core::{generate_gaussian_blobs, generate_uniform_dataset, LabeledDataset};

use crate::render::ImageShape;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab_case")]
pub enum ScenarioKind {
    /// Four tight 2-D blobs – verifies plumbing quickly.
    Smoke,
    /// Ten blurred 8x8 "glyph" prototypes, swept over several k like a digit dataset.
    DigitsLike,
    /// Overlapping blobs in 16-D where restarts matter.
    Overlapping,
}

#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub dimension: usize,
    pub blobs: usize,
    pub per_blob: usize,
    /// Blob centers are drawn uniformly from `[0, spread)` per feature.
    pub spread: f32,
    pub std_dev: f32,
    pub ks: &'static [usize],
    pub image_shape: Option<ImageShape>,
}

#[derive(Clone, Debug)]
pub struct ScenarioDetails {
    pub slug: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub config: ScenarioConfig,
}

impl ScenarioKind {
    pub fn details(self) -> ScenarioDetails {
        match self {
            ScenarioKind::Smoke => ScenarioDetails {
                slug: "smoke",
                label: "Smoke test (200 pts)",
                description: "Well separated 2-D blobs; k-means should recover them exactly.",
                config: ScenarioConfig {
                    dimension: 2,
                    blobs: 4,
                    per_blob: 50,
                    spread: 40.0,
                    std_dev: 0.5,
                    ks: &[4],
                    image_shape: None,
                },
            },
            ScenarioKind::DigitsLike => ScenarioDetails {
                slug: "digits-like",
                label: "Digits-like (5k pts)",
                description: "Ten 64-pixel prototypes with pixel noise, values roughly in [0, 1].",
                config: ScenarioConfig {
                    dimension: 64,
                    blobs: 10,
                    per_blob: 500,
                    spread: 1.0,
                    std_dev: 0.15,
                    ks: &[10, 15, 20, 30],
                    image_shape: Some(ImageShape {
                        height: 8,
                        width: 8,
                    }),
                },
            },
            ScenarioKind::Overlapping => ScenarioDetails {
                slug: "overlapping",
                label: "Overlapping (3k pts)",
                description: "Six wide 16-D blobs; compare inertia across k and restarts.",
                config: ScenarioConfig {
                    dimension: 16,
                    blobs: 6,
                    per_blob: 500,
                    spread: 4.0,
                    std_dev: 1.0,
                    ks: &[4, 6, 8],
                    image_shape: None,
                },
            },
        }
    }

    pub fn list_details() -> Vec<ScenarioDetails> {
        ScenarioKind::value_variants()
            .iter()
            .map(|kind| kind.details())
            .collect()
    }
}

impl ScenarioConfig {
    /// Generates the scenario's labeled dataset from `seed`.
    pub fn generate(&self, seed: u64) -> Result<LabeledDataset> {
        let centers = generate_uniform_dataset(self.dimension, self.blobs, 0.0..self.spread, seed);
        generate_gaussian_blobs(&centers, self.per_blob, self.std_dev, seed.wrapping_add(1))
    }
}

pub fn print_available() {
    println!("Available scenarios:");
    for details in ScenarioKind::list_details() {
        println!(
            "  {:<12} {:<22} dim={:<3} blobs={:<3} points={:<6} std={:<5} ks={:?}",
            details.slug,
            details.label,
            details.config.dimension,
            details.config.blobs,
            details.config.blobs * details.config.per_blob,
            details.config.std_dev,
            details.config.ks
        );
        println!("      {}", details.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_scenarios_have_unique_slugs() {
        let mut slugs = ScenarioKind::list_details()
            .into_iter()
            .map(|detail| detail.slug)
            .collect::<Vec<_>>();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), ScenarioKind::value_variants().len());
    }

    #[test]
    fn scenarios_fit_their_largest_k() {
        for details in ScenarioKind::list_details() {
            let config = &details.config;
            let points = config.blobs * config.per_blob;
            assert!(config.ks.iter().all(|&k| k >= 1 && k <= points));
            if let Some(shape) = config.image_shape {
                assert_eq!(shape.pixels(), config.dimension);
            }
        }
    }

    #[test]
    fn generated_dataset_matches_config() {
        let config = ScenarioKind::Smoke.details().config;
        let dataset = config.generate(42).unwrap();
        assert_eq!(dataset.len(), config.blobs * config.per_blob);
        assert_eq!(dataset.dimension(), Some(config.dimension));
        assert_eq!(dataset.class_count(), Some(config.blobs));
    }
}
