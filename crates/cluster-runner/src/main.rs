mod composition;
mod render;
mod scenarios;

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use cluster_core::{load_csv_dataset, save_json, CsvOptions, LabeledDataset};
use cluster_kmeans::{KMeans, KMeansConfig, KMeansFit, RestartSummary, Termination};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use composition::{composition_matrix, CompositionMatrix};
use render::{write_centroid_grid, ImageShape};
use scenarios::{ScenarioDetails, ScenarioKind};

const DEFAULT_KS: &[usize] = &[10, 15, 20, 30];

#[derive(Debug, Parser)]
#[command(about = "Run k-means sweeps over a CSV or synthetic dataset and compare clusters with known labels")]
struct Cli {
    /// CSV file with one sample per row (synthetic scenario data is used when omitted)
    #[arg(long)]
    input: Option<PathBuf>,
    /// The CSV file starts with a header row
    #[arg(long)]
    has_header: bool,
    /// Zero-based CSV column holding the ground-truth class label
    #[arg(long)]
    label_column: Option<usize>,
    /// Multiplier applied to every feature, e.g. 0.00392156862 (1/255) for raw pixels
    #[arg(long, default_value = "1.0")]
    scale: f32,
    /// Comma separated cluster counts to sweep (defaults to the scenario's, or 10,15,20,30)
    #[arg(long, value_delimiter = ',')]
    k: Option<Vec<usize>>,
    /// Iteration cap per restart
    #[arg(long, default_value = "100")]
    max_iters: usize,
    /// Centroid-shift tolerance for convergence
    #[arg(long, default_value = "1e-4")]
    tol: f64,
    /// Restarts per k; the lowest inertia wins
    #[arg(long, default_value = "5")]
    n_init: usize,
    /// RNG seed for clustering and synthetic data generation
    #[arg(long, default_value = "42")]
    seed: u64,
    /// Reshape hint for rendering centroids, e.g. 28x28
    #[arg(long)]
    image_shape: Option<ImageShape>,
    /// List the baked-in synthetic scenarios
    #[arg(long)]
    list_scenarios: bool,
    /// Synthetic scenario to cluster when no --input is given
    #[arg(long, value_enum)]
    scenario: Option<ScenarioKind>,
    /// Directory for composition CSVs and centroid images
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Export per-k results and configuration as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,
    /// Export the clustered dataset as JSON for reuse
    #[arg(long)]
    export_dataset: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset (error | warn | info | debug | trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.list_scenarios {
        scenarios::print_available();
        return Ok(());
    }

    let mut runtime = RuntimeConfig::from_cli(&cli);
    let dataset = match cli.input.as_deref() {
        Some(path) => {
            let options = CsvOptions {
                has_header: cli.has_header,
                label_column: cli.label_column,
                scale: cli.scale,
            };
            println!("Loading data from {}...", path.display());
            load_csv_dataset(path, &options)?
        }
        None => {
            let details = cli.scenario.unwrap_or(ScenarioKind::Smoke).details();
            println!("Using scenario '{}' – {}", details.slug, details.description);
            runtime.apply_scenario(&details, cli.k.is_none());
            details.config.generate(runtime.seed)?
        }
    };

    ensure!(!runtime.ks.is_empty(), "at least one k value is required");
    let dimension = dataset.dimension().unwrap_or(0);
    if let Some(shape) = runtime.image_shape {
        ensure!(
            shape.pixels() == dimension,
            "image shape {}x{} does not match {} features",
            shape.height,
            shape.width,
            dimension
        );
    }
    info!(
        samples = dataset.len(),
        dimension,
        labeled = dataset.truths.is_some(),
        "dataset ready"
    );

    if let Some(path) = cli.export_dataset.as_deref() {
        save_json(&dataset, path)?;
        println!("Wrote dataset to {}", path.display());
    }
    if let Some(dir) = cli.output_dir.as_deref() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    let mut runs = Vec::with_capacity(runtime.ks.len());
    for &k in &runtime.ks {
        println!("Clustering with k={k}...");
        let run = run_k(&dataset, k, &runtime, cli.output_dir.as_deref())?;
        println!(
            " - best inertia: {:.2} (restart {} of {}, {:.2?})",
            run.fit.inertia,
            run.fit.best_restart + 1,
            run.fit.restarts.len(),
            run.elapsed
        );
        if let Some(composition) = &run.composition {
            println!(" - purity: {:.1}%", composition.purity() * 100.0);
            print!("{}", composition.render_table());
        }
        runs.push(run);
    }

    println!("\nInertia summary:");
    for run in &runs {
        println!("k={}: inertia={:.2}", run.k, run.fit.inertia);
    }

    if let Some(path) = cli.report_json.as_deref() {
        write_report(path, &runtime, dataset.len(), dimension, &runs)?;
        println!("Wrote report to {}", path.display());
    }

    Ok(())
}

struct KRun {
    k: usize,
    fit: KMeansFit,
    composition: Option<CompositionMatrix>,
    elapsed: Duration,
}

fn run_k(
    dataset: &LabeledDataset,
    k: usize,
    runtime: &RuntimeConfig,
    output_dir: Option<&Path>,
) -> Result<KRun> {
    let config = KMeansConfig::new(k)
        .with_max_iters(runtime.max_iters)
        .with_tol(runtime.tol)
        .with_n_init(runtime.n_init)
        .with_seed(runtime.seed);
    let model = KMeans::new(config)?;

    let start = Instant::now();
    let fit = model
        .fit(&dataset.samples)
        .with_context(|| format!("k-means failed for k={k}"))?;
    let elapsed = start.elapsed();

    let exhausted = fit
        .restarts
        .iter()
        .filter(|summary| summary.termination == Termination::ExhaustedIterations)
        .count();
    if exhausted > 0 {
        warn!(k, exhausted, max_iters = runtime.max_iters, "restarts hit the iteration cap");
    }

    let composition = match (&dataset.truths, dataset.class_count()) {
        (Some(truths), Some(classes)) => Some(composition_matrix(&fit.labels, truths, k, classes)?),
        _ => None,
    };

    if let Some(dir) = output_dir {
        if let Some(composition) = &composition {
            let path = dir.join(format!("assignment_k{k}.csv"));
            composition.write_csv(&path)?;
            info!(path = %path.display(), "wrote composition matrix");
        }
        if let Some(shape) = runtime.image_shape {
            let path = dir.join(format!("centroids_k{k}.pgm"));
            write_centroid_grid(&path, &fit.centroids, shape)?;
            info!(path = %path.display(), "wrote centroid images");
        }
    }

    Ok(KRun {
        k,
        fit,
        composition,
        elapsed,
    })
}

#[derive(Debug, Clone)]
struct RuntimeConfig {
    ks: Vec<usize>,
    max_iters: usize,
    tol: f64,
    n_init: usize,
    seed: u64,
    image_shape: Option<ImageShape>,
    scenario_slug: Option<&'static str>,
    scenario_label: Option<&'static str>,
    scenario_description: Option<&'static str>,
}

impl RuntimeConfig {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            ks: cli.k.clone().unwrap_or_else(|| DEFAULT_KS.to_vec()),
            max_iters: cli.max_iters,
            tol: cli.tol,
            n_init: cli.n_init,
            seed: cli.seed,
            image_shape: cli.image_shape,
            scenario_slug: None,
            scenario_label: None,
            scenario_description: None,
        }
    }

    /// Takes the scenario's k sweep unless the caller chose one, and its
    /// image shape unless one was given.
    fn apply_scenario(&mut self, details: &ScenarioDetails, use_scenario_ks: bool) {
        if use_scenario_ks {
            self.ks = details.config.ks.to_vec();
        }
        if self.image_shape.is_none() {
            self.image_shape = details.config.image_shape;
        }
        self.scenario_slug = Some(details.slug);
        self.scenario_label = Some(details.label);
        self.scenario_description = Some(details.description);
    }
}

fn write_report(
    path: &Path,
    runtime: &RuntimeConfig,
    samples: usize,
    dimension: usize,
    runs: &[KRun],
) -> Result<()> {
    #[derive(Serialize)]
    struct ReportPayload<'a> {
        config: ReportConfig<'a>,
        results: Vec<ReportRun<'a>>,
    }

    #[derive(Serialize)]
    struct ReportConfig<'a> {
        scenario: Option<&'a str>,
        label: Option<&'a str>,
        description: Option<&'a str>,
        samples: usize,
        dimension: usize,
        max_iters: usize,
        tol: f64,
        n_init: usize,
        seed: u64,
    }

    #[derive(Serialize)]
    struct ReportRun<'a> {
        k: usize,
        inertia: f64,
        best_restart: usize,
        cluster_sizes: Vec<usize>,
        purity: Option<f64>,
        elapsed_ms: f64,
        restarts: &'a [RestartSummary],
        composition: Option<&'a CompositionMatrix>,
    }

    let payload = ReportPayload {
        config: ReportConfig {
            scenario: runtime.scenario_slug,
            label: runtime.scenario_label,
            description: runtime.scenario_description,
            samples,
            dimension,
            max_iters: runtime.max_iters,
            tol: runtime.tol,
            n_init: runtime.n_init,
            seed: runtime.seed,
        },
        results: runs
            .iter()
            .map(|run| ReportRun {
                k: run.k,
                inertia: run.fit.inertia,
                best_restart: run.fit.best_restart,
                cluster_sizes: run.fit.cluster_sizes(),
                purity: run.composition.as_ref().map(CompositionMatrix::purity),
                elapsed_ms: run.elapsed.as_secs_f64() * 1_000.0,
                restarts: &run.fit.restarts,
                composition: run.composition.as_ref(),
            })
            .collect(),
    };

    save_json(&payload, path).context("failed to write clustering report")
}
