//! Offline builder for the demo scaler/forest pair.
//!
//! Writes the same persisted form the server loads at startup.

use anyhow::{Context, Result};
use clap::Parser;
use nexthour::application::ml::{
    DemoModelBuilder, DemoTrainingConfig, ForestParameters, InferenceOptions, InferencePipeline,
    ModelRegistry, ModelSource, ModelStore,
};
use nexthour::config::DEFAULT_MODEL_PATH;
use nexthour::domain::market::Ohlcv;
use nexthour::domain::ml::{ConfidenceTier, FEATURE_NAMES};
use nexthour::infrastructure::JsonModelRepository;
use nexthour::infrastructure::observability::Metrics;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of synthetic bars to generate
    #[arg(long, default_value_t = 1000)]
    n_samples: usize,

    /// Seed for data generation and tree bootstrap
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum depth of trees
    #[arg(long, default_value_t = 10)]
    max_depth: u16,

    /// Minimum samples required to split an internal node
    #[arg(long, default_value_t = 5)]
    min_split: usize,

    /// Path to output model file
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Also write the synthetic training matrix (features + label) as CSV
    #[arg(long)]
    export_csv: Option<PathBuf>,
}

fn export_training_csv(path: &PathBuf, x: &[Vec<f64>], y: &[u32]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("Failed to create CSV directory")?;
    }

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let mut header: Vec<&str> = FEATURE_NAMES.to_vec();
    header.push("label");
    wtr.write_record(&header)?;

    for (row, label) in x.iter().zip(y) {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(label.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.n_samples == 0 || args.n_trees == 0 || args.max_depth == 0 || args.min_split < 2 {
        anyhow::bail!(
            "n_samples, n_trees and max_depth must be positive and min_split at least 2"
        );
    }

    let config = DemoTrainingConfig {
        n_samples: args.n_samples,
        seed: args.seed,
        forest: ForestParameters {
            n_trees: args.n_trees,
            max_depth: args.max_depth,
            min_samples_split: args.min_split,
            seed: args.seed,
        },
        ..DemoTrainingConfig::default()
    };
    let builder = DemoModelBuilder::new(config);

    println!(
        "Generating {} synthetic bars (seed {})...",
        args.n_samples, args.seed
    );
    let samples = builder.generate_samples()?;

    if let Some(csv_path) = &args.export_csv {
        let (x, y) = DemoModelBuilder::training_matrix(&samples);
        export_training_csv(csv_path, &x, &y)?;
        println!("Training matrix written to {:?}", csv_path);
    }

    println!(
        "Training Decision Forest (Trees: {}, Depth: {}, MinSplit: {})...",
        args.n_trees, args.max_depth, args.min_split
    );
    let persisted = builder.build()?;

    println!("Saving model to {:?}", args.output);
    JsonModelRepository::new(args.output.clone()).save(&persisted)?;

    let registry = Arc::new(ModelRegistry::new());
    registry.install(persisted.into_bundle(ModelSource::Demo)?);
    let pipeline = InferencePipeline::new(registry, Metrics::new()?);

    let bars: Vec<Ohlcv> = samples.iter().map(|s| s.bar).collect();
    let results = pipeline.predict_batch(&bars, InferenceOptions::default())?;

    let mut correct = 0usize;
    let mut tiers = [0usize; 3];
    for (sample, result) in samples.iter().zip(results) {
        let prediction = result?;
        if u32::from(prediction.label) == sample.label {
            correct += 1;
        }
        let slot = match prediction.confidence {
            ConfidenceTier::High => 0,
            ConfidenceTier::Medium => 1,
            ConfidenceTier::Low => 2,
        };
        tiers[slot] += 1;
    }

    let n = samples.len();
    let ups = samples.iter().filter(|s| s.label == 1).count();
    println!("\n══════════════════════════════════════════════════════");
    println!("  IN-SAMPLE REPORT");
    println!("══════════════════════════════════════════════════════");
    println!("  Samples:  {}", n);
    println!(
        "  Up:       {} ({:.1}%)",
        ups,
        ups as f64 / n as f64 * 100.0
    );
    println!(
        "  Accuracy: {:.2}%",
        correct as f64 / n as f64 * 100.0
    );
    println!(
        "  Confidence: High {} / Medium {} / Low {}",
        tiers[0], tiers[1], tiers[2]
    );
    println!("\nDone. Model saved successfully.");
    Ok(())
}
