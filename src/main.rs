use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use nn_compare::{experiment, ExperimentConfig};

/// Trains small networks on a synthetic classification problem and plots
/// their training/validation loss curves side by side.
#[derive(Parser, Debug)]
#[command(name = "nn-compare")]
#[command(version, about)]
struct Cli {
    /// JSON experiment config; omitted fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the chart, histories and trained models
    #[arg(short, long, default_value = "output")]
    out_dir: PathBuf,

    /// Override the epoch count of every run
    #[arg(long)]
    epochs: Option<usize>,

    /// Override the number of generated samples
    #[arg(long)]
    samples: Option<usize>,

    /// Seed the dataset and derive per-run seeds from it
    #[arg(long)]
    seed: Option<u64>,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ExperimentConfig::load_json(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    if let Some(epochs) = cli.epochs {
        config.epochs = epochs;
        for run in &mut config.runs {
            run.epochs = None;
        }
    }
    if let Some(samples) = cli.samples {
        config.dataset.n_samples = samples;
    }
    if let Some(seed) = cli.seed {
        config.reseed(seed);
    }

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    config.validate().context("invalid experiment config")?;

    let report = experiment::run(&config, &cli.out_dir).context("experiment failed")?;

    println!("{:<14} {:<12} {:>8} {:>11} {:>10} {:>10} {:>9}",
        "run", "backend", "params", "train loss", "val loss", "test loss", "test acc");
    for run in &report.runs {
        println!(
            "{:<14} {:<12} {:>8} {:>11.4} {:>10} {:>10.4} {:>8.2}%",
            run.name,
            run.backend.display_name(),
            run.parameters,
            run.final_train_loss,
            run.final_val_loss.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".into()),
            run.test.loss,
            run.test.accuracy * 100.0,
        );
    }
    info!("chart: {}", report.chart_path.display());

    Ok(())
}
