use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::{Serialize, Deserialize};

use crate::config::{ExperimentConfig, RunSpec};
use crate::data::{make_classification, split_three_way, DataLoader, Dataset, Splits};
use crate::error::Result;
use crate::network::Network;
use crate::plot::{panels_from_histories, write_loss_chart, ChartOptions};
use crate::train::{
    evaluate, save_histories, train_manual, Backend, FitConfig, History, Metrics, Sequential,
};

pub const CHART_FILE: &str = "loss_curves.svg";
pub const HISTORY_FILE: &str = "history.json";
pub const MODELS_DIR: &str = "models";

/// Outcome of one trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    pub label: String,
    pub backend: Backend,
    pub parameters: usize,
    pub epochs: usize,
    pub final_train_loss: f64,
    pub final_val_loss: Option<f64>,
    pub test: Metrics,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub train_shape: (usize, usize),
    pub val_shape: (usize, usize),
    pub test_shape: (usize, usize),
    pub runs: Vec<RunSummary>,
    pub histories: Vec<History>,
    pub chart_path: PathBuf,
    pub history_path: PathBuf,
    pub models_dir: PathBuf,
}

/// Generates the data, trains every configured run, evaluates each on the
/// held-out test split and writes the chart, histories and trained models
/// under `out_dir`.
pub fn run(config: &ExperimentConfig, out_dir: impl AsRef<Path>) -> Result<Report> {
    config.validate()?;
    let out_dir = out_dir.as_ref();
    let models_dir = out_dir.join(MODELS_DIR);
    std::fs::create_dir_all(&models_dir)?;

    let dataset = make_classification(&config.dataset)?;
    let splits = split_three_way(&dataset, &config.split)?;
    log_shapes(&splits);

    let mut histories = Vec::with_capacity(config.runs.len());
    let mut summaries = Vec::with_capacity(config.runs.len());

    for run_spec in &config.runs {
        let epochs = run_spec.epochs(config.epochs);
        info!(
            "training '{}' via {} ({} epochs, batch {})",
            run_spec.name(),
            run_spec.backend.display_name(),
            epochs,
            run_spec.batch_size()
        );

        let t_start = Instant::now();
        let (mut network, history) = match run_spec.backend {
            Backend::Fit => train_with_fit(run_spec, &splits, epochs)?,
            Backend::Manual => train_with_loop(run_spec, &splits, epochs)?,
        };
        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        let test = evaluate(&mut network, run_spec.network.loss, &splits.test, run_spec.batch_size())?;
        network.save_json(models_dir.join(format!("{}.json", run_spec.name())))?;

        let summary = RunSummary {
            name: run_spec.name().to_owned(),
            label: run_spec.network.label().to_owned(),
            backend: run_spec.backend,
            parameters: network.parameter_count(),
            epochs: history.len(),
            final_train_loss: history.last().map(|s| s.train_loss).unwrap_or(f64::NAN),
            final_val_loss: history.last().and_then(|s| s.val_loss),
            test,
            elapsed_ms,
        };
        info!(
            "'{}' done in {:.1}s: train loss {:.4}, val loss {}, test loss {:.4}, test accuracy {:.2}%",
            summary.name,
            elapsed_ms as f64 / 1000.0,
            summary.final_train_loss,
            summary.final_val_loss.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".into()),
            test.loss,
            test.accuracy * 100.0,
        );

        histories.push(history);
        summaries.push(summary);
    }

    let chart_path = out_dir.join(CHART_FILE);
    write_loss_chart(&chart_path, &panels_from_histories(&histories), &ChartOptions::default())?;
    info!("loss curves written to {}", chart_path.display());

    let history_path = out_dir.join(HISTORY_FILE);
    save_histories(&histories, &history_path)?;
    info!("histories written to {}", history_path.display());

    Ok(Report {
        train_shape: splits.train.shape(),
        val_shape: splits.val.shape(),
        test_shape: splits.test.shape(),
        runs: summaries,
        histories,
        chart_path,
        history_path,
        models_dir,
    })
}

fn log_shapes(splits: &Splits) {
    let describe = |name: &str, ds: &Dataset| {
        let (rows, cols) = ds.shape();
        info!("{name} data: ({rows}, {cols}), labels: ({rows},)");
    };
    describe("training", &splits.train);
    describe("validation", &splits.val);
    describe("test", &splits.test);
}

fn train_with_fit(run_spec: &RunSpec, splits: &Splits, epochs: usize) -> Result<(Network, History)> {
    let mut model = Sequential::new(run_spec.network.clone(), run_spec.seed)?;
    model.compile(&run_spec.optimizer)?;
    let fit_config = FitConfig {
        epochs,
        batch_size: run_spec.batch_size(),
        shuffle: true,
        seed: run_spec.seed,
    };
    let history = model.fit(&splits.train, &fit_config, Some(&splits.val))?;
    Ok((model.into_network(), history))
}

fn train_with_loop(run_spec: &RunSpec, splits: &Splits, epochs: usize) -> Result<(Network, History)> {
    let backend = Backend::Manual;
    let mut network = Network::from_spec(&run_spec.network, backend.weight_init(), run_spec.seed)?;
    let mut optimizer = run_spec.optimizer.build(backend);

    let batch_size = run_spec.batch_size();
    let mut train_loader = DataLoader::new(&splits.train, batch_size, true, run_spec.seed)?;
    let mut val_loader = DataLoader::new(&splits.val, batch_size, false, None)?;

    let history = train_manual(
        &mut network,
        optimizer.as_mut(),
        run_spec.network.loss,
        &mut train_loader,
        &mut val_loader,
        epochs,
        run_spec.network.label(),
    )?;
    Ok((network, history))
}
