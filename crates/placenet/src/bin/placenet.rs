use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::config::Config;
use clap::Parser;
use placenet::{
    EvalConfig,
    burn_backend_types::{InferenceBackend, InferenceDevice, NAME},
    config::{DEFAULT_BATCH_SIZE, DEFAULT_NUM_WORKERS},
    model::ObjectPlaceNetConfig,
    run_evaluation,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "placenet")]
#[command(about = "Evaluate an object-placement checkpoint on precomputed artifacts")]
struct Cli {
    /// Predictor checkpoint (NamedMpk, full precision)
    #[arg(long)]
    checkpoint: PathBuf,

    /// Experiment name
    #[arg(long)]
    expid: String,

    /// Snapshot whose artifacts are evaluated
    #[arg(long, allow_hyphen_values = true)]
    epoch: i64,

    /// Artifact set to evaluate
    #[arg(long = "eval_type", alias = "eval-type", default_value = "eval")]
    eval_type: String,

    /// Root directory of the result layout
    #[arg(long, default_value = "result")]
    result_dir: PathBuf,

    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Loader worker threads (0 loads on the main thread)
    #[arg(long, default_value_t = DEFAULT_NUM_WORKERS)]
    num_workers: usize,

    /// Model configuration as JSON; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn eval_config(&self) -> EvalConfig {
        EvalConfig {
            checkpoint: self.checkpoint.clone(),
            expid: self.expid.clone(),
            epoch: self.epoch,
            eval_type: self.eval_type.clone(),
            result_dir: self.result_dir.clone(),
            batch_size: self.batch_size,
            num_workers: self.num_workers,
        }
    }

    fn model_config(&self) -> Result<ObjectPlaceNetConfig> {
        match &self.config {
            Some(path) => <ObjectPlaceNetConfig as Config>::load(path)
                .with_context(|| format!("Failed to read model config {}", path.display())),
            None => Ok(ObjectPlaceNetConfig::new()),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let model_config = cli.model_config()?;
    let eval_config = cli.eval_config();

    let device = InferenceDevice::default();
    tracing::info!(backend = NAME, ?device, "initialized device");

    run_evaluation::<InferenceBackend>(&eval_config, &model_config, &device).with_context(
        || {
            format!(
                "Evaluation of {} on {} failed",
                eval_config.checkpoint.display(),
                eval_config.artifact_dir().display()
            )
        },
    )?;
    Ok(())
}
