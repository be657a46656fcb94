// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2. The only
// output produced here is the end-of-command summary.
//
//   train    - new model, epoch 0 → n_epoch
//   resume   - continue from a checkpoint
//   predict  - accuracy of a checkpoint on a data file
//   inspect  - summary of a datapoint CSV
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{bail, Result};
use clap::Parser;
use commands::{Commands, InspectArgs, PredictArgs, ResumeArgs, TrainArgs};

use crate::application::{
    predict_use_case::PredictUseCase,
    train_use_case::TrainUseCase,
};
use crate::infra::{checkpoint::CheckpointManager, metrics::read_datapoints};

#[derive(Parser, Debug)]
#[command(
    name = "mlp-trainer",
    version,
    about = "Train a sigmoid MLP classifier with interval checkpoints and datapoint logs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Resume(args)  => run_resume(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Inspect(args) => run_inspect(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Starting training on '{}'", args.data);
    TrainUseCase::new(args.into()).execute()?;
    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_resume(args: ResumeArgs) -> Result<()> {
    // The checkpoint's own model config rebuilds the same architecture and data split
    let ckpt    = CheckpointManager::new(&args.checkpoint_dir)?;
    let pointer = ckpt.resolve(&args.from, args.model.as_deref())?;
    let mut config = ckpt.load_config(&pointer.model)?;
    config.checkpoint_dir = args.checkpoint_dir;
    if let Some(epochs) = args.epochs {
        config.n_epoch = epochs;
    }

    TrainUseCase::new(config).resume(&pointer.name)?;
    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let use_case = PredictUseCase::new(&args.checkpoint_dir, &args.checkpoint, args.model.as_deref())?;
    let s = use_case.run(args.data.as_deref(), args.output.as_deref())?;

    println!("Checkpoint: {}", s.checkpoint);
    println!("Training accuracy: {:.4} ({} rows)", s.train_acc, s.train_rows);
    println!("Testing accuracy:  {:.4} ({} rows)", s.test_acc, s.test_rows);
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let log = read_datapoints(&args.path)?;
    let Some(last) = log.rows.last() else {
        bail!("'{}' has a header but no datapoints", args.path.display());
    };

    let accuracies = log.accuracies();
    let best = accuracies
        .iter()
        .zip(log.epochs())
        .filter(|((_, test), _)| !test.is_nan())
        .max_by(|((_, a), _), ((_, b), _)| a.total_cmp(b));

    println!("File:              {}", args.path.display());
    println!("Parameter columns: {}", log.parameter_columns().len());
    println!("Datapoints:        {}", log.rows.len());
    println!(
        "Last epoch:        {} (training {:.4}, testing {:.4})",
        last[0],
        last[last.len() - 2],
        last[last.len() - 1],
    );
    if let Some(((train, test), epoch)) = best {
        println!("Best testing:      {:.4} @ epoch {} (training {:.4})", test, epoch, train);
    }
    Ok(())
}
