// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Four subcommands: `train`, `resume`, `predict`, `inspect`.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a new model from epoch 0
    Train(TrainArgs),

    /// Continue training from a saved checkpoint
    Resume(ResumeArgs),

    /// Report a checkpoint's accuracy on a data file
    Predict(PredictArgs),

    /// Summarise a datapoint CSV written during training
    Inspect(InspectArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Prefix for checkpoint and datapoint file names
    #[arg(long, default_value = "model")]
    pub model_name: String,

    /// Delimited table: index column, features, label
    #[arg(long, default_value = "feature.csv")]
    pub data: String,

    /// Number of feature columns
    #[arg(long)]
    pub n_feat: usize,

    /// Number of hidden layers
    #[arg(long, default_value_t = 1)]
    pub n_hidden: usize,

    /// Neurons per hidden layer
    #[arg(long, default_value_t = 10)]
    pub n_node: usize,

    /// Number of epochs
    #[arg(long)]
    pub epochs: usize,

    /// Rows from the top of the table used for training
    #[arg(long)]
    pub n_train: usize,

    /// Initial value of every bias
    #[arg(long, default_value_t = 1.0)]
    pub init_bias: f64,

    #[arg(long, default_value_t = 0.1)]
    pub lr: f64,

    /// Shuffle rows (seeded) before splitting
    #[arg(long)]
    pub shuffle: bool,

    /// Epochs between checkpoints
    #[arg(long, default_value_t = 100)]
    pub save_interval: usize,

    /// Epochs between datapoint rows
    #[arg(long, default_value_t = 10)]
    pub write_interval: usize,

    /// Epochs between printed accuracy lines
    #[arg(long, default_value_t = 10)]
    pub print_interval: usize,

    /// Log every weight and bias instead of per-layer means
    #[arg(long)]
    pub detailed: bool,

    #[arg(long, default_value_t = 1234)]
    pub seed: u64,

    #[arg(long, default_value = "mlp/checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value = "mlp/datapoints")]
    pub datapoint_dir: String,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            model_name:     a.model_name,
            data_file:      a.data,
            n_feat:         a.n_feat,
            n_hidden:       a.n_hidden,
            n_node:         a.n_node,
            n_epoch:        a.epochs,
            n_train:        a.n_train,
            init_bias:      a.init_bias,
            learning_rate:  a.lr,
            shuffle:        a.shuffle,
            save_interval:  a.save_interval,
            write_interval: a.write_interval,
            print_interval: a.print_interval,
            compact:        !a.detailed,
            seed:           a.seed,
            checkpoint_dir: a.checkpoint_dir,
            datapoint_dir:  a.datapoint_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Checkpoint to continue from, e.g. `model-300`, or `latest`
    #[arg(long, default_value = "latest")]
    pub from: String,

    /// Model whose `latest` checkpoint is meant, when several share the directory
    #[arg(long)]
    pub model: Option<String>,

    /// New final epoch (defaults to the stored configuration's)
    #[arg(long)]
    pub epochs: Option<usize>,

    #[arg(long, default_value = "mlp/checkpoints")]
    pub checkpoint_dir: String,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Checkpoint to evaluate, e.g. `model-300`, or `latest`
    #[arg(long, default_value = "latest")]
    pub checkpoint: String,

    /// Model whose `latest` checkpoint is meant, when several share the directory
    #[arg(long)]
    pub model: Option<String>,

    /// Data file (defaults to the one the model was trained on)
    #[arg(long)]
    pub data: Option<String>,

    /// Write per-row predictions to this CSV file
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value = "mlp/checkpoints")]
    pub checkpoint_dir: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Datapoint file, e.g. mlp/datapoints/model_2_10_compact.csv
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use crate::cli::Cli;
    use super::*;
    use clap::Parser;

    #[test]
    fn test_train_args_convert_to_config() {
        let cli = Cli::try_parse_from([
            "mlp-trainer", "train",
            "--n-feat", "6", "--epochs", "500", "--n-train", "80",
            "--n-hidden", "2", "--detailed", "--shuffle",
        ])
        .unwrap();

        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!((cfg.n_feat, cfg.n_epoch, cfg.n_train, cfg.n_hidden), (6, 500, 80, 2));
        assert!(!cfg.compact);
        assert!(cfg.shuffle);
        assert_eq!(cfg.save_interval, 100);
        assert_eq!(cfg.learning_rate, 0.1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_resume_defaults_to_latest() {
        let cli = Cli::try_parse_from(["mlp-trainer", "resume"]).unwrap();
        let Commands::Resume(args) = cli.command else { panic!("expected resume") };
        assert_eq!(args.from, "latest");
        assert_eq!(args.epochs, None);
        assert_eq!(args.model, None);
    }

    #[test]
    fn test_predict_takes_a_model() {
        let cli = Cli::try_parse_from(["mlp-trainer", "predict", "--model", "a"]).unwrap();
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };
        assert_eq!(args.checkpoint, "latest");
        assert_eq!(args.model.as_deref(), Some("a"));
    }
}
