// ============================================================
// Layer 2: TrainUseCase
// ============================================================
// Orchestrates a training run:
//
//   Step 1: Validate the configuration
//   Step 2: Load, shuffle, normalise, split  (Layer 4 - data)
//   Step 3: Save config next to checkpoints  (Layer 6 - infra)
//   Step 4: Build a new model or restore one (Layer 5 - ml)
//   Step 5: Run the epoch loop               (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::MlpConfig;
use crate::ml::trainer::Trainer;

// ─── Training Configuration ──────────────────────────────────────────────────
// Every scalar a run needs. Serialisable so it can be stored with
// the checkpoints and reloaded to rebuild the same architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Prefix of checkpoint and datapoint file names
    pub model_name: String,
    /// Delimited table: index column, n_feat features, label
    pub data_file: String,
    pub n_feat: usize,
    pub n_hidden: usize,
    /// Width of every hidden layer
    pub n_node: usize,
    pub n_epoch: usize,
    /// Rows from the top of the table used for training
    pub n_train: usize,
    pub init_bias: f64,
    pub learning_rate: f64,
    /// Shuffle rows (seeded) before normalising and splitting
    pub shuffle: bool,
    /// Epochs between checkpoints
    pub save_interval: usize,
    /// Epochs between datapoint rows
    pub write_interval: usize,
    /// Epochs between printed accuracy lines
    pub print_interval: usize,
    /// Per-layer means (true) or every parameter (false) in the datapoint file
    pub compact: bool,
    pub seed: u64,
    pub checkpoint_dir: String,
    pub datapoint_dir: String,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model_name:     "model".to_string(),
            data_file:      "feature.csv".to_string(),
            n_feat:         4,
            n_hidden:       1,
            n_node:         10,
            n_epoch:        1000,
            n_train:        100,
            init_bias:      1.0,
            learning_rate:  0.1,
            shuffle:        false,
            save_interval:  100,
            write_interval: 10,
            print_interval: 10,
            compact:        true,
            seed:           1234,
            checkpoint_dir: "mlp/checkpoints".to_string(),
            datapoint_dir:  "mlp/datapoints".to_string(),
        }
    }
}

impl TrainConfig {
    /// Reject configurations the training loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.model_name.is_empty()
            || self.model_name.contains(['/', '\\', '.'])
        {
            bail!("model name '{}' must be a plain file name prefix", self.model_name);
        }
        for (name, value) in [
            ("n_feat", self.n_feat),
            ("n_hidden", self.n_hidden),
            ("n_node", self.n_node),
            ("save_interval", self.save_interval),
            ("write_interval", self.write_interval),
            ("print_interval", self.print_interval),
        ] {
            if value == 0 {
                bail!("{name} must be at least 1");
            }
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            bail!("learning rate must be a positive number, got {}", self.learning_rate);
        }
        if !self.init_bias.is_finite() {
            bail!("initial bias must be finite, got {}", self.init_bias);
        }
        Ok(())
    }

    pub fn model_config(&self) -> MlpConfig {
        MlpConfig::new(self.n_feat, self.n_hidden, self.n_node)
            .with_init_bias(self.init_bias)
            .with_seed(self.seed)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train a freshly initialised model from epoch 0.
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        cfg.validate()?;

        let partition = data::prepare(cfg)?;

        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt.save_config(cfg)?;

        tracing::info!(
            "New model '{}': {} hidden layers x {} nodes, {} epochs",
            cfg.model_name, cfg.n_hidden, cfg.n_node, cfg.n_epoch
        );
        let mut trainer = Trainer::new(cfg.clone(), partition, ckpt)?;
        trainer.train_model(0)
    }

    /// Continue training from a saved checkpoint of this model
    /// (`latest` or a name such as `model-300`). Training restarts at
    /// the checkpoint's epoch and runs up to `n_epoch`.
    pub fn resume(&self, checkpoint: &str) -> Result<()> {
        let cfg = &self.config;
        cfg.validate()?;

        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let pointer = ckpt.resolve(checkpoint, Some(&cfg.model_name))?;
        if pointer.epoch > cfg.n_epoch {
            bail!(
                "checkpoint '{}' is at epoch {} but the run ends at epoch {}",
                pointer.name, pointer.epoch, cfg.n_epoch
            );
        }

        let partition = data::prepare(cfg)?;
        ckpt.save_config(cfg)?;

        tracing::info!("Resuming '{}' at epoch {}", pointer.name, pointer.epoch);
        let mut trainer = Trainer::resume(cfg.clone(), partition, ckpt, &pointer.name)?;
        trainer.train_model(pointer.epoch)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let cfg = TrainConfig { write_interval: 0, ..TrainConfig::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("write_interval"));
    }

    #[test]
    fn test_zero_hidden_layers_rejected() {
        let cfg = TrainConfig { n_hidden: 0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_model_name_must_be_plain() {
        for name in ["", "a/b", "with.dot"] {
            let cfg = TrainConfig { model_name: name.into(), ..TrainConfig::default() };
            assert!(cfg.validate().is_err(), "{name:?}");
        }
    }

    #[test]
    fn test_bad_learning_rate_rejected() {
        let cfg = TrainConfig { learning_rate: 0.0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = TrainConfig { learning_rate: f64::NAN, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_model_config_carries_scalars() {
        let cfg = TrainConfig { n_feat: 7, n_hidden: 3, n_node: 5, init_bias: 0.25, seed: 9, ..TrainConfig::default() };
        let m = cfg.model_config();
        assert_eq!((m.n_feat, m.n_hidden, m.n_node, m.seed), (7, 3, 5, 9));
        assert_eq!(m.init_bias, 0.25);
    }
}
