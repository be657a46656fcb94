// ============================================================
// Layer 5: Training Loop
// ============================================================
// Per-sample gradient descent over the training rows.
//
// For every epoch in [epoch_start, n_epoch):
//   1. epoch % write_interval == 0 → append a datapoint row
//   2. epoch % print_interval == 0 → print accuracies
//   3. epoch % save_interval  == 0 → save `{model_name}-{epoch}`
//   4. one SGD step per training row, in table order
// After the last epoch the datapoint, printout and checkpoint
// are always produced for epoch n_epoch.
//
// Checkpoint `{model_name}-E` therefore holds the weights after
// E full epochs, and resuming from it with epoch_start = E
// continues exactly where the uninterrupted run would be.
//
// Key burn points:
//   - training runs on TrainBackend (Autodiff<NdArray>)
//   - model.valid() gives the same weights on the inner backend
//     for evaluation without building a graph
//   - plain SGD keeps no optimiser state, so the parameters are
//     all a checkpoint has to hold
//
// Reference: Burn Book §5 (Custom Training Loop)

use anyhow::{bail, Result};
use burn::{
    backend::ndarray::NdArrayDevice,
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer, SgdConfig},
    tensor::ElementConversion,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::RowBatcher;
use crate::domain::table::Partition;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{datapoint_path, DatapointLogger, DatapointSchema, Layout};
use crate::ml::inferencer::Inferencer;
use crate::ml::model::{binary_cross_entropy, Mlp};
use crate::ml::TrainBackend;

pub struct Trainer {
    cfg:         TrainConfig,
    partition:   Partition,
    model:       Mlp<TrainBackend>,
    device:      NdArrayDevice,
    checkpoints: CheckpointManager,
}

impl Trainer {
    /// Build a freshly initialised model for `cfg`.
    pub fn new(cfg: TrainConfig, partition: Partition, checkpoints: CheckpointManager) -> Result<Self> {
        cfg.validate()?;
        if partition.train.n_feat != cfg.n_feat {
            bail!(
                "data has {} features but the model expects {}",
                partition.train.n_feat,
                cfg.n_feat
            );
        }

        let device = NdArrayDevice::default();
        let model: Mlp<TrainBackend> = cfg.model_config().init(&device);
        tracing::info!(
            "Model ready: {} -> {} x {} -> 1",
            cfg.n_feat, cfg.n_hidden, cfg.n_node
        );

        Ok(Self { cfg, partition, model, device, checkpoints })
    }

    /// Rebuild the architecture for `cfg` and restore the parameters
    /// saved as checkpoint `name`.
    pub fn resume(
        cfg:         TrainConfig,
        partition:   Partition,
        checkpoints: CheckpointManager,
        name:        &str,
    ) -> Result<Self> {
        let mut trainer = Self::new(cfg, partition, checkpoints)?;
        trainer.model = trainer
            .checkpoints
            .load_model(trainer.model.clone(), name, &trainer.device)?;
        Ok(trainer)
    }

    fn schema(&self) -> DatapointSchema {
        DatapointSchema {
            n_feat:   self.cfg.n_feat,
            n_hidden: self.cfg.n_hidden,
            n_node:   self.cfg.n_node,
            layout:   Layout::from_compact(self.cfg.compact),
        }
    }

    /// (training accuracy, testing accuracy) of the current weights
    pub fn accuracies(&self) -> (f64, f64) {
        let inferencer = Inferencer::new(self.model.valid(), self.device.clone());
        (
            inferencer.accuracy_on(&self.partition.train),
            inferencer.accuracy_on(&self.partition.test),
        )
    }

    /// Mean cross-entropy over the training rows
    pub fn training_loss(&self) -> f64 {
        let train = &self.partition.train;
        if train.is_empty() {
            return f64::NAN;
        }
        let batcher = RowBatcher::new(self.device.clone());
        let model   = self.model.valid();
        let loss: f64 = binary_cross_entropy(
            model.forward(batcher.features(train)),
            batcher.labels(train),
        )
        .into_scalar()
        .elem();
        loss / train.rows() as f64
    }

    /// Train epochs `epoch_start..n_epoch`, then record the final
    /// state at `n_epoch`. The datapoint header is only written
    /// when starting from epoch 0.
    pub fn train_model(&mut self, epoch_start: usize) -> Result<()> {
        let schema = self.schema();
        let path   = datapoint_path(&self.cfg.datapoint_dir, &self.cfg.model_name, &schema);
        let mut datapoints = DatapointLogger::open(&path, schema, epoch_start == 0)?;
        tracing::info!("Writing datapoints to '{}'", datapoints.csv_path().display());

        let batcher   = RowBatcher::<TrainBackend>::new(self.device.clone());
        let mut optim = SgdConfig::new().init::<TrainBackend, Mlp<TrainBackend>>();

        println!();
        println!("Epoch\tTraining   Testing");
        println!("Number\tAccuracy   Accuracy");

        for epoch in epoch_start..self.cfg.n_epoch {
            let mut acc = None;

            if epoch % self.cfg.write_interval == 0 {
                let (train_acc, test_acc) = self.accuracies();
                self.write_datapoint(&mut datapoints, epoch, train_acc, test_acc)?;
                acc = Some((train_acc, test_acc));
            }

            if epoch % self.cfg.print_interval == 0 {
                let (train_acc, test_acc) = acc.unwrap_or_else(|| self.accuracies());
                print_accuracy(epoch, train_acc, test_acc);
                tracing::debug!("epoch {}: training loss {:.6}", epoch, self.training_loss());
            }

            if epoch % self.cfg.save_interval == 0 {
                self.save(epoch)?;
            }

            // ── One gradient step per training row ────────────────────────────
            let train = &self.partition.train;
            for i in 0..train.rows() {
                let x = batcher.row(train.row(i));
                let y = batcher.label(train.label(i));

                let loss  = self.model.forward_loss(x, y);
                let grads = GradientsParams::from_grads(loss.backward(), &self.model);
                self.model = optim.step(self.cfg.learning_rate, self.model.clone(), grads);
            }
        }

        // ── Always record the final state ─────────────────────────────────────
        let n_epoch = self.cfg.n_epoch;
        let (train_acc, test_acc) = self.accuracies();
        self.write_datapoint(&mut datapoints, n_epoch, train_acc, test_acc)?;
        print_accuracy(n_epoch, train_acc, test_acc);
        self.save(n_epoch)?;

        tracing::info!("Training complete!");
        Ok(())
    }

    fn write_datapoint(
        &self,
        log:       &mut DatapointLogger,
        epoch:     usize,
        train_acc: f64,
        test_acc:  f64,
    ) -> Result<()> {
        let snapshot = self.model.valid().snapshot();
        log.log(epoch, &snapshot, train_acc, test_acc)
    }

    fn save(&self, epoch: usize) -> Result<()> {
        self.checkpoints.save_model(&self.model, &self.cfg.model_name, epoch)?;
        println!("\u{1b}[33m#### Session Saved @ epoch {} ####\u{1b}[0m", epoch);
        Ok(())
    }
}

fn print_accuracy(epoch: usize, train_acc: f64, test_acc: f64) {
    println!("{}\t{:.2}\t   {:.2}", epoch, train_acc, test_acc);
}
