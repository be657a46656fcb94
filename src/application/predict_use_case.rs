// ============================================================
// Layer 2: Predict Use Case
// ============================================================
// Loads a checkpoint together with the config it was trained
// with, prepares a table the same way training did, and reports
// accuracy on both halves of the split. Optionally writes every
// row's prediction to a CSV file.

use anyhow::{Context, Result};
use csv::Writer;
use std::path::Path;

use crate::application::train_use_case::TrainConfig;
use crate::data;
use crate::domain::table::FeatureTable;
use crate::infra::checkpoint::{CheckpointManager, CheckpointPointer};
use crate::ml::inferencer::{accuracy, classify, Inferencer};
use crate::ml::EvalBackend;

/// Accuracy of a checkpoint on a prepared table.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSummary {
    pub checkpoint: String,
    pub train_rows: usize,
    pub test_rows:  usize,
    pub train_acc:  f64,
    pub test_acc:   f64,
}

/// One half of the split run through the model once.
struct Scored<'a> {
    set:           &'static str,
    table:         &'a FeatureTable,
    probabilities: Vec<f32>,
    predictions:   Vec<f32>,
}

impl Scored<'_> {
    fn accuracy(&self) -> f64 {
        accuracy(&self.predictions, &self.table.labels)
    }
}

pub struct PredictUseCase {
    config:     TrainConfig,
    pointer:    CheckpointPointer,
    inferencer: Inferencer<EvalBackend>,
}

impl PredictUseCase {
    /// `checkpoint` is `latest` or a name such as `model-300`. `model`
    /// picks whose `latest` is meant when the directory holds several.
    /// The architecture is rebuilt from the config stored for the
    /// checkpoint's own model.
    pub fn new(checkpoint_dir: &str, checkpoint: &str, model: Option<&str>) -> Result<Self> {
        let ckpt       = CheckpointManager::new(checkpoint_dir)?;
        let pointer    = ckpt.resolve(checkpoint, model)?;
        let config     = ckpt.load_config(&pointer.model)?;
        let inferencer = Inferencer::from_checkpoint(&ckpt, &config, &pointer.name)?;
        Ok(Self { config, pointer, inferencer })
    }

    /// Evaluate on `data_file` (the training file when `None`),
    /// writing per-row predictions to `output` when given.
    pub fn run(&self, data_file: Option<&str>, output: Option<&Path>) -> Result<PredictionSummary> {
        let mut cfg = self.config.clone();
        if let Some(file) = data_file {
            cfg.data_file = file.to_string();
        }
        let partition = data::prepare(&cfg)?;

        let train = self.score("train", &partition.train);
        let test  = self.score("test", &partition.test);

        let summary = PredictionSummary {
            checkpoint: self.pointer.name.clone(),
            train_rows: partition.train.rows(),
            test_rows:  partition.test.rows(),
            train_acc:  train.accuracy(),
            test_acc:   test.accuracy(),
        };
        tracing::info!(
            "'{}': training accuracy {:.4}, testing accuracy {:.4}",
            summary.checkpoint, summary.train_acc, summary.test_acc
        );

        if let Some(path) = output {
            let mut writer = Writer::from_path(path)
                .with_context(|| format!("Cannot create '{}'", path.display()))?;
            writer.write_record(["row", "set", "probability", "prediction", "label"])?;

            let mut row = 0usize;
            for scored in [&train, &test] {
                row = write_predictions(&mut writer, scored, row)?;
            }
            writer.flush()?;
            tracing::info!("Wrote {} predictions to '{}'", row, path.display());
        }

        Ok(summary)
    }

    fn score<'a>(&self, set: &'static str, table: &'a FeatureTable) -> Scored<'a> {
        let probabilities = self.inferencer.probabilities(table);
        let predictions   = classify(&probabilities);
        Scored { set, table, probabilities, predictions }
    }
}

fn write_predictions(writer: &mut Writer<std::fs::File>, scored: &Scored<'_>, first: usize) -> Result<usize> {
    let rows = scored.probabilities.iter().zip(&scored.predictions).enumerate();
    for (i, (p, y)) in rows {
        writer.write_record([
            (first + i).to_string(),
            scored.set.to_string(),
            p.to_string(),
            y.to_string(),
            scored.table.label(i).to_string(),
        ])?;
    }
    Ok(first + scored.table.rows())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainUseCase;
    use crate::infra::metrics::read_datapoints;
    use std::fs;
    use tempfile::tempdir;

    fn write_table(path: &Path) {
        let mut csv = String::from(",a,b,c,label\n");
        for i in 0..24 {
            let a = (i % 5) as f32;
            let b = ((i * 3) % 7) as f32;
            let c = (i % 2) as f32 * 10.0;
            let label = if a + b > 5.0 { 1 } else { 0 };
            csv.push_str(&format!("{i},{a},{b},{c},{label}\n"));
        }
        fs::write(path, csv).unwrap();
    }

    #[test]
    fn test_train_then_predict() {
        let dir  = tempdir().unwrap();
        let data = dir.path().join("feature.csv");
        write_table(&data);

        let cfg = TrainConfig {
            model_name:     "fake_model".into(),
            data_file:      data.display().to_string(),
            n_feat:         3,
            n_hidden:       1,
            n_node:         4,
            n_epoch:        3,
            n_train:        18,
            shuffle:        true,
            save_interval:  2,
            write_interval: 1,
            print_interval: 1,
            checkpoint_dir: dir.path().join("checkpoints").display().to_string(),
            datapoint_dir:  dir.path().join("datapoints").display().to_string(),
            ..TrainConfig::default()
        };
        TrainUseCase::new(cfg.clone()).execute().unwrap();

        let log = read_datapoints(dir.path().join("datapoints/fake_model_1_4_compact.csv")).unwrap();
        assert_eq!(log.epochs(), vec![0, 1, 2, 3]);

        let out     = dir.path().join("predictions.csv");
        let predict = PredictUseCase::new(&cfg.checkpoint_dir, "latest", None).unwrap();
        let summary = predict.run(None, Some(&out)).unwrap();

        assert_eq!(summary.checkpoint, "fake_model-3");
        assert_eq!((summary.train_rows, summary.test_rows), (18, 6));
        // the final datapoint row was computed from the same weights
        assert_eq!(log.accuracies()[3], (summary.train_acc, summary.test_acc));

        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written.lines().count(), 25);

        // every prediction is its probability rounded, and the train
        // rows reproduce the reported accuracy
        let mut correct = 0;
        for line in written.lines().skip(1).take(18) {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields[1], "train");
            let p: f32 = fields[2].parse().unwrap();
            let y: f32 = fields[3].parse().unwrap();
            assert_eq!(y, p.round_ties_even());
            if fields[3] == fields[4] {
                correct += 1;
            }
        }
        assert_eq!(correct as f64 / 18.0, summary.train_acc);
    }

    #[test]
    fn test_models_share_checkpoint_dir() {
        let dir  = tempdir().unwrap();
        let data = dir.path().join("feature.csv");
        write_table(&data);

        let a = TrainConfig {
            model_name:     "a".into(),
            data_file:      data.display().to_string(),
            n_feat:         3,
            n_hidden:       1,
            n_node:         2,
            n_epoch:        2,
            n_train:        20,
            save_interval:  1,
            write_interval: 1,
            checkpoint_dir: dir.path().join("ckpt").display().to_string(),
            datapoint_dir:  dir.path().join("dp").display().to_string(),
            ..TrainConfig::default()
        };
        let b = TrainConfig { model_name: "b".into(), n_hidden: 2, n_node: 5, ..a.clone() };
        TrainUseCase::new(a.clone()).execute().unwrap();
        TrainUseCase::new(b.clone()).execute().unwrap();

        // a's checkpoints still load with a's own architecture
        let a_log   = read_datapoints(dir.path().join("dp/a_1_2_compact.csv")).unwrap();
        let summary = PredictUseCase::new(&a.checkpoint_dir, "a-2", None).unwrap().run(None, None).unwrap();
        assert_eq!(summary.checkpoint, "a-2");
        assert_eq!(a_log.accuracies()[2], (summary.train_acc, summary.test_acc));

        // `latest` needs a model once two share the directory
        assert!(PredictUseCase::new(&a.checkpoint_dir, "latest", None).is_err());
        let latest_a = PredictUseCase::new(&a.checkpoint_dir, "latest", Some("a")).unwrap();
        assert_eq!(latest_a.run(None, None).unwrap().checkpoint, "a-2");

        // resuming a continues a, and leaves b's pointer alone
        let ckpt = CheckpointManager::new(&a.checkpoint_dir).unwrap();
        let longer_a = TrainConfig { n_epoch: 3, ..ckpt.load_config("a").unwrap() };
        assert_eq!(longer_a.n_node, 2);
        TrainUseCase::new(longer_a.clone()).resume("latest").unwrap();

        let a_log = read_datapoints(dir.path().join("dp/a_1_2_compact.csv")).unwrap();
        assert_eq!(a_log.epochs(), vec![0, 1, 2, 2, 3]);
        assert_eq!(ckpt.latest("a").unwrap().name, "a-3");
        assert_eq!(ckpt.latest("b").unwrap().name, "b-2");

        // another model's checkpoint is refused rather than loaded
        assert!(TrainUseCase::new(longer_a).resume("b-2").is_err());
    }

    #[test]
    fn test_resume_continues_log() {
        let dir  = tempdir().unwrap();
        let data = dir.path().join("feature.csv");
        write_table(&data);

        let cfg = TrainConfig {
            model_name:     "again".into(),
            data_file:      data.display().to_string(),
            n_feat:         3,
            n_node:         2,
            n_epoch:        2,
            n_train:        20,
            save_interval:  1,
            write_interval: 1,
            checkpoint_dir: dir.path().join("ckpt").display().to_string(),
            datapoint_dir:  dir.path().join("dp").display().to_string(),
            ..TrainConfig::default()
        };
        TrainUseCase::new(cfg.clone()).execute().unwrap();

        let longer = TrainConfig { n_epoch: 4, ..cfg };
        TrainUseCase::new(longer).resume("latest").unwrap();

        let log = read_datapoints(dir.path().join("dp/again_1_2_compact.csv")).unwrap();
        assert_eq!(log.epochs(), vec![0, 1, 2, 2, 3, 4]);
    }

    #[test]
    fn test_resume_past_end_rejected() {
        let dir  = tempdir().unwrap();
        let data = dir.path().join("feature.csv");
        write_table(&data);

        let cfg = TrainConfig {
            model_name:     "short".into(),
            data_file:      data.display().to_string(),
            n_feat:         3,
            n_epoch:        2,
            n_train:        20,
            checkpoint_dir: dir.path().join("ckpt").display().to_string(),
            datapoint_dir:  dir.path().join("dp").display().to_string(),
            ..TrainConfig::default()
        };
        TrainUseCase::new(cfg.clone()).execute().unwrap();

        let shorter = TrainConfig { n_epoch: 1, ..cfg };
        assert!(TrainUseCase::new(shorter).resume("short-2").is_err());
    }
}
