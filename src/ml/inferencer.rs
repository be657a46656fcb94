// ============================================================
// Layer 5: Inferencer
// ============================================================
use anyhow::Result;
use burn::prelude::*;

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::RowBatcher;
use crate::domain::table::FeatureTable;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::Mlp;
use crate::ml::EvalBackend;

pub struct Inferencer<B: Backend> {
    model:   Mlp<B>,
    batcher: RowBatcher<B>,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: Mlp<B>, device: B::Device) -> Self {
        Self { model, batcher: RowBatcher::new(device) }
    }

    /// Raw sigmoid outputs, one per row
    pub fn probabilities(&self, table: &FeatureTable) -> Vec<f32> {
        if table.is_empty() {
            return Vec::new();
        }
        self.model
            .forward(self.batcher.features(table))
            .into_data()
            .iter::<f32>()
            .collect()
    }

    /// Rounded predictions for every row of `table`. When `labels`
    /// are given the accuracy against them is logged as well.
    pub fn predict(&self, table: &FeatureTable, labels: Option<&[f32]>) -> Vec<f32> {
        let predictions = classify(&self.probabilities(table));

        if let Some(labels) = labels {
            tracing::info!("Accuracy: {:.4}", accuracy(&predictions, labels));
        }
        predictions
    }

    /// Fraction of rows whose rounded prediction equals the label
    pub fn accuracy_on(&self, table: &FeatureTable) -> f64 {
        accuracy(&self.predict(table, None), &table.labels)
    }
}

impl Inferencer<EvalBackend> {
    /// Rebuild the architecture described by `cfg` and load the
    /// parameters of checkpoint `name` into it.
    pub fn from_checkpoint(ckpt: &CheckpointManager, cfg: &TrainConfig, name: &str) -> Result<Self> {
        let device = Default::default();
        let model: Mlp<EvalBackend> = cfg.model_config().init(&device);
        let model = ckpt.load_model(model, name, &device)?;
        tracing::info!("Model loaded from checkpoint '{}'", name);
        Ok(Self::new(model, device))
    }
}

/// Round each probability to a 0/1 class, half to even.
pub fn classify(probabilities: &[f32]) -> Vec<f32> {
    probabilities.iter().map(|p| p.round_ties_even()).collect()
}

/// Share of positions where `predictions` and `labels` agree.
/// An empty set has no defined accuracy and yields NaN.
pub fn accuracy(predictions: &[f32], labels: &[f32]) -> f64 {
    if labels.is_empty() {
        return f64::NAN;
    }
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(p, y)| p == y)
        .count();
    correct as f64 / labels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::MlpConfig;

    #[test]
    fn test_accuracy_counts_matches() {
        assert_eq!(accuracy(&[1.0, 0.0, 1.0, 1.0], &[1.0, 1.0, 1.0, 0.0]), 0.5);
        assert_eq!(accuracy(&[0.0], &[0.0]), 1.0);
        assert!(accuracy(&[], &[]).is_nan());
    }

    #[test]
    fn test_classify_rounds_half_to_even() {
        assert_eq!(classify(&[0.2, 0.5, 0.50001, 0.9]), vec![0.0, 0.0, 1.0, 1.0]);
        assert!(classify(&[]).is_empty());
    }

    #[test]
    fn test_predictions_are_rounded() {
        let device = Default::default();
        let model: Mlp<EvalBackend> = MlpConfig::new(2, 1, 3).init(&device);
        let inf = Inferencer::new(model, device);

        let mut t = FeatureTable::new(2);
        t.push_row(&[0.5, -1.0], 1.0);
        t.push_row(&[-2.0, 3.0], 0.0);
        t.push_row(&[1.0, 1.0], 1.0);

        let probs = inf.probabilities(&t);
        let preds = inf.predict(&t, Some(&t.labels));
        assert_eq!(preds.len(), 3);
        for (p, q) in probs.iter().zip(&preds) {
            assert!(*q == 0.0 || *q == 1.0);
            assert_eq!(*q, p.round_ties_even());
        }
        assert_eq!(inf.accuracy_on(&t), accuracy(&preds, &t.labels));
    }

    #[test]
    fn test_empty_table_predicts_nothing() {
        let device = Default::default();
        let model: Mlp<EvalBackend> = MlpConfig::new(2, 1, 3).init(&device);
        let inf = Inferencer::new(model, device);
        assert!(inf.predict(&FeatureTable::new(2), None).is_empty());
        assert!(inf.accuracy_on(&FeatureTable::new(2)).is_nan());
    }
}
