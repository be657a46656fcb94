// ============================================================
// Layer 4: Row Batcher
// ============================================================
// Converts table rows into burn tensors on a target device.
//
// Training feeds one sample at a time, so the common shapes are:
//   row(features)   → [1, n_feat]
//   label(y)        → [1, 1]
// Accuracy evaluation feeds a whole partition at once:
//   features(table) → [rows, n_feat]
//
// B is the burn Backend, generic so the same batcher serves the
// autodiff backend during training and the inner backend during
// evaluation.
//
// Reference: Burn Book §4 (Batcher)

use burn::{prelude::*, tensor::TensorData};

use crate::domain::table::FeatureTable;

/// Holds the device tensors are created on.
#[derive(Clone, Debug)]
pub struct RowBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> RowBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// A single sample as a `[1, n_feat]` tensor
    pub fn row(&self, features: &[f32]) -> Tensor<B, 2> {
        let data = TensorData::new(features.to_vec(), [1, features.len()]);
        Tensor::<B, 2>::from_data(data, &self.device)
    }

    /// A single label as a `[1, 1]` tensor
    pub fn label(&self, y: f32) -> Tensor<B, 2> {
        Tensor::<B, 2>::from_data(TensorData::new(vec![y], [1, 1]), &self.device)
    }

    /// Every row of `table` stacked into `[rows, n_feat]`
    pub fn features(&self, table: &FeatureTable) -> Tensor<B, 2> {
        let data = TensorData::new(table.features.clone(), [table.rows(), table.n_feat]);
        Tensor::<B, 2>::from_data(data, &self.device)
    }

    /// Every label of `table` as a `[rows, 1]` column
    pub fn labels(&self, table: &FeatureTable) -> Tensor<B, 2> {
        let data = TensorData::new(table.labels.clone(), [table.rows(), 1]);
        Tensor::<B, 2>::from_data(data, &self.device)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_tensor_shapes() {
        let mut t = FeatureTable::new(3);
        t.push_row(&[1.0, 2.0, 3.0], 1.0);
        t.push_row(&[4.0, 5.0, 6.0], 0.0);

        let b = RowBatcher::<NdArray>::new(Default::default());
        assert_eq!(b.row(t.row(1)).dims(), [1, 3]);
        assert_eq!(b.label(1.0).dims(),    [1, 1]);
        assert_eq!(b.features(&t).dims(),  [2, 3]);
        assert_eq!(b.labels(&t).dims(),    [2, 1]);

        let second: Vec<f32> = b.features(&t).into_data().iter::<f32>().skip(3).collect();
        assert_eq!(second, vec![4.0, 5.0, 6.0]);
    }
}
