// ============================================================
// Layer 3: Feature Table Domain Type
// ============================================================
// The only "entity" the trainer knows about: a dense matrix of
// features with one binary label per row.
//
// Features are stored row-major in a single Vec so a row can be
// handed to the tensor engine as a slice without copying:
//
//   features = [r0_f0, r0_f1, ..., r0_fN, r1_f0, ...]
//   labels   = [r0_y,  r1_y,  ...]

use serde::{Deserialize, Serialize};

/// A feature matrix with `n_feat` columns and one label per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    /// Number of feature columns per row
    pub n_feat: usize,

    /// Row-major feature values, `rows() * n_feat` long
    pub features: Vec<f32>,

    /// One label (0.0 or 1.0) per row
    pub labels: Vec<f32>,
}

impl FeatureTable {
    /// Create an empty table with the given width
    pub fn new(n_feat: usize) -> Self {
        Self { n_feat, features: Vec::new(), labels: Vec::new() }
    }

    /// Append one row. The caller guarantees `features.len() == n_feat`.
    pub fn push_row(&mut self, features: &[f32], label: f32) {
        debug_assert_eq!(features.len(), self.n_feat);
        self.features.extend_from_slice(features);
        self.labels.push(label);
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature values of row `i`
    pub fn row(&self, i: usize) -> &[f32] {
        &self.features[i * self.n_feat..(i + 1) * self.n_feat]
    }

    /// Label of row `i`
    pub fn label(&self, i: usize) -> f32 {
        self.labels[i]
    }

    /// All values of feature column `col`, top to bottom
    pub fn column(&self, col: usize) -> impl Iterator<Item = f32> + '_ {
        self.features.iter().skip(col).step_by(self.n_feat.max(1)).copied()
    }

    /// Build a new table from the rows at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut out = Self::new(self.n_feat);
        for &i in indices {
            out.push_row(self.row(i), self.label(i));
        }
        out
    }
}

/// The training rows and the held-out rows of one dataset.
#[derive(Debug, Clone)]
pub struct Partition {
    pub train: FeatureTable,
    pub test:  FeatureTable,
}

impl Partition {
    pub fn total_rows(&self) -> usize {
        self.train.rows() + self.test.rows()
    }
}
