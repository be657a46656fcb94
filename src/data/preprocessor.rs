// ============================================================
// Layer 4: Feature Normaliser
// ============================================================
// Z-score normalisation applied to every feature column before
// the table is split:
//
//   x' = (x - mean) / std
//
// `std` is the sample standard deviation (n - 1 denominator),
// so after normalisation every column has mean 0 and sample
// variance 1. Labels are never touched.
//
// A column with zero spread (or a table with a single row) has
// no meaningful scale; such columns are only centred.
//
// Reference: Rust Book §13 (Iterators)

use crate::domain::table::FeatureTable;

/// Per-column statistics fitted on a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    /// Mean of each feature column
    pub means: Vec<f64>,

    /// Sample standard deviation of each feature column
    pub stds: Vec<f64>,
}

impl Normalizer {
    /// Compute column means and sample standard deviations.
    pub fn fit(table: &FeatureTable) -> Self {
        let n = table.rows() as f64;
        let mut means = Vec::with_capacity(table.n_feat);
        let mut stds  = Vec::with_capacity(table.n_feat);

        for col in 0..table.n_feat {
            let mean = if n > 0.0 {
                table.column(col).map(f64::from).sum::<f64>() / n
            } else {
                0.0
            };

            let std = if n > 1.0 {
                let ss: f64 = table
                    .column(col)
                    .map(|x| (f64::from(x) - mean).powi(2))
                    .sum();
                (ss / (n - 1.0)).sqrt()
            } else {
                0.0
            };

            means.push(mean);
            stds.push(std);
        }

        Self { means, stds }
    }

    /// Normalise `table` in place with the fitted statistics.
    pub fn normalize(&self, table: &mut FeatureTable) {
        let n_feat = table.n_feat;
        for (i, x) in table.features.iter_mut().enumerate() {
            let col = i % n_feat;
            let std = self.stds[col];
            let centred = f64::from(*x) - self.means[col];
            *x = if std > 0.0 { (centred / std) as f32 } else { centred as f32 };
        }

        tracing::debug!("Normalised {} feature columns", n_feat);
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FeatureTable {
        let mut t = FeatureTable::new(3);
        t.push_row(&[1.0, 10.0, 7.0], 0.0);
        t.push_row(&[2.0, 30.0, 7.0], 1.0);
        t.push_row(&[3.0, 20.0, 7.0], 0.0);
        t.push_row(&[6.0, 60.0, 7.0], 1.0);
        t
    }

    fn mean_and_variance(t: &FeatureTable, col: usize) -> (f64, f64) {
        let xs: Vec<f64> = t.column(col).map(f64::from).collect();
        let n    = xs.len() as f64;
        let mean = xs.iter().sum::<f64>() / n;
        let var  = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var)
    }

    #[test]
    fn test_columns_have_zero_mean_unit_variance() {
        let mut t = table();
        Normalizer::fit(&t).normalize(&mut t);

        for col in 0..2 {
            let (mean, var) = mean_and_variance(&t, col);
            assert!(mean.abs() < 1e-6, "column {col} mean {mean}");
            assert!((var - 1.0).abs() < 1e-5, "column {col} variance {var}");
        }
    }

    #[test]
    fn test_uses_sample_standard_deviation() {
        let n = Normalizer::fit(&table());
        assert!((n.means[0] - 3.0).abs() < 1e-12);
        // sum of squares 14 over n - 1 = 3
        assert!((n.stds[0] - (14.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_only_centred() {
        let mut t = table();
        Normalizer::fit(&t).normalize(&mut t);
        assert!(t.column(2).all(|x| x == 0.0));
    }

    #[test]
    fn test_labels_untouched() {
        let mut t = table();
        Normalizer::fit(&t).normalize(&mut t);
        assert_eq!(t.labels, vec![0.0, 1.0, 0.0, 1.0]);
    }
}
