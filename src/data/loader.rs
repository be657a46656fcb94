// ============================================================
// Layer 4: Feature Table Loader
// ============================================================
// Reads a delimited table with the csv crate.
//
// Expected layout (header row required):
//
//   ,f1,f2,...,fN,label
//   0,0.13,5.2,...,1.7,1
//   1,0.42,4.9,...,1.1,0
//
// The first column is a row index and is ignored. It is followed
// by exactly `n_feat` feature columns and a single label column.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::{Path, PathBuf};

use crate::domain::table::FeatureTable;
use crate::domain::traits::TableSource;

/// Loads a labelled feature table from a CSV file.
pub struct CsvTableLoader {
    /// Path to the delimited file
    path: PathBuf,

    /// Number of feature columns between the index and the label
    n_feat: usize,
}

impl CsvTableLoader {
    pub fn new(path: impl AsRef<Path>, n_feat: usize) -> Self {
        Self { path: path.as_ref().to_path_buf(), n_feat }
    }

    /// Parse one data record into (features, label)
    fn parse_record(&self, record: &StringRecord, line: usize) -> Result<(Vec<f32>, f32)> {
        // index + features + label
        let expected = self.n_feat + 2;
        if record.len() != expected {
            bail!(
                "'{}' record {}: expected {} columns (index, {} features, label), found {}",
                self.path.display(),
                line,
                expected,
                self.n_feat,
                record.len(),
            );
        }

        let mut values = Vec::with_capacity(self.n_feat + 1);
        for (col, field) in record.iter().enumerate().skip(1) {
            let v: f32 = field.parse().with_context(|| {
                format!(
                    "'{}' record {} column {}: '{}' is not a number",
                    self.path.display(),
                    line,
                    col,
                    field
                )
            })?;
            values.push(v);
        }

        // The last value is the label, everything before it is a feature
        let label = values.pop().unwrap_or_default();
        Ok((values, label))
    }
}

impl TableSource for CsvTableLoader {
    fn load_table(&self) -> Result<FeatureTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(&self.path)
            .with_context(|| {
                format!(
                    "Cannot open data file '{}'. Is the working directory correct?",
                    self.path.display()
                )
            })?;

        let mut table = FeatureTable::new(self.n_feat);

        for (i, record) in reader.records().enumerate() {
            // +2: one for the header, one for 1-based numbering
            let line = i + 2;
            let record = record
                .with_context(|| format!("Cannot read record {} of '{}'", line, self.path.display()))?;
            let (features, label) = self.parse_record(&record, line)?;
            table.push_row(&features, label);
        }

        if table.is_empty() {
            bail!("'{}' contains no data rows", self.path.display());
        }

        tracing::info!(
            "Loaded {} rows x {} features from '{}'",
            table.rows(),
            table.n_feat,
            self.path.display()
        );
        Ok(table)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_loads_features_and_labels() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("feature.csv");
        fs::write(&path, ",a,b,label\n0,1.5,2.0,1\n1,-3.0,4.25,0\n").unwrap();

        let table = CsvTableLoader::new(&path, 2).load_table().unwrap();
        assert_eq!(table.rows(), 2);
        assert_eq!(table.row(0), &[1.5, 2.0]);
        assert_eq!(table.row(1), &[-3.0, 4.25]);
        assert_eq!(table.labels, vec![1.0, 0.0]);
    }

    #[test]
    fn test_rejects_wrong_column_count() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("feature.csv");
        fs::write(&path, ",a,b,c,label\n0,1,2,3,1\n").unwrap();

        let err = CsvTableLoader::new(&path, 2).load_table().unwrap_err();
        assert!(err.to_string().contains("expected 4 columns"));
    }

    #[test]
    fn test_rejects_non_numeric_field() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("feature.csv");
        fs::write(&path, ",a,label\n0,abc,1\n").unwrap();

        assert!(CsvTableLoader::new(&path, 1).load_table().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = CsvTableLoader::new("definitely/not/here.csv", 3)
            .load_table()
            .unwrap_err();
        assert!(err.to_string().contains("Cannot open data file"));
    }

    #[test]
    fn test_empty_table_is_an_error() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("feature.csv");
        fs::write(&path, ",a,label\n").unwrap();

        assert!(CsvTableLoader::new(&path, 1).load_table().is_err());
    }
}
