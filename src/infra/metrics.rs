// ============================================================
// Layer 6: Datapoint Logger
// ============================================================
// Records parameter summaries and accuracy to a CSV file so the
// run can be plotted offline.
//
// Output file:
//   {datapoint_dir}/{model_name}_{n_hidden}_{n_node}_{compact|detailed}.csv
//
// Every file starts with `epoch` and ends with
// `training_acc,testing_acc`. The columns in between depend on
// the layout:
//
//   Compact  - mean of each layer's weights and biases
//     epoch,W1,b1,W2,b2,Wout,bout,training_acc,testing_acc
//
//   Detailed - every individual parameter
//     W{layer}_{destination}_{origin}   e.g. W1_3_2
//     b{layer}_{neuron}                 e.g. b1_3
//     Wout_1_{origin}, bout_1
//
//     Weights are listed in row-major order of W (origin outer,
//     destination inner), which is the order the parameter
//     snapshot flattens them in.
//
// The file is opened in append mode so a resumed run continues
// the same log; the header is only written for a fresh run.
//
// Reference: csv crate documentation
//            Rust Book §12 (I/O and File Handling)

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use crate::ml::model::ParameterSnapshot;

/// Which parameter columns the datapoint file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Compact,
    Detailed,
}

impl Layout {
    pub fn from_compact(compact: bool) -> Self {
        if compact { Layout::Compact } else { Layout::Detailed }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Layout::Compact  => "compact",
            Layout::Detailed => "detailed",
        }
    }
}

/// Network shape plus layout: everything needed to name the columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatapointSchema {
    pub n_feat:   usize,
    pub n_hidden: usize,
    pub n_node:   usize,
    pub layout:   Layout,
}

impl DatapointSchema {
    /// Column names, `epoch` first and the two accuracies last.
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["epoch".to_string()];

        match self.layout {
            Layout::Compact => {
                for layer in 1..=self.n_hidden {
                    header.push(format!("W{layer}"));
                    header.push(format!("b{layer}"));
                }
                header.push("Wout".into());
                header.push("bout".into());
            }
            Layout::Detailed => {
                for layer in 1..=self.n_hidden {
                    let n_in = if layer == 1 { self.n_feat } else { self.n_node };
                    for origin in 1..=n_in {
                        for dest in 1..=self.n_node {
                            header.push(format!("W{layer}_{dest}_{origin}"));
                        }
                    }
                    for neuron in 1..=self.n_node {
                        header.push(format!("b{layer}_{neuron}"));
                    }
                }
                for origin in 1..=self.n_node {
                    header.push(format!("Wout_1_{origin}"));
                }
                header.push("bout_1".into());
            }
        }

        header.push("training_acc".into());
        header.push("testing_acc".into());
        header
    }

    /// One row of values matching `header()`.
    pub fn row(
        &self,
        epoch:     usize,
        snapshot:  &ParameterSnapshot,
        train_acc: f64,
        test_acc:  f64,
    ) -> Vec<String> {
        let mut row = vec![epoch.to_string()];

        for layer in &snapshot.layers {
            match self.layout {
                Layout::Compact => {
                    row.push(layer.mean_weight().to_string());
                    row.push(layer.mean_bias().to_string());
                }
                Layout::Detailed => {
                    row.extend(layer.weights.iter().map(|w| w.to_string()));
                    row.extend(layer.biases.iter().map(|b| b.to_string()));
                }
            }
        }

        row.push(train_acc.to_string());
        row.push(test_acc.to_string());
        row
    }
}

/// `{dir}/{model_name}_{n_hidden}_{n_node}_{compact|detailed}.csv`
pub fn datapoint_path(dir: impl AsRef<Path>, model_name: &str, schema: &DatapointSchema) -> PathBuf {
    dir.as_ref().join(format!(
        "{}_{}_{}_{}.csv",
        model_name,
        schema.n_hidden,
        schema.n_node,
        schema.layout.suffix()
    ))
}

/// Appends datapoint rows to a CSV file.
pub struct DatapointLogger {
    writer:   Writer<File>,
    schema:   DatapointSchema,
    csv_path: PathBuf,
}

impl DatapointLogger {
    /// Open `path` for appending, creating parent directories.
    /// Writes the header row when `write_header` is set.
    pub fn open(path: impl Into<PathBuf>, schema: DatapointSchema, write_header: bool) -> Result<Self> {
        let csv_path = path.into();
        if let Some(parent) = csv_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&csv_path)
            .with_context(|| format!("Cannot open datapoint file '{}'", csv_path.display()))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if write_header {
            writer.write_record(schema.header())?;
            writer.flush()?;
            tracing::debug!("Wrote datapoint header to '{}'", csv_path.display());
        }

        Ok(Self { writer, schema, csv_path })
    }

    /// Append one row and flush it to disk.
    pub fn log(
        &mut self,
        epoch:     usize,
        snapshot:  &ParameterSnapshot,
        train_acc: f64,
        test_acc:  f64,
    ) -> Result<()> {
        let row = self.schema.row(epoch, snapshot, train_acc, test_acc);
        let width = self.schema.header().len();
        if row.len() != width {
            bail!(
                "datapoint row for epoch {} has {} values but the header has {} columns",
                epoch,
                row.len(),
                width
            );
        }

        self.writer.write_record(&row)?;
        self.writer.flush()?;

        tracing::debug!(
            "Logged epoch {} datapoint: training_acc={:.4}, testing_acc={:.4}",
            epoch,
            train_acc,
            test_acc,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Reading a log back ───────────────────────────────────────────────────────

/// A datapoint file loaded back into memory.
#[derive(Debug, Clone)]
pub struct Datapoints {
    pub header: Vec<String>,
    pub rows:   Vec<Vec<f64>>,
}

impl Datapoints {
    /// Names of the parameter columns (everything but epoch and accuracies)
    pub fn parameter_columns(&self) -> &[String] {
        let n = self.header.len();
        if n < 3 { &[] } else { &self.header[1..n - 2] }
    }

    pub fn epochs(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r[0] as usize).collect()
    }

    /// (training_acc, testing_acc) per row
    pub fn accuracies(&self) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .map(|r| (r[r.len() - 2], r[r.len() - 1]))
            .collect()
    }
}

pub fn read_datapoints(path: impl AsRef<Path>) -> Result<Datapoints> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Cannot open datapoint file '{}'", path.display()))?;

    let header: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if header.len() < 3 {
        bail!("'{}' is not a datapoint file", path.display());
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Cannot read row {} of '{}'", i + 1, path.display()))?;
        let values = record
            .iter()
            .map(|v| v.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Row {} of '{}' is not numeric", i + 1, path.display()))?;
        rows.push(values);
    }

    Ok(Datapoints { header, rows })
}
