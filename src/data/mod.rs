// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything between the delimited file on disk and the tensors
// the trainer feeds to the model.
//
//   feature.csv
//       │
//       ▼
//   CsvTableLoader    → parses header, index column, features, label
//       │
//       ▼
//   shuffle_rows      → optional seeded row permutation
//       │
//       ▼
//   Normalizer        → z-score every feature column
//       │
//       ▼
//   split_at          → first n_train rows train, the rest test
//       │
//       ▼
//   RowBatcher        → single rows / whole partitions as tensors
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Loads a delimited feature table with the csv crate
pub mod loader;

/// Z-score normalisation of feature columns
pub mod preprocessor;

/// Seeded row shuffle and prefix/suffix split
pub mod splitter;

/// Turns table rows into burn tensors
pub mod batcher;

use anyhow::Result;

use crate::application::train_use_case::TrainConfig;
use crate::domain::{table::Partition, traits::TableSource};
use loader::CsvTableLoader;
use preprocessor::Normalizer;
use splitter::{shuffle_rows, split_at};

/// Run the full preparation pipeline for a training configuration:
/// load, optionally shuffle, normalise, split.
pub fn prepare(cfg: &TrainConfig) -> Result<Partition> {
    let loader = CsvTableLoader::new(&cfg.data_file, cfg.n_feat);
    let mut table = loader.load_table()?;

    if cfg.shuffle {
        table = shuffle_rows(table, cfg.seed);
    }

    let normalizer = Normalizer::fit(&table);
    normalizer.normalize(&mut table);

    let partition = split_at(table, cfg.n_train);
    tracing::info!(
        "Prepared {} rows: {} training, {} testing",
        partition.total_rows(),
        partition.train.rows(),
        partition.test.rows(),
    );
    Ok(partition)
}
