// ============================================================
// Layer 3: Core Traits
// ============================================================
// The application layer loads data through TableSource so it
// never needs to know the table came from a delimited file.
//
// Implementations:
//   - CsvTableLoader -> header row, index column, N features, label
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::table::FeatureTable;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a labelled feature table.
pub trait TableSource {
    /// Load every row available from this source.
    fn load_table(&self) -> Result<FeatureTable>;
}
