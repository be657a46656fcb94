// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust structs and traits describing the data the
// trainer works on. Nothing in here touches burn or the disk.
//
//   table.rs   - FeatureTable (row-major features + labels)
//                and Partition (train / test halves)
//   traits.rs  - TableSource, implemented by the CSV loader
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A dense feature matrix with one label per row
pub mod table;

// Core abstractions that other layers implement
pub mod traits;
