// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Persistence concerns shared by the use cases:
//
//   checkpoint.rs - model parameters through burn's recorder,
//                   plus the latest-checkpoint pointer and the
//                   run's TrainConfig as JSON
//
//   metrics.rs    - datapoint CSV: parameter summaries and
//                   accuracy per logged epoch, in compact or
//                   detailed layout, and reading it back
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Datapoint CSV logger
pub mod metrics;
