// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// Workflow coordination only: no tensor math and no direct
// file formats here. Each use case wires the data, ml and infra
// layers together for one job.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Training from scratch or from a checkpoint
pub mod train_use_case;

// Predictions and accuracy from a saved checkpoint
pub mod predict_use_case;
