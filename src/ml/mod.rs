// ============================================================
// Layer 5: ML / Model Layer (burn)
// ============================================================
// All burn-specific model code lives here. burn is the tensor
// engine: it owns the matrix multiplies, automatic
// differentiation (`loss.backward()`), the gradient-descent
// optimiser and the record format used for checkpoints.
//
//   model.rs      - the sigmoid MLP, its BCE loss and parameter
//                   snapshots for logging
//
//   trainer.rs    - the epoch loop: one SGD step per training
//                   row, interval datapoints, printing and
//                   checkpoints
//
//   inferencer.rs - rounded predictions and accuracy on the
//                   inner (non-autodiff) backend
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

use burn::backend::{Autodiff, NdArray};

/// Sigmoid MLP architecture and loss
pub mod model;

/// Training loop with datapoint logging and checkpointing
pub mod trainer;

/// Prediction and accuracy
pub mod inferencer;

/// Backend used for training (records gradients)
pub type TrainBackend = Autodiff<NdArray>;

/// Backend used for evaluation and prediction
pub type EvalBackend = NdArray;
