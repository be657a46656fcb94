// ============================================================
// Layer 5: MLP Architecture
// ============================================================
// The single supported topology:
//
//   X [rows, n_feat]
//     → h1 = sigmoid(X  · W1 + b1)        W1: [n_feat, n_node]
//     → h2 = sigmoid(h1 · W2 + b2)        W2: [n_node, n_node]
//       ...
//     → y  = sigmoid(hN · Wout + bout)    Wout: [n_node, 1]
//
// Biases are row vectors ([1, n_out]) broadcast over the batch.
// Weights are Glorot/Xavier-uniform from a seeded StdRng so the
// same seed always produces the same starting point; biases all
// start at `init_bias`.
//
// Loss is binary cross-entropy with a 1e-30 floor inside both
// logarithms to keep log(0) out of the graph.

use burn::{
    module::Param,
    prelude::*,
    tensor::{activation::sigmoid, TensorData},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Added inside every logarithm of the loss
pub const LOG_EPSILON: f64 = 1e-30;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct MlpConfig {
    pub n_feat:   usize,
    pub n_hidden: usize,
    pub n_node:   usize,
    #[config(default = 1.0)]
    pub init_bias: f64,
    #[config(default = 1234)]
    pub seed: u64,
}

/// Layer sizes of a network, enough to tell whether a set of
/// saved parameters fits a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlpShape {
    pub n_feat:   usize,
    pub n_hidden: usize,
    pub n_node:   usize,
}

impl MlpConfig {
    pub fn shape(&self) -> MlpShape {
        MlpShape { n_feat: self.n_feat, n_hidden: self.n_hidden, n_node: self.n_node }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let hidden = (0..self.n_hidden)
            .map(|i| {
                let n_in = if i == 0 { self.n_feat } else { self.n_node };
                SigmoidLayer::init(&mut rng, n_in, self.n_node, self.init_bias, device)
            })
            .collect();
        let output = SigmoidLayer::init(&mut rng, self.n_node, 1, self.init_bias, device);

        Mlp { hidden, output }
    }
}

/// One fully-connected layer followed by a sigmoid.
#[derive(Module, Debug)]
pub struct SigmoidLayer<B: Backend> {
    /// [n_in, n_out]
    pub weight: Param<Tensor<B, 2>>,
    /// [1, n_out]
    pub bias: Param<Tensor<B, 2>>,
}

impl<B: Backend> SigmoidLayer<B> {
    fn init(
        rng:       &mut StdRng,
        n_in:      usize,
        n_out:     usize,
        init_bias: f64,
        device:    &B::Device,
    ) -> Self {
        let limit = (6.0 / (n_in + n_out) as f64).sqrt();
        let values: Vec<f32> = (0..n_in * n_out)
            .map(|_| rng.gen_range(-limit..limit) as f32)
            .collect();

        let weight = Tensor::<B, 2>::from_data(TensorData::new(values, [n_in, n_out]), device);
        let bias   = Tensor::<B, 2>::full([1, n_out], init_bias, device);

        Self {
            weight: Param::from_tensor(weight),
            bias:   Param::from_tensor(bias),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        sigmoid(x.matmul(self.weight.val()) + self.bias.val())
    }

    /// Host copy of this layer's parameters, row-major.
    pub fn params(&self) -> LayerParams {
        LayerParams {
            weights: self.weight.val().into_data().iter::<f32>().collect(),
            biases:  self.bias.val().into_data().iter::<f32>().collect(),
        }
    }
}

#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    pub hidden: Vec<SigmoidLayer<B>>,
    pub output: SigmoidLayer<B>,
}

impl<B: Backend> Mlp<B> {
    /// x: [rows, n_feat] → probabilities [rows, 1]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let h = self.hidden.iter().fold(x, |h, layer| layer.forward(h));
        self.output.forward(h)
    }

    pub fn forward_loss(&self, x: Tensor<B, 2>, y: Tensor<B, 2>) -> Tensor<B, 1> {
        binary_cross_entropy(self.forward(x), y)
    }

    /// Layer sizes read off the parameter tensors.
    pub fn shape(&self) -> MlpShape {
        let [n_node, _] = self.output.weight.val().dims();
        let n_feat = self
            .hidden
            .first()
            .map_or(n_node, |layer| layer.weight.val().dims()[0]);
        MlpShape { n_feat, n_hidden: self.hidden.len(), n_node }
    }

    /// Every layer's parameters, hidden layers first, output last.
    pub fn snapshot(&self) -> ParameterSnapshot {
        let mut layers: Vec<LayerParams> = self.hidden.iter().map(|l| l.params()).collect();
        layers.push(self.output.params());
        ParameterSnapshot { layers }
    }
}

/// -Σ [ y·ln(p + ε) + (1 - y)·ln(1 - p + ε) ]
pub fn binary_cross_entropy<B: Backend>(pred: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
    let pos = target.clone() * pred.clone().add_scalar(LOG_EPSILON).log();
    let neg = target.neg().add_scalar(1.0)
        * pred.neg().add_scalar(1.0).add_scalar(LOG_EPSILON).log();
    (pos + neg).sum().neg()
}

// ─── Parameter Snapshots ──────────────────────────────────────────────────────

/// Flattened weights and biases of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerParams {
    pub weights: Vec<f32>,
    pub biases:  Vec<f32>,
}

impl LayerParams {
    pub fn mean_weight(&self) -> f64 {
        mean(&self.weights)
    }

    pub fn mean_bias(&self) -> f64 {
        mean(&self.biases)
    }
}

/// Host-side copy of every parameter in the network.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSnapshot {
    /// Hidden layers in order, then the output layer
    pub layers: Vec<LayerParams>,
}

fn mean(xs: &[f32]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().map(|&x| f64::from(x)).sum::<f64>() / xs.len() as f64
}
