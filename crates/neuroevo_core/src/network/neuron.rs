use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::random::xavier_weight;

/// A single unit: one weight per upstream neuron, plus the last activation
/// and the last back-propagated error signal.
///
/// Input-layer neurons have fan-in 0 and only carry `output` (the raw input).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    weights: Vec<f64>,
    output: f64,
    error: f64,
}

impl Neuron {
    /// Neuron with `fan_in` Xavier-initialised weights.
    pub fn new<R: Rng + ?Sized>(fan_in: usize, rng: &mut R) -> Self {
        Neuron {
            weights: (0..fan_in).map(|_| xavier_weight(rng, fan_in)).collect(),
            output: 0.0,
            error: 0.0,
        }
    }

    /// Neuron with `fan_in` weights, all zero.
    pub fn zeroed(fan_in: usize) -> Self {
        Self::with_weights(vec![0.0; fan_in])
    }

    /// Neuron with explicit weights.
    pub fn with_weights(weights: Vec<f64>) -> Self {
        Neuron {
            weights,
            output: 0.0,
            error: 0.0,
        }
    }

    pub fn fan_in(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Post-activation value from the most recent forward pass.
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Error signal from the most recent `compute_error`/`backpropagation`.
    pub fn error(&self) -> f64 {
        self.error
    }

    pub(crate) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    pub(crate) fn set_output(&mut self, value: f64) {
        self.output = value;
    }

    pub(crate) fn set_error(&mut self, value: f64) {
        self.error = value;
    }

    /// Weighted sum of `upstream` outputs.
    pub(crate) fn weighted_sum(&self, upstream: &Layer) -> f64 {
        self.weights
            .iter()
            .zip(upstream.neurons.iter())
            .map(|(w, n)| w * n.output)
            .sum()
    }
}

/// Ordered group of neurons sharing one fan-in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    neurons: Vec<Neuron>,
}

impl Layer {
    /// `width` randomly initialised neurons, each with `fan_in` weights.
    pub fn new<R: Rng + ?Sized>(width: usize, fan_in: usize, rng: &mut R) -> Self {
        Layer {
            neurons: (0..width).map(|_| Neuron::new(fan_in, rng)).collect(),
        }
    }

    pub fn zeroed(width: usize, fan_in: usize) -> Self {
        Layer {
            neurons: (0..width).map(|_| Neuron::zeroed(fan_in)).collect(),
        }
    }

    /// Build from explicit neurons. Returns `None` if their fan-ins differ.
    pub fn from_neurons(neurons: Vec<Neuron>) -> Option<Self> {
        let fan_in = neurons.first().map(Neuron::fan_in).unwrap_or(0);
        if neurons.iter().any(|n| n.fan_in() != fan_in) {
            return None;
        }
        Some(Layer { neurons })
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn neuron(&self, index: usize) -> Option<&Neuron> {
        self.neurons.get(index)
    }

    pub fn width(&self) -> usize {
        self.neurons.len()
    }

    /// Fan-in shared by every neuron (0 for an empty or input layer).
    pub fn fan_in(&self) -> usize {
        self.neurons.first().map(Neuron::fan_in).unwrap_or(0)
    }

    /// Number of weights held by this layer.
    pub fn weight_count(&self) -> usize {
        self.width() * self.fan_in()
    }

    /// Current outputs, in neuron order.
    pub fn outputs(&self) -> Vec<f64> {
        self.neurons.iter().map(Neuron::output).collect()
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }
}
