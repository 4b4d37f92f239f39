//! Fixed-topology feedforward network.
//!
//! One input layer (identity pass-through, no weights), one or more tanh
//! hidden layers, one sigmoid output layer. No biases.
//!
//! The genotype vector is every weight in a fixed traversal order: hidden
//! layer 0 (neuron-major, upstream-minor), then hidden layers 1..N-1, then
//! the output layer. [`NeuralNetwork::flatten_weights`] and
//! [`NeuralNetwork::unflatten_weights`] share that traversal and nothing
//! else may depend on a different one.

pub mod neuron;
pub mod topology;

pub use neuron::{Layer, Neuron};
pub use topology::Topology;

use core::iter;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::NetworkError;

/// Step size for gradient training.
pub const LEARNING_RATE: f64 = 0.1;

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of the logistic function, taken at the already-activated
/// value `y = sigmoid(x)`.
pub fn sigmoid_derivative(y: f64) -> f64 {
    y * (1.0 - y)
}

/// Derivative of tanh, taken at the already-activated value `y = tanh(x)`.
pub fn tanh_derivative(y: f64) -> f64 {
    1.0 - y * y
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeuralNetwork {
    input: Layer,
    hidden: Vec<Layer>,
    output: Layer,
}

impl NeuralNetwork {
    /// Randomly initialised network (Xavier scaling per neuron).
    pub fn new<R: Rng + ?Sized>(topology: Topology, rng: &mut R) -> Result<Self, NetworkError> {
        topology.validate()?;
        let input = Layer::new(topology.inputs, 0, rng);
        let hidden = (0..topology.hidden_layers)
            .map(|i| Layer::new(topology.hidden_width, topology.hidden_fan_in(i), rng))
            .collect();
        let output = Layer::new(topology.outputs, topology.hidden_width, rng);
        Ok(NeuralNetwork {
            input,
            hidden,
            output,
        })
    }

    /// Network with every weight set to zero.
    pub fn zeroed(topology: Topology) -> Result<Self, NetworkError> {
        topology.validate()?;
        let hidden = (0..topology.hidden_layers)
            .map(|i| Layer::zeroed(topology.hidden_width, topology.hidden_fan_in(i)))
            .collect();
        Ok(NeuralNetwork {
            input: Layer::zeroed(topology.inputs, 0),
            hidden,
            output: Layer::zeroed(topology.outputs, topology.hidden_width),
        })
    }

    /// Assemble a network from hand-built layers.
    ///
    /// Each layer's fan-in must equal the previous layer's width and all
    /// hidden layers must share one width. An empty `hidden` list is accepted
    /// here (the output then chains to the input layer) but such a network
    /// cannot run [`forward`](Self::forward).
    pub fn from_layers(input: Layer, hidden: Vec<Layer>, output: Layer) -> Result<Self, NetworkError> {
        if input.width() == 0 || output.width() == 0 {
            return Err(NetworkError::InvalidTopology(
                "input and output layers need at least one neuron".into(),
            ));
        }
        if input.fan_in() != 0 {
            return Err(NetworkError::InvalidTopology(
                "input layer neurons cannot carry weights".into(),
            ));
        }

        let mut upstream = input.width();
        for (i, layer) in hidden.iter().enumerate() {
            if layer.width() == 0 || layer.width() != hidden[0].width() {
                return Err(NetworkError::InvalidTopology(format!(
                    "hidden layer {i} has width {}, expected {}",
                    layer.width(),
                    hidden[0].width()
                )));
            }
            if layer.fan_in() != upstream {
                return Err(NetworkError::InvalidTopology(format!(
                    "hidden layer {i} has fan-in {}, upstream width is {upstream}",
                    layer.fan_in()
                )));
            }
            upstream = layer.width();
        }
        if output.fan_in() != upstream {
            return Err(NetworkError::InvalidTopology(format!(
                "output layer has fan-in {}, upstream width is {upstream}",
                output.fan_in()
            )));
        }

        Ok(NeuralNetwork {
            input,
            hidden,
            output,
        })
    }

    /// Run one forward pass and return the output activations.
    ///
    /// `inputs[i]` is written to input neuron `i`. A shorter slice leaves the
    /// trailing input neurons at their previous value; extra values are ignored.
    pub fn forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if self.hidden.is_empty() {
            return Err(NetworkError::EmptyTopology);
        }

        for (neuron, &value) in self.input.neurons_mut().iter_mut().zip(inputs) {
            neuron.set_output(value);
        }

        propagate(&self.input, &mut self.hidden[0], f64::tanh);
        for c in 1..self.hidden.len() {
            let (before, after) = self.hidden.split_at_mut(c);
            propagate(&before[c - 1], &mut after[0], f64::tanh);
        }
        let last = self.hidden.last().ok_or(NetworkError::EmptyTopology)?;
        propagate(last, &mut self.output, sigmoid);

        Ok(self.output.outputs())
    }

    /// Output activations from the most recent forward pass.
    pub fn outputs(&self) -> Vec<f64> {
        self.output.outputs()
    }

    /// One supervised step: forward, output error, back-propagation and
    /// weight update.
    ///
    /// The shape check runs first, so a mismatch leaves the network untouched.
    pub fn train(&mut self, input: &[f64], expected: &[f64]) -> Result<(), NetworkError> {
        self.check_output_shape(expected)?;
        self.forward(input)?;
        self.compute_error(expected)?;
        self.backpropagation()
    }

    /// Set each output neuron's error to `(expected - output) * sigmoid'(output)`.
    pub fn compute_error(&mut self, expected: &[f64]) -> Result<(), NetworkError> {
        self.check_output_shape(expected)?;
        for (neuron, &target) in self.output.neurons_mut().iter_mut().zip(expected) {
            let out = neuron.output();
            neuron.set_error((target - out) * sigmoid_derivative(out));
        }
        Ok(())
    }

    /// Push output errors back through the hidden layers, then move every
    /// weight by `LEARNING_RATE * downstream_error * upstream_output`.
    ///
    /// Errors are all computed before any weight moves.
    pub fn backpropagation(&mut self) -> Result<(), NetworkError> {
        let depth = self.hidden.len();
        if depth == 0 {
            return Err(NetworkError::EmptyTopology);
        }

        backpropagate_into(&mut self.hidden[depth - 1], &self.output);
        for c in (0..depth - 1).rev() {
            let (left, right) = self.hidden.split_at_mut(c + 1);
            backpropagate_into(&mut left[c], &right[0]);
        }

        apply_gradient(&mut self.output, &self.hidden[depth - 1]);
        for c in (1..depth).rev() {
            let (before, after) = self.hidden.split_at_mut(c);
            apply_gradient(&mut after[0], &before[c - 1]);
        }
        apply_gradient(&mut self.hidden[0], &self.input);
        Ok(())
    }

    /// Half the summed squared difference between `expected` and the current outputs.
    pub fn squared_error(&self, expected: &[f64]) -> Result<f64, NetworkError> {
        self.check_output_shape(expected)?;
        let sum: f64 = self
            .output
            .neurons()
            .iter()
            .zip(expected)
            .map(|(n, &t)| (t - n.output()).powi(2))
            .sum();
        Ok(sum / 2.0)
    }

    /// Genotype length, from layer shapes alone.
    pub fn weight_count(&self) -> usize {
        self.weighted_layers().map(Layer::weight_count).sum()
    }

    /// Every weight, in genotype order.
    pub fn flatten_weights(&self) -> Vec<f64> {
        let mut genome = Vec::with_capacity(self.weight_count());
        for layer in self.weighted_layers() {
            for neuron in layer.neurons() {
                genome.extend_from_slice(neuron.weights());
            }
        }
        genome
    }

    /// Overwrite every weight from a genotype vector.
    ///
    /// The vector must be exactly [`weight_count`](Self::weight_count) long;
    /// anything else is rejected with `CorruptGenotype` before any weight moves.
    pub fn unflatten_weights(&mut self, genome: &[f64]) -> Result<(), NetworkError> {
        let expected = self.weight_count();
        if genome.len() != expected {
            return Err(NetworkError::CorruptGenotype {
                expected,
                actual: genome.len(),
            });
        }

        let mut cursor = 0;
        let layers = self.hidden.iter_mut().chain(iter::once(&mut self.output));
        for layer in layers {
            for neuron in layer.neurons_mut() {
                let weights = neuron.weights_mut();
                let end = cursor + weights.len();
                weights.copy_from_slice(&genome[cursor..end]);
                cursor = end;
            }
        }
        Ok(())
    }

    /// Shape of this network. `hidden_width` is 0 when there are no hidden layers.
    pub fn topology(&self) -> Topology {
        Topology {
            hidden_layers: self.hidden.len(),
            inputs: self.input.width(),
            hidden_width: self.hidden.first().map(Layer::width).unwrap_or(0),
            outputs: self.output.width(),
        }
    }

    pub fn input_layer(&self) -> &Layer {
        &self.input
    }

    pub fn hidden_layers(&self) -> &[Layer] {
        &self.hidden
    }

    pub fn output_layer(&self) -> &Layer {
        &self.output
    }

    /// All layers, input first.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        iter::once(&self.input)
            .chain(self.hidden.iter())
            .chain(iter::once(&self.output))
    }

    pub fn hidden_layer_count(&self) -> usize {
        self.hidden.len()
    }

    pub fn input_count(&self) -> usize {
        self.input.width()
    }

    pub fn output_count(&self) -> usize {
        self.output.width()
    }

    fn weighted_layers(&self) -> impl Iterator<Item = &Layer> {
        self.hidden.iter().chain(iter::once(&self.output))
    }

    fn check_output_shape(&self, expected: &[f64]) -> Result<(), NetworkError> {
        if expected.len() != self.output.width() {
            return Err(NetworkError::ShapeMismatch {
                expected: self.output.width(),
                actual: expected.len(),
            });
        }
        Ok(())
    }
}

fn propagate(upstream: &Layer, layer: &mut Layer, activation: fn(f64) -> f64) {
    for neuron in layer.neurons_mut() {
        let sum = neuron.weighted_sum(upstream);
        neuron.set_output(activation(sum));
    }
}

/// Hidden-layer error: downstream errors weighted by the connecting weights,
/// scaled by tanh' at this neuron's output.
fn backpropagate_into(layer: &mut Layer, downstream: &Layer) {
    for (i, neuron) in layer.neurons_mut().iter_mut().enumerate() {
        let signal: f64 = downstream
            .neurons()
            .iter()
            .map(|d| d.error() * d.weights()[i])
            .sum();
        neuron.set_error(signal * tanh_derivative(neuron.output()));
    }
}

fn apply_gradient(layer: &mut Layer, upstream: &Layer) {
    for neuron in layer.neurons_mut() {
        let error = neuron.error();
        for (w, up) in neuron.weights_mut().iter_mut().zip(upstream.neurons()) {
            *w += LEARNING_RATE * error * up.output();
        }
    }
}
