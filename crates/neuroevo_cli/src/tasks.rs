//! Built-in tasks for the runner.
//!
//! The network has no bias terms, so every task appends a constant 1.0 input.

use clap::ValueEnum;
use core::f64::consts::PI;
use neuroevo_core::inputs::{denormalize, normalize};
use neuroevo_core::{NetworkError, NeuralNetwork, Topology};

const SINE_SAMPLES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Task {
    /// Two-bit exclusive or
    Xor,
    /// One period of a sine wave, rescaled into the sigmoid range
    Sine,
}

/// One supervised example.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

impl Task {
    pub fn input_count(self) -> usize {
        match self {
            Task::Xor => 3,
            Task::Sine => 2,
        }
    }

    pub fn output_count(self) -> usize {
        1
    }

    /// `base` with inputs and outputs replaced by this task's.
    pub fn topology(self, base: Topology) -> Topology {
        Topology {
            inputs: self.input_count(),
            outputs: self.output_count(),
            ..base
        }
    }

    pub fn cases(self) -> Vec<Case> {
        match self {
            Task::Xor => [(0.0, 0.0, 0.0), (0.0, 1.0, 1.0), (1.0, 0.0, 1.0), (1.0, 1.0, 0.0)]
                .into_iter()
                .map(|(a, b, y)| Case {
                    input: vec![a, b, 1.0],
                    target: vec![y],
                })
                .collect(),
            Task::Sine => (0..SINE_SAMPLES)
                .map(|i| {
                    let theta = 2.0 * PI * i as f64 / (SINE_SAMPLES - 1) as f64;
                    Case {
                        input: vec![normalize(theta, 0.0, 2.0 * PI), 1.0],
                        target: vec![denormalize(theta.sin(), 0.0, 1.0)],
                    }
                })
                .collect(),
        }
    }

    /// Number of cases minus the summed squared error; the maximum is the case count.
    pub fn fitness(self, network: &mut NeuralNetwork) -> f64 {
        let cases = self.cases();
        let error: f64 = cases
            .iter()
            .map(|case| match network.forward(&case.input) {
                Ok(out) => out
                    .iter()
                    .zip(&case.target)
                    .map(|(o, t)| (t - o).powi(2))
                    .sum::<f64>(),
                Err(_) => self.output_count() as f64,
            })
            .sum();
        cases.len() as f64 - error
    }

    /// Mean squared error over all cases.
    pub fn mean_squared_error(self, network: &mut NeuralNetwork) -> Result<f64, NetworkError> {
        let cases = self.cases();
        let mut total = 0.0;
        for case in &cases {
            network.forward(&case.input)?;
            total += network.squared_error(&case.target)?;
        }
        Ok(2.0 * total / cases.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_shapes_match_topology() {
        for task in [Task::Xor, Task::Sine] {
            let topology = task.topology(Topology::default());
            for case in task.cases() {
                assert_eq!(case.input.len(), topology.inputs);
                assert_eq!(case.target.len(), topology.outputs);
                assert!(case.target.iter().all(|t| (0.0..=1.0).contains(t)));
                assert!(case.input.iter().all(|x| (-1.0..=1.0).contains(x)));
            }
        }
    }

    #[test]
    fn test_zero_network_fitness() {
        let mut net = NeuralNetwork::zeroed(Task::Xor.topology(Topology::default())).unwrap();
        // Every output is 0.5, so each case costs 0.25
        assert!((Task::Xor.fitness(&mut net) - 3.0).abs() < 1e-12);
        assert!((Task::Xor.mean_squared_error(&mut net).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_mse_reports_shape_errors() {
        // Two outputs against single-target cases
        let mut net = NeuralNetwork::zeroed(Topology::new(1, 3, 4, 2)).unwrap();
        assert!(matches!(
            Task::Xor.mean_squared_error(&mut net),
            Err(NetworkError::ShapeMismatch { .. })
        ));
    }
}
