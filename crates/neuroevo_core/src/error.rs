use thiserror::Error;

/// Failures raised by network construction, propagation and genotype loading.
///
/// None of these are retried internally. A failed call leaves the network in
/// the state it was in before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// A layer or neuron count was zero at construction, or hand-built layers
    /// do not chain (a layer's fan-in differs from the previous layer's width)
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Forward pass attempted on a network without hidden layers
    #[error("network has no hidden layers")]
    EmptyTopology,

    /// Expected-output vector length differs from the output layer size
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Genotype length disagrees with the topology-derived weight count
    #[error("corrupt genotype: topology needs {expected} weights, got {actual}")]
    CorruptGenotype { expected: usize, actual: usize },
}

/// Failures raised by genotype stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary record ended before its four-field header was complete
    #[error("binary genotype truncated: {0} bytes")]
    Truncated(usize),

    #[error(transparent)]
    Network(#[from] NetworkError),
}
