use serde::{Deserialize, Serialize};

use crate::error::NetworkError;

/// Shape of a network: `hidden_layers` hidden layers of `hidden_width`
/// neurons between an input layer and an output layer.
///
/// Fixed at construction; the GA never changes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topology {
    pub hidden_layers: usize,
    pub inputs: usize,
    pub hidden_width: usize,
    pub outputs: usize,
}

impl Default for Topology {
    /// One hidden layer of 4, five inputs, two outputs.
    fn default() -> Self {
        Self::new(1, 5, 4, 2)
    }
}

impl Topology {
    pub const fn new(hidden_layers: usize, inputs: usize, hidden_width: usize, outputs: usize) -> Self {
        Topology {
            hidden_layers,
            inputs,
            hidden_width,
            outputs,
        }
    }

    /// Every count must be at least 1 and the weight count must fit in `usize`.
    pub fn validate(&self) -> Result<(), NetworkError> {
        let fields = [
            ("hidden_layers", self.hidden_layers),
            ("inputs", self.inputs),
            ("hidden_width", self.hidden_width),
            ("outputs", self.outputs),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(NetworkError::InvalidTopology(format!("{name} must be > 0")));
            }
        }
        if self.checked_weight_count().is_none() {
            return Err(NetworkError::InvalidTopology(format!(
                "weight count of {self:?} overflows usize"
            )));
        }
        Ok(())
    }

    /// Genotype length for this shape, derived without building a network.
    ///
    /// Saturates at `usize::MAX` for shapes that `validate` rejects.
    pub fn weight_count(&self) -> usize {
        self.checked_weight_count().unwrap_or(usize::MAX)
    }

    /// `None` when the genotype length overflows `usize`.
    pub fn checked_weight_count(&self) -> Option<usize> {
        if self.hidden_layers == 0 {
            return Some(0);
        }
        let first = self.hidden_width.checked_mul(self.inputs)?;
        let between = (self.hidden_layers - 1)
            .checked_mul(self.hidden_width)?
            .checked_mul(self.hidden_width)?;
        let last = self.outputs.checked_mul(self.hidden_width)?;
        first.checked_add(between)?.checked_add(last)
    }

    /// Fan-in of hidden layer `index`.
    pub(crate) fn hidden_fan_in(&self, index: usize) -> usize {
        if index == 0 {
            self.inputs
        } else {
            self.hidden_width
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_count_single_hidden() {
        assert_eq!(Topology::new(1, 5, 4, 2).weight_count(), 28);
    }

    #[test]
    fn test_weight_count_deep() {
        // 3*2 + 3*3 + 3*3 + 1*3
        assert_eq!(Topology::new(3, 2, 3, 1).weight_count(), 27);
    }

    #[test]
    fn test_validate_rejects_zeros() {
        assert!(Topology::new(1, 1, 1, 1).validate().is_ok());
        for bad in [
            Topology::new(0, 5, 4, 2),
            Topology::new(1, 0, 4, 2),
            Topology::new(1, 5, 0, 2),
            Topology::new(1, 5, 4, 0),
        ] {
            assert!(matches!(bad.validate(), Err(NetworkError::InvalidTopology(_))));
        }
    }

    #[test]
    fn test_oversized_shape_is_invalid() {
        let huge = Topology::new(i32::MAX as usize, 1, i32::MAX as usize, 1);
        assert_eq!(huge.checked_weight_count(), None);
        assert_eq!(huge.weight_count(), usize::MAX);
        assert!(matches!(huge.validate(), Err(NetworkError::InvalidTopology(_))));

        let wide = Topology::new(1, 1, usize::MAX, 2);
        assert!(wide.validate().is_err());
    }
}
