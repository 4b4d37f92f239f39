//! Input scaling helpers.
//!
//! `forward` and `train` assume inputs already lie in a bounded range,
//! nominally [-1, 1]. These map raw task values into that range and back;
//! anything task-specific (which values, which bounds) belongs to the caller.

/// Map `value` from `[min, max]` linearly onto `[-1, 1]`.
///
/// A degenerate range (`min == max`) maps everything to 0.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span == 0.0 {
        return 0.0;
    }
    ((value - min) / span) * 2.0 - 1.0
}

/// Inverse of [`normalize`]: map `[-1, 1]` back onto `[min, max]`.
pub fn denormalize(value: f64, min: f64, max: f64) -> f64 {
    ((value + 1.0) / 2.0) * (max - min) + min
}

/// Normalize a batch of `(value, min, max)` triples into a network input vector.
pub fn normalize_all(values: &[(f64, f64, f64)]) -> Vec<f64> {
    values
        .iter()
        .map(|&(value, min, max)| normalize(value, min, max))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(normalize(0.0, 0.0, 10.0), -1.0);
        assert_eq!(normalize(10.0, 0.0, 10.0), 1.0);
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn test_denormalize_inverts() {
        for v in [-3.0, 0.0, 1.5, 7.25] {
            let back = denormalize(normalize(v, -4.0, 8.0), -4.0, 8.0);
            assert!((back - v).abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalize_all() {
        let inputs = normalize_all(&[(0.0, 0.0, 4.0), (3.0, 0.0, 4.0), (9.0, 9.0, 9.0)]);
        assert_eq!(inputs, vec![-1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(normalize(3.0, 2.0, 2.0), 0.0);
    }
}
