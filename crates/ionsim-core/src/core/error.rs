use thiserror::Error;

/// Non-physical or undiscretizable input handed to a core model.
///
/// Every variant is fatal for the operation that produced it; numerical guard
/// conditions (stability limits, exponent overflow) are never reported through
/// this type, they are clamped where they occur.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("'{name}' must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("'{name}' must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("'{name}' = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Grid of depth {depth:e} m with step {step:e} m yields {nodes} node(s); at least 2 are required")]
    TooFewNodes { depth: f64, step: f64, nodes: usize },

    #[error("Missing parameter '{name}' required by the {regime} regime")]
    MissingParameter {
        regime: &'static str,
        name: &'static str,
    },

    #[error("'{name}' has {len} element(s), expected {expected}")]
    LengthMismatch {
        name: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("Field row {row} has {len} column(s), expected {expected}")]
    RaggedField {
        row: usize,
        len: usize,
        expected: usize,
    },
}

pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NonFinite { name, value })
    }
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, InputError> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(InputError::NonPositive { name, value })
    }
}

pub(crate) fn require_in_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, InputError> {
    require_finite(name, value)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(InputError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_positive_rejects_zero_and_nan() {
        assert!(matches!(
            require_positive("r", 0.0),
            Err(InputError::NonPositive { name: "r", .. })
        ));
        assert!(matches!(
            require_positive("r", f64::NAN),
            Err(InputError::NonFinite { name: "r", .. })
        ));
        assert_eq!(require_positive("r", 2.5), Ok(2.5));
    }

    #[test]
    fn require_in_range_accepts_inclusive_bounds() {
        assert_eq!(require_in_range("theta", 180.0, 0.0, 180.0), Ok(180.0));
        assert!(require_in_range("theta", 180.5, 0.0, 180.0).is_err());
    }
}
