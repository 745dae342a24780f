use crate::Annealed;

use thiserror::Error;

/// Errors produced while validating a configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must lie within [0, 1], found {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f32 },
    #[error("{field} must be strictly positive, found {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be a finite, non-negative value, found {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} is not a valid interval: ({min}, {max})")]
    InvalidInterval {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{field} must be greater than {bound}, found {value}")]
    NotAbove {
        field: &'static str,
        value: f32,
        bound: f32,
    },
    #[error("fixed layer {index} is malformed: {reason}")]
    InvalidLayer { index: usize, reason: String },
    #[error("invalid seed genomes: {0}")]
    InvalidSeed(String),
}

/// Checks that `value` is a probability.
pub fn check_probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}

/// Checks that both ends of an annealed chance are
/// probabilities and that `min <= max`.
pub fn check_annealed(field: &'static str, value: Annealed) -> Result<(), ConfigError> {
    check_probability(field, value.min)?;
    check_probability(field, value.max)?;
    if value.min > value.max {
        return Err(ConfigError::InvalidInterval {
            field,
            min: value.min,
            max: value.max,
        });
    }
    Ok(())
}

/// Checks that `value` is finite and strictly positive.
pub fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Checks that `value` is finite and not negative.
pub fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

/// Checks that `(min, max)` is a finite, ordered interval.
pub fn check_interval(field: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidInterval { field, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annealed_bounds() {
        assert!(check_annealed("a", Annealed::new(0.1, 0.5)).is_ok());
        assert_eq!(
            check_annealed("a", Annealed::new(0.6, 0.5)),
            Err(ConfigError::InvalidInterval {
                field: "a",
                min: 0.6,
                max: 0.5
            })
        );
        assert_eq!(
            check_annealed("a", Annealed::new(0.1, 1.5)),
            Err(ConfigError::ProbabilityOutOfRange {
                field: "a",
                value: 1.5
            })
        );
    }

    #[test]
    fn positivity() {
        assert!(check_positive("t", 0.5).is_ok());
        assert!(check_positive("t", 0.0).is_err());
        assert!(check_positive("t", f32::NAN).is_err());
        assert!(check_non_negative("t", 0.0).is_ok());
        assert!(check_non_negative("t", -0.1).is_err());
    }

    #[test]
    fn intervals() {
        assert!(check_interval("w", (-1.0, 1.0)).is_ok());
        assert!(check_interval("w", (1.0, 1.0)).is_ok());
        assert!(check_interval("w", (1.0, -1.0)).is_err());
        assert!(check_interval("w", (f32::NEG_INFINITY, 1.0)).is_err());
    }
}
