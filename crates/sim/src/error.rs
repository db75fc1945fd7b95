use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name}: lower bound {low} exceeds upper bound {high}")]
    InvertedRange {
        name: &'static str,
        low: f64,
        high: f64,
    },
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    // Written as a negation so NaN is rejected too.
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfigError::NotPositive { name, value });
    }
    Ok(())
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

pub(crate) fn ordered(name: &'static str, low: f64, high: f64) -> Result<(), ConfigError> {
    for value in [low, high] {
        if !value.is_finite() {
            return Err(ConfigError::NotFinite { name, value });
        }
    }
    if !(low <= high) {
        return Err(ConfigError::InvertedRange { name, low, high });
    }
    Ok(())
}
