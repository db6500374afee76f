//! Validation errors shared by every model and pass constructor.

use std::num::NonZeroUsize;

use thiserror::Error;

/// Rejection of an out-of-range construction argument.
///
/// Each variant names the offending field so callers can report exactly
/// which input was wrong. Values are never clamped into range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be >= {min}, got {value}")]
    WindowTooSmall {
        field: &'static str,
        value: usize,
        min: usize,
    },
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NotPositive { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::WindowTooSmall { field, .. } => field,
        }
    }
}

/// Unknown textual name for a strategy, decay model or preset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{name}', expected one of: {expected}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub name: String,
    pub expected: &'static str,
}

// NaN fails every comparison, so `!(value > 0.0)` rejects it too.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(value)
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

pub(crate) fn ensure_in_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, ValidationError> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

pub(crate) fn ensure_window(
    field: &'static str,
    value: usize,
) -> Result<NonZeroUsize, ValidationError> {
    NonZeroUsize::new(value).ok_or(ValidationError::WindowTooSmall {
        field,
        value,
        min: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_not_positive() {
        let err = ensure_positive("length", f64::NAN).unwrap_err();
        assert_eq!(err.field(), "length");
    }

    #[test]
    fn test_messages_name_field_and_bound() {
        let err = ensure_in_range("shore_hardness", 150.0, 0.0, 100.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "shore_hardness must be between 0 and 100, got 150"
        );
        let err = ensure_window("window_size", 0).unwrap_err();
        assert_eq!(err.to_string(), "window_size must be >= 1, got 0");
    }
}
