//! Error types for particle set creation
//!
//! The per-frame path never fails: bad frame deltas are clamped and non-finite
//! scalars are rejected in place. Only configuration can be invalid.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChoreographyError {
    #[error("particle count for {set} must be positive")]
    EmptySet { set: &'static str },

    #[error("{name} must be a positive finite number, got {value}")]
    InvalidDimension { name: &'static str, value: f32 },

    #[error("{name} must be a positive finite rate, got {value}")]
    InvalidRate { name: &'static str, value: f32 },
}

pub type Result<T> = std::result::Result<T, ChoreographyError>;

/// Reject zero-sized sets at creation time
pub fn ensure_count(set: &'static str, count: usize) -> Result<usize> {
    if count == 0 {
        return Err(ChoreographyError::EmptySet { set });
    }
    Ok(count)
}

/// Reject zero, negative, NaN and infinite geometry parameters
pub fn ensure_dimension(name: &'static str, value: f32) -> Result<f32> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ChoreographyError::InvalidDimension { name, value });
    }
    Ok(value)
}

pub fn ensure_rate(name: &'static str, value: f32) -> Result<f32> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ChoreographyError::InvalidRate { name, value });
    }
    Ok(value)
}
