//! Error types for the parts of the core that reject input.
//!
//! Signal extraction and trust scoring never fail; they fall back to neutral
//! defaults. Only the value-curve analyzer and configuration validation
//! report errors to the caller.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("value curve needs at least one point")]
    Empty,

    #[error("non-finite {field} on curve point {label:?}")]
    NonFinite { label: String, field: &'static str },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("weight {name} must be finite and >= 0 (got {value})")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("quantiles must satisfy 0 <= lower <= upper <= 1 (got {lower}, {upper})")]
    InvalidQuantiles { lower: f64, upper: f64 },

    #[error("rank share must be in (0, 1] (got {0})")]
    InvalidRankShare(f64),

    #[error("reference brand multiplier must be > 0 (got {0})")]
    InvalidReference(f64),
}

pub type CurveResult<T> = Result<T, CurveError>;
