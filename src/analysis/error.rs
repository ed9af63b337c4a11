//! AnalysisError: failures of the sieve analysis.
//!
//! Every precondition violation is reported as soon as it is found; the
//! analysis never returns partial results.

use thiserror::Error;

/// Error type for [`analyze`](super::analyze).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// Fewer than two sieves carry both masses, so there is no distribution.
    #[error("insufficient data: {usable} usable sieve(s), at least 2 are required")]
    InsufficientData { usable: usize },
    /// A row holds a value the formulas cannot accept.
    #[error("invalid measurement in row {row} ({particle_diameter} µm): {reason}")]
    InvalidMeasurement {
        row: usize,
        particle_diameter: f64,
        reason: String,
    },
    /// All retained masses sum to zero.
    #[error("total retained mass is zero; cannot compute percentages")]
    DivisionByZero,
    /// Material density must be a finite positive number.
    #[error("density must be positive, got {0}")]
    InvalidDensity(f64),
}

impl AnalysisError {
    pub(crate) fn invalid(row: usize, particle_diameter: f64, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidMeasurement {
            row,
            particle_diameter,
            reason: reason.into(),
        }
    }
}
