//! Error types for the particle simulation.

use thiserror::Error;

/// Errors raised by simulation operations.
///
/// Everything except [`SimError::ContactOverflow`] is a caller error and is
/// returned at the call site that caused it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Timestep must be positive and finite.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Mass must be positive and finite.
    #[error("invalid mass: {0} (must be positive and finite)")]
    InvalidMass(f64),

    /// Inverse mass must be non-negative and finite.
    #[error("invalid inverse mass: {0} (must be >= 0 and finite)")]
    InvalidInverseMass(f64),

    /// Damping must lie in [0, 1].
    #[error("invalid damping: {0} (must be in [0, 1])")]
    InvalidDamping(f64),

    /// Radius must be non-negative and finite.
    #[error("invalid radius: {0}")]
    InvalidRadius(f64),

    /// Restitution must lie in [0, 1].
    #[error("invalid restitution: {0} (must be in [0, 1])")]
    InvalidRestitution(f64),

    /// Anchored constraint needs a non-negative length and tolerance.
    #[error("invalid constraint: length {length}, tolerance {tolerance}")]
    InvalidConstraint {
        /// Target separation.
        length: f64,
        /// Allowed slack.
        tolerance: f64,
    },

    /// A particle handle that does not belong to the particle set.
    #[error("unknown particle {index} (count: {count})")]
    UnknownParticle {
        /// Index carried by the handle.
        index: usize,
        /// Number of particles in the set.
        count: usize,
    },

    /// More contacts were generated than the registry can hold.
    #[error("contact registry '{label}' is full (capacity {capacity})")]
    ContactOverflow {
        /// Diagnostic label of the registry.
        label: String,
        /// Fixed capacity of the registry.
        capacity: usize,
    },

    /// Scenario configuration could not be turned into a simulation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    /// True for conditions the frame driver may log and step past.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimError::ContactOverflow { .. })
    }
}

/// Reject non-positive or non-finite timesteps.
pub(crate) fn check_timestep(dt: f64) -> Result<(), SimError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidTimestep(dt))
    }
}

/// Reject restitution outside [0, 1].
pub(crate) fn check_restitution(restitution: f64) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&restitution) {
        Ok(())
    } else {
        Err(SimError::InvalidRestitution(restitution))
    }
}
