//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - gravity and restitution coefficients for ground and particle contacts,
//! - contact buffer capacity,
//! - resolver tolerances and iteration budget (`ResolverTuning`),
//! - random seed for scattered scenarios

use crate::simulation::states::NVec3;

/// Contacts deeper than this are still resolved by the penetration pass
pub const DEFAULT_PENETRATION_EPSILON: f64 = 1.0e-6;
/// Closing speeds slower than this are treated as resting
pub const DEFAULT_VELOCITY_EPSILON: f64 = 1.0e-6;
/// Iterations per pass = factor * number of contacts
pub const DEFAULT_ITERATION_FACTOR: usize = 2;
/// Contacts held per frame before the overflow policy kicks in
pub const DEFAULT_CONTACT_CAPACITY: usize = 100;

/// Tolerances and iteration budget of the contact resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverTuning {
    pub penetration_epsilon: f64,
    pub velocity_epsilon: f64,
    pub iteration_factor: usize,
}

impl Default for ResolverTuning {
    fn default() -> Self {
        Self {
            penetration_epsilon: DEFAULT_PENETRATION_EPSILON,
            velocity_epsilon: DEFAULT_VELOCITY_EPSILON,
            iteration_factor: DEFAULT_ITERATION_FACTOR,
        }
    }
}

impl ResolverTuning {
    /// Iterations allowed per pass for `contacts` pending contacts
    pub fn budget(&self, contacts: usize) -> usize {
        self.iteration_factor.max(1) * contacts
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub gravity: NVec3, // uniform gravitational acceleration
    pub ground_restitution: f64, // restitution of particle-ground contacts
    pub particle_restitution: f64, // restitution of particle-particle contacts
    pub contact_capacity: usize, // contact buffer size
    pub tuning: ResolverTuning, // resolver epsilons and budget
    pub seed: u64, // deterministic seed
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            gravity: NVec3::new(0.0, -1.0, 0.0),
            ground_restitution: 0.0,
            particle_restitution: 1.0,
            contact_capacity: DEFAULT_CONTACT_CAPACITY,
            tuning: ResolverTuning::default(),
            seed: 42,
        }
    }
}
