//! Fixed-step integration of the whole particle set
//!
//! Per-particle semi-implicit Euler lives on
//! [`Particle::integrate`](crate::simulation::states::Particle::integrate); this
//! module advances every particle of a `Particles` arena with it.

use crate::error::{check_timestep, SimError};
use crate::simulation::states::{NVec3, Particles};

/// Advance every particle by `dt`
/// The timestep is checked once up front so a bad `dt` touches nothing
pub fn integrate_particles(particles: &mut Particles, dt: f64) -> Result<(), SimError> {
    check_timestep(dt)?;
    if particles.is_empty() { // No particles, return
        return Ok(());
    }

    for p in particles.iter_mut() {
        p.integrate(dt)?;
    }
    Ok(())
}

/// Total kinetic energy of movable particles, ½ m v²
pub fn kinetic_energy(particles: &Particles) -> f64 {
    particles
        .iter()
        .filter(|p| p.has_finite_mass())
        .map(|p| 0.5 * p.mass() * p.velocity.norm_squared())
        .sum()
}

/// Potential energy of movable particles in a uniform field `g` (height along -g)
pub fn potential_energy(particles: &Particles, gravity: &NVec3) -> f64 {
    particles
        .iter()
        .filter(|p| p.has_finite_mass())
        .map(|p| -p.mass() * gravity.dot(&p.position))
        .sum()
}
