//! Force contributors for the particle engine
//!
//! Defines the [`ForceGenerator`] trait, a few concrete generators
//! (gravity, drag, anchored spring) and the registry that maps each
//! particle to the generators acting on it

use std::sync::Arc;

use crate::error::{check_timestep, SimError};
use crate::simulation::states::{NVec3, Particle, ParticleId, Particles};

/// Shared handle to a force generator. One generator may act on many particles
pub type ForceGeneratorRef = Arc<dyn ForceGenerator + Send + Sync>;

/// Something that adds a force to a particle every step
/// Implementations call [`Particle::add_force`]; they must not integrate
pub trait ForceGenerator {
    fn update_force(&self, particle: &mut Particle, dt: f64);
}

/// Registered (particle, generator) pairs, applied in registration order
#[derive(Default)]
pub struct ForceGeneratorRegistry {
    registrations: Vec<(ParticleId, ForceGeneratorRef)>,
}

impl ForceGeneratorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Register `generator` for `particle`
    /// The same pair may be added more than once; each copy contributes
    pub fn add(
        &mut self,
        particles: &Particles,
        particle: ParticleId,
        generator: ForceGeneratorRef,
    ) -> Result<(), SimError> {
        particles.check(particle)?;
        self.registrations.push((particle, generator));
        Ok(())
    }

    /// Let every generator add its contribution to its particle's accumulator
    /// Must run once per step, before integration
    pub fn apply_force(&self, particles: &mut Particles, dt: f64) -> Result<(), SimError> {
        check_timestep(dt)?;
        for (id, generator) in &self.registrations {
            let particle = particles.get_mut(*id)?;
            generator.update_force(particle, dt);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// Uniform gravitational field
/// Adds `gravity * mass`; immovable particles are left alone
#[derive(Debug, Clone)]
pub struct GravityForceGenerator {
    pub gravity: NVec3,
}

impl GravityForceGenerator {
    pub fn new(gravity: NVec3) -> Self {
        Self { gravity }
    }
}

impl ForceGenerator for GravityForceGenerator {
    fn update_force(&self, particle: &mut Particle, _dt: f64) {
        if !particle.has_finite_mass() {
            return;
        }
        particle.add_force(self.gravity * particle.mass());
    }
}

/// Velocity drag: `-v̂ (k1 |v| + k2 |v|²)`
#[derive(Debug, Clone)]
pub struct DragForceGenerator {
    pub k1: f64, // linear coefficient
    pub k2: f64, // quadratic coefficient
}

impl ForceGenerator for DragForceGenerator {
    fn update_force(&self, particle: &mut Particle, _dt: f64) {
        let speed = particle.velocity.norm();
        if speed == 0.0 {
            return;
        }
        let magnitude = self.k1 * speed + self.k2 * speed * speed;
        let force = -particle.velocity / speed * magnitude;
        particle.add_force(force);
    }
}

/// Hooke spring between a particle and a fixed point
#[derive(Debug, Clone)]
pub struct AnchoredSpringForceGenerator {
    pub anchor: NVec3,
    pub spring_constant: f64,
    pub rest_length: f64,
}

impl ForceGenerator for AnchoredSpringForceGenerator {
    fn update_force(&self, particle: &mut Particle, _dt: f64) {
        let d = particle.position - self.anchor;
        let length = d.norm();
        if length == 0.0 {
            // direction undefined at the anchor
            return;
        }
        let stretch = length - self.rest_length;
        particle.add_force(-d / length * (self.spring_constant * stretch));
    }
}
