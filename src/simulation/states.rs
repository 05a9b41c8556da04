//! Core state types for the particle simulation.
//!
//! Defines the point-mass particle and the arena that owns every particle:
//! - `Particle`  kinematic state, mass, damping, radius and presentation tags
//! - `ParticleId` opaque handle into a `Particles` arena
//! - `Particles` the single owner of particle state, cleared wholesale on rebuild

use nalgebra::Vector3;

use crate::error::{check_timestep, SimError};

pub type NVec3 = Vector3<f64>;

/// RGB colour tag carried through for presentation, never read by the physics.
pub type Rgb = [u8; 3];

/// Handle to a particle stored in a [`Particles`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub(crate) usize);

/// A point mass integrated with semi-implicit Euler.
#[derive(Debug, Clone)]
pub struct Particle {
    pub label: String, // display label
    pub position: NVec3, // position
    pub velocity: NVec3, // velocity
    pub acceleration: NVec3, // constant external acceleration, added to F/m every step
    force_accum: NVec3, // reset after every integrate
    inverse_mass: f64, // 0 = immovable
    damping: f64, // fraction of velocity kept per second, in [0, 1]
    pub radius: f64, // contact radius
    pub body_color: Rgb,
    pub wire_color: Rgb,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            label: String::new(),
            position: NVec3::zeros(),
            velocity: NVec3::zeros(),
            acceleration: NVec3::zeros(),
            force_accum: NVec3::zeros(),
            inverse_mass: 1.0,
            damping: 0.99,
            radius: 1.0,
            body_color: [255, 255, 255],
            wire_color: [255, 255, 255],
        }
    }
}

impl Particle {
    /// Unit-mass particle at `position`.
    pub fn new(position: NVec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Result<Self, SimError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SimError::InvalidRadius(radius));
        }
        self.radius = radius;
        Ok(self)
    }

    pub fn with_velocity(mut self, velocity: NVec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_colors(mut self, body: Rgb, wire: Rgb) -> Self {
        self.body_color = body;
        self.wire_color = wire;
        self
    }

    pub fn with_inverse_mass(mut self, inverse_mass: f64) -> Result<Self, SimError> {
        self.set_inverse_mass(inverse_mass)?;
        Ok(self)
    }

    pub fn with_damping(mut self, damping: f64) -> Result<Self, SimError> {
        self.set_damping(damping)?;
        Ok(self)
    }

    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Infinite mass for immovable particles.
    pub fn mass(&self) -> f64 {
        if self.inverse_mass == 0.0 {
            f64::INFINITY
        } else {
            self.inverse_mass.recip()
        }
    }

    pub fn has_finite_mass(&self) -> bool {
        self.inverse_mass > 0.0
    }

    pub fn set_inverse_mass(&mut self, inverse_mass: f64) -> Result<(), SimError> {
        if !inverse_mass.is_finite() || inverse_mass < 0.0 {
            return Err(SimError::InvalidInverseMass(inverse_mass));
        }
        self.inverse_mass = inverse_mass;
        Ok(())
    }

    pub fn set_mass(&mut self, mass: f64) -> Result<(), SimError> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(SimError::InvalidMass(mass));
        }
        self.inverse_mass = mass.recip();
        Ok(())
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn set_damping(&mut self, damping: f64) -> Result<(), SimError> {
        if !(0.0..=1.0).contains(&damping) {
            return Err(SimError::InvalidDamping(damping));
        }
        self.damping = damping;
        Ok(())
    }

    /// Force gathered since the last integration.
    pub fn accumulated_force(&self) -> NVec3 {
        self.force_accum
    }

    /// Add `force` to this step's accumulator. Called by force generators.
    pub fn add_force(&mut self, force: NVec3) {
        self.force_accum += force;
    }

    pub fn clear_accumulator(&mut self) {
        self.force_accum = NVec3::zeros();
    }

    /// Advance one step of `dt` seconds.
    ///
    /// v <- (v + a dt) * damping^dt, then p <- p + v dt, then the force
    /// accumulator is cleared. Immovable particles only have their
    /// accumulator cleared. A non-positive or non-finite `dt` is rejected
    /// before anything is mutated.
    pub fn integrate(&mut self, dt: f64) -> Result<(), SimError> {
        check_timestep(dt)?;

        if self.inverse_mass > 0.0 {
            let a = self.acceleration + self.force_accum * self.inverse_mass;
            self.velocity = (self.velocity + a * dt) * self.damping.powf(dt);
            self.position += self.velocity * dt;
        }

        self.clear_accumulator();
        Ok(())
    }
}

/// Arena owning every particle of a scenario.
///
/// Ids are minted by [`Particles::add`] only and stay valid for the life of
/// the arena; a rebuild replaces the arena instead of editing it.
#[derive(Debug, Clone, Default)]
pub struct Particles {
    items: Vec<Particle>,
}

impl Particles {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn add(&mut self, particle: Particle) -> ParticleId {
        let id = ParticleId(self.items.len());
        self.items.push(particle);
        id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fail with [`SimError::UnknownParticle`] if `id` is not in this arena.
    pub fn check(&self, id: ParticleId) -> Result<(), SimError> {
        if id.0 < self.items.len() {
            Ok(())
        } else {
            Err(SimError::UnknownParticle {
                index: id.0,
                count: self.items.len(),
            })
        }
    }

    pub fn get(&self, id: ParticleId) -> Result<&Particle, SimError> {
        self.check(id)?;
        Ok(&self.items[id.0])
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Result<&mut Particle, SimError> {
        self.check(id)?;
        Ok(&mut self.items[id.0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.items.iter_mut()
    }

    // Ids reaching the resolver were validated at registration.
    pub(crate) fn at(&self, id: ParticleId) -> &Particle {
        &self.items[id.0]
    }

    pub(crate) fn at_mut(&mut self, id: ParticleId) -> &mut Particle {
        &mut self.items[id.0]
    }
}
