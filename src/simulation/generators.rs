//! Contact generators
//!
//! Each generator inspects the particles it tracks and offers zero or more
//! [`Contact`]s to the frame's [`ContactRegistry`]:
//! - `GroundContactGenerator`  sphere vs the plane y = 0
//! - `ParticleParticleContactGenerator`  every unordered pair of spheres, O(n²)
//!
//! Anchored constraints implement the same trait in `constraints.rs`.

use crate::error::{check_restitution, SimError};
use crate::simulation::contacts::{Contact, ContactBody};
use crate::simulation::resolver::ContactRegistry;
use crate::simulation::states::{NVec3, ParticleId, Particles};

/// Separations at or below this are treated as coincident centres
pub const COINCIDENT_DISTANCE: f64 = 1.0e-12;

/// Inspects world state and emits contacts into a registry
pub trait ContactGenerator {
    /// Offer this frame's contacts to `contacts`. Returns how many were offered
    fn generate(&self, particles: &Particles, contacts: &mut ContactRegistry) -> Result<usize, SimError>;
}

/// Keeps tracked particles above the ground plane y = 0
///
/// Emits one contact per tracked particle dipping below the plane, immovable
/// ones included; the resolver leaves contacts without inverse mass alone.
#[derive(Debug, Clone)]
pub struct GroundContactGenerator {
    particles: Vec<ParticleId>,
    pub restitution: f64,
}

impl GroundContactGenerator {
    pub fn new(restitution: f64) -> Result<Self, SimError> {
        check_restitution(restitution)?;
        Ok(Self {
            particles: Vec::new(),
            restitution,
        })
    }

    /// Start tracking `id`
    pub fn track(&mut self, particles: &Particles, id: ParticleId) -> Result<(), SimError> {
        particles.check(id)?;
        self.particles.push(id);
        Ok(())
    }

    pub fn tracked(&self) -> &[ParticleId] {
        &self.particles
    }
}

impl ContactGenerator for GroundContactGenerator {
    fn generate(&self, particles: &Particles, contacts: &mut ContactRegistry) -> Result<usize, SimError> {
        let mut found = Vec::new();
        for &id in &self.particles {
            let p = particles.get(id)?;
            let depth = p.radius - p.position.y;
            if depth > 0.0 {
                found.push(Contact {
                    a: id,
                    b: ContactBody::Ground,
                    normal: NVec3::y(),
                    penetration: depth,
                    restitution: self.restitution,
                });
            }
        }
        contacts.extend(found)
    }
}

/// Sphere-sphere overlap between every pair of tracked particles
/// Pairs of immovable particles are reported like any other
#[derive(Debug, Clone)]
pub struct ParticleParticleContactGenerator {
    particles: Vec<ParticleId>,
    pub restitution: f64,
}

impl ParticleParticleContactGenerator {
    pub fn new(restitution: f64) -> Result<Self, SimError> {
        check_restitution(restitution)?;
        Ok(Self {
            particles: Vec::new(),
            restitution,
        })
    }

    pub fn track(&mut self, particles: &Particles, id: ParticleId) -> Result<(), SimError> {
        particles.check(id)?;
        self.particles.push(id);
        Ok(())
    }

    pub fn tracked(&self) -> &[ParticleId] {
        &self.particles
    }
}

impl ContactGenerator for ParticleParticleContactGenerator {
    fn generate(&self, particles: &Particles, contacts: &mut ContactRegistry) -> Result<usize, SimError> {
        let n = self.particles.len();
        let mut found = Vec::new();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let id_i = self.particles[i];
            let pi = particles.get(id_i)?;

            for &id_j in &self.particles[(i + 1)..n] {
                let pj = particles.get(id_j)?;

                let reach = pi.radius + pj.radius;
                let d = pi.position - pj.position; // from j to i
                if d.norm_squared() >= reach * reach {
                    continue;
                }

                let distance = d.norm();
                // coincident centres: push i up, j down
                let normal = d.try_normalize(COINCIDENT_DISTANCE).unwrap_or_else(NVec3::y);

                found.push(Contact {
                    a: id_i,
                    b: ContactBody::Particle(id_j),
                    normal,
                    penetration: reach - distance,
                    restitution: self.restitution,
                });
            }
        }

        contacts.extend(found)
    }
}
