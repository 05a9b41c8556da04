//! Equality-anchored constraints
//!
//! Ties a particle to a fixed anchor point like a cable: while the particle
//! is within `length + tolerance` of the anchor nothing happens; once it is
//! further away a contact pulls it back toward the anchor.

use crate::error::{check_restitution, SimError};
use crate::simulation::contacts::{Contact, ContactBody};
use crate::simulation::generators::{ContactGenerator, COINCIDENT_DISTANCE};
use crate::simulation::resolver::ContactRegistry;
use crate::simulation::states::{NVec3, ParticleId, Particles};

#[derive(Debug, Clone)]
pub struct EqualityAnchoredConstraint {
    pub label: String,
    particle: ParticleId,
    pub anchor: NVec3, // fixed point
    length: f64, // target separation
    tolerance: f64, // slack before the constraint engages
    pub restitution: f64,
}

impl EqualityAnchoredConstraint {
    pub fn new(
        particles: &Particles,
        particle: ParticleId,
        anchor: NVec3,
        length: f64,
        tolerance: f64,
        restitution: f64,
        label: impl Into<String>,
    ) -> Result<Self, SimError> {
        particles.check(particle)?;
        let valid = |x: f64| x.is_finite() && x >= 0.0;
        if !valid(length) || !valid(tolerance) {
            return Err(SimError::InvalidConstraint { length, tolerance });
        }
        check_restitution(restitution)?;
        Ok(Self {
            label: label.into(),
            particle,
            anchor,
            length,
            tolerance,
            restitution,
        })
    }

    pub fn particle(&self) -> ParticleId {
        self.particle
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Current particle-anchor distance
    pub fn current_length(&self, particles: &Particles) -> Result<f64, SimError> {
        Ok((self.anchor - particles.get(self.particle)?.position).norm())
    }

    /// The contact this constraint would emit now, if it is taut
    pub fn violation(&self, particles: &Particles) -> Result<Option<Contact>, SimError> {
        let to_anchor = self.anchor - particles.get(self.particle)?.position;
        let distance = to_anchor.norm();
        if distance <= self.length + self.tolerance {
            return Ok(None);
        }
        let Some(normal) = to_anchor.try_normalize(COINCIDENT_DISTANCE) else {
            return Ok(None);
        };
        Ok(Some(Contact {
            a: self.particle,
            b: ContactBody::Anchor(self.anchor),
            normal,
            penetration: distance - self.length,
            restitution: self.restitution,
        }))
    }
}

impl ContactGenerator for EqualityAnchoredConstraint {
    fn generate(&self, particles: &Particles, contacts: &mut ContactRegistry) -> Result<usize, SimError> {
        contacts.extend(self.violation(particles)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::Particle;

    fn hanging(distance: f64) -> (Particles, EqualityAnchoredConstraint) {
        let mut particles = Particles::new();
        let id = particles.add(Particle::new(NVec3::new(0.0, 6.0 - distance, 0.0)));
        let anchor = NVec3::new(0.0, 6.0, 0.0);
        let c = EqualityAnchoredConstraint::new(&particles, id, anchor, 5.0, 0.5, 0.0, "rod").unwrap();
        (particles, c)
    }

    #[test]
    fn slack_within_tolerance_band() {
        let (particles, c) = hanging(5.4);
        assert_eq!(c.violation(&particles).unwrap(), None);
    }

    #[test]
    fn taut_beyond_tolerance_band() {
        let (particles, c) = hanging(5.75);
        let contact = c.violation(&particles).unwrap().unwrap();
        assert!((contact.penetration - 0.75).abs() < 1e-12);
        // toward the anchor, i.e. up
        assert!((contact.normal - NVec3::y()).norm() < 1e-12);
    }

    #[test]
    fn negative_length_rejected() {
        let mut particles = Particles::new();
        let id = particles.add(Particle::default());
        let err = EqualityAnchoredConstraint::new(&particles, id, NVec3::zeros(), -1.0, 0.0, 0.0, "bad");
        assert!(matches!(err, Err(SimError::InvalidConstraint { .. })));
    }
}
