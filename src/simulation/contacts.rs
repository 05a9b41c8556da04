//! Contact records produced by contact generators and consumed by the resolver
//!
//! A contact always involves one particle (`a`) and a second body (`b`) that
//! is either another particle or something immovable (the ground plane or a
//! fixed anchor point). `normal` is the unit direction along which `a` must
//! move to reduce `penetration`; `b` moves the opposite way.

use crate::simulation::states::{NVec3, ParticleId, Particles};

/// Second participant of a contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactBody {
    Particle(ParticleId),
    Anchor(NVec3), // immovable point
    Ground,        // immovable plane y = 0
}

impl ContactBody {
    pub fn particle(&self) -> Option<ParticleId> {
        match self {
            ContactBody::Particle(id) => Some(*id),
            _ => None,
        }
    }
}

/// One detected interpenetration or constraint violation, valid for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub a: ParticleId,
    pub b: ContactBody,
    pub normal: NVec3, // unit, direction a must move
    pub penetration: f64, // > 0 means overlapping / violated
    pub restitution: f64,
}

impl Contact {
    /// Summed inverse mass of both bodies; 0 when neither can move
    /// Ids must already be checked against `particles`
    pub(crate) fn total_inverse_mass(&self, particles: &Particles) -> f64 {
        let mut total = particles.at(self.a).inverse_mass();
        if let ContactBody::Particle(b) = self.b {
            total += particles.at(b).inverse_mass();
        }
        total
    }

    /// Relative velocity of `a` with respect to `b` along the normal
    /// Negative = closing, zero or positive = separating
    pub(crate) fn separating_velocity(&self, particles: &Particles) -> f64 {
        let mut relative = particles.at(self.a).velocity;
        if let ContactBody::Particle(b) = self.b {
            relative -= particles.at(b).velocity;
        }
        relative.dot(&self.normal)
    }

    /// Push the bodies apart along the normal in proportion to inverse mass
    /// Returns the displacement applied to `a` and to `b` (zero when immovable)
    pub(crate) fn resolve_interpenetration(&self, particles: &mut Particles) -> (NVec3, NVec3) {
        let total_inverse_mass = self.total_inverse_mass(particles);
        if self.penetration <= 0.0 || total_inverse_mass <= 0.0 {
            return (NVec3::zeros(), NVec3::zeros());
        }

        let move_per_inverse_mass = self.normal * (self.penetration / total_inverse_mass);

        let a = particles.at_mut(self.a);
        let move_a = move_per_inverse_mass * a.inverse_mass();
        a.position += move_a;

        let mut move_b = NVec3::zeros();
        if let ContactBody::Particle(b) = self.b {
            let b = particles.at_mut(b);
            move_b = -move_per_inverse_mass * b.inverse_mass();
            b.position += move_b;
        }

        (move_a, move_b)
    }

    /// Apply the restitution impulse along the normal if the bodies are closing
    /// Returns the impulse magnitude, 0 when the contact was already separating
    pub(crate) fn resolve_velocity(&self, particles: &mut Particles) -> f64 {
        let separating = self.separating_velocity(particles);
        if separating >= 0.0 {
            return 0.0;
        }
        let total_inverse_mass = self.total_inverse_mass(particles);
        if total_inverse_mass <= 0.0 {
            return 0.0;
        }

        // j = -(1 + e) vs / (1/ma + 1/mb)
        let impulse = -(1.0 + self.restitution) * separating / total_inverse_mass;
        let impulse_per_inverse_mass = self.normal * impulse;

        let a = particles.at_mut(self.a);
        let im = a.inverse_mass();
        a.velocity += impulse_per_inverse_mass * im;

        if let ContactBody::Particle(b) = self.b {
            let b = particles.at_mut(b);
            let im = b.inverse_mass();
            b.velocity -= impulse_per_inverse_mass * im;
        }

        impulse
    }
}
