//! Contact registry and iterative resolver
//!
//! Contacts from every generator are collected into one bounded registry and
//! resolved in two passes:
//! 1. interpenetration: repeatedly push apart the deepest contact, then
//!    update the depth of every contact sharing a moved particle
//! 2. velocity: repeatedly apply a restitution impulse to the fastest
//!    closing contact
//!
//! Each pass is capped at `iteration_factor * contact count` iterations.
//! Running out of budget leaves the remaining error for the next frame.

use log::debug;

use crate::error::{check_timestep, SimError};
use crate::simulation::contacts::{Contact, ContactBody};
use crate::simulation::params::ResolverTuning;
use crate::simulation::states::{NVec3, ParticleId, Particles};

/// Outcome of one `resolve` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub contacts: usize,
    pub penetration_iterations: usize,
    pub velocity_iterations: usize,
    pub budget: usize, // per pass
    pub max_penetration: f64, // deepest remaining depth after the position pass, estimated from the linear updates
}

impl Resolution {
    pub fn budget_exhausted(&self) -> bool {
        self.budget > 0
            && (self.penetration_iterations >= self.budget || self.velocity_iterations >= self.budget)
    }
}

/// Bounded per-frame contact buffer plus the resolver that consumes it
///
/// When full, [`ContactRegistry::add`] keeps the deepest `capacity`
/// contacts: a new contact deeper than the shallowest stored one replaces
/// it, otherwise the new one is dropped. Both cases count as an overflow
/// and return [`SimError::ContactOverflow`].
#[derive(Debug, Clone)]
pub struct ContactRegistry {
    label: String,
    capacity: usize,
    contacts: Vec<Contact>,
    tuning: ResolverTuning,
    overflowed: usize, // contacts dropped since the last clear
}

impl ContactRegistry {
    pub fn new(capacity: usize, label: impl Into<String>) -> Result<Self, SimError> {
        if capacity == 0 {
            return Err(SimError::InvalidConfig(
                "contact registry capacity must be at least 1".into(),
            ));
        }
        Ok(Self {
            label: label.into(),
            capacity,
            contacts: Vec::with_capacity(capacity),
            tuning: ResolverTuning::default(),
            overflowed: 0,
        })
    }

    pub fn with_tuning(mut self, tuning: ResolverTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn tuning(&self) -> &ResolverTuning {
        &self.tuning
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Contacts dropped by the overflow policy since the last clear
    pub fn overflowed(&self) -> usize {
        self.overflowed
    }

    pub fn add(&mut self, contact: Contact) -> Result<(), SimError> {
        if self.contacts.len() < self.capacity {
            self.contacts.push(contact);
            return Ok(());
        }

        self.overflowed += 1;

        let shallowest = self
            .contacts
            .iter()
            .enumerate()
            .min_by(|(_, x), (_, y)| x.penetration.total_cmp(&y.penetration))
            .map(|(i, c)| (i, c.penetration));

        if let Some((index, depth)) = shallowest {
            if contact.penetration > depth {
                // keep generator order for the survivors
                self.contacts.remove(index);
                self.contacts.push(contact);
            }
        }

        debug!(
            "{}: contact buffer full ({}), {} contact(s) dropped this frame",
            self.label, self.capacity, self.overflowed
        );

        Err(SimError::ContactOverflow {
            label: self.label.clone(),
            capacity: self.capacity,
        })
    }

    /// Add every contact from `generated`, carrying on past an overflow so
    /// the policy sees all of them. Returns the number offered, or the first
    /// overflow once all were offered
    pub fn extend(
        &mut self,
        generated: impl IntoIterator<Item = Contact>,
    ) -> Result<usize, SimError> {
        let mut offered = 0;
        let mut overflow = None;
        for contact in generated {
            offered += 1;
            if let Err(e) = self.add(contact) {
                overflow.get_or_insert(e);
            }
        }
        match overflow {
            Some(e) => Err(e),
            None => Ok(offered),
        }
    }

    /// Discard every pending contact. Call once per frame after `resolve`
    pub fn clear(&mut self) {
        self.contacts.clear();
        self.overflowed = 0;
    }

    /// Resolve all pending contacts: positions first, then velocities
    pub fn resolve(&mut self, particles: &mut Particles, dt: f64) -> Result<Resolution, SimError> {
        check_timestep(dt)?;
        for contact in &self.contacts {
            particles.check(contact.a)?;
            if let ContactBody::Particle(b) = contact.b {
                particles.check(b)?;
            }
        }

        let n = self.contacts.len();
        if n == 0 {
            return Ok(Resolution::default());
        }

        let budget = self.tuning.budget(n);
        let order = self.priority_order();

        let penetration_iterations = self.resolve_interpenetration(particles, &order, budget);
        let max_penetration = self
            .contacts
            .iter()
            .map(|c| c.penetration)
            .fold(0.0_f64, f64::max);

        let velocity_iterations = self.resolve_velocities(particles, &order, budget);

        let resolution = Resolution {
            contacts: n,
            penetration_iterations,
            velocity_iterations,
            budget,
            max_penetration,
        };
        if resolution.budget_exhausted() {
            debug!(
                "{}: iteration budget {} used up ({} position, {} velocity), max penetration {:.3e}",
                self.label, budget, penetration_iterations, velocity_iterations, max_penetration
            );
        }
        Ok(resolution)
    }

    // Deepest first; stable, so equal depths keep generator order.
    fn priority_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.contacts.len()).collect();
        order.sort_by(|&i, &j| {
            self.contacts[j]
                .penetration
                .total_cmp(&self.contacts[i].penetration)
        });
        order
    }

    fn resolve_interpenetration(
        &mut self,
        particles: &mut Particles,
        order: &[usize],
        budget: usize,
    ) -> usize {
        let epsilon = self.tuning.penetration_epsilon;
        let mut iterations = 0;

        while iterations < budget {
            let mut deepest = None;
            let mut max = epsilon;
            for &i in order {
                let c = &self.contacts[i];
                if c.penetration > max && c.total_inverse_mass(particles) > 0.0 {
                    max = c.penetration;
                    deepest = Some(i);
                }
            }
            let Some(index) = deepest else {
                break;
            };

            let (move_a, move_b) = self.contacts[index].resolve_interpenetration(particles);
            let moved_a = self.contacts[index].a;
            let moved_b = self.contacts[index].b.particle();
            self.contacts[index].penetration = 0.0;

            for (i, contact) in self.contacts.iter_mut().enumerate() {
                if i != index {
                    update_penetration(contact, moved_a, move_a, moved_b, move_b);
                }
            }
            iterations += 1;
        }

        iterations
    }

    fn resolve_velocities(&self, particles: &mut Particles, order: &[usize], budget: usize) -> usize {
        let epsilon = self.tuning.velocity_epsilon;
        let mut iterations = 0;

        while iterations < budget {
            let mut fastest = None;
            let mut min = -epsilon;
            for &i in order {
                let c = &self.contacts[i];
                let separating = c.separating_velocity(particles);
                if separating < min && c.total_inverse_mass(particles) > 0.0 {
                    min = separating;
                    fastest = Some(i);
                }
            }
            let Some(index) = fastest else {
                break;
            };

            self.contacts[index].resolve_velocity(particles);
            iterations += 1;
        }

        iterations
    }
}

/// Shift a contact's depth by the displacement of any particle it shares
/// with the contact that was just resolved
fn update_penetration(
    contact: &mut Contact,
    moved_a: ParticleId,
    move_a: NVec3,
    moved_b: Option<ParticleId>,
    move_b: NVec3,
) {
    let displacement = |id: ParticleId| {
        if id == moved_a {
            Some(move_a)
        } else if Some(id) == moved_b {
            Some(move_b)
        } else {
            None
        }
    };

    if let Some(d) = displacement(contact.a) {
        contact.penetration -= d.dot(&contact.normal);
    }
    if let Some(d) = contact.b.particle().and_then(displacement) {
        contact.penetration += d.dot(&contact.normal);
    }
}
