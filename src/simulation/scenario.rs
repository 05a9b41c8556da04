//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario`, the single owner of everything a frame touches:
//! - numerical parameters (`Parameters`)
//! - particle state (`Particles`)
//! - force registrations (`ForceGeneratorRegistry`)
//! - ground / particle-particle generators and anchored constraints
//! - the per-frame contact buffer (`ContactRegistry`)
//!
//! Collections are never patched in place: `rebuild` throws the old world
//! away and repopulates from the configuration.

use std::sync::Arc;

use log::info;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::configuration::config::{
    BodyConfig, BouncingBallsConfig, CradleConfig, ParametersConfig, ScenarioConfig,
    ScenarioKindConfig,
};
use crate::error::{check_timestep, SimError};
use crate::simulation::constraints::EqualityAnchoredConstraint;
use crate::simulation::forces::{ForceGeneratorRef, ForceGeneratorRegistry, GravityForceGenerator};
use crate::simulation::generators::{GroundContactGenerator, ParticleParticleContactGenerator};
use crate::simulation::params::{Parameters, ResolverTuning};
use crate::simulation::resolver::ContactRegistry;
use crate::simulation::states::{NVec3, Particle, ParticleId, Particles, Rgb};

const PERTURBED_COLOR: Rgb = [255, 0, 0];
const RESTING_COLOR: Rgb = [0, 255, 255];

/// Runtime bundle constructed from a [`ScenarioConfig`]
pub struct Scenario {
    pub config: ScenarioConfig,
    pub parameters: Parameters,
    pub particles: Particles,
    pub forces: ForceGeneratorRegistry,
    pub ground: GroundContactGenerator,
    pub pairs: ParticleParticleContactGenerator,
    pub anchors: Vec<EqualityAnchoredConstraint>,
    pub contacts: ContactRegistry,
    pub t: f64, // simulated time
    rng: Pcg32,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, SimError> {
        check_timestep(cfg.engine.dt)?;
        let parameters = parameters_from_config(&cfg.parameters)?;

        let contacts = ContactRegistry::new(parameters.contact_capacity, "All contacts")?
            .with_tuning(parameters.tuning);

        let mut scenario = Self {
            ground: GroundContactGenerator::new(parameters.ground_restitution)?,
            pairs: ParticleParticleContactGenerator::new(parameters.particle_restitution)?,
            rng: Pcg32::seed_from_u64(parameters.seed),
            particles: Particles::new(),
            forces: ForceGeneratorRegistry::new(),
            anchors: Vec::new(),
            contacts,
            parameters,
            config: cfg,
            t: 0.0,
        };
        scenario.populate()?;

        info!(
            "scenario built: {} particles, {} force registrations, {} anchors, contact capacity {}",
            scenario.particles.len(),
            scenario.forces.len(),
            scenario.anchors.len(),
            scenario.contacts.capacity()
        );
        Ok(scenario)
    }

    /// Discard the whole world and rebuild it from the current configuration
    pub fn rebuild(&mut self) -> Result<(), SimError> {
        *self = Self::build_scenario(self.config.clone())?;
        Ok(())
    }

    /// Replace the configuration and rebuild
    pub fn set_config(&mut self, cfg: ScenarioConfig) -> Result<(), SimError> {
        *self = Self::build_scenario(cfg)?;
        Ok(())
    }

    /// Re-scatter bouncing balls without touching registrations
    /// Other scenario kinds are rebuilt instead
    pub fn reset_positions(&mut self) -> Result<(), SimError> {
        if !matches!(self.config.scenario, ScenarioKindConfig::BouncingBalls(_)) {
            return self.rebuild();
        }
        for p in self.particles.iter_mut() {
            p.position = scatter_position(&mut self.rng);
            p.velocity = NVec3::zeros();
            p.clear_accumulator();
        }
        self.contacts.clear();
        self.t = 0.0;
        Ok(())
    }

    /// Timestep from the engine configuration
    pub fn dt(&self) -> f64 {
        self.config.engine.dt
    }

    fn populate(&mut self) -> Result<(), SimError> {
        let gravity: ForceGeneratorRef = Arc::new(GravityForceGenerator::new(self.parameters.gravity));

        match self.config.scenario.clone() {
            ScenarioKindConfig::NewtonsCradle(cfg) => self.populate_cradle(&cfg, &gravity),
            ScenarioKindConfig::BouncingBalls(cfg) => self.populate_bouncing_balls(&cfg, &gravity),
            ScenarioKindConfig::Bodies { bodies } => self.populate_bodies(&bodies, &gravity),
        }
    }

    /// Register `id` with gravity, the ground and the pair generator
    fn attach(&mut self, id: ParticleId, gravity: &ForceGeneratorRef) -> Result<(), SimError> {
        self.forces.add(&self.particles, id, Arc::clone(gravity))?;
        self.ground.track(&self.particles, id)?;
        self.pairs.track(&self.particles, id)?;
        Ok(())
    }

    fn populate_cradle(&mut self, cfg: &CradleConfig, gravity: &ForceGeneratorRef) -> Result<(), SimError> {
        let n = cfg.ball_count;
        let perturbed = cfg.perturbed_ball_count.min(n);
        let r = cfg.radius;
        let angle = cfg.initial_angle.to_radians();

        // balls side by side, centred on x = 0
        let x_offset = (n as f64 / 2.0) * r * 2.0;

        for k in 0..n {
            let rest = NVec3::new(-x_offset + (k as f64 * 2.0 * r + r), cfg.rest_height, 0.0);
            let anchor = rest + NVec3::new(0.0, cfg.rod_length, 0.0);

            let (position, color) = if k < perturbed {
                let swung = NVec3::new(
                    anchor.x - cfg.rod_length * angle.sin(),
                    anchor.y - cfg.rod_length * angle.cos(),
                    0.0,
                );
                (swung, PERTURBED_COLOR)
            } else {
                (rest, RESTING_COLOR)
            };

            let particle = Particle::new(position)
                .with_label(format!("Ball {k}"))
                .with_radius(r)?
                .with_damping(cfg.damping)?
                .with_colors(color, color);
            let id = self.particles.add(particle);
            self.attach(id, gravity)?;

            self.anchors.push(EqualityAnchoredConstraint::new(
                &self.particles,
                id,
                anchor,
                cfg.rod_length,
                cfg.tolerance,
                cfg.constraint_restitution,
                format!("EqualityAnchoredConstraint{k}"),
            )?);
        }
        Ok(())
    }

    fn populate_bouncing_balls(
        &mut self,
        cfg: &BouncingBallsConfig,
        gravity: &ForceGeneratorRef,
    ) -> Result<(), SimError> {
        if !(cfg.min_radius > 0.0 && cfg.max_radius >= cfg.min_radius) {
            return Err(SimError::InvalidConfig(format!(
                "radius range [{}, {}] is empty",
                cfg.min_radius, cfg.max_radius
            )));
        }

        for k in 0..cfg.ball_count {
            let radius = if cfg.max_radius > cfg.min_radius {
                self.rng.random_range(cfg.min_radius..cfg.max_radius)
            } else {
                cfg.min_radius
            };
            let color: Rgb = [self.rng.random(), self.rng.random(), self.rng.random()];
            let position = scatter_position(&mut self.rng);

            let particle = Particle::new(position)
                .with_label(format!("Ball {k}"))
                .with_radius(radius)?
                .with_damping(cfg.damping)?
                .with_colors(color, color);
            let id = self.particles.add(particle);
            self.attach(id, gravity)?;
        }
        Ok(())
    }

    fn populate_bodies(&mut self, bodies: &[BodyConfig], gravity: &ForceGeneratorRef) -> Result<(), SimError> {
        for (k, body) in bodies.iter().enumerate() {
            let label = body.label.clone().unwrap_or_else(|| format!("Body {k}"));
            let particle = Particle::new(NVec3::from(body.position))
                .with_label(label.clone())
                .with_velocity(NVec3::from(body.velocity))
                .with_inverse_mass(body.inverse_mass)?
                .with_damping(body.damping)?
                .with_radius(body.radius)?;
            let id = self.particles.add(particle);

            if body.gravity {
                self.forces.add(&self.particles, id, Arc::clone(gravity))?;
            }
            if body.ground {
                self.ground.track(&self.particles, id)?;
            }
            if body.collide {
                self.pairs.track(&self.particles, id)?;
            }
            if let Some(anchor) = &body.anchor {
                self.anchors.push(EqualityAnchoredConstraint::new(
                    &self.particles,
                    id,
                    NVec3::from(anchor.position),
                    anchor.length,
                    anchor.tolerance,
                    anchor.restitution,
                    format!("{label} anchor"),
                )?);
            }
        }
        Ok(())
    }
}

/// Uniform scatter over x∈[-10,10], y∈[2,20], z∈[-10,10]
fn scatter_position(rng: &mut Pcg32) -> NVec3 {
    NVec3::new(
        rng.random_range(-10.0..10.0),
        rng.random_range(2.0..20.0),
        rng.random_range(-10.0..10.0),
    )
}

fn parameters_from_config(cfg: &ParametersConfig) -> Result<Parameters, SimError> {
    let tolerance_ok = |x: f64| x.is_finite() && x >= 0.0;
    if !tolerance_ok(cfg.penetration_epsilon) || !tolerance_ok(cfg.velocity_epsilon) {
        return Err(SimError::InvalidConfig(format!(
            "resolver epsilons must be finite and >= 0 (penetration {}, velocity {})",
            cfg.penetration_epsilon, cfg.velocity_epsilon
        )));
    }
    if cfg.iteration_factor == 0 {
        return Err(SimError::InvalidConfig("iteration_factor must be at least 1".into()));
    }
    if cfg.gravity.iter().any(|g| !g.is_finite()) {
        return Err(SimError::InvalidConfig(format!("gravity {:?} is not finite", cfg.gravity)));
    }

    Ok(Parameters {
        gravity: NVec3::from(cfg.gravity),
        ground_restitution: cfg.ground_restitution,
        particle_restitution: cfg.particle_restitution,
        contact_capacity: cfg.contact_capacity,
        tuning: ResolverTuning {
            penetration_epsilon: cfg.penetration_epsilon,
            velocity_epsilon: cfg.velocity_epsilon,
            iteration_factor: cfg.iteration_factor,
        },
        seed: cfg.seed,
    })
}
