pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use error::SimError;

pub use simulation::states::{Particle, ParticleId, Particles, NVec3, Rgb};
pub use simulation::forces::{ForceGenerator, ForceGeneratorRef, ForceGeneratorRegistry, GravityForceGenerator, DragForceGenerator, AnchoredSpringForceGenerator};
pub use simulation::contacts::{Contact, ContactBody};
pub use simulation::generators::{ContactGenerator, GroundContactGenerator, ParticleParticleContactGenerator};
pub use simulation::constraints::EqualityAnchoredConstraint;
pub use simulation::resolver::{ContactRegistry, Resolution};
pub use simulation::params::{Parameters, ResolverTuning};
pub use simulation::integrator::integrate_particles;
pub use simulation::engine::{step, run, StepReport};
pub use simulation::scenario::Scenario;

pub use configuration::config::{EngineConfig, ParametersConfig, CradleConfig, BouncingBallsConfig, BodyConfig, AnchorConfig, ScenarioKindConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_resolver, bench_resolver_curve};
