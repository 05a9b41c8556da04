//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]       – fixed timestep and frame count for headless runs
//! - [`ParametersConfig`]   – gravity, restitution and resolver tuning
//! - [`ScenarioKindConfig`] – which particles, anchors and generators to build
//! - [`ScenarioConfig`]     – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example Newton's cradle matching these types:
//!
//! ```yaml
//! engine:
//!   dt: 0.0166666667         # fixed timestep (s)
//!   frames: 600
//!
//! parameters:
//!   gravity: [0.0, -1.0, 0.0]
//!   ground_restitution: 0.0
//!   particle_restitution: 1.0
//!   contact_capacity: 100
//!   penetration_epsilon: 1.0e-6
//!   velocity_epsilon: 1.0e-6
//!   iteration_factor: 2      # iterations per pass = factor * contacts
//!   seed: 42
//!
//! scenario:
//!   kind: newtons_cradle
//!   ball_count: 5
//!   perturbed_ball_count: 1
//!   initial_angle: 45.0      # degrees
//!   radius: 0.5
//!   rod_length: 5.0
//! ```
//!
//! Every field except `scenario.kind` has a default. The engine maps this
//! configuration into its runtime `Scenario`, validating values on the way.

use serde::Deserialize;

use crate::error::SimError;
use crate::simulation::params::{
    DEFAULT_CONTACT_CAPACITY, DEFAULT_ITERATION_FACTOR, DEFAULT_PENETRATION_EPSILON,
    DEFAULT_VELOCITY_EPSILON,
};

/// Fixed-step driver settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub dt: f64, // timestep in seconds, must be > 0
    pub frames: usize, // frames to run headless
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            frames: 600,
        }
    }
}

/// Global physical parameters and resolver tuning
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ParametersConfig {
    pub gravity: [f64; 3],
    pub ground_restitution: f64,
    pub particle_restitution: f64,
    pub contact_capacity: usize,
    pub penetration_epsilon: f64,
    pub velocity_epsilon: f64,
    pub iteration_factor: usize,
    pub seed: u64, // deterministic seed to make runs reproducible
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -1.0, 0.0],
            ground_restitution: 0.0,
            particle_restitution: 1.0,
            contact_capacity: DEFAULT_CONTACT_CAPACITY,
            penetration_epsilon: DEFAULT_PENETRATION_EPSILON,
            velocity_epsilon: DEFAULT_VELOCITY_EPSILON,
            iteration_factor: DEFAULT_ITERATION_FACTOR,
            seed: 42,
        }
    }
}

/// A row of pendulums hanging from fixed anchors
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CradleConfig {
    pub ball_count: usize,
    pub perturbed_ball_count: usize, // clamped to ball_count
    pub initial_angle: f64, // degrees, swing of the perturbed balls
    pub radius: f64,
    pub rest_height: f64, // y of a ball hanging straight down
    pub rod_length: f64,
    pub tolerance: f64,
    pub constraint_restitution: f64,
    pub damping: f64,
}

impl Default for CradleConfig {
    fn default() -> Self {
        Self {
            ball_count: 5,
            perturbed_ball_count: 1,
            initial_angle: 45.0,
            radius: 0.5,
            rest_height: 1.0,
            rod_length: 5.0,
            tolerance: 0.0,
            constraint_restitution: 0.0,
            damping: 0.99,
        }
    }
}

/// Randomly sized balls dropped from random heights
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BouncingBallsConfig {
    pub ball_count: usize,
    pub min_radius: f64,
    pub max_radius: f64,
    pub damping: f64,
}

impl Default for BouncingBallsConfig {
    fn default() -> Self {
        Self {
            ball_count: 10,
            min_radius: 0.1,
            max_radius: 0.3,
            damping: 0.99,
        }
    }
}

/// Fixed anchor attached to an explicitly listed body
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AnchorConfig {
    pub position: [f64; 3],
    pub length: f64,
    #[serde(default)]
    pub tolerance: f64,
    #[serde(default)]
    pub restitution: f64,
}

fn default_inverse_mass() -> f64 {
    1.0
}

fn default_damping() -> f64 {
    0.99
}

fn default_radius() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

/// Configuration for a single particle's initial state
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BodyConfig {
    #[serde(default)]
    pub label: Option<String>,
    pub position: [f64; 3],
    #[serde(default)]
    pub velocity: [f64; 3],
    #[serde(default = "default_inverse_mass")]
    pub inverse_mass: f64, // 0 = immovable
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default = "default_true")]
    pub gravity: bool, // register the shared gravity generator
    #[serde(default = "default_true")]
    pub ground: bool, // collide with the ground plane
    #[serde(default = "default_true")]
    pub collide: bool, // collide with other bodies
    #[serde(default)]
    pub anchor: Option<AnchorConfig>,
}

/// Which world to build
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioKindConfig {
    NewtonsCradle(CradleConfig),
    BouncingBalls(BouncingBallsConfig),
    Bodies { bodies: Vec<BodyConfig> },
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig, // timestep and run length
    #[serde(default)]
    pub parameters: ParametersConfig, // global physical and numerical parameters
    pub scenario: ScenarioKindConfig, // what to put in the world
}

impl ScenarioConfig {
    /// Parse a scenario from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self, SimError> {
        serde_yaml::from_str(text).map_err(|e| SimError::InvalidConfig(e.to_string()))
    }
}
