pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod contacts;
pub mod generators;
pub mod constraints;
pub mod resolver;
pub mod scenario;
