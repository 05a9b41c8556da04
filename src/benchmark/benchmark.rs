use std::time::Instant;

use crate::configuration::config::{
    BouncingBallsConfig, CradleConfig, EngineConfig, ParametersConfig, ScenarioConfig,
    ScenarioKindConfig,
};
use crate::error::SimError;
use crate::simulation::engine::step;
use crate::simulation::scenario::Scenario;

/// Helper to build a bouncing-balls config of size `n`
/// Capacity is generous so the timings measure resolution, not overflow
fn make_bouncing(n: usize) -> ScenarioConfig {
    ScenarioConfig {
        engine: EngineConfig::default(),
        parameters: ParametersConfig {
            contact_capacity: (8 * n).max(100),
            ..Default::default()
        },
        scenario: ScenarioKindConfig::BouncingBalls(BouncingBallsConfig {
            ball_count: n,
            ..Default::default()
        }),
    }
}

/// Helper to build a cradle config of size `n`, first ball swung out
fn make_cradle(n: usize) -> ScenarioConfig {
    ScenarioConfig {
        engine: EngineConfig::default(),
        parameters: ParametersConfig {
            contact_capacity: (8 * n).max(100),
            ..Default::default()
        },
        scenario: ScenarioKindConfig::NewtonsCradle(CradleConfig {
            ball_count: n,
            perturbed_ball_count: 1,
            ..Default::default()
        }),
    }
}

/// Average wall time of one `step` in milliseconds
fn time_steps(cfg: ScenarioConfig, warmup: usize, steps: usize) -> Result<f64, SimError> {
    let mut scenario = Scenario::build_scenario(cfg)?;
    let dt = scenario.dt();

    for _ in 0..warmup {
        step(&mut scenario, dt)?;
    }

    let t0 = Instant::now();
    for _ in 0..steps {
        step(&mut scenario, dt)?;
    }
    Ok(t0.elapsed().as_secs_f64() * 1000.0 / steps as f64)
}

pub fn bench_resolver() -> Result<(), SimError> {
    // Different system sizes to test
    let ns = [10, 20, 40, 80, 160, 320];
    let steps = 100;

    for n in ns {
        // Let the bouncing balls reach the ground so contacts exist
        let ms_bouncing = time_steps(make_bouncing(n), 300, steps)?;
        let ms_cradle = time_steps(make_cradle(n), 30, steps)?;

        println!(
            "N = {n:4}, bouncing step = {:8.4} ms, cradle step = {:8.4} ms",
            ms_bouncing, ms_cradle
        );
    }
    Ok(())
}

/// Sweep ball counts and print CSV
/// Paste output directly into a spreadsheet to graph
pub fn bench_resolver_curve() -> Result<(), SimError> {
    println!("N,bouncing_ms,cradle_ms");

    for n in (10..=400).step_by(10) {
        // Small n: average over more steps to smooth noise
        let steps = if n <= 100 { 200 } else { 20 };

        let ms_bouncing = time_steps(make_bouncing(n), 300, steps)?;
        let ms_cradle = time_steps(make_cradle(n), 30, steps)?;

        println!("{},{:.6},{:.6}", n, ms_bouncing, ms_cradle);
    }
    Ok(())
}
