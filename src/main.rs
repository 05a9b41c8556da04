use ppsim::simulation::engine::run;
use ppsim::simulation::integrator::kinetic_energy;
use ppsim::{bench_resolver, bench_resolver_curve, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "newtons_cradle.yaml")]
    file_name: String,

    /// Override the number of frames from the scenario file
    #[arg(long)]
    frames: Option<usize>,

    /// Run the resolver benchmark instead of a scenario
    #[arg(long)]
    bench: bool,

    /// With --bench: sweep ball counts and print CSV
    #[arg(long)]
    curve: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("opening scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("parsing scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        if args.curve {
            bench_resolver_curve()?;
        } else {
            bench_resolver()?;
        }
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let frames = args.frames.unwrap_or(scenario_cfg.engine.frames);

    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    let dt = scenario.dt();

    info!("running {} frames of {:.5} s from {}", frames, dt, args.file_name);
    let report = run(&mut scenario, frames, dt)?;

    info!(
        "t = {:.3} s, last frame: {} contacts, max penetration {:.3e}, kinetic energy {:.5}",
        report.t,
        report.resolution.contacts,
        report.resolution.max_penetration,
        kinetic_energy(&scenario.particles)
    );
    for p in scenario.particles.iter() {
        info!(
            "{:>8}: position ({:8.4}, {:8.4}, {:8.4}), speed {:.4}",
            p.label,
            p.position.x,
            p.position.y,
            p.position.z,
            p.velocity.norm()
        );
    }

    Ok(())
}
