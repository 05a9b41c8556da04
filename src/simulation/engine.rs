//! Frame driver
//!
//! Runs one simulation frame over a `Scenario` in a fixed order:
//! forces, integration, contact generation (ground, then particle pairs,
//! then anchored constraints), resolution, and clearing of the contact
//! buffer.

use log::{trace, warn};

use crate::error::{check_timestep, SimError};
use crate::simulation::generators::ContactGenerator;
use crate::simulation::integrator::integrate_particles;
use crate::simulation::resolver::Resolution;
use crate::simulation::scenario::Scenario;

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub t: f64, // simulated time after the frame
    pub generated: usize, // contacts offered by all generators
    pub overflowed: usize, // contacts dropped by the buffer policy
    pub resolution: Resolution,
}

/// Advance `scenario` by one frame of `dt` seconds
///
/// Contact overflow is logged and the frame continues with the contacts the
/// buffer kept. Any other error aborts the frame; `dt` is checked before
/// anything is touched and the contact buffer is always left empty.
pub fn step(scenario: &mut Scenario, dt: f64) -> Result<StepReport, SimError> {
    check_timestep(dt)?;

    let result = pipeline(scenario, dt);
    scenario.contacts.clear();
    let (generated, overflowed, resolution) = result?;

    scenario.t += dt;
    trace!(
        "t = {:.4}: {} contacts, {} position / {} velocity iterations",
        scenario.t,
        resolution.contacts,
        resolution.penetration_iterations,
        resolution.velocity_iterations
    );

    Ok(StepReport {
        t: scenario.t,
        generated,
        overflowed,
        resolution,
    })
}

fn pipeline(scenario: &mut Scenario, dt: f64) -> Result<(usize, usize, Resolution), SimError> {
    // Split &mut Scenario into &mut fields in one destructuring step
    let Scenario {
        particles,
        forces,
        ground,
        pairs,
        anchors,
        contacts,
        t,
        ..
    } = scenario;

    forces.apply_force(particles, dt)?;
    integrate_particles(particles, dt)?;

    let generators = std::iter::once(&*ground as &dyn ContactGenerator)
        .chain(std::iter::once(&*pairs as &dyn ContactGenerator))
        .chain(anchors.iter().map(|a| a as &dyn ContactGenerator));

    for generator in generators {
        match generator.generate(particles, contacts) {
            Ok(_) => {}
            Err(e) if e.is_recoverable() => {}
            Err(e) => return Err(e),
        }
    }

    // every offered contact was either stored or counted as dropped
    let overflowed = contacts.overflowed();
    let generated = contacts.len() + overflowed;
    if overflowed > 0 {
        warn!(
            "t = {:.4}: {} contact(s) beyond capacity {} were dropped",
            *t,
            overflowed,
            contacts.capacity()
        );
    }

    let resolution = contacts.resolve(particles, dt)?;
    Ok((generated, overflowed, resolution))
}

/// Run `frames` frames with a fixed `dt`, returning the last frame's report
pub fn run(scenario: &mut Scenario, frames: usize, dt: f64) -> Result<StepReport, SimError> {
    check_timestep(dt)?;
    let mut report = StepReport {
        t: scenario.t,
        ..Default::default()
    };
    for _ in 0..frames {
        report = step(scenario, dt)?;
    }
    Ok(report)
}
