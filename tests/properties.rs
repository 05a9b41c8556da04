//! Property-based tests for contact resolution.
//!
//! Random pairs and small piles of spheres are generated and the resolver
//! invariants are checked after one `resolve` or a few engine steps.

use ppsim::simulation::engine::run;
use ppsim::{
    AnchorConfig, BodyConfig, ContactGenerator, ContactRegistry, EngineConfig, NVec3, Particle,
    ParticleParticleContactGenerator, Particles, ParametersConfig, Scenario, ScenarioConfig,
    ScenarioKindConfig,
};
use proptest::prelude::*;

const DT: f64 = 1.0 / 60.0;

// =============================================================================
// Strategies
// =============================================================================

fn arb_position() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-1.0..1.0f64)
}

fn arb_velocity() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-5.0..5.0f64)
}

/// Inverse mass, immovable one time in four
fn arb_inverse_mass() -> impl Strategy<Value = f64> {
    prop_oneof![1 => Just(0.0), 3 => 0.1..4.0f64]
}

fn arb_particle() -> impl Strategy<Value = Particle> {
    (arb_position(), arb_velocity(), arb_inverse_mass(), 0.1..1.0f64).prop_map(|(p, v, im, r)| {
        Particle::new(NVec3::from(p))
            .with_velocity(NVec3::from(v))
            .with_inverse_mass(im)
            .unwrap()
            .with_radius(r)
            .unwrap()
    })
}

fn body(position: [f64; 3], velocity: [f64; 3], inverse_mass: f64) -> BodyConfig {
    BodyConfig {
        label: None,
        position,
        velocity,
        inverse_mass,
        damping: 0.99,
        radius: 0.5,
        gravity: true,
        ground: true,
        collide: true,
        anchor: None,
    }
}

fn bodies_scenario(bodies: Vec<BodyConfig>) -> Scenario {
    let cfg = ScenarioConfig {
        engine: EngineConfig::default(),
        parameters: ParametersConfig {
            gravity: [0.0, -9.8, 0.0],
            ..Default::default()
        },
        scenario: ScenarioKindConfig::Bodies { bodies },
    };
    Scenario::build_scenario(cfg).unwrap()
}

fn pair(a: Particle, b: Particle) -> (Particles, ParticleParticleContactGenerator) {
    let mut particles = Particles::new();
    let ia = particles.add(a);
    let ib = particles.add(b);
    let mut pairs = ParticleParticleContactGenerator::new(0.8).unwrap();
    pairs.track(&particles, ia).unwrap();
    pairs.track(&particles, ib).unwrap();
    (particles, pairs)
}

fn finite(v: &NVec3) -> bool {
    v.iter().all(|x| x.is_finite())
}

// =============================================================================
// Pair resolution
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A single overlapping pair with at least one movable body is fully
    /// separated by one resolve, including coincident centres
    #[test]
    fn single_pair_is_separated(a in arb_particle(), b in arb_particle(), coincident in any::<bool>()) {
        let mut b = b;
        if coincident {
            b.position = a.position;
        }
        let (mut particles, pairs) = pair(a, b);
        let mut contacts = ContactRegistry::new(10, "pair").unwrap();

        pairs.generate(&particles, &mut contacts).unwrap();
        contacts.resolve(&mut particles, DT).unwrap();
        contacts.clear();

        for p in particles.iter() {
            prop_assert!(finite(&p.position));
            prop_assert!(finite(&p.velocity));
        }

        // two pinned bodies are reported but never pushed apart
        let movable = particles.iter().any(|p| p.has_finite_mass());

        // contacts shallower than the epsilon are left alone
        let epsilon = contacts.tuning().penetration_epsilon;
        pairs.generate(&particles, &mut contacts).unwrap();
        for c in contacts.contacts().iter().filter(|_| movable) {
            prop_assert!(c.penetration <= epsilon + 1e-12, "left {}", c.penetration);
        }
    }

    /// Pair impulses are equal and opposite, so momentum survives a resolve
    #[test]
    fn pair_resolution_conserves_momentum(
        pa in arb_position(),
        pb in arb_position(),
        va in arb_velocity(),
        vb in arb_velocity(),
        ima in 0.1..4.0f64,
        imb in 0.1..4.0f64,
    ) {
        let a = Particle::new(NVec3::from(pa)).with_velocity(NVec3::from(va)).with_inverse_mass(ima).unwrap();
        let b = Particle::new(NVec3::from(pb)).with_velocity(NVec3::from(vb)).with_inverse_mass(imb).unwrap();
        let momentum = |ps: &Particles| -> NVec3 { ps.iter().map(|p| p.velocity * p.mass()).sum() };

        let (mut particles, pairs) = pair(a, b);
        let before = momentum(&particles);

        let mut contacts = ContactRegistry::new(10, "pair").unwrap();
        pairs.generate(&particles, &mut contacts).unwrap();
        contacts.resolve(&mut particles, DT).unwrap();

        prop_assert!((momentum(&particles) - before).norm() <= 1e-9 * (1.0 + before.norm()));
    }
}

// =============================================================================
// Whole-engine invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A pinned body is never moved, whatever falls on it
    #[test]
    fn immovable_body_never_moves(
        pinned in arb_position(),
        others in prop::collection::vec((arb_position(), arb_velocity()), 1..6),
    ) {
        let pinned = [pinned[0], pinned[1] + 1.0, pinned[2]];
        let mut bodies = vec![body(pinned, [0.0; 3], 0.0)];
        bodies.extend(others.into_iter().map(|(p, v)| body([p[0], p[1] + 2.0, p[2]], v, 1.0)));

        let mut scenario = bodies_scenario(bodies);
        run(&mut scenario, 60, DT).unwrap();

        let post = scenario.particles.iter().next().unwrap();
        prop_assert_eq!(post.position, NVec3::from(pinned));
        prop_assert_eq!(post.velocity, NVec3::zeros());
        for p in scenario.particles.iter() {
            prop_assert!(finite(&p.position));
            prop_assert!(finite(&p.velocity));
        }
    }

    /// An anchored body swinging under gravity stays within its rod length
    #[test]
    fn anchored_body_stays_on_its_rod(start in arb_position(), velocity in arb_velocity()) {
        let anchor = [0.0, 10.0, 0.0];
        let mut hanging = body([start[0], 6.0 + start[1], start[2]], velocity, 1.0);
        hanging.anchor = Some(AnchorConfig {
            position: anchor,
            length: 5.0,
            tolerance: 0.0,
            restitution: 0.0,
        });

        let mut scenario = bodies_scenario(vec![hanging]);
        for _ in 0..120 {
            ppsim::step(&mut scenario, DT).unwrap();
            let length = scenario.anchors[0].current_length(&scenario.particles).unwrap();
            prop_assert!(length <= 5.0 + 1e-5, "rod stretched to {}", length);
        }
    }
}
