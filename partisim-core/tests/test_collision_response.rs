//! Pair response: momentum, separation and edge cases inside a full step

use glam::Vec2;
use partisim_core::tests::test_helpers::{approx_eq_vec2, empty_world, min_pair_gap};
use partisim_core::{
    build_simulation_context, step_simulation, AllPairs, CellGrid, GridConfig, Integrator,
    Particle, SimConfig, StepParams,
};

const DT: f32 = 1.0 / 60.0;

#[test]
fn test_equal_masses_swap_velocities() {
    let mut world = empty_world(10.0);
    world
        .add_particle_with_velocity(Vec2::new(-15.0, 0.0), Vec2::new(50.0, 0.0), 1.0)
        .unwrap();
    world
        .add_particle_with_velocity(Vec2::new(15.0, 0.0), Vec2::new(-50.0, 0.0), 1.0)
        .unwrap();

    let mut integrator = Integrator::new(Box::new(CellGrid::new(None)), StepParams::default());
    let mut contacts = 0;
    for _ in 0..30 {
        contacts += integrator.step(&mut world, DT).contacts;
        assert!(approx_eq_vec2(world.total_momentum(), Vec2::ZERO, 1e-4));
    }

    assert_eq!(contacts, 1);
    assert_eq!(world.particles[0].vel, Vec2::new(-50.0, 0.0));
    assert_eq!(world.particles[1].vel, Vec2::new(50.0, 0.0));
    assert!(world.particles[0].pos.x < world.particles[1].pos.x);
}

#[test]
fn test_elastic_collisions_conserve_energy() {
    let mut world = empty_world(10.0);
    world
        .add_particle_with_velocity(Vec2::new(-100.0, 3.0), Vec2::new(120.0, 0.0), 1.0)
        .unwrap();
    world
        .add_particle_with_velocity(Vec2::new(100.0, -3.0), Vec2::new(-60.0, 10.0), 3.0)
        .unwrap();
    let energy = world.kinetic_energy();
    let momentum = world.total_momentum();

    let mut integrator = Integrator::new(Box::new(AllPairs), StepParams::default());
    for _ in 0..120 {
        integrator.step(&mut world, DT);
    }

    assert!((world.kinetic_energy() - energy).abs() / energy < 1e-4);
    assert!(approx_eq_vec2(world.total_momentum(), momentum, 1e-2));
}

#[test]
fn test_isolated_overlaps_are_fully_separated() {
    let mut world = empty_world(10.0);
    // Three separate clusters: a pair, a chain of three, a coincident pair
    for pos in [
        Vec2::new(-500.0, 0.0),
        Vec2::new(-488.0, 5.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(15.0, 0.0),
        Vec2::new(30.0, 0.0),
        Vec2::new(400.0, 300.0),
        Vec2::new(400.0, 300.0),
    ] {
        world.add_particle(pos, 1.0).unwrap();
    }
    assert!(min_pair_gap(&world.particles) < -5.0);

    let mut integrator = Integrator::new(
        Box::new(CellGrid::new(None)),
        StepParams {
            iterations: 12,
            ..StepParams::default()
        },
    );
    let report = integrator.step(&mut world, DT);

    assert_eq!(report.coincident, 1);
    assert!(min_pair_gap(&world.particles) >= -1e-3);
    for p in &world.particles {
        assert!(p.pos.is_finite());
    }
}

#[test]
fn test_no_deep_overlap_in_busy_scene() {
    let config = SimConfig {
        particle_radius: 8.0,
        initial_speed: 150.0,
        seed: 5,
        collision_iterations: 4,
        grid: Some(GridConfig {
            rows: 30,
            cols: 40,
            spacing: Vec2::new(20.0, 20.0),
            with_initial_velocity: true,
            mass: None,
        }),
        ..SimConfig::default()
    };
    let mut ctx = build_simulation_context(&config).unwrap();
    for _ in 0..240 {
        step_simulation(&mut ctx);
    }
    let gap = min_pair_gap(&ctx.world.particles);
    assert!(gap > -config.particle_radius * 0.5, "deepest overlap {gap}");
    assert_eq!(ctx.anomalies.repaired, 0);
}

#[test]
fn test_heavy_particle_barely_moves() {
    let mut world = empty_world(10.0);
    world
        .add_particle_with(Particle::new(Vec2::ZERO, Vec2::ZERO, 1000.0, 10.0))
        .unwrap();
    world
        .add_particle_with_velocity(Vec2::new(-25.0, 0.0), Vec2::new(300.0, 0.0), 1.0)
        .unwrap();

    let mut integrator = Integrator::new(Box::new(AllPairs), StepParams::default());
    for _ in 0..10 {
        integrator.step(&mut world, DT);
    }
    assert!(world.particles[0].pos.length() < 1.0);
    assert!(world.particles[1].vel.x < 0.0);
}
