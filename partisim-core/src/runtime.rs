use crate::clock::FixedStepClock;
use crate::config::{ConfigError, SimConfig};
use crate::diagnostics::{AnomalyCounters, StepReport};
use crate::engine::World;
use crate::integrator::{Integrator, StepParams};
use crate::spatial::broad_phase_for;
use crate::view::ViewTransform;
use glam::{Mat4, Vec2};
use log::{debug, info};

/// Per-particle data handed to a renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    pub pos: Vec2,
    pub radius: f32,
}

/// Summary of a headless run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub particle_count: usize,
    pub steps: u64,
    pub momentum: Vec2,
    pub kinetic_energy: f32,
    pub anomalies: AnomalyCounters,
}

/// Everything a frame loop needs: the particles, the stepper, the clock
/// and the camera.
#[derive(Debug)]
pub struct SimulationContext {
    pub world: World,
    pub integrator: Integrator,
    pub clock: FixedStepClock,
    pub view: ViewTransform,
    pub border_offset: f32,
    pub current_step: u64,
    pub anomalies: AnomalyCounters,
}

/// Build a context from a configuration, placing the configured grid
pub fn build_simulation_context(config: &SimConfig) -> Result<SimulationContext, ConfigError> {
    config.validate()?;
    let bounds = config.bounds()?;

    let mut world = World::new(bounds, config.particle_radius)
        .with_initial_velocity(config.initial_speed, config.seed);
    if let Some(request) = config.grid_request() {
        world.add_grid_request(&request)?;
    }

    let params = StepParams {
        gravity: config.gravity,
        wall_restitution: config.wall_restitution,
        particle_restitution: config.particle_restitution,
        iterations: config.collision_iterations,
    };
    let integrator = Integrator::new(
        broad_phase_for(config.use_spatial_partitioning, config.cell_size),
        params,
    );
    debug!(
        "built simulation: {} particles, {} search, dt {}",
        world.len(),
        integrator.broad_phase_name(),
        config.fixed_dt
    );

    Ok(SimulationContext {
        world,
        integrator,
        clock: FixedStepClock::new(
            config.fixed_dt,
            config.max_steps_per_frame,
            config.fps_window,
        ),
        view: ViewTransform::new(bounds, config.zoom, config.window_width),
        border_offset: config.border_offset,
        current_step: 0,
        anomalies: AnomalyCounters::default(),
    })
}

/// Run one fixed step
pub fn step_simulation(ctx: &mut SimulationContext) -> StepReport {
    let dt = ctx.clock.fixed_dt();
    let report = ctx.integrator.step(&mut ctx.world, dt);
    ctx.current_step += 1;
    ctx.anomalies += report;
    report
}

/// Feed one rendered frame's duration to the clock and run the steps it owes.
/// Returns the number of steps taken.
pub fn advance_frame(ctx: &mut SimulationContext, frame_seconds: f32) -> u32 {
    let steps = ctx.clock.update(frame_seconds);
    for _ in 0..steps {
        step_simulation(ctx);
    }
    steps
}

/// Positions and radii in particle index order
pub fn get_particle_states(ctx: &SimulationContext) -> Vec<ParticleState> {
    ctx.world
        .particles
        .iter()
        .map(|p| ParticleState {
            pos: p.pos,
            radius: p.radius,
        })
        .collect()
}

/// Projection for the current zoom and the given aspect ratio
pub fn projection(ctx: &SimulationContext, aspect_ratio: f32) -> Mat4 {
    ctx.view.projection(aspect_ratio, ctx.border_offset)
}

pub fn summarize(ctx: &SimulationContext) -> SimulationResult {
    SimulationResult {
        particle_count: ctx.world.len(),
        steps: ctx.current_step,
        momentum: ctx.world.total_momentum(),
        kinetic_energy: ctx.world.kinetic_energy(),
        anomalies: ctx.anomalies,
    }
}

/// Build from `config` and run `steps` fixed steps without a frame loop
pub fn run_headless(config: &SimConfig, steps: u64) -> Result<SimulationResult, ConfigError> {
    let mut ctx = build_simulation_context(config)?;
    for _ in 0..steps {
        step_simulation(&mut ctx);
    }
    let result = summarize(&ctx);
    info!(
        "ran {} steps over {} particles ({})",
        result.steps, result.particle_count, result.anomalies
    );
    Ok(result)
}
