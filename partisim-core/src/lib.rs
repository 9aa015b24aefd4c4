pub mod clock;
pub mod collision;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod grid;
pub mod integrator;
pub mod runtime;
pub mod spatial;
pub mod view;

pub use clock::{FixedStepClock, FrameStats, Performance};
pub use config::{ConfigError, GridConfig, SimConfig};
pub use diagnostics::{AnomalyCounters, StepReport};
pub use engine::{Bounds, Particle, PlacementError, World};
pub use grid::{GridError, GridRequest};
pub use integrator::{Integrator, StepParams};
pub use runtime::{
    advance_frame, build_simulation_context, get_particle_states, projection, run_headless,
    step_simulation, summarize, ParticleState, SimulationContext, SimulationResult,
};
pub use spatial::{AllPairs, BroadPhase, CellGrid, SpatialGrid};
pub use view::ViewTransform;

// Test helpers module (public for integration tests)
// Always compiled - integration tests are separate crates and need access
pub mod tests;
