use crate::collision::{pair_mut, resolve_pair, resolve_walls};
use crate::diagnostics::StepReport;
use crate::engine::{is_usable_mass, Bounds, Particle, World};
use crate::spatial::BroadPhase;
use glam::Vec2;
use log::warn;

/// Advance every particle by dt using semi-implicit Euler integration
pub fn integrate(particles: &mut [Particle], gravity: Vec2, dt: f32) {
    // v += a*dt, then x += v*dt
    for particle in particles.iter_mut() {
        particle.vel += gravity * dt;
        particle.pos += particle.vel * dt;
    }
}

/// Physical constants applied during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    pub gravity: Vec2,
    pub wall_restitution: f32,
    pub particle_restitution: f32,
    /// Contact relaxation passes per step
    pub iterations: u32,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            gravity: Vec2::ZERO,
            wall_restitution: 1.0,
            particle_restitution: 1.0,
            iterations: 1,
        }
    }
}

/// Runs fixed steps over a [`World`]: integrate, bounce off walls, resolve
/// particle contacts found by the configured [`BroadPhase`], then repair
/// anything that went non-finite.
#[derive(Debug)]
pub struct Integrator {
    broad_phase: Box<dyn BroadPhase>,
    params: StepParams,
    contacts: Vec<(usize, usize)>,
    snapshot: Vec<Particle>,
}

impl Integrator {
    pub fn new(broad_phase: Box<dyn BroadPhase>, params: StepParams) -> Self {
        Self {
            broad_phase,
            params,
            contacts: Vec::new(),
            snapshot: Vec::new(),
        }
    }

    pub fn params(&self) -> &StepParams {
        &self.params
    }

    pub fn broad_phase_name(&self) -> &'static str {
        self.broad_phase.name()
    }

    /// Advance `world` by one step of `dt` seconds.
    ///
    /// Always leaves every particle finite and inside the bounds. A
    /// non-positive or non-finite `dt` leaves the world untouched.
    pub fn step(&mut self, world: &mut World, dt: f32) -> StepReport {
        let mut report = StepReport::default();
        if !(dt.is_finite() && dt > 0.0) {
            warn!("skipping step with invalid dt {}", dt);
            return report;
        }

        self.snapshot.clear();
        self.snapshot.extend_from_slice(&world.particles);

        let bounds = *world.bounds();
        let params = self.params;

        integrate(&mut world.particles, params.gravity, dt);
        report.wall_hits +=
            bounce_off_walls(&mut world.particles, &bounds, params.wall_restitution);

        for _ in 0..params.iterations.max(1) {
            self.broad_phase.collect_contacts(world, &mut self.contacts);
            if self.contacts.is_empty() {
                break;
            }
            for &(i, j) in &self.contacts {
                let (a, b) = pair_mut(&mut world.particles, i, j);
                if let Some(contact) = resolve_pair(a, b, params.particle_restitution) {
                    report.contacts += 1;
                    if contact.coincident {
                        report.coincident += 1;
                    }
                }
            }
        }

        // Contact separation can push a particle back through a wall
        report.wall_hits +=
            bounce_off_walls(&mut world.particles, &bounds, params.wall_restitution);

        report.repaired = self.repair(world);
        if report.has_anomalies() {
            warn!(
                "step anomalies: {} repaired particles, {} coincident pairs",
                report.repaired, report.coincident
            );
        }
        report
    }

    /// Restore particles that went non-finite to their state before the step
    fn repair(&self, world: &mut World) -> usize {
        let bounds = *world.bounds();
        let default_radius = world.default_radius();
        let mut repaired = 0;

        for (idx, (particle, previous)) in world
            .particles
            .iter_mut()
            .zip(&self.snapshot)
            .enumerate()
        {
            if particle.is_valid() {
                continue;
            }
            repaired += 1;
            warn!("particle {} has non-finite state {:?}; restoring", idx, particle);

            if previous.is_valid() {
                *particle = *previous;
            } else {
                sanitize(particle, previous, &bounds, default_radius);
            }
            resolve_walls(particle, &bounds, 1.0);
        }
        repaired
    }
}

fn bounce_off_walls(particles: &mut [Particle], bounds: &Bounds, restitution: f32) -> usize {
    particles
        .iter_mut()
        .map(|p| resolve_walls(p, bounds, restitution))
        .filter(|&hit| hit)
        .count()
}

/// Component-wise fallback when the pre-step state was already unusable
fn sanitize(particle: &mut Particle, previous: &Particle, bounds: &Bounds, default_radius: f32) {
    if !particle.pos.is_finite() {
        particle.pos = if previous.pos.is_finite() {
            previous.pos
        } else {
            bounds.center()
        };
    }
    if !particle.vel.is_finite() {
        particle.vel = if previous.vel.is_finite() {
            previous.vel
        } else {
            Vec2::ZERO
        };
    }
    if !is_usable_mass(particle.mass) {
        particle.mass = 1.0;
    }
    if !(particle.radius.is_finite() && particle.radius > 0.0) {
        particle.radius = default_radius;
    }
}
