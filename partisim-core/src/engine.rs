use glam::Vec2;
use log::warn;
use thiserror::Error;

/// A circular particle in the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub mass: f32,
    pub radius: f32,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, mass: f32, radius: f32) -> Self {
        Self {
            pos,
            vel,
            mass,
            radius,
        }
    }

    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass
    }

    pub fn momentum(&self) -> Vec2 {
        self.vel * self.mass
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.vel.length_squared()
    }

    /// True when every component is finite and mass/radius are usable
    pub fn is_valid(&self) -> bool {
        self.pos.is_finite()
            && self.vel.is_finite()
            && is_usable_mass(self.mass)
            && self.radius.is_finite()
            && self.radius > 0.0
    }
}

/// A mass is usable when it is finite, positive and has a finite inverse.
///
/// Subnormal masses fail the last test.
pub fn is_usable_mass(mass: f32) -> bool {
    mass.is_finite() && mass > 0.0 && mass.recip().is_finite()
}

/// Axis-aligned confinement rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub bottom_left: Vec2,
    pub top_right: Vec2,
}

impl Bounds {
    /// Returns `None` unless both corners are finite and strictly ordered on each axis.
    pub fn new(bottom_left: Vec2, top_right: Vec2) -> Option<Self> {
        let ordered = bottom_left.x < top_right.x && bottom_left.y < top_right.y;
        if bottom_left.is_finite() && top_right.is_finite() && ordered {
            Some(Self {
                bottom_left,
                top_right,
            })
        } else {
            None
        }
    }

    pub fn width(&self) -> f32 {
        self.top_right.x - self.bottom_left.x
    }

    pub fn height(&self) -> f32 {
        self.top_right.y - self.bottom_left.y
    }

    pub fn size(&self) -> Vec2 {
        self.top_right - self.bottom_left
    }

    pub fn center(&self) -> Vec2 {
        (self.top_right + self.bottom_left) * 0.5
    }

    /// Corners of the region a particle center may occupy, or `None` if the
    /// rectangle collapses.
    pub fn inset(&self, margin: f32) -> Option<(Vec2, Vec2)> {
        let lo = self.bottom_left + Vec2::splat(margin);
        let hi = self.top_right - Vec2::splat(margin);
        if lo.x < hi.x && lo.y < hi.y {
            Some((lo, hi))
        } else {
            None
        }
    }

    /// Whether a circle of `radius` centered at `pos` lies fully inside
    pub fn contains_circle(&self, pos: Vec2, radius: f32) -> bool {
        pos.x - radius >= self.bottom_left.x
            && pos.x + radius <= self.top_right.x
            && pos.y - radius >= self.bottom_left.y
            && pos.y + radius <= self.top_right.y
    }
}

/// Rejected single-particle insertion
#[derive(Debug, Error, PartialEq)]
pub enum PlacementError {
    #[error("particle at ({x}, {y}) with radius {radius} lies outside the simulation bounds")]
    OutOfBounds { x: f32, y: f32, radius: f32 },
    #[error("particle state must be finite with positive mass and radius")]
    InvalidState,
}

/// The particle store: a flat, insertion-ordered collection confined to `bounds`.
///
/// A particle's index is its identity for the lifetime of the world.
#[derive(Debug, Clone)]
pub struct World {
    pub particles: Vec<Particle>,
    bounds: Bounds,
    default_radius: f32,
    pub(crate) initial_speed: f32,
    pub(crate) seed: u64,
}

impl World {
    pub fn new(bounds: Bounds, default_radius: f32) -> Self {
        Self {
            particles: Vec::new(),
            bounds,
            default_radius,
            initial_speed: 100.0,
            seed: 0,
        }
    }

    /// Magnitude cap and RNG seed used for grid particles spawned with an initial velocity
    pub fn with_initial_velocity(mut self, speed: f32, seed: u64) -> Self {
        self.initial_speed = speed;
        self.seed = seed;
        self
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn default_radius(&self) -> f32 {
        self.default_radius
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Largest radius currently present (the default radius for an empty world)
    pub fn max_radius(&self) -> f32 {
        self.particles
            .iter()
            .map(|p| p.radius)
            .fold(self.default_radius, f32::max)
    }

    /// Append a resting particle with the default radius, returning its index
    pub fn add_particle(&mut self, pos: Vec2, mass: f32) -> Result<usize, PlacementError> {
        self.add_particle_with(Particle::new(pos, Vec2::ZERO, mass, self.default_radius))
    }

    pub fn add_particle_with_velocity(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        mass: f32,
    ) -> Result<usize, PlacementError> {
        self.add_particle_with(Particle::new(pos, vel, mass, self.default_radius))
    }

    /// Append a fully specified particle
    pub fn add_particle_with(&mut self, particle: Particle) -> Result<usize, PlacementError> {
        if !particle.is_valid() {
            warn!("rejected particle with invalid state: {:?}", particle);
            return Err(PlacementError::InvalidState);
        }
        if !self.bounds.contains_circle(particle.pos, particle.radius) {
            warn!(
                "rejected particle at ({}, {}): outside usable bounds",
                particle.pos.x, particle.pos.y
            );
            return Err(PlacementError::OutOfBounds {
                x: particle.pos.x,
                y: particle.pos.y,
                radius: particle.radius,
            });
        }
        self.particles.push(particle);
        Ok(self.particles.len() - 1)
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.particles.iter().map(|p| p.pos)
    }

    pub fn total_momentum(&self) -> Vec2 {
        self.particles.iter().map(Particle::momentum).sum()
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }
}
