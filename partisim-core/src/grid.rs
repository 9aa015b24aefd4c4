//! Rectangular grid population for the particle store
//!
//! A grid request is validated and fully planned before anything is
//! appended to the world, so a rejected request leaves the store untouched.

use crate::engine::{is_usable_mass, Bounds, Particle, World};
use glam::Vec2;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use std::ops::Range;
use thiserror::Error;

/// Reason a grid request was rejected
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("cannot create grid with {rows} rows and {cols} columns; values must be positive")]
    NonPositiveCount { rows: i32, cols: i32 },
    #[error("particle mass must be finite and positive, got {0}")]
    InvalidMass(f32),
    #[error("not enough space within bounds to create particle grid")]
    NoSpace,
    #[error(
        "grid with {rows}x{cols} particles (radius {radius}) and spacing {spacing_x}x{spacing_y} \
         requires {required_w}x{required_h} units, but only {available_w}x{available_h} units are available"
    )]
    InsufficientSpace {
        rows: i32,
        cols: i32,
        radius: f32,
        spacing_x: f32,
        spacing_y: f32,
        required_w: f32,
        required_h: f32,
        available_w: f32,
        available_h: f32,
    },
    #[error("{requested} particles do not fit inside the available area (room for {capacity:.0})")]
    TooManyParticles { requested: i64, capacity: f32 },
    #[error(
        "particles would overlap with spacing {spacing_x}x{spacing_y}; minimum spacing needed: {min} units"
    )]
    Overlap {
        spacing_x: f32,
        spacing_y: f32,
        min: f32,
    },
}

/// Parameters for placing a `rows` x `cols` block of particles.
///
/// A non-positive spacing component means "distribute evenly" along that axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRequest {
    pub rows: i32,
    pub cols: i32,
    pub spacing: Vec2,
    /// Optional placement rectangle (bottom-left, top-right); defaults to the whole domain
    pub region: Option<(Vec2, Vec2)>,
    pub with_initial_velocity: bool,
    pub mass: f32,
}

impl GridRequest {
    pub fn new(rows: i32, cols: i32) -> Self {
        Self {
            rows,
            cols,
            spacing: Vec2::ZERO,
            region: None,
            with_initial_velocity: false,
            mass: 1.0,
        }
    }

    pub fn spacing(mut self, spacing: Vec2) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn region(mut self, bottom_left: Vec2, top_right: Vec2) -> Self {
        self.region = Some((bottom_left, top_right));
        self
    }

    pub fn initial_velocity(mut self, enabled: bool) -> Self {
        self.with_initial_velocity = enabled;
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

/// Compute the center of every particle in the requested grid, row-major
/// from the bottom-left, without touching any world.
pub fn plan_grid(
    bounds: &Bounds,
    radius: f32,
    request: &GridRequest,
) -> Result<Vec<Vec2>, GridError> {
    let GridRequest {
        rows, cols, spacing, ..
    } = *request;

    if rows <= 0 || cols <= 0 {
        return Err(GridError::NonPositiveCount { rows, cols });
    }
    if !is_usable_mass(request.mass) {
        return Err(GridError::InvalidMass(request.mass));
    }

    // Usable rectangle for particle centers
    let (mut lo, mut hi) = bounds.inset(radius).ok_or(GridError::NoSpace)?;
    if let Some((region_lo, region_hi)) = request.region {
        lo = lo.max(region_lo);
        hi = hi.min(region_hi);
    }
    if !(lo.x < hi.x && lo.y < hi.y) {
        return Err(GridError::NoSpace);
    }
    let available = hi - lo;

    let diameter = 2.0 * radius;
    let mut required_w = cols as f32 * diameter;
    if cols > 1 {
        required_w += (cols - 1) as f32 * spacing.x;
    }
    let mut required_h = rows as f32 * diameter;
    if rows > 1 {
        required_h += (rows - 1) as f32 * spacing.y;
    }
    if required_w > available.x || required_h > available.y {
        return Err(GridError::InsufficientSpace {
            rows,
            cols,
            radius,
            spacing_x: spacing.x,
            spacing_y: spacing.y,
            required_w,
            required_h,
            available_w: available.x,
            available_h: available.y,
        });
    }

    let capacity = (available.x / diameter) * (available.y / diameter);
    let requested = rows as i64 * cols as i64;
    if capacity < requested as f32 {
        return Err(GridError::TooManyParticles {
            requested,
            capacity,
        });
    }

    let step = Vec2::new(
        axis_step(cols, spacing.x, available.x),
        axis_step(rows, spacing.y, available.y),
    );

    if (cols > 1 && step.x < diameter) || (rows > 1 && step.y < diameter) {
        return Err(GridError::Overlap {
            spacing_x: step.x,
            spacing_y: step.y,
            min: diameter,
        });
    }

    // Center the block when it does not span the whole rectangle
    let block = Vec2::new(step.x * (cols - 1) as f32, step.y * (rows - 1) as f32);
    let mut start = lo;
    if block.x < available.x {
        start.x += (available.x - block.x) / 2.0;
    }
    if block.y < available.y {
        start.y += (available.y - block.y) / 2.0;
    }

    let mut positions = Vec::with_capacity(requested as usize);
    for row in 0..rows {
        for col in 0..cols {
            let pos = start + Vec2::new(col as f32 * step.x, row as f32 * step.y);
            positions.push(pos.clamp(lo, hi));
        }
    }
    Ok(positions)
}

fn axis_step(count: i32, spacing: f32, available: f32) -> f32 {
    if count == 1 {
        0.0
    } else if spacing > 0.0 {
        spacing
    } else {
        available / (count - 1) as f32
    }
}

impl World {
    /// Populate the whole domain with a `rows` x `cols` grid.
    ///
    /// All-or-nothing: returns the index range of the new particles, or an
    /// error with zero particles added.
    pub fn add_grid(
        &mut self,
        rows: i32,
        cols: i32,
        spacing: Vec2,
        with_initial_velocity: bool,
        mass: f32,
    ) -> Result<Range<usize>, GridError> {
        let request = GridRequest::new(rows, cols)
            .spacing(spacing)
            .initial_velocity(with_initial_velocity)
            .mass(mass);
        self.add_grid_request(&request)
    }

    pub fn add_grid_request(&mut self, request: &GridRequest) -> Result<Range<usize>, GridError> {
        let radius = self.default_radius();
        let positions = plan_grid(self.bounds(), radius, request).map_err(|e| {
            warn!("grid request rejected: {}", e);
            e
        })?;

        let start = self.particles.len();
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(start as u64));
        let speed = self.initial_speed;

        self.particles.extend(positions.into_iter().map(|pos| {
            let vel = if request.with_initial_velocity && speed > 0.0 {
                let angle = rng.random_range(0.0..TAU);
                Vec2::from_angle(angle) * rng.random_range(0.0..=speed)
            } else {
                Vec2::ZERO
            };
            Particle::new(pos, vel, request.mass, radius)
        }));

        info!(
            "created grid with {}x{} particles",
            request.rows, request.cols
        );
        Ok(start..self.particles.len())
    }
}
