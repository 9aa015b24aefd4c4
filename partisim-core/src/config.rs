//! Scenario configuration
//!
//! A [`SimConfig`] describes everything needed to build a simulation:
//! domain, particle defaults, timing, solver constants, view state and an
//! optional initial grid. It round-trips through JSON; missing fields take
//! their defaults.

use crate::engine::{is_usable_mass, Bounds};
use crate::grid::{GridError, GridRequest};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bounds must be finite with bottom-left strictly below and left of top-right")]
    InvalidBounds,
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
    #[error("particle radius {radius} does not fit inside the bounds")]
    RadiusTooLarge { radius: f32 },
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Initial particle block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: i32,
    pub cols: i32,
    pub spacing: Vec2,
    pub with_initial_velocity: bool,
    pub mass: Option<f32>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            spacing: Vec2::ZERO,
            with_initial_velocity: true,
            mass: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub bottom_left: Vec2,
    pub top_right: Vec2,
    pub particle_radius: f32,
    pub particle_mass: f32,

    /// Seconds per physics step
    pub fixed_dt: f32,
    pub max_steps_per_frame: u32,
    /// Frames averaged for the rolling FPS figure
    pub fps_window: usize,

    pub use_spatial_partitioning: bool,
    /// Minimum broad-phase cell size; never smaller than the largest particle diameter
    pub cell_size: Option<f32>,
    pub collision_iterations: u32,
    pub wall_restitution: f32,
    pub particle_restitution: f32,
    pub gravity: Vec2,

    /// Upper bound on the random speed of grid particles spawned moving
    pub initial_speed: f32,
    pub seed: u64,

    pub zoom: f32,
    pub window_width: f32,
    pub border_offset: f32,

    pub grid: Option<GridConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bottom_left: Vec2::new(-1000.0, -750.0),
            top_right: Vec2::new(1000.0, 750.0),
            particle_radius: 10.0,
            particle_mass: 1.0,
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 5,
            fps_window: 60,
            use_spatial_partitioning: true,
            cell_size: None,
            collision_iterations: 1,
            wall_restitution: 1.0,
            particle_restitution: 1.0,
            gravity: Vec2::ZERO,
            initial_speed: 100.0,
            seed: 0,
            zoom: 1.0,
            window_width: 800.0,
            border_offset: 0.0,
            grid: None,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn bounds(&self) -> Result<Bounds, ConfigError> {
        Bounds::new(self.bottom_left, self.top_right).ok_or(ConfigError::InvalidBounds)
    }

    /// The grid block as a placement request, if one is configured
    pub fn grid_request(&self) -> Option<GridRequest> {
        self.grid.as_ref().map(|grid| {
            GridRequest::new(grid.rows, grid.cols)
                .spacing(grid.spacing)
                .initial_velocity(grid.with_initial_velocity)
                .mass(grid.mass.unwrap_or(self.particle_mass))
        })
    }

    /// Check every numeric field. Grid fit is checked when the grid is placed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = self.bounds()?;

        positive("particle_radius", self.particle_radius)?;
        if !is_usable_mass(self.particle_mass) {
            return Err(ConfigError::OutOfRange {
                field: "particle_mass",
                expected: "finite and positive with a finite inverse",
                value: self.particle_mass,
            });
        }
        positive("fixed_dt", self.fixed_dt)?;
        positive("zoom", self.zoom)?;
        positive("window_width", self.window_width)?;
        unit_interval("wall_restitution", self.wall_restitution)?;
        unit_interval("particle_restitution", self.particle_restitution)?;
        at_least_one("max_steps_per_frame", self.max_steps_per_frame as usize)?;
        at_least_one("collision_iterations", self.collision_iterations as usize)?;
        at_least_one("fps_window", self.fps_window)?;

        if !(self.initial_speed.is_finite() && self.initial_speed >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "initial_speed",
                expected: "finite and non-negative",
                value: self.initial_speed,
            });
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "gravity",
                expected: "finite",
                value: if self.gravity.x.is_finite() {
                    self.gravity.y
                } else {
                    self.gravity.x
                },
            });
        }
        if !self.border_offset.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "border_offset",
                expected: "finite",
                value: self.border_offset,
            });
        }
        if let Some(cell_size) = self.cell_size {
            positive("cell_size", cell_size)?;
        }
        if bounds.inset(self.particle_radius).is_none() {
            return Err(ConfigError::RadiusTooLarge {
                radius: self.particle_radius,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "finite and positive",
            value,
        })
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "between 0 and 1",
            value,
        })
    }
}

fn at_least_one(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "at least 1",
            value: value as f32,
        })
    }
}
