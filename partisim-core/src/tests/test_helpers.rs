//! Test helper utilities for partisim tests

use crate::config::{ConfigError, SimConfig};
use crate::engine::{Bounds, Particle, World};
use glam::Vec2;
use std::path::PathBuf;

/// Check if two f32 values are approximately equal within tolerance
pub fn approx_eq_f32(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}

pub fn approx_eq_vec2(a: Vec2, b: Vec2, tol: f32) -> bool {
    approx_eq_f32(a.x, b.x, tol) && approx_eq_f32(a.y, b.y, tol)
}

/// The 2000 x 1500 domain centered on the origin
pub fn screen_bounds() -> Bounds {
    Bounds::new(Vec2::new(-1000.0, -750.0), Vec2::new(1000.0, 750.0))
        .expect("screen bounds are ordered")
}

pub fn empty_world(radius: f32) -> World {
    World::new(screen_bounds(), radius)
}

/// Path of a fixture under `tests/data`
pub fn test_data_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push(filename);
    path
}

pub fn load_fixture(filename: &str) -> Result<SimConfig, ConfigError> {
    SimConfig::load(test_data_path(filename))
}

/// Smallest `distance - (r_a + r_b)` over all pairs; negative means overlap
pub fn min_pair_gap(particles: &[Particle]) -> f32 {
    let mut gap = f32::INFINITY;
    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            let a = &particles[i];
            let b = &particles[j];
            gap = gap.min(a.pos.distance(b.pos) - (a.radius + b.radius));
        }
    }
    gap
}

/// Whether every particle lies within bounds shrunk by its radius, allowing `tol`
pub fn all_inside(particles: &[Particle], bounds: &Bounds, tol: f32) -> bool {
    particles.iter().all(|p| {
        p.pos.x - p.radius >= bounds.bottom_left.x - tol
            && p.pos.x + p.radius <= bounds.top_right.x + tol
            && p.pos.y - p.radius >= bounds.bottom_left.y - tol
            && p.pos.y + p.radius <= bounds.top_right.y + tol
    })
}

/// Compare two particle sets position- and velocity-wise with tolerance
pub fn states_approx_equal(a: &[Particle], b: &[Particle], tol: f32) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(pa, pb)| {
            approx_eq_vec2(pa.pos, pb.pos, tol) && approx_eq_vec2(pa.vel, pb.vel, tol)
        })
}
