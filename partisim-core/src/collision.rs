//! Narrow-phase contact resolution: particle-wall and particle-particle.

use crate::engine::{Bounds, Particle};
use glam::Vec2;

/// Centers closer than this are treated as coincident
pub const COINCIDENT_DISTANCE: f32 = 1e-6;

/// Approach speeds along the normal below this are left alone
const RESTING_SPEED: f32 = 1e-6;

/// Separation axis used when two centers coincide
const FALLBACK_AXIS: Vec2 = Vec2::X;

/// Whether the two circles overlap
#[inline]
pub fn in_contact(a: &Particle, b: &Particle) -> bool {
    let reach = a.radius + b.radius;
    a.pos.distance_squared(b.pos) < reach * reach
}

/// What happened when a pair was resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Normal impulse applied (zero when the pair was already separating)
    pub impulse: f32,
    pub coincident: bool,
}

/// Push two overlapping particles apart along the line of centers and apply
/// a normal impulse.
///
/// Separation is split by inverse mass so the heavier particle moves less;
/// afterwards the centers are exactly `a.radius + b.radius` apart. The
/// tangential velocity of each particle is preserved. Returns `None` when
/// the pair does not overlap.
pub fn resolve_pair(a: &mut Particle, b: &mut Particle, restitution: f32) -> Option<Contact> {
    let reach = a.radius + b.radius;
    let delta = b.pos - a.pos;
    let dist_sq = delta.length_squared();
    if !(dist_sq < reach * reach) {
        return None;
    }

    let dist = dist_sq.sqrt();
    let coincident = dist < COINCIDENT_DISTANCE;
    let normal = if coincident { FALLBACK_AXIS } else { delta / dist };

    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;

    let overlap = reach - dist;
    a.pos -= normal * (overlap * inv_a / inv_sum);
    b.pos += normal * (overlap * inv_b / inv_sum);

    let approach = (b.vel - a.vel).dot(normal);
    let impulse = if approach < -RESTING_SPEED {
        let j = -(1.0 + restitution) * approach / inv_sum;
        a.vel -= normal * (j * inv_a);
        b.vel += normal * (j * inv_b);
        j
    } else {
        0.0
    };

    Some(Contact {
        impulse,
        coincident,
    })
}

/// Mutable references to two distinct particles
pub fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    debug_assert!(i != j);
    if i < j {
        let (head, tail) = particles.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = particles.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Keep a particle inside `bounds`, reflecting the velocity component of
/// every axis it crossed. Returns true if any wall was hit.
pub fn resolve_walls(particle: &mut Particle, bounds: &Bounds, restitution: f32) -> bool {
    let r = particle.radius;
    let hit_x = bounce_axis(
        &mut particle.pos.x,
        &mut particle.vel.x,
        bounds.bottom_left.x + r,
        bounds.top_right.x - r,
        restitution,
    );
    let hit_y = bounce_axis(
        &mut particle.pos.y,
        &mut particle.vel.y,
        bounds.bottom_left.y + r,
        bounds.top_right.y - r,
        restitution,
    );
    hit_x || hit_y
}

fn bounce_axis(pos: &mut f32, vel: &mut f32, lo: f32, hi: f32, restitution: f32) -> bool {
    if lo > hi {
        // Wider than the domain: pin to the middle
        *pos = (lo + hi) * 0.5;
        *vel = 0.0;
        return true;
    }
    if *pos < lo {
        *pos = lo;
        if *vel < 0.0 {
            *vel = -*vel * restitution;
        }
        true
    } else if *pos > hi {
        *pos = hi;
        if *vel > 0.0 {
            *vel = -*vel * restitution;
        }
        true
    } else {
        false
    }
}
