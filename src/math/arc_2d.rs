//! 2D arc angle utilities.
//!
//! Angles follow the canvas `arc()` convention: a non-anticlockwise arc sweeps
//! toward increasing angles, an anticlockwise arc toward decreasing angles,
//! and a requested sweep of one full turn or more is clamped to exactly one
//! full turn.

use std::f64::consts::TAU;

/// Angular slack used when mapping a point's angle back onto an arc.
const ANGLE_EPSILON: f64 = 1e-12;

/// Resolves the canvas end angle so that `end - start` is the actual sweep.
///
/// The result lies in `[start, start + 2π]` when not anticlockwise and in
/// `[start - 2π, start]` when anticlockwise.
#[must_use]
pub fn actual_end_angle(start_angle: f64, end_angle: f64, anticlockwise: bool) -> f64 {
    if anticlockwise {
        if start_angle - end_angle >= TAU {
            start_angle - TAU
        } else {
            start_angle - (start_angle - end_angle).rem_euclid(TAU)
        }
    } else if end_angle - start_angle >= TAU {
        start_angle + TAU
    } else {
        start_angle + (end_angle - start_angle).rem_euclid(TAU)
    }
}

/// Maps an absolute angle to the arc parameter `t`.
///
/// The returned value is the fraction of `sweep` needed to reach `angle` when
/// travelling from `start_angle` in the sweep direction, so it lies in
/// `[0, 2π / |sweep|)`. Values in `[0, 1]` are on the arc.
#[must_use]
pub fn arc_t_at_angle(start_angle: f64, sweep: f64, angle: f64) -> f64 {
    if sweep == 0.0 {
        return 0.0;
    }
    let mut delta = if sweep > 0.0 {
        (angle - start_angle).rem_euclid(TAU)
    } else {
        (start_angle - angle).rem_euclid(TAU)
    };
    if delta >= TAU - ANGLE_EPSILON {
        delta = 0.0;
    }
    delta / sweep.abs()
}

/// Whether `angle` lies on the arc (inclusive of both ends).
#[must_use]
pub fn arc_contains_angle(start_angle: f64, sweep: f64, angle: f64) -> bool {
    if sweep.abs() >= TAU {
        return true;
    }
    arc_t_at_angle(start_angle, sweep, angle) <= 1.0 + ANGLE_EPSILON
}

/// Evaluates a point on a circle arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(
    cx: f64,
    cy: f64,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    t: f64,
) -> (f64, f64) {
    let angle = start_angle + sweep * t;
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// Computes the unit tangent direction on an arc at parameter `t` in `[0, 1]`.
///
/// The tangent points in the direction of increasing `t`.
#[must_use]
pub fn arc_tangent_at(start_angle: f64, sweep: f64, t: f64) -> (f64, f64) {
    let angle = start_angle + sweep * t;
    let sign = if sweep >= 0.0 { 1.0 } else { -1.0 };
    (-sign * angle.sin(), sign * angle.cos())
}
