use super::{cross, Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let denominator = cross(d1, d2);
    if denominator.abs() < TOLERANCE {
        return None;
    }
    let delta = p2 - p1;
    let t = cross(&delta, d2) / denominator;
    let u = cross(&delta, d1) / denominator;
    Some((t, u))
}

/// Intersection point of two infinite lines, if they are not parallel.
#[must_use]
pub fn line_line_point_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<Point2> {
    line_line_intersect_2d(p1, d1, p2, d2).map(|(t, _)| p1 + d1 * t)
}

/// Distances along a ray at which it meets a circle.
///
/// `direction` must be a unit vector. Returns the roots of
/// `|origin + s * direction - center|^2 = radius^2` in ascending order,
/// including negative ones. A tangent ray yields no roots.
#[must_use]
pub fn ray_circle_intersect_2d(
    origin: &Point2,
    direction: &Vector2,
    center: &Point2,
    radius: f64,
) -> Vec<f64> {
    let offset = origin - center;
    // s^2 + 2 b s + c = 0 with |direction| = 1.
    let b = offset.dot(direction);
    let c = offset.norm_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant <= 0.0 {
        return Vec::new();
    }
    let sqrt = discriminant.sqrt();
    vec![-b - sqrt, -b + sqrt]
}

/// Clips the segment `p0 -> p1` against the axis-aligned box `[min, max]`.
///
/// Returns the parameter interval `(t_enter, t_exit)` within `[0, 1]` that
/// lies inside the box, or `None` if the segment misses it entirely.
#[must_use]
pub fn clip_segment_to_box_2d(
    p0: &Point2,
    p1: &Point2,
    min: &Point2,
    max: &Point2,
) -> Option<(f64, f64)> {
    let delta = p1 - p0;
    let mut t_enter = 0.0_f64;
    let mut t_exit = 1.0_f64;

    let edges = [
        (-delta.x, p0.x - min.x),
        (delta.x, max.x - p0.x),
        (-delta.y, p0.y - min.y),
        (delta.y, max.y - p0.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            // Parallel to this edge: reject if outside it.
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t_enter = t_enter.max(r);
        } else {
            t_exit = t_exit.min(r);
        }
        if t_enter > t_exit {
            return None;
        }
    }
    Some((t_enter, t_exit))
}
