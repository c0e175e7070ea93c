//! Real-root solvers for low-degree polynomials.
//!
//! Coefficients are given highest degree first. Leading coefficients that are
//! negligible compared to the rest fall back to the lower-degree solver, so a
//! cubic that is numerically a quadratic is solved as one.

use std::f64::consts::PI;

/// Ratio beyond which a leading coefficient is treated as zero.
const DEGENERATE_RATIO: f64 = 1e7;

/// Relative size below which the cubic discriminant counts as zero, measured
/// against the larger of `|q^3|` and `r^2`.
const CUBIC_DISCRIMINANT_EPSILON: f64 = 1e-12;

/// Solves `a*x + b = 0`.
///
/// Returns no roots when `a == 0`, including the identically zero case.
#[must_use]
pub fn solve_linear_roots_real(a: f64, b: f64) -> Vec<f64> {
    if a == 0.0 {
        return Vec::new();
    }
    vec![-b / a]
}

/// Solves `a*x^2 + b*x + c = 0`.
///
/// A zero discriminant yields a single root.
#[must_use]
pub fn solve_quadratic_roots_real(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0.0 || (b / a).abs() > DEGENERATE_RATIO || (c / a).abs() > DEGENERATE_RATIO {
        return solve_linear_roots_real(b, c);
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    if discriminant == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    let sqrt = discriminant.sqrt();
    vec![(-b - sqrt) / (2.0 * a), (-b + sqrt) / (2.0 * a)]
}

/// Solves `a*x^3 + b*x^2 + c*x + d = 0`.
///
/// Uses Cardano's formula when the discriminant is positive (one real root),
/// the double-root form when it is zero relative to the magnitude of its
/// terms, and the trigonometric form when it is negative (three distinct real
/// roots). Each root is refined with one Newton step when that reduces the
/// residual.
#[must_use]
pub fn solve_cubic_roots_real(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a == 0.0
        || (b / a).abs() > DEGENERATE_RATIO
        || (c / a).abs() > DEGENERATE_RATIO
        || (d / a).abs() > DEGENERATE_RATIO
    {
        return solve_quadratic_roots_real(b, c, d);
    }

    if d == 0.0
        || (a / d).abs() > DEGENERATE_RATIO
        || (b / d).abs() > DEGENERATE_RATIO
        || (c / d).abs() > DEGENERATE_RATIO
    {
        let mut roots = vec![0.0];
        roots.extend(solve_quadratic_roots_real(a, b, c));
        return roots;
    }

    let b = b / a;
    let c = c / a;
    let d = d / a;

    let q = (3.0 * c - b * b) / 9.0;
    let r = (-(27.0 * d) + b * (9.0 * c - 2.0 * (b * b))) / 54.0;
    let discriminant = q * q * q + r * r;
    let threshold = CUBIC_DISCRIMINANT_EPSILON * (q * q * q).abs().max(r * r);
    let b3 = b / 3.0;

    let roots = if discriminant > threshold {
        let dsqrt = discriminant.sqrt();
        vec![(r + dsqrt).cbrt() + (r - dsqrt).cbrt() - b3]
    } else if discriminant >= -threshold {
        let rsqrt = r.cbrt();
        let double_root = -b3 - rsqrt;
        let single_root = -b3 + 2.0 * rsqrt;
        if (single_root - double_root).abs() == 0.0 {
            vec![single_root]
        } else {
            vec![single_root, double_root]
        }
    } else {
        let theta = (r / (-q * q * q).sqrt()).clamp(-1.0, 1.0).acos();
        let rr = 2.0 * (-q).sqrt();
        vec![
            -b3 + rr * (theta / 3.0).cos(),
            -b3 + rr * ((theta + 2.0 * PI) / 3.0).cos(),
            -b3 + rr * ((theta + 4.0 * PI) / 3.0).cos(),
        ]
    };
    roots
        .into_iter()
        .map(|root| newton_polish(b, c, d, root))
        .collect()
}

/// One Newton step on the monic cubic `x^3 + b*x^2 + c*x + d`, kept only if
/// it lowers the residual.
fn newton_polish(b: f64, c: f64, d: f64, x: f64) -> f64 {
    let value = |x: f64| ((x + b) * x + c) * x + d;
    let slope = (3.0 * x + 2.0 * b) * x + c;
    if slope == 0.0 {
        return x;
    }
    let refined = x - value(x) / slope;
    if refined.is_finite() && value(refined).abs() < value(x).abs() {
        refined
    } else {
        x
    }
}
