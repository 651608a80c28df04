//! Polynomial root helpers and curve analysis.
//!
//! Everything here works on the unit parameter interval: roots outside
//! `(0, 1)` are discarded, and results come back sorted in small
//! fixed-capacity arrays instead of out-parameters.

use arrayvec::ArrayVec;

use crate::basics::{is_nearly_zero, SCALAR_NEARLY_ZERO};
use crate::vector2::Vector2;

/// Epsilon for ray intersection denominators.
pub const INTERSECTION_EPSILON: f64 = 1.0e-30;

// ============================================================================
// Scalar roots
// ============================================================================

/// `numer / denom` if the ratio lies strictly inside `(0, 1)`.
pub fn valid_unit_divide(mut numer: f64, mut denom: f64) -> Option<f64> {
    if numer < 0.0 {
        numer = -numer;
        denom = -denom;
    }
    if denom == 0.0 || numer == 0.0 || numer >= denom {
        return None;
    }
    let r = numer / denom;
    if r.is_nan() || r == 0.0 {
        return None;
    }
    Some(r)
}

/// Roots of `a*t^2 + b*t + c` in `(0, 1)`, ascending, duplicates merged.
pub fn find_unit_quad_roots(a: f64, b: f64, c: f64) -> ArrayVec<f64, 2> {
    let mut roots = ArrayVec::new();
    if a == 0.0 {
        if let Some(r) = valid_unit_divide(-c, b) {
            roots.push(r);
        }
        return roots;
    }

    let dr = b * b - 4.0 * a * c;
    if dr < 0.0 {
        return roots;
    }
    let r = dr.sqrt();
    if !r.is_finite() {
        return roots;
    }

    // Numerically stable form: q = -(b + sign(b) * sqrt(disc)) / 2.
    let q = if b < 0.0 { -(b - r) / 2.0 } else { -(b + r) / 2.0 };
    if let Some(t) = valid_unit_divide(q, a) {
        roots.push(t);
    }
    if let Some(t) = valid_unit_divide(c, q) {
        roots.push(t);
    }
    if roots.len() == 2 {
        if roots[0] > roots[1] {
            roots.swap(0, 1);
        } else if roots[0] == roots[1] {
            roots.pop();
        }
    }
    roots
}

/// Roots of `coeff[0]*t^3 + coeff[1]*t^2 + coeff[2]*t + coeff[3]`,
/// clamped to `[0, 1]`, sorted and deduplicated.
pub fn solve_cubic_poly(coeff: [f64; 4]) -> ArrayVec<f64, 3> {
    let mut out = ArrayVec::new();
    if is_nearly_zero(coeff[0]) {
        for r in find_unit_quad_roots(coeff[1], coeff[2], coeff[3]) {
            out.push(r);
        }
        return out;
    }

    let inva = 1.0 / coeff[0];
    let a = coeff[1] * inva;
    let b = coeff[2] * inva;
    let c = coeff[3] * inva;

    let q = (a * a - b * 3.0) / 9.0;
    let r = (2.0 * a * a * a - 9.0 * a * b + 27.0 * c) / 54.0;
    let q3 = q * q * q;
    let r2_minus_q3 = r * r - q3;
    let adiv3 = a / 3.0;

    if r2_minus_q3 < 0.0 {
        // Three real roots.
        let theta = (r / q3.sqrt()).clamp(-1.0, 1.0).acos();
        let neg2_root_q = -2.0 * q.sqrt();
        let tau = std::f64::consts::TAU;
        let mut t = [
            (neg2_root_q * (theta / 3.0).cos() - adiv3).clamp(0.0, 1.0),
            (neg2_root_q * ((theta + tau) / 3.0).cos() - adiv3).clamp(0.0, 1.0),
            (neg2_root_q * ((theta - tau) / 3.0).cos() - adiv3).clamp(0.0, 1.0),
        ];
        t.sort_by(|x, y| x.total_cmp(y));
        for v in t {
            if out.last() != Some(&v) {
                out.push(v);
            }
        }
    } else {
        // One real root.
        let mut a2 = (r.abs() + r2_minus_q3.sqrt()).cbrt();
        if r > 0.0 {
            a2 = -a2;
        }
        if a2 != 0.0 {
            a2 += q / a2;
        }
        out.push((a2 - adiv3).clamp(0.0, 1.0));
    }
    out
}

// ============================================================================
// Extrema
// ============================================================================

/// Parameter of the extremum of a 1D quadratic with control values
/// `a, b, c`, if it is interior.
pub fn find_quad_extrema(a: f64, b: f64, c: f64) -> Option<f64> {
    valid_unit_divide(a - b, a - b - b + c)
}

/// Parameters of the extrema of a 1D cubic with control values `a..d`.
pub fn find_cubic_extrema(a: f64, b: f64, c: f64, d: f64) -> ArrayVec<f64, 2> {
    // Derivative divided by 3: A t^2 + 2B t + C.
    let aa = d - a + 3.0 * (b - c);
    let bb = 2.0 * (a - b - b + c);
    let cc = b - a;
    find_unit_quad_roots(aa, bb, cc)
}

/// Parameter of maximum curvature of a quadratic, in `[0, 1]`.
pub fn find_quad_max_curvature(src: &[Vector2; 3]) -> f64 {
    let a = src[1] - src[0];
    let b = src[0] - src[1] - src[1] + src[2];
    let mut numer = -a.dot(b);
    let mut denom = b.dot(b);
    if denom < 0.0 {
        numer = -numer;
        denom = -denom;
    }
    if numer <= 0.0 {
        return 0.0;
    }
    if numer >= denom {
        return 1.0;
    }
    numer / denom
}

/// Inflection points of a cubic: where `F' x F'' == 0`.
pub fn find_cubic_inflections(src: &[Vector2; 4]) -> ArrayVec<f64, 2> {
    let a = src[1] - src[0];
    let b = src[2] - src[1] * 2.0 + src[0];
    let c = src[3] + (src[1] - src[2]) * 3.0 - src[0];
    find_unit_quad_roots(b.cross(c), a.cross(c), a.cross(b))
}

fn f1_dot_f2_coeffs(p0: f64, p1: f64, p2: f64, p3: f64) -> [f64; 4] {
    let a = p1 - p0;
    let b = p2 - 2.0 * p1 + p0;
    let c = p3 + 3.0 * (p1 - p2) - p0;
    [c * c, 3.0 * b * c, 2.0 * b * b + c * a, a * b]
}

/// Parameters where `F' . F'' == 0`, i.e. curvature extrema.
pub fn find_cubic_max_curvature(src: &[Vector2; 4]) -> ArrayVec<f64, 3> {
    let cx = f1_dot_f2_coeffs(src[0].x, src[1].x, src[2].x, src[3].x);
    let cy = f1_dot_f2_coeffs(src[0].y, src[1].y, src[2].y, src[3].y);
    solve_cubic_poly([cx[0] + cy[0], cx[1] + cy[1], cx[2] + cy[2], cx[3] + cy[3]])
}

fn on_same_side(src: &[Vector2; 4], s: usize, o: usize) -> bool {
    let origin = src[s];
    let line = src[s + 1] - origin;
    let c0 = line.cross(src[o] - origin);
    let c1 = line.cross(src[o + 1] - origin);
    c0 * c1 >= 0.0
}

fn cubic_precision(src: &[Vector2; 4]) -> f64 {
    (src[1].distance_sq(src[0]) + src[2].distance_sq(src[1]) + src[3].distance_sq(src[2])) * 1e-8
}

/// Parameter of a cusp (tangent reversal) on a cubic, if it has one.
pub fn find_cubic_cusp(src: &[Vector2; 4]) -> Option<f64> {
    // A control point sitting on its end point looks like a cusp at the
    // end, which is not interesting.
    if src[0] == src[1] || src[2] == src[3] {
        return None;
    }
    // The control polygon's first and last legs must cross.
    if on_same_side(src, 0, 2) || on_same_side(src, 2, 0) {
        return None;
    }
    let precision = cubic_precision(src);
    find_cubic_max_curvature(src).into_iter().find(|&t| {
        if t <= 0.0 || t >= 1.0 {
            return false;
        }
        crate::curves::eval_cubic_derivative(src, t).length_sq() < precision
    })
}

// ============================================================================
// Lines
// ============================================================================

/// Intersection of the rays `p0 + s*d0` and `p1 + u*d1`, or `None` if
/// they are parallel.
pub fn intersect_lines(p0: Vector2, d0: Vector2, p1: Vector2, d1: Vector2) -> Option<Vector2> {
    let denom = d0.cross(d1);
    if denom.abs() < INTERSECTION_EPSILON {
        return None;
    }
    let s = (p1 - p0).cross(d1) / denom;
    let r = p0 + d0 * s;
    if r.is_finite() {
        Some(r)
    } else {
        None
    }
}

/// Distance from `p` to the infinite line through `a` and `b`.
pub fn line_point_distance(a: Vector2, b: Vector2, p: Vector2) -> f64 {
    let d = b - a;
    let len = d.length();
    if len < SCALAR_NEARLY_ZERO {
        return p.distance(a);
    }
    (d.cross(p - a) / len).abs()
}
