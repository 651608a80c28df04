//! Bezier curve evaluation, subdivision and flattening.
//!
//! Quadratic and cubic curves are passed around as fixed-size point arrays
//! (`[Vector2; 3]`, `[Vector2; 4]`). Flattening is lazy: [`Flatten`] is an
//! iterator that performs recursive midpoint subdivision on an explicit
//! stack, emitting one line end point per step.

use arrayvec::ArrayVec;
use log::trace;

use crate::math::{line_point_distance, valid_unit_divide};
use crate::vector2::Vector2;

// ============================================================================
// Constants
// ============================================================================

/// Maximum subdivision depth while flattening. At this depth the current
/// piece is emitted as a line regardless of its deviation.
pub const CURVE_RECURSION_LIMIT: u32 = 16;

/// Scratch capacity for de Casteljau evaluation without allocating.
const MAX_STACK_POINTS: usize = 16;

// ============================================================================
// Evaluation
// ============================================================================

/// De Casteljau evaluation of a Bezier curve of any degree.
///
/// `t` is not clamped. An empty slice evaluates to the origin.
pub fn eval_bezier(points: &[Vector2], t: f64) -> Vector2 {
    match points.len() {
        0 => Vector2::ZERO,
        1 => points[0],
        n if n <= MAX_STACK_POINTS => {
            let mut tmp: ArrayVec<Vector2, MAX_STACK_POINTS> = points.iter().copied().collect();
            de_casteljau(&mut tmp, t)
        }
        _ => {
            let mut tmp = points.to_vec();
            de_casteljau(&mut tmp, t)
        }
    }
}

fn de_casteljau(pts: &mut [Vector2], t: f64) -> Vector2 {
    let n = pts.len();
    for level in 1..n {
        for i in 0..n - level {
            pts[i] = pts[i].lerp(pts[i + 1], t);
        }
    }
    pts[0]
}

#[inline]
pub fn eval_quad(src: &[Vector2; 3], t: f64) -> Vector2 {
    let ab = src[0].lerp(src[1], t);
    let bc = src[1].lerp(src[2], t);
    ab.lerp(bc, t)
}

#[inline]
pub fn eval_cubic(src: &[Vector2; 4], t: f64) -> Vector2 {
    let ab = src[0].lerp(src[1], t);
    let bc = src[1].lerp(src[2], t);
    let cd = src[2].lerp(src[3], t);
    let abc = ab.lerp(bc, t);
    let bcd = bc.lerp(cd, t);
    abc.lerp(bcd, t)
}

/// Tangent of a quadratic. Falls back to the chord when the control point
/// sits on the end being queried.
pub fn eval_quad_tangent(src: &[Vector2; 3], t: f64) -> Vector2 {
    if (t == 0.0 && src[0] == src[1]) || (t == 1.0 && src[1] == src[2]) {
        return src[2] - src[0];
    }
    let b = src[1] - src[0];
    let a = src[2] - src[1] * 2.0 + src[0];
    (a * t + b) * 2.0
}

/// Derivative of a cubic divided by 3.
pub fn eval_cubic_derivative(src: &[Vector2; 4], t: f64) -> Vector2 {
    let a = src[3] + (src[1] - src[2]) * 3.0 - src[0];
    let b = (src[2] - src[1] * 2.0 + src[0]) * 2.0;
    let c = src[1] - src[0];
    (a * t + b) * t + c
}

/// Tangent of a cubic, stepping to the next distinct control point when
/// an end control point coincides with its end point.
pub fn eval_cubic_tangent(src: &[Vector2; 4], t: f64) -> Vector2 {
    if (t == 0.0 && src[0] == src[1]) || (t == 1.0 && src[2] == src[3]) {
        let tangent = if t == 0.0 { src[2] - src[0] } else { src[3] - src[1] };
        if tangent.is_zero() {
            return src[3] - src[0];
        }
        return tangent;
    }
    eval_cubic_derivative(src, t)
}

// ============================================================================
// Subdivision
// ============================================================================

/// Split a quadratic at `t`. The halves share `dst[2]`.
pub fn chop_quad_at(src: &[Vector2; 3], t: f64) -> [Vector2; 5] {
    let p01 = src[0].lerp(src[1], t);
    let p12 = src[1].lerp(src[2], t);
    let mid = p01.lerp(p12, t);
    [src[0], p01, mid, p12, src[2]]
}

/// Split a cubic at `t`. The halves share `dst[3]`.
pub fn chop_cubic_at(src: &[Vector2; 4], t: f64) -> [Vector2; 7] {
    let ab = src[0].lerp(src[1], t);
    let bc = src[1].lerp(src[2], t);
    let cd = src[2].lerp(src[3], t);
    let abc = ab.lerp(bc, t);
    let bcd = bc.lerp(cd, t);
    let abcd = abc.lerp(bcd, t);
    [src[0], ab, abc, abcd, bcd, cd, src[3]]
}

/// Split a cubic at up to two ascending parameters.
///
/// Each later `t` is renormalized into the remaining piece. If that is
/// not possible the remainder becomes a degenerate cubic at the end point.
pub fn chop_cubic_at_many(src: &[Vector2; 4], ts: &[f64]) -> ArrayVec<[Vector2; 4], 3> {
    let mut out = ArrayVec::new();
    let mut rest = *src;
    let mut t = match ts.first() {
        Some(&t) => t,
        None => {
            out.push(rest);
            return out;
        }
    };
    for i in 0..ts.len().min(2) {
        let d = chop_cubic_at(&rest, t);
        out.push([d[0], d[1], d[2], d[3]]);
        rest = [d[3], d[4], d[5], d[6]];
        if i + 1 == ts.len() || i + 1 == 2 {
            break;
        }
        match valid_unit_divide(ts[i + 1] - ts[i], 1.0 - ts[i]) {
            Some(next) => t = next,
            None => {
                rest = [rest[0], rest[3], rest[3], rest[3]];
                break;
            }
        }
    }
    out.push(rest);
    out
}

// ============================================================================
// Flattening
// ============================================================================

/// Control points of a curve piece on the flattening stack. Quadratics
/// leave the last slot unused.
#[derive(Debug, Clone, Copy)]
struct Piece {
    pts: [Vector2; 4],
    depth: u32,
}

/// Lazy polyline approximation of a quadratic or cubic curve.
///
/// Yields the end point of each line; the start point of the curve is not
/// yielded. Each emitted line is within `tolerance` of the control polygon
/// it replaces, except where the recursion ceiling forces emission.
#[derive(Debug, Clone)]
pub struct Flatten {
    stack: ArrayVec<Piece, { CURVE_RECURSION_LIMIT as usize + 1 }>,
    cubic: bool,
    tolerance: f64,
}

impl Flatten {
    pub fn quad(src: &[Vector2; 3], tolerance: f64) -> Self {
        Self::with_piece([src[0], src[1], src[2], src[2]], false, tolerance)
    }

    pub fn cubic(src: &[Vector2; 4], tolerance: f64) -> Self {
        Self::with_piece(*src, true, tolerance)
    }

    fn with_piece(pts: [Vector2; 4], cubic: bool, tolerance: f64) -> Self {
        let mut stack = ArrayVec::new();
        stack.push(Piece { pts, depth: 0 });
        Self {
            stack,
            cubic,
            tolerance: if tolerance > 0.0 { tolerance } else { f64::EPSILON },
        }
    }

    /// Maximum distance of the control points from the chord.
    fn deviation(&self, p: &[Vector2; 4]) -> f64 {
        let end = if self.cubic { p[3] } else { p[2] };
        let d1 = line_point_distance(p[0], end, p[1]);
        if self.cubic {
            d1.max(line_point_distance(p[0], end, p[2]))
        } else {
            d1
        }
    }

    fn split(&self, p: &[Vector2; 4]) -> ([Vector2; 4], [Vector2; 4]) {
        if self.cubic {
            let d = chop_cubic_at(p, 0.5);
            ([d[0], d[1], d[2], d[3]], [d[3], d[4], d[5], d[6]])
        } else {
            let d = chop_quad_at(&[p[0], p[1], p[2]], 0.5);
            ([d[0], d[1], d[2], d[2]], [d[2], d[3], d[4], d[4]])
        }
    }
}

impl Iterator for Flatten {
    type Item = Vector2;

    fn next(&mut self) -> Option<Vector2> {
        loop {
            let piece = self.stack.pop()?;
            let end = if self.cubic { piece.pts[3] } else { piece.pts[2] };
            let dev = self.deviation(&piece.pts);
            // NaN deviation means non-finite input: emit rather than split.
            if dev.is_nan() || dev <= self.tolerance {
                return Some(end);
            }
            if piece.depth >= CURVE_RECURSION_LIMIT {
                trace!("flatten: depth ceiling reached, deviation {dev}");
                return Some(end);
            }
            let (a, b) = self.split(&piece.pts);
            let depth = piece.depth + 1;
            // Second half first so the first half is processed next.
            self.stack.push(Piece { pts: b, depth });
            self.stack.push(Piece { pts: a, depth });
        }
    }
}
