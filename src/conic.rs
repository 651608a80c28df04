//! Rational quadratic ("conic") curves.
//!
//! A conic is three control points plus a weight on the middle one. Unlike
//! a polynomial quadratic it represents circular and elliptical arcs
//! exactly, which is why round joins, round caps, ovals and arcs are all
//! built from conics and only then lowered to ordinary quadratics.
//!
//! The unit-arc builder splits a sweep into whole quadrants (fixed weight
//! `cos 45°`) plus at most one remainder piece, so no error accumulates
//! from per-segment trigonometry.

use arrayvec::ArrayVec;

use crate::basics::SCALAR_ROOT2_OVER2;
use crate::trans_affine::TransAffine;
use crate::vector2::{vec2, Vector2};

/// Upper bound on conics needed for any unit arc (4 quadrants + remainder).
pub const MAX_CONICS_FOR_ARC: usize = 5;

/// Upper bound on the power-of-two subdivision used by
/// [`Conic::compute_quad_pow2`].
pub const MAX_CONIC_TO_QUAD_POW2: u32 = 5;

/// Point capacity for the quads of one conic at maximum subdivision.
pub const MAX_CONIC_QUAD_POINTS: usize = 2 * (1 << MAX_CONIC_TO_QUAD_POW2) + 1;

/// Quadratic control points produced from one conic: `p0, (ctrl, end)*`.
pub type ConicQuadPoints = ArrayVec<Vector2, MAX_CONIC_QUAD_POINTS>;

/// Unit-arc conics.
pub type UnitArc = ArrayVec<Conic, MAX_CONICS_FOR_ARC>;

/// Sweep direction in device space (y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conic {
    pub points: [Vector2; 3],
    pub weight: f64,
}

#[inline]
fn subdivide_weight(w: f64) -> f64 {
    (0.5 + w * 0.5).sqrt()
}

/// `true` if `b` lies between `a` and `c` (inclusive, either order).
#[inline]
fn between(a: f64, b: f64, c: f64) -> bool {
    (a - b) * (c - b) <= 0.0
}

impl Conic {
    pub fn new(p0: Vector2, p1: Vector2, p2: Vector2, weight: f64) -> Self {
        let mut c = Self {
            points: [p0, p1, p2],
            weight: 1.0,
        };
        c.set_weight(weight);
        c
    }

    /// Non-finite or non-positive weights are replaced by 1.
    pub fn set_weight(&mut self, w: f64) {
        self.weight = if w > 0.0 && w.is_finite() { w } else { 1.0 };
    }

    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.is_finite())
    }

    // ====================================================================
    // Evaluation
    // ====================================================================

    pub fn eval(&self, t: f64) -> Vector2 {
        let [p0, p1, p2] = self.points;
        let w = self.weight;
        let p1w = p1 * w;

        // numerator: A t^2 + B t + C
        let na = p2 - p1w * 2.0 + p0;
        let nb = (p1w - p0) * 2.0;
        let numer = (na * t + nb) * t + p0;

        // denominator: A t^2 + B t + 1
        let db = 2.0 * (w - 1.0);
        let da = -db;
        let denom = (da * t + db) * t + 1.0;
        numer / denom
    }

    /// Tangent direction at `t`. Only the direction is meaningful.
    pub fn eval_tangent(&self, t: f64) -> Vector2 {
        let [p0, p1, p2] = self.points;
        if (t == 0.0 && p0 == p1) || (t == 1.0 && p1 == p2) {
            return p2 - p0;
        }
        let w = self.weight;
        let p20 = p2 - p0;
        let p10 = p1 - p0;
        let c = p10 * w;
        let a = p20 * w - p20;
        let b = p20 - c - c;
        (a * t + b) * t + c
    }

    // ====================================================================
    // Subdivision
    // ====================================================================

    /// Split at `t = 0.5`.
    pub fn chop(&self) -> [Conic; 2] {
        let [p0, p1, p2] = self.points;
        let w = self.weight;
        let scale = 1.0 / (1.0 + w);
        let t0 = p0 * scale;
        let t1 = p1 * (w * scale);
        let t2 = p2 * scale;
        let m = t0 * 0.5 + t1 + t2 * 0.5;
        let nw = subdivide_weight(w);
        [
            Conic {
                points: [p0, t0 + t1, m],
                weight: nw,
            },
            Conic {
                points: [m, t1 + t2, p2],
                weight: nw,
            },
        ]
    }

    /// Split at an arbitrary `t` using homogeneous coordinates. Returns
    /// `None` when the split produces non-finite points.
    pub fn chop_at(&self, t: f64) -> Option<[Conic; 2]> {
        let [p0, p1, p2] = self.points;
        let w = self.weight;
        // (x*w, y*w, w) per control point.
        let h0 = (p0.x, p0.y, 1.0);
        let h1 = (p1.x * w, p1.y * w, w);
        let h2 = (p2.x, p2.y, 1.0);
        let lerp3 = |a: (f64, f64, f64), b: (f64, f64, f64)| {
            (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t, a.2 + (b.2 - a.2) * t)
        };
        let ab = lerp3(h0, h1);
        let bc = lerp3(h1, h2);
        let abc = lerp3(ab, bc);
        let project = |h: (f64, f64, f64)| vec2(h.0 / h.2, h.1 / h.2);

        let mid = project(abc);
        let root = abc.2.sqrt();
        let left = Conic {
            points: [p0, project(ab), mid],
            weight: ab.2 / root,
        };
        let right = Conic {
            points: [mid, project(bc), p2],
            weight: bc.2 / root,
        };
        if left.is_finite() && right.is_finite() {
            Some([left, right])
        } else {
            None
        }
    }

    // ====================================================================
    // Conversion to quadratics
    // ====================================================================

    /// Distance vector between the conic and its control quadratic at
    /// the midpoint.
    pub fn quad_error(&self) -> Vector2 {
        let a = self.weight - 1.0;
        let k = a / (4.0 * (2.0 + a));
        let [p0, p1, p2] = self.points;
        (p0 - p1 * 2.0 + p2) * k
    }

    /// `true` if the control quadratic alone is within `tolerance`.
    pub fn as_quad_tol(&self, tolerance: f64) -> bool {
        self.quad_error().length_sq() <= tolerance * tolerance
    }

    /// Power-of-two number of quadratics needed to stay within `tolerance`.
    /// Every bisection quarters the error.
    pub fn compute_quad_pow2(&self, tolerance: f64) -> u32 {
        if tolerance < 0.0 || !tolerance.is_finite() || !self.is_finite() {
            return 0;
        }
        let mut error = self.quad_error().length();
        let mut pow2 = 0;
        while pow2 < MAX_CONIC_TO_QUAD_POW2 {
            if error <= tolerance {
                break;
            }
            error *= 0.25;
            pow2 += 1;
        }
        pow2
    }

    /// Chop into `2^pow2` quadratics, returned as `2 * 2^pow2 + 1`
    /// contiguous points sharing end points.
    pub fn chop_into_quads_pow2(&self, pow2: u32) -> ConicQuadPoints {
        let pow2 = pow2.min(MAX_CONIC_TO_QUAD_POW2);
        let mut pts = ConicQuadPoints::new();
        pts.push(self.points[0]);

        let mut lines = false;
        if pow2 == MAX_CONIC_TO_QUAD_POW2 {
            // An extreme weight can make the first chop a pair of lines.
            let [a, b] = self.chop();
            if a.points[1].nearly_equals(a.points[2]) && b.points[0].nearly_equals(b.points[1]) {
                pts.push(a.points[1]);
                pts.push(a.points[1]);
                pts.push(a.points[1]);
                pts.push(b.points[2]);
                lines = true;
            }
        }
        if !lines {
            subdivide(self, &mut pts, pow2);
        }

        if !pts.iter().all(|p| p.is_finite()) {
            let n = pts.len();
            for p in pts[1..n - 1].iter_mut() {
                *p = self.points[1];
            }
        }
        pts
    }

    pub fn transform(&self, m: &TransAffine) -> Conic {
        Conic {
            points: [
                m.transform(self.points[0]),
                m.transform(self.points[1]),
                m.transform(self.points[2]),
            ],
            weight: self.weight,
        }
    }
}

fn subdivide(src: &Conic, pts: &mut ConicQuadPoints, level: u32) {
    if level == 0 {
        pts.push(src.points[1]);
        pts.push(src.points[2]);
        return;
    }
    let mut dst = src.chop();
    let start_y = src.points[0].y;
    let end_y = src.points[2].y;
    if between(start_y, src.points[1].y, end_y) {
        // Keep y-monotonic input monotonic after the split.
        let mid_y = dst[0].points[2].y;
        if !between(start_y, mid_y, end_y) {
            let closer = if (mid_y - start_y).abs() < (mid_y - end_y).abs() {
                start_y
            } else {
                end_y
            };
            dst[0].points[2].y = closer;
            dst[1].points[0].y = closer;
        }
        if !between(start_y, dst[0].points[1].y, dst[0].points[2].y) {
            dst[0].points[1].y = start_y;
        }
        if !between(dst[1].points[0].y, dst[1].points[1].y, end_y) {
            dst[1].points[1].y = end_y;
        }
    }
    subdivide(&dst[0], pts, level - 1);
    subdivide(&dst[1], pts, level - 1);
}

/// Approximate a conic by ordinary quadratics within `tolerance`.
///
/// Returns `2 * 2^k + 1` points: the start point followed by a
/// `(control, end)` pair per quadratic.
pub fn conic_to_quadratics(
    p0: Vector2,
    p1: Vector2,
    p2: Vector2,
    weight: f64,
    tolerance: f64,
) -> ConicQuadPoints {
    let conic = Conic::new(p0, p1, p2, weight);
    let pow2 = conic.compute_quad_pow2(tolerance);
    conic.chop_into_quads_pow2(pow2)
}

// ============================================================================
// Unit arcs
// ============================================================================

const QUADRANT_POINTS: [Vector2; 8] = [
    vec2(1.0, 0.0),
    vec2(1.0, 1.0),
    vec2(0.0, 1.0),
    vec2(-1.0, 1.0),
    vec2(-1.0, 0.0),
    vec2(-1.0, -1.0),
    vec2(0.0, -1.0),
    vec2(1.0, -1.0),
];

/// Conics covering the unit-circle arc from `u_start` to `u_stop`
/// (both unit vectors) in direction `dir`, mapped through `user`.
///
/// Returns no conics when the two vectors coincide for the requested
/// direction (zero sweep).
pub fn build_unit_arc(
    u_start: Vector2,
    u_stop: Vector2,
    dir: RotationDirection,
    user: Option<&TransAffine>,
) -> UnitArc {
    let mut dst = UnitArc::new();
    let ccw = dir == RotationDirection::CounterClockwise;

    let x = u_start.dot(u_stop);
    let mut y = u_start.cross(u_stop);
    let abs_y = y.abs();

    if abs_y <= crate::basics::SCALAR_NEARLY_ZERO
        && x > 0.0
        && ((y >= 0.0 && !ccw) || (y <= 0.0 && ccw))
    {
        return dst;
    }
    if ccw {
        y = -y;
    }

    let quadrant = if y == 0.0 {
        2
    } else if x == 0.0 {
        if y > 0.0 {
            1
        } else {
            3
        }
    } else {
        let mut q = 0;
        if y < 0.0 {
            q += 2;
        }
        if (x < 0.0) != (y < 0.0) {
            q += 1;
        }
        q
    };

    for i in 0..quadrant {
        dst.push(Conic {
            points: [
                QUADRANT_POINTS[i * 2],
                QUADRANT_POINTS[i * 2 + 1],
                QUADRANT_POINTS[(i * 2 + 2) % 8],
            ],
            weight: SCALAR_ROOT2_OVER2,
        });
    }

    let final_pt = vec2(x, y);
    let last_q = QUADRANT_POINTS[(quadrant * 2) % 8];
    let dot = last_q.dot(final_pt);
    if dot < 1.0 {
        let cos_theta_over2 = ((1.0 + dot) / 2.0).sqrt();
        if let Some(off_curve) = (last_q + final_pt).with_length(1.0 / cos_theta_over2) {
            if !last_q.nearly_equals(off_curve) {
                dst.push(Conic::new(last_q, off_curve, final_pt, cos_theta_over2));
            }
        }
    }

    // Rotate the canonical arc to start at u_start, mirror for ccw, then
    // apply the caller's transform.
    let mut m = TransAffine::new_sin_cos(u_start.y, u_start.x);
    if ccw {
        m.pre_scale(1.0, -1.0);
    }
    if let Some(user) = user {
        m.multiply(user);
    }
    for c in dst.iter_mut() {
        *c = c.transform(&m);
    }
    dst
}
