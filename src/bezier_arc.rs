//! Elliptical arcs in SVG endpoint form.
//!
//! Converts the endpoint parameterization (`from`, `to`, radii, x-axis
//! rotation, large-arc and sweep flags) into the center parameterization,
//! and approximates a center-form arc with at most four cubic Beziers.

use core::f64::consts::{FRAC_PI_2, PI};

use arrayvec::ArrayVec;
use log::warn;

use crate::error::{GeometryError, Result};
use crate::vector2::{vec2, Vector2};

/// Cubics produced for one arc: `(ctrl1, ctrl2, end)` per segment, the
/// start point being the previous segment's end.
pub type ArcCubics = ArrayVec<[Vector2; 3], 4>;

/// Center parameterization of an elliptical arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcCenter {
    pub center: Vector2,
    /// Radii after the feasibility correction (always positive).
    pub rx: f64,
    pub ry: f64,
    /// X-axis rotation in radians.
    pub rotation: f64,
    /// Start angle in radians, before rotation.
    pub start_angle: f64,
    /// Signed sweep in radians; positive sweeps run with increasing angle.
    pub sweep_angle: f64,
}

impl ArcCenter {
    /// Point on the arc at parameter angle `theta`.
    pub fn point_at(&self, theta: f64) -> Vector2 {
        let (s, c) = theta.sin_cos();
        self.map(vec2(self.rx * c, self.ry * s))
    }

    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep_angle
    }

    fn map(&self, p: Vector2) -> Vector2 {
        let (s, c) = self.rotation.sin_cos();
        vec2(p.x * c - p.y * s, p.x * s + p.y * c) + self.center
    }
}

/// Convert an SVG endpoint arc to center form.
///
/// `rotation_deg` is the x-axis rotation in degrees. Returns `Ok(None)`
/// when the arc degenerates to a straight line (coincident endpoints or
/// exactly one zero radius). Both radii zero with distinct endpoints is
/// undefined and reported as [`GeometryError::ZeroRadiusArc`].
pub fn arc_endpoint_to_center(
    from: Vector2,
    to: Vector2,
    rx: f64,
    ry: f64,
    rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
) -> Result<Option<ArcCenter>> {
    if !from.is_finite()
        || !to.is_finite()
        || !rx.is_finite()
        || !ry.is_finite()
        || !rotation_deg.is_finite()
    {
        warn!("rejecting elliptical arc with non-finite parameters");
        return Err(GeometryError::NonFiniteInput { what: "elliptical arc" });
    }

    let chord = from.distance(to);
    if rx == 0.0 && ry == 0.0 && chord > 0.0 {
        warn!("rejecting elliptical arc with zero radii over chord {}", chord);
        return Err(GeometryError::ZeroRadiusArc { chord });
    }
    if chord == 0.0 || rx == 0.0 || ry == 0.0 {
        return Ok(None);
    }

    let phi = rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    // Midpoint-relative start point in the ellipse's own frame.
    let half = (from - to) * 0.5;
    let x1p = cos_phi * half.x + sin_phi * half.y;
    let y1p = -sin_phi * half.x + cos_phi * half.y;

    let mut rx = rx.abs();
    let mut ry = ry.abs();
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let num = (rx2 * ry2 - den).max(0.0);
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let coef = sign * (num / den).sqrt();
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * -(ry * x1p / rx);

    let mid = from.midpoint(to);
    let center = vec2(
        cos_phi * cxp - sin_phi * cyp + mid.x,
        sin_phi * cxp + cos_phi * cyp + mid.y,
    );

    let u = vec2((x1p - cxp) / rx, (y1p - cyp) / ry);
    let v = vec2((-x1p - cxp) / rx, (-y1p - cyp) / ry);
    let start_angle = u.angle();
    let mut sweep_angle = u.cross(v).atan2(u.dot(v)) % (2.0 * PI);
    if !sweep && sweep_angle > 0.0 {
        sweep_angle -= 2.0 * PI;
    } else if sweep && sweep_angle < 0.0 {
        sweep_angle += 2.0 * PI;
    }

    Ok(Some(ArcCenter {
        center,
        rx,
        ry,
        rotation: phi,
        start_angle,
        sweep_angle,
    }))
}

/// Approximate a center-form arc by cubics, one per started quarter turn.
pub fn arc_to_cubics(arc: &ArcCenter) -> ArcCubics {
    let mut out = ArcCubics::new();
    let sweep = arc.sweep_angle;
    if sweep == 0.0 || !sweep.is_finite() {
        return out;
    }
    // The epsilon keeps an exact quarter multiple from rounding up.
    let segments = ((sweep.abs() / FRAC_PI_2) - 1e-9).ceil().clamp(1.0, 4.0) as usize;
    let delta = sweep / segments as f64;
    let alpha = 4.0 / 3.0 * (delta / 4.0).tan();

    let mut theta1 = arc.start_angle;
    for i in 0..segments {
        let theta2 = if i + 1 == segments {
            arc.end_angle()
        } else {
            theta1 + delta
        };
        let (s1, c1) = theta1.sin_cos();
        let (s2, c2) = theta2.sin_cos();
        let p1 = vec2(arc.rx * c1, arc.ry * s1);
        let p2 = vec2(arc.rx * c2, arc.ry * s2);
        let cp1 = p1 + vec2(-arc.rx * s1, arc.ry * c1) * alpha;
        let cp2 = p2 - vec2(-arc.rx * s2, arc.ry * c2) * alpha;
        out.push([arc.map(cp1), arc.map(cp2), arc.map(p2)]);
        theta1 = theta2;
    }
    out
}
