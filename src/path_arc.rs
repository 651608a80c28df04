//! Arc construction on [`Path`].
//!
//! Three families of arcs are supported:
//!
//! - tangent arcs ([`Path::arc_to`]) that round the corner between two
//!   lines, as used for rounded rectangles;
//! - SVG endpoint arcs ([`Path::svg_arc_to`], [`Path::ellipse_arc_cubic`]);
//! - oval arcs given by a bounding box and angles in degrees
//!   ([`Path::arc_to_oval`], [`Path::add_arc`]) and their canvas-style
//!   wrappers in radians ([`Path::arc`], [`Path::ellipse`]).
//!
//! Circular and elliptical pieces are built from exact conics
//! ([`build_unit_arc`]); only `ellipse_arc_cubic` approximates with cubics.

use core::f64::consts::PI;

use log::debug;

use crate::basics::{is_nearly_zero, RectD, SCALAR_NEARLY_ZERO};
use crate::bezier_arc::{arc_endpoint_to_center, arc_to_cubics, ArcCenter};
use crate::conic::{build_unit_arc, RotationDirection};
use crate::error::Result;
use crate::path_storage::{AddPathMode, Path};
use crate::path_shapes::PathDirection;
use crate::trans_affine::TransAffine;
use crate::vector2::{vec2, Vector2};

const TWO_PI: f64 = 2.0 * PI;

/// Sweeps below this (radians) are drawn as a straight line.
const MIN_SWEEP: f64 = PI * 1e-6;

// ============================================================================
// Angle helpers
// ============================================================================

/// Cosine/sine pair with values within [`SCALAR_NEARLY_ZERO`] of zero
/// snapped to exactly zero.
fn snapped_unit_vector(radians: f64) -> Vector2 {
    let (s, c) = radians.sin_cos();
    let snap = |v: f64| if is_nearly_zero(v) { 0.0 } else { v };
    vec2(snap(c), snap(s))
}

/// Start/stop unit vectors and direction for an oval arc in degrees.
///
/// A sweep just short of a full turn whose two vectors snap to the same
/// point gets its stop vector nudged back so the arc is not dropped.
fn angles_to_unit_vectors(start_deg: f64, sweep_deg: f64) -> (Vector2, Vector2, RotationDirection) {
    let start_rad = start_deg.to_radians();
    let mut stop_rad = (start_deg + sweep_deg).to_radians();

    let start_v = snapped_unit_vector(start_rad);
    let mut stop_v = snapped_unit_vector(stop_rad);

    let sw = sweep_deg.abs();
    if start_v == stop_v && sw > 359.0 && sw < 360.0 {
        let delta = (1.0 / 512.0f64).copysign(sweep_deg);
        for _ in 0..8 {
            stop_rad -= delta;
            stop_v = snapped_unit_vector(stop_rad);
            if start_v != stop_v {
                break;
            }
        }
    }

    let dir = if sweep_deg > 0.0 {
        RotationDirection::Clockwise
    } else {
        RotationDirection::CounterClockwise
    };
    (start_v, stop_v, dir)
}

/// An oval arc that collapses to a single point, if it does.
fn arc_lone_point(oval: &RectD, start_deg: f64, sweep_deg: f64) -> Option<Vector2> {
    if sweep_deg == 0.0 && (start_deg == 0.0 || start_deg == 360.0) {
        return Some(vec2(oval.x2, oval.center_y()));
    }
    if oval.width() == 0.0 && oval.height() == 0.0 {
        return Some(vec2(oval.x2, oval.y1));
    }
    None
}

/// Bring `start` into `[0, 2π)` and shift `end` by the same amount.
fn canonicalize_angles(start: f64, end: f64) -> (f64, f64) {
    let mut new_start = start % TWO_PI;
    if new_start < 0.0 {
        new_start += TWO_PI;
        if new_start >= TWO_PI {
            new_start -= TWO_PI;
        }
    }
    (new_start, end + (new_start - start))
}

/// Canvas rules for the end angle: sweeps beyond a full turn clamp to
/// one turn, and an end angle on the wrong side of the start wraps
/// around in the drawing direction.
fn adjust_end_angle(start: f64, end: f64, ccw: bool) -> f64 {
    if !ccw && end - start >= TWO_PI {
        start + TWO_PI
    } else if ccw && start - end >= TWO_PI {
        start - TWO_PI
    } else if !ccw && start > end {
        start + (TWO_PI - (start - end) % TWO_PI)
    } else if ccw && start < end {
        start - (TWO_PI - (end - start) % TWO_PI)
    } else {
        end
    }
}

// ============================================================================
// Path arc operations
// ============================================================================

impl Path {
    /// Round the corner at `(x1, y1)` between the line from the current
    /// point and the line to `(x2, y2)` with a circle of `radius`.
    ///
    /// Draws a line to the first tangent point (skipped when already
    /// there) followed by a conic to the second. A zero radius or
    /// collinear points reduce to a line to `(x1, y1)`.
    pub fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) {
        self.inject_move_to_if_needed();
        let start = self.current_point();
        let p1 = vec2(x1, y1);

        if radius <= 0.0 || !radius.is_finite() {
            self.line_to(x1, y1);
            return;
        }

        let (Some(before), Some(after)) =
            ((p1 - start).normalize(), (vec2(x2, y2) - p1).normalize())
        else {
            self.line_to(x1, y1);
            return;
        };

        let cosh = before.dot(after);
        let sinh = before.cross(after);
        if is_nearly_zero(sinh) {
            self.line_to(x1, y1);
            return;
        }

        let dist = (radius * (1.0 - cosh) / sinh).abs();
        let tangent = p1 - before * dist;
        let end = p1 + after * dist;
        if !tangent.nearly_equals(start) {
            self.line_to(tangent.x, tangent.y);
        }
        self.conic_to(x1, y1, end.x, end.y, (0.5 + cosh * 0.5).sqrt());
    }

    /// SVG elliptical arc from the current point to `(x, y)`.
    ///
    /// `rotation_deg` is the x-axis rotation in degrees. The arc is built
    /// from exact conics and ends exactly on `(x, y)`. Degenerate arcs
    /// (coincident endpoints, one zero radius) become a line.
    ///
    /// # Errors
    ///
    /// Both radii zero over a non-zero chord, or non-finite input. The
    /// path is left untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn svg_arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        rotation_deg: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> Result<()> {
        let from = self.current_point();
        let to = vec2(x, y);
        let Some(arc) =
            arc_endpoint_to_center(from, to, rx, ry, rotation_deg, large_arc, sweep)?
        else {
            self.line_to(x, y);
            return Ok(());
        };
        if arc.sweep_angle.abs() < MIN_SWEEP {
            self.line_to(x, y);
            return Ok(());
        }

        let m = arc_matrix(&arc);
        let dir = if arc.sweep_angle > 0.0 {
            RotationDirection::Clockwise
        } else {
            RotationDirection::CounterClockwise
        };
        let conics = build_unit_arc(
            Vector2::from_angle(arc.start_angle),
            Vector2::from_angle(arc.end_angle()),
            dir,
            Some(&m),
        );

        self.inject_move_to_if_needed();
        for c in &conics {
            self.conic_to(c.points[1].x, c.points[1].y, c.points[2].x, c.points[2].y, c.weight);
        }
        if conics.is_empty() {
            self.line_to(x, y);
        } else {
            self.set_last_point(to);
        }
        Ok(())
    }

    /// SVG elliptical arc from the current point to `(x, y)`,
    /// approximated by at most four cubics.
    ///
    /// # Errors
    ///
    /// Same as [`Path::svg_arc_to`]; the path is left untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse_arc_cubic(
        &mut self,
        rx: f64,
        ry: f64,
        rotation_deg: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> Result<()> {
        let from = self.current_point();
        match arc_endpoint_to_center(from, vec2(x, y), rx, ry, rotation_deg, large_arc, sweep)? {
            None => self.line_to(x, y),
            Some(arc) => {
                let cubics = arc_to_cubics(&arc);
                if cubics.is_empty() {
                    self.line_to(x, y);
                }
                for [c1, c2, p] in cubics {
                    self.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
                }
            }
        }
        Ok(())
    }

    /// Arc of the ellipse inscribed in `oval`, from `start_deg` sweeping
    /// `sweep_deg` degrees (positive is clockwise on screen).
    ///
    /// The arc is connected to the current contour with a line unless
    /// `force_move_to` is set or the path is empty, in which case it
    /// starts a new contour.
    pub fn arc_to_oval(
        &mut self,
        oval: &RectD,
        start_deg: f64,
        sweep_deg: f64,
        force_move_to: bool,
    ) {
        if oval.width() < 0.0 || oval.height() < 0.0 {
            return;
        }
        let force_move_to = force_move_to || self.is_empty();

        if let Some(p) = arc_lone_point(oval, start_deg, sweep_deg) {
            self.add_arc_point(p, force_move_to);
            return;
        }

        let (start_v, stop_v, dir) = angles_to_unit_vectors(start_deg, sweep_deg);
        let rx = oval.width() * 0.5;
        let ry = oval.height() * 0.5;

        if start_v == stop_v {
            let end = (start_deg + sweep_deg).to_radians();
            let (s, c) = end.sin_cos();
            let p = vec2(oval.center_x() + rx * c, oval.center_y() + ry * s);
            self.add_arc_point(p, force_move_to);
            return;
        }

        let m = TransAffine::new_scale_translate(rx, ry, oval.center_x(), oval.center_y());
        let conics = build_unit_arc(start_v, stop_v, dir, Some(&m));
        match conics.first() {
            None => self.add_arc_point(m.transform(stop_v), force_move_to),
            Some(first) => {
                self.add_arc_point(first.points[0], force_move_to);
                for c in &conics {
                    let [_, ctrl, end] = c.points;
                    self.conic_to(ctrl.x, ctrl.y, end.x, end.y, c.weight);
                }
            }
        }
    }

    /// Add an oval arc as a new contour. Sweeps of a full turn or more
    /// starting on a quadrant boundary become a closed oval.
    pub fn add_arc(&mut self, oval: &RectD, start_deg: f64, sweep_deg: f64) {
        if oval.width() <= 0.0 || oval.height() <= 0.0 || sweep_deg == 0.0 {
            return;
        }

        if sweep_deg.abs() >= 360.0 {
            let start_over_90 = start_deg / 90.0;
            let rounded = start_over_90.round();
            if is_nearly_zero(start_over_90 - rounded) {
                let start_index = (rounded + 1.0).rem_euclid(4.0) as usize;
                let dir = if sweep_deg > 0.0 {
                    PathDirection::Cw
                } else {
                    PathDirection::Ccw
                };
                self.add_oval(oval, dir, start_index);
                return;
            }
        }

        self.arc_to_oval(oval, start_deg, sweep_deg, true);
    }

    /// Canvas `arc`: circle of radius `r` around `(cx, cy)` from `start`
    /// to `end` radians.
    pub fn arc(&mut self, cx: f64, cy: f64, r: f64, start: f64, end: f64, ccw: bool) {
        self.ellipse(cx, cy, r, r, 0.0, start, end, ccw);
    }

    /// Canvas `ellipse`: arc of the ellipse centered at `(x, y)` with
    /// radii `rx`/`ry`, rotated by `rotation`, from `start` to `end`
    /// radians. Joined to the current contour with a line.
    ///
    /// Negative or non-finite radii are ignored.
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
        &mut self,
        x: f64,
        y: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
        start: f64,
        end: f64,
        ccw: bool,
    ) {
        if rx < 0.0 || ry < 0.0 || !rx.is_finite() || !ry.is_finite() {
            debug!("ellipse ignored: radii ({}, {})", rx, ry);
            return;
        }
        let (start, end) = canonicalize_angles(start, end);
        let end = adjust_end_angle(start, end, ccw);

        let start_deg = start.to_degrees();
        let sweep_deg = (end - start).to_degrees();
        let oval = RectD::new(x - rx, y - ry, x + rx, y + ry);

        let mut arc = Path::new();
        if (sweep_deg.abs() - 360.0).abs() <= SCALAR_NEARLY_ZERO {
            // A full turn has coincident end vectors; draw it as two halves.
            let half = sweep_deg * 0.5;
            arc.arc_to_oval(&oval, start_deg, half, false);
            arc.arc_to_oval(&oval, start_deg + half, half, false);
        } else {
            arc.arc_to_oval(&oval, start_deg, sweep_deg, false);
        }

        let mut m = TransAffine::new_translation(-x, -y);
        m.rotate(rotation).translate(x, y);
        self.add_path_transformed(&arc, &m, AddPathMode::Extend);
    }

    fn add_arc_point(&mut self, p: Vector2, force_move_to: bool) {
        if force_move_to {
            self.move_to(p.x, p.y);
        } else if !self.last_point().map_or(false, |last| last.nearly_equals(p)) {
            self.line_to(p.x, p.y);
        }
    }
}

/// Unit circle to the arc's ellipse: scale by the radii, rotate, then
/// move to the center.
fn arc_matrix(arc: &ArcCenter) -> TransAffine {
    let mut m = TransAffine::new_scaling(arc.rx, arc.ry);
    m.rotate(arc.rotation).translate(arc.center.x, arc.center.y);
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use crate::path_storage::Verb;

    const EPS: f64 = 1e-9;

    /// Largest `|distance - r|` of the flattened points from `center`,
    /// ignoring the first `skip` points.
    fn max_radius_error_from(p: &Path, skip: usize, center: Vector2, r: f64) -> f64 {
        p.flatten(0.01)
            .points()
            .iter()
            .skip(skip)
            .map(|q| (q.distance(center) - r).abs())
            .fold(0.0, f64::max)
    }

    fn max_radius_error(p: &Path, center: Vector2, r: f64) -> f64 {
        max_radius_error_from(p, 0, center, r)
    }

    #[test]
    fn test_adjust_end_angle() {
        assert!((adjust_end_angle(0.0, 7.0, false) - TWO_PI).abs() < EPS);
        assert!((adjust_end_angle(0.0, -7.0, true) + TWO_PI).abs() < EPS);
        assert!((adjust_end_angle(1.0, 0.5, false) - (1.0 + TWO_PI - 0.5)).abs() < EPS);
        assert!((adjust_end_angle(0.5, 1.0, true) - (0.5 - (TWO_PI - 0.5))).abs() < EPS);
        assert_eq!(adjust_end_angle(0.0, 1.0, false), 1.0);
    }

    #[test]
    fn test_canonicalize_angles() {
        let (s, e) = canonicalize_angles(-PI / 2.0, 0.0);
        assert!((s - 1.5 * PI).abs() < EPS);
        assert!((e - 2.0 * PI).abs() < EPS);
    }

    #[test]
    fn test_angles_to_unit_vectors() {
        let (a, b, dir) = angles_to_unit_vectors(0.0, 90.0);
        assert_eq!(a, vec2(1.0, 0.0));
        assert_eq!(b, vec2(0.0, 1.0));
        assert_eq!(dir, RotationDirection::Clockwise);

        let (a, b, dir) = angles_to_unit_vectors(0.0, -359.99999);
        assert_ne!(a, b);
        assert_eq!(dir, RotationDirection::CounterClockwise);
    }

    #[test]
    fn test_arc_to_tangent() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.arc_to(100.0, 0.0, 100.0, 100.0, 20.0);
        assert_eq!(p.verbs()[1], Verb::Line);
        assert!(p.points()[1].equals_eps(vec2(80.0, 0.0), EPS));
        assert!(p.last_point().unwrap().equals_eps(vec2(100.0, 20.0), EPS));
        assert!(max_radius_error_from(&p, 1, vec2(80.0, 20.0), 20.0) < 0.3);
    }

    #[test]
    fn test_arc_to_degenerate() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.arc_to(50.0, 0.0, 100.0, 0.0, 10.0);
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line]);
        assert_eq!(p.last_point(), Some(vec2(50.0, 0.0)));

        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.arc_to(50.0, 0.0, 50.0, 50.0, 0.0);
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line]);
    }

    #[test]
    fn test_svg_arc_to_semicircle() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.svg_arc_to(50.0, 50.0, 0.0, false, true, 100.0, 0.0).unwrap();
        assert_eq!(p.last_point(), Some(vec2(100.0, 0.0)));
        assert!(max_radius_error(&p, vec2(50.0, 0.0), 50.0) < 0.3);
        // Sweep flag set runs with increasing angle: through (50, -50).
        let b = p.compute_tight_bounds().unwrap();
        assert!((b.y1 + 50.0).abs() < 0.3);
        assert!(b.y2.abs() < EPS);
    }

    #[test]
    fn test_svg_arc_to_degenerate_and_error() {
        let mut p = Path::new();
        p.move_to(10.0, 10.0);
        p.svg_arc_to(0.0, 20.0, 0.0, false, false, 30.0, 10.0).unwrap();
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line]);

        let before = p.clone();
        let err = p.svg_arc_to(0.0, 0.0, 0.0, false, false, 60.0, 50.0);
        assert!(matches!(err, Err(GeometryError::ZeroRadiusArc { .. })));
        assert_eq!(p, before);
    }

    #[test]
    fn test_ellipse_arc_cubic() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.ellipse_arc_cubic(50.0, 50.0, 0.0, false, true, 100.0, 0.0).unwrap();
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Cubic, Verb::Cubic]);
        assert!(p.last_point().unwrap().equals_eps(vec2(100.0, 0.0), 1e-9));
    }

    #[test]
    fn test_arc_to_oval_quarter() {
        let oval = RectD::new(0.0, 0.0, 100.0, 100.0);
        let mut p = Path::new();
        p.arc_to_oval(&oval, 0.0, 90.0, false);
        assert_eq!(p.verbs()[0], Verb::Move);
        assert!(p.points()[0].equals_eps(vec2(100.0, 50.0), EPS));
        assert!(p.last_point().unwrap().equals_eps(vec2(50.0, 100.0), 1e-9));
        assert!(max_radius_error(&p, vec2(50.0, 50.0), 50.0) < 0.3);
    }

    #[test]
    fn test_arc_to_oval_lone_point() {
        let oval = RectD::new(0.0, 0.0, 100.0, 60.0);
        let mut p = Path::new();
        p.arc_to_oval(&oval, 0.0, 0.0, false);
        assert_eq!(p.verbs(), &[Verb::Move]);
        assert_eq!(p.points()[0], vec2(100.0, 30.0));

        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.arc_to_oval(&oval, 90.0, 0.0, false);
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line]);
        assert!(p.points()[1].equals_eps(vec2(50.0, 60.0), 1e-9));
    }

    #[test]
    fn test_add_arc_full_turn_is_oval() {
        let oval = RectD::new(0.0, 0.0, 40.0, 40.0);
        let mut p = Path::new();
        p.add_arc(&oval, 0.0, 360.0);
        assert_eq!(p.last_verb(), Some(Verb::Close));
        assert!(p.points()[0].equals_eps(vec2(40.0, 20.0), EPS));

        let mut p = Path::new();
        p.add_arc(&oval, 10.0, 90.0);
        assert_ne!(p.last_verb(), Some(Verb::Close));
        assert!(max_radius_error(&p, vec2(20.0, 20.0), 20.0) < 0.3);
    }

    #[test]
    fn test_arc_canvas_full_circle() {
        let mut p = Path::new();
        p.arc(50.0, 50.0, 25.0, 0.0, TWO_PI, false);
        assert_eq!(p.contour_count(), 1);
        assert!(p.points()[0].equals_eps(vec2(75.0, 50.0), EPS));
        assert!(p.last_point().unwrap().equals_eps(vec2(75.0, 50.0), 1e-9));
        let b = p.compute_tight_bounds().unwrap();
        assert!((b.x1 - 25.0).abs() < 0.01 && (b.y2 - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_arc_canvas_joins_with_line() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.arc(50.0, 50.0, 10.0, 0.0, PI / 2.0, false);
        assert_eq!(p.verbs()[1], Verb::Line);
        assert!(p.points()[1].equals_eps(vec2(60.0, 50.0), EPS));
        assert!(p.last_point().unwrap().equals_eps(vec2(50.0, 60.0), 1e-9));
    }

    #[test]
    fn test_arc_canvas_ccw() {
        let mut p = Path::new();
        p.arc(0.0, 0.0, 10.0, 0.0, PI / 2.0, true);
        // Counter-clockwise from 0 to 90 degrees takes the long way round.
        let b = p.compute_tight_bounds().unwrap();
        assert!((b.x1 + 10.0).abs() < 0.01);
        assert!((b.y1 + 10.0).abs() < 0.01);
        assert!(p.last_point().unwrap().equals_eps(vec2(0.0, 10.0), 1e-9));
    }

    #[test]
    fn test_ellipse_rotated() {
        let mut p = Path::new();
        p.ellipse(0.0, 0.0, 20.0, 10.0, PI / 2.0, 0.0, TWO_PI, false);
        let b = p.compute_tight_bounds().unwrap();
        assert!((b.width() - 20.0).abs() < 0.05);
        assert!((b.height() - 40.0).abs() < 0.05);

        let before = p.clone();
        p.ellipse(0.0, 0.0, -1.0, 10.0, 0.0, 0.0, 1.0, false);
        assert_eq!(p, before);
    }
}
