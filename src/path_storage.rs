//! Path storage: the verb/point container every other stage consumes.
//!
//! A `Path` is a list of [`Verb`]s plus one flat list of points. Each verb
//! consumes a fixed number of points (see [`Verb::points`]), so the two
//! lists decode unambiguously into [`Segment`]s. Conics are lowered to
//! quadratics on insertion; the stored verb set is Move/Line/Quad/Cubic/Close.
//!
//! Drawing verbs follow the implicit-moveto rules of 2D canvas APIs: a
//! drawing call on an empty path starts at `(0, 0)`, and a drawing call
//! after `close` starts again at the contour's MoveTo point.

use crate::basics::{RectD, DEFAULT_FLATTEN_TOLERANCE};
use crate::bounding_rect::BoundsAccumulator;
use crate::conic::conic_to_quadratics;
use crate::curves::Flatten;
use crate::trans_affine::TransAffine;
use crate::vector2::{vec2, Vector2};

// ============================================================================
// Verbs and segments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Verb {
    Move,
    Line,
    Quad,
    Cubic,
    Close,
}

impl Verb {
    /// Number of points this verb consumes from the point list.
    #[inline]
    pub const fn points(self) -> usize {
        match self {
            Verb::Move | Verb::Line => 1,
            Verb::Quad => 2,
            Verb::Cubic => 3,
            Verb::Close => 0,
        }
    }
}

/// A decoded path segment with its start point attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Move(Vector2),
    /// `(from, to)`.
    Line(Vector2, Vector2),
    Quad([Vector2; 3]),
    Cubic([Vector2; 4]),
    /// `(last point, contour start)`. The closing edge runs between them.
    Close(Vector2, Vector2),
}

/// How [`Path::add_path`] joins the added path to the current contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPathMode {
    /// Added contours stay separate.
    Append,
    /// The first added contour continues the current one with a line.
    Extend,
}

/// Callback form of [`Path::segments`].
pub trait PathVisitor {
    fn move_to(&mut self, p: Vector2);
    fn line_to(&mut self, from: Vector2, to: Vector2);
    fn quad_to(&mut self, pts: &[Vector2; 3]);
    fn cubic_to(&mut self, pts: &[Vector2; 4]);
    fn close(&mut self, last: Vector2, start: Vector2);
}

// ============================================================================
// Path
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    verbs: Vec<Verb>,
    points: Vec<Vector2>,
    last_move_point: Vector2,
    needs_move: bool,
}

impl Path {
    pub fn new() -> Self {
        Self {
            verbs: Vec::new(),
            points: Vec::new(),
            last_move_point: Vector2::ZERO,
            needs_move: true,
        }
    }

    /// Remove everything (keeps allocated memory).
    pub fn reset(&mut self) {
        self.verbs.clear();
        self.points.clear();
        self.last_move_point = Vector2::ZERO;
        self.needs_move = true;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// Number of verbs.
    #[inline]
    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    #[inline]
    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    #[inline]
    pub fn points(&self) -> &[Vector2] {
        &self.points
    }

    #[inline]
    pub fn last_point(&self) -> Option<Vector2> {
        self.points.last().copied()
    }

    #[inline]
    pub fn last_verb(&self) -> Option<Verb> {
        self.verbs.last().copied()
    }

    /// Point the next drawing verb starts from, taking the implicit
    /// MoveTo into account.
    pub fn current_point(&self) -> Vector2 {
        if self.needs_move {
            if self.points.is_empty() {
                Vector2::ZERO
            } else {
                self.last_move_point
            }
        } else {
            self.last_point().unwrap_or(Vector2::ZERO)
        }
    }

    /// Overwrite the last point, or start a contour there if the path is
    /// empty.
    pub fn set_last_point(&mut self, p: Vector2) {
        match self.points.last_mut() {
            Some(last) => *last = p,
            None => self.move_to(p.x, p.y),
        }
    }

    pub fn contour_count(&self) -> usize {
        self.verbs.iter().filter(|v| **v == Verb::Move).count()
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// Start a new contour. A MoveTo directly after another MoveTo
    /// replaces it.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = vec2(x, y);
        if self.last_verb() == Some(Verb::Move) {
            self.set_last_point(p);
        } else {
            self.verbs.push(Verb::Move);
            self.points.push(p);
        }
        self.last_move_point = p;
        self.needs_move = false;
    }

    /// Insert the implicit MoveTo a drawing verb needs: `(0, 0)` on an
    /// empty path, the last MoveTo point after a close.
    pub(crate) fn inject_move_to_if_needed(&mut self) {
        if self.needs_move {
            if self.points.is_empty() {
                self.move_to(0.0, 0.0);
            } else {
                let p = self.last_move_point;
                self.move_to(p.x, p.y);
            }
        }
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.inject_move_to_if_needed();
        self.verbs.push(Verb::Line);
        self.points.push(vec2(x, y));
    }

    pub fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64) {
        self.inject_move_to_if_needed();
        self.verbs.push(Verb::Quad);
        self.points.push(vec2(x1, y1));
        self.points.push(vec2(x, y));
    }

    pub fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.inject_move_to_if_needed();
        self.verbs.push(Verb::Cubic);
        self.points.push(vec2(x1, y1));
        self.points.push(vec2(x2, y2));
        self.points.push(vec2(x, y));
    }

    /// Rational quadratic to `(x, y)` with control `(x1, y1)`.
    ///
    /// Stored as quadratics within [`DEFAULT_FLATTEN_TOLERANCE`]. A weight
    /// `<= 0` becomes a line to the end point, a non-finite weight becomes
    /// two lines through the control point, and a weight of exactly 1 is
    /// a plain quadratic.
    pub fn conic_to(&mut self, x1: f64, y1: f64, x: f64, y: f64, weight: f64) {
        if weight.is_nan() || weight <= 0.0 {
            self.line_to(x, y);
        } else if !weight.is_finite() {
            self.line_to(x1, y1);
            self.line_to(x, y);
        } else if weight == 1.0 {
            self.quad_to(x1, y1, x, y);
        } else {
            self.inject_move_to_if_needed();
            let start = self.last_point().unwrap_or(Vector2::ZERO);
            let pts = conic_to_quadratics(
                start,
                vec2(x1, y1),
                vec2(x, y),
                weight,
                DEFAULT_FLATTEN_TOLERANCE,
            );
            for pair in pts[1..].chunks_exact(2) {
                self.quad_to(pair[0].x, pair[0].y, pair[1].x, pair[1].y);
            }
        }
    }

    /// Close the current contour. Repeated closes and closes on an empty
    /// path are ignored.
    pub fn close(&mut self) {
        if let Some(last) = self.last_verb() {
            if last != Verb::Close {
                self.verbs.push(Verb::Close);
                self.needs_move = true;
            }
        }
    }

    /// Move to the first point, line through the rest, close if asked.
    pub fn add_polygon(&mut self, pts: &[Vector2], close: bool) {
        let Some((first, rest)) = pts.split_first() else {
            return;
        };
        self.move_to(first.x, first.y);
        for p in rest {
            self.line_to(p.x, p.y);
        }
        if close {
            self.close();
        }
    }

    // ---------------------------------------------------------------
    // Iteration
    // ---------------------------------------------------------------

    pub fn segments(&self) -> Segments<'_> {
        Segments {
            path: self,
            verb_index: 0,
            point_index: 0,
            last: Vector2::ZERO,
            start: Vector2::ZERO,
        }
    }

    pub fn visit<V: PathVisitor + ?Sized>(&self, visitor: &mut V) {
        for seg in self.segments() {
            match seg {
                Segment::Move(p) => visitor.move_to(p),
                Segment::Line(a, b) => visitor.line_to(a, b),
                Segment::Quad(q) => visitor.quad_to(&q),
                Segment::Cubic(c) => visitor.cubic_to(&c),
                Segment::Close(last, start) => visitor.close(last, start),
            }
        }
    }

    // ---------------------------------------------------------------
    // Bounds
    // ---------------------------------------------------------------

    /// Box of all control points. `None` for an empty path.
    pub fn bounds(&self) -> Option<RectD> {
        crate::bounding_rect::bounding_rect_points(&self.points)
    }

    /// Box of the curves themselves, including interior extrema.
    pub fn compute_tight_bounds(&self) -> Option<RectD> {
        let mut acc = BoundsAccumulator::new();
        for seg in self.segments() {
            match seg {
                Segment::Move(p) => acc.add_point(p),
                Segment::Line(_, p) => acc.add_point(p),
                Segment::Quad(q) => acc.add_quad_extrema(&q),
                Segment::Cubic(c) => acc.add_cubic_extrema(&c),
                Segment::Close(..) => {}
            }
        }
        acc.rect()
    }

    // ---------------------------------------------------------------
    // Derived paths
    // ---------------------------------------------------------------

    /// Copy of the path with every curve replaced by line segments within
    /// `tolerance`.
    pub fn flatten(&self, tolerance: f64) -> Path {
        let mut out = Path::new();
        for seg in self.segments() {
            match seg {
                Segment::Move(p) => out.move_to(p.x, p.y),
                Segment::Line(_, p) => out.line_to(p.x, p.y),
                Segment::Quad(q) => {
                    for p in Flatten::quad(&q, tolerance) {
                        out.line_to(p.x, p.y);
                    }
                }
                Segment::Cubic(c) => {
                    for p in Flatten::cubic(&c, tolerance) {
                        out.line_to(p.x, p.y);
                    }
                }
                Segment::Close(..) => out.close(),
            }
        }
        out
    }

    /// Flattened polylines, one per contour. With `closed`, a closed
    /// contour repeats its start point at the end.
    pub fn to_polygons(&self, tolerance: f64, closed: bool) -> Vec<Vec<Vector2>> {
        let mut polygons = Vec::new();
        let mut current: Option<Vec<Vector2>> = None;
        for seg in self.flatten(tolerance).segments() {
            match seg {
                Segment::Move(p) => {
                    if let Some(poly) = current.take() {
                        polygons.push(poly);
                    }
                    current = Some(vec![p]);
                }
                Segment::Line(_, p) => {
                    if let Some(poly) = current.as_mut() {
                        poly.push(p);
                    }
                }
                Segment::Close(_, start) => {
                    if let Some(mut poly) = current.take() {
                        if closed {
                            poly.push(start);
                        }
                        polygons.push(poly);
                    }
                }
                Segment::Quad(_) | Segment::Cubic(_) => {}
            }
        }
        if let Some(poly) = current {
            polygons.push(poly);
        }
        polygons
    }

    pub fn transform(&mut self, m: &TransAffine) {
        m.transform_points(&mut self.points);
        self.last_move_point = m.transform(self.last_move_point);
    }

    pub fn transformed(&self, m: &TransAffine) -> Path {
        let mut out = self.clone();
        out.transform(m);
        out
    }

    pub fn add_path(&mut self, other: &Path, mode: AddPathMode) {
        self.add_path_transformed(other, &TransAffine::new(), mode);
    }

    /// Add `other` mapped through `m`.
    pub fn add_path_transformed(&mut self, other: &Path, m: &TransAffine, mode: AddPathMode) {
        if other.is_empty() {
            return;
        }
        if mode == AddPathMode::Append {
            self.verbs.extend_from_slice(&other.verbs);
            self.points.extend(other.points.iter().map(|p| m.transform(*p)));
            self.last_move_point = m.transform(other.last_move_point);
            self.needs_move = other.needs_move;
            return;
        }

        let mut first = true;
        for seg in other.segments() {
            match seg {
                Segment::Move(p) => {
                    let p = m.transform(p);
                    if first && !self.is_empty() {
                        self.inject_move_to_if_needed();
                        let joined = self.last_point().map_or(false, |last| last.nearly_equals(p));
                        if !joined {
                            self.line_to(p.x, p.y);
                        }
                    } else {
                        self.move_to(p.x, p.y);
                    }
                }
                Segment::Line(_, p) => {
                    let p = m.transform(p);
                    self.line_to(p.x, p.y);
                }
                Segment::Quad(q) => {
                    let (c, p) = (m.transform(q[1]), m.transform(q[2]));
                    self.quad_to(c.x, c.y, p.x, p.y);
                }
                Segment::Cubic(c) => {
                    let (c1, c2, p) = (m.transform(c[1]), m.transform(c[2]), m.transform(c[3]));
                    self.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
                }
                Segment::Close(..) => self.close(),
            }
            first = false;
        }
    }

    /// Append the last contour of `other` backwards, continuing the
    /// current contour from its last point. The end point of `other`
    /// itself is not repeated.
    pub fn add_reverse_path(&mut self, other: &Path) {
        let pts = &other.points;
        let Some(mut k) = pts.len().checked_sub(1) else {
            return;
        };
        for &verb in other.verbs.iter().rev() {
            match verb {
                Verb::Move => break,
                Verb::Line => {
                    k -= 1;
                    self.line_to(pts[k].x, pts[k].y);
                }
                Verb::Quad => {
                    let (c, p) = (pts[k - 1], pts[k - 2]);
                    self.quad_to(c.x, c.y, p.x, p.y);
                    k -= 2;
                }
                Verb::Cubic => {
                    let (c1, c2, p) = (pts[k - 1], pts[k - 2], pts[k - 3]);
                    self.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
                    k -= 3;
                }
                Verb::Close => {}
            }
        }
    }

    /// Copy of the path with every contour reversed. Closed contours stay
    /// closed.
    pub fn reversed(&self) -> Path {
        let mut out = Path::new();
        let pts = &self.points;
        let mut need_move = true;
        let mut need_close = false;
        let mut k = pts.len();
        for &verb in self.verbs.iter().rev() {
            if need_move {
                k -= 1;
                out.move_to(pts[k].x, pts[k].y);
                need_move = false;
            }
            match verb {
                Verb::Move => {
                    if need_close {
                        out.close();
                        need_close = false;
                    }
                    need_move = true;
                }
                Verb::Line => {
                    k -= 1;
                    out.line_to(pts[k].x, pts[k].y);
                }
                Verb::Quad => {
                    k -= 2;
                    out.quad_to(pts[k + 1].x, pts[k + 1].y, pts[k].x, pts[k].y);
                }
                Verb::Cubic => {
                    k -= 3;
                    out.cubic_to(
                        pts[k + 2].x,
                        pts[k + 2].y,
                        pts[k + 1].x,
                        pts[k + 1].y,
                        pts[k].x,
                        pts[k].y,
                    );
                }
                Verb::Close => need_close = true,
            }
        }
        out
    }

    /// `true` if every point from index `start` on coincides with the
    /// point at `start` (or fewer than two points remain).
    pub fn is_zero_length_since_point(&self, start: usize) -> bool {
        let tail = self.points.get(start..).unwrap_or(&[]);
        match tail.split_first() {
            Some((first, rest)) if !rest.is_empty() => rest.iter().all(|p| first.nearly_equals(*p)),
            _ => true,
        }
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Segment iterator
// ============================================================================

pub struct Segments<'a> {
    path: &'a Path,
    verb_index: usize,
    point_index: usize,
    last: Vector2,
    start: Vector2,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let verb = *self.path.verbs.get(self.verb_index)?;
        self.verb_index += 1;
        let pts = &self.path.points[self.point_index..self.point_index + verb.points()];
        self.point_index += verb.points();
        let seg = match verb {
            Verb::Move => {
                self.start = pts[0];
                Segment::Move(pts[0])
            }
            Verb::Line => Segment::Line(self.last, pts[0]),
            Verb::Quad => Segment::Quad([self.last, pts[0], pts[1]]),
            Verb::Cubic => Segment::Cubic([self.last, pts[0], pts[1], pts[2]]),
            Verb::Close => Segment::Close(self.last, self.start),
        };
        if let Some(p) = pts.last() {
            self.last = *p;
        }
        Some(seg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::SCALAR_ROOT2_OVER2;

    const EPS: f64 = 1e-9;

    fn triangle() -> Path {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);
        p.close();
        p
    }

    #[test]
    fn test_new_empty() {
        let p = Path::new();
        assert!(p.is_empty());
        assert_eq!(p.len(), 0);
        assert!(p.bounds().is_none());
        assert!(p.last_point().is_none());
    }

    #[test]
    fn test_move_to_replaces_move_to() {
        let mut p = Path::new();
        p.move_to(1.0, 1.0);
        p.move_to(5.0, 6.0);
        assert_eq!(p.verbs(), &[Verb::Move]);
        assert_eq!(p.points(), &[vec2(5.0, 6.0)]);
    }

    #[test]
    fn test_implicit_move_on_empty() {
        let mut p = Path::new();
        p.line_to(3.0, 4.0);
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line]);
        assert_eq!(p.points()[0], vec2(0.0, 0.0));
    }

    #[test]
    fn test_draw_after_close_reopens_at_move_point() {
        let mut p = triangle();
        p.line_to(20.0, 20.0);
        assert_eq!(
            p.verbs(),
            &[Verb::Move, Verb::Line, Verb::Line, Verb::Close, Verb::Move, Verb::Line]
        );
        assert_eq!(p.points()[3], vec2(0.0, 0.0));
        assert_eq!(p.contour_count(), 2);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut p = triangle();
        p.close();
        assert_eq!(p.len(), 4);
        let mut empty = Path::new();
        empty.close();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_conic_weight_cases() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.conic_to(5.0, 5.0, 10.0, 0.0, 0.0);
        assert_eq!(p.last_verb(), Some(Verb::Line));

        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.conic_to(5.0, 5.0, 10.0, 0.0, f64::INFINITY);
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line, Verb::Line]);
        assert_eq!(p.points()[1], vec2(5.0, 5.0));

        let mut a = Path::new();
        a.move_to(0.0, 0.0);
        a.conic_to(5.0, 5.0, 10.0, 0.0, 1.0);
        let mut b = Path::new();
        b.move_to(0.0, 0.0);
        b.quad_to(5.0, 5.0, 10.0, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_conic_quarter_circle_becomes_quads() {
        let mut p = Path::new();
        p.move_to(100.0, 0.0);
        p.conic_to(100.0, 100.0, 0.0, 100.0, SCALAR_ROOT2_OVER2);
        assert!(p.len() > 2);
        assert!(p.verbs()[1..].iter().all(|v| *v == Verb::Quad));
        assert!(p.last_point().unwrap().equals_eps(vec2(0.0, 100.0), EPS));
        for poly in p.to_polygons(0.01, false) {
            for q in poly {
                assert!((q.length() - 100.0).abs() < 0.3);
            }
        }
    }

    #[test]
    fn test_segments_decode() {
        let mut p = Path::new();
        p.move_to(1.0, 2.0);
        p.quad_to(3.0, 4.0, 5.0, 6.0);
        p.cubic_to(7.0, 8.0, 9.0, 10.0, 11.0, 12.0);
        p.close();
        let segs: Vec<_> = p.segments().collect();
        assert_eq!(
            segs,
            vec![
                Segment::Move(vec2(1.0, 2.0)),
                Segment::Quad([vec2(1.0, 2.0), vec2(3.0, 4.0), vec2(5.0, 6.0)]),
                Segment::Cubic([vec2(5.0, 6.0), vec2(7.0, 8.0), vec2(9.0, 10.0), vec2(11.0, 12.0)]),
                Segment::Close(vec2(11.0, 12.0), vec2(1.0, 2.0)),
            ]
        );
    }

    struct Counter {
        moves: usize,
        lines: usize,
        closes: usize,
    }

    impl PathVisitor for Counter {
        fn move_to(&mut self, _p: Vector2) {
            self.moves += 1;
        }
        fn line_to(&mut self, _from: Vector2, _to: Vector2) {
            self.lines += 1;
        }
        fn quad_to(&mut self, _pts: &[Vector2; 3]) {}
        fn cubic_to(&mut self, _pts: &[Vector2; 4]) {}
        fn close(&mut self, _last: Vector2, _start: Vector2) {
            self.closes += 1;
        }
    }

    #[test]
    fn test_visit() {
        let mut c = Counter {
            moves: 0,
            lines: 0,
            closes: 0,
        };
        triangle().visit(&mut c);
        assert_eq!((c.moves, c.lines, c.closes), (1, 2, 1));
    }

    #[test]
    fn test_bounds_loose_and_tight() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.quad_to(50.0, 100.0, 100.0, 0.0);
        let loose = p.bounds().unwrap();
        assert_eq!(loose, RectD::new(0.0, 0.0, 100.0, 100.0));
        let tight = p.compute_tight_bounds().unwrap();
        assert!((tight.y2 - 50.0).abs() < EPS);
        assert_eq!(tight.x1, 0.0);
        assert_eq!(tight.x2, 100.0);
    }

    #[test]
    fn test_flatten_only_lines() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.cubic_to(0.0, 100.0, 100.0, 100.0, 100.0, 0.0);
        p.close();
        let f = p.flatten(0.25);
        assert!(f
            .verbs()
            .iter()
            .all(|v| matches!(v, Verb::Move | Verb::Line | Verb::Close)));
        assert!(f.len() > 4);
        assert_eq!(f.last_verb(), Some(Verb::Close));
        assert_eq!(f.flatten(0.25), f);
    }

    #[test]
    fn test_transform() {
        let mut p = triangle();
        p.transform(&TransAffine::new_translation(5.0, -5.0));
        assert_eq!(p.points()[0], vec2(5.0, -5.0));
        // Drawing after close reopens at the moved start.
        p.line_to(0.0, 0.0);
        assert_eq!(p.points()[3], vec2(5.0, -5.0));
        let scaled = triangle().transformed(&TransAffine::new_scaling(2.0, 2.0));
        assert_eq!(scaled.bounds().unwrap(), RectD::new(0.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn test_add_path_append_and_extend() {
        let mut other = Path::new();
        other.move_to(20.0, 0.0);
        other.line_to(30.0, 0.0);

        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.add_path(&other, AddPathMode::Append);
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line, Verb::Move, Verb::Line]);

        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.add_path(&other, AddPathMode::Extend);
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line, Verb::Line, Verb::Line]);
        assert_eq!(p.points()[2], vec2(20.0, 0.0));

        // Coincident start adds no connecting line.
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(20.0, 0.0);
        p.add_path(&other, AddPathMode::Extend);
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line, Verb::Line]);
    }

    #[test]
    fn test_add_path_transformed() {
        let mut p = Path::new();
        let m = TransAffine::new_scaling(3.0, 3.0);
        p.add_path_transformed(&triangle(), &m, AddPathMode::Append);
        assert_eq!(p.bounds().unwrap(), RectD::new(0.0, 0.0, 30.0, 30.0));
        p.line_to(1.0, 1.0);
        assert_eq!(p.points()[3], vec2(0.0, 0.0));
    }

    #[test]
    fn test_add_reverse_path() {
        let mut inner = Path::new();
        inner.move_to(0.0, 5.0);
        inner.line_to(50.0, 5.0);
        inner.quad_to(75.0, 5.0, 100.0, 5.0);

        let mut outer = Path::new();
        outer.move_to(0.0, -5.0);
        outer.line_to(100.0, -5.0);
        outer.line_to(100.0, 5.0);
        outer.add_reverse_path(&inner);
        assert_eq!(
            outer.verbs(),
            &[Verb::Move, Verb::Line, Verb::Line, Verb::Quad, Verb::Line]
        );
        assert_eq!(outer.points()[3], vec2(75.0, 5.0));
        assert_eq!(outer.points()[4], vec2(50.0, 5.0));
        assert_eq!(outer.last_point(), Some(vec2(0.0, 5.0)));
    }

    #[test]
    fn test_reversed() {
        let r = triangle().reversed();
        assert_eq!(r.verbs(), &[Verb::Move, Verb::Line, Verb::Line, Verb::Close]);
        assert_eq!(
            r.points(),
            &[vec2(10.0, 10.0), vec2(10.0, 0.0), vec2(0.0, 0.0)]
        );

        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.cubic_to(1.0, 0.0, 2.0, 1.0, 3.0, 3.0);
        p.move_to(10.0, 10.0);
        p.line_to(20.0, 10.0);
        let r = p.reversed();
        assert_eq!(r.verbs(), &[Verb::Move, Verb::Line, Verb::Move, Verb::Cubic]);
        assert_eq!(
            r.points(),
            &[
                vec2(20.0, 10.0),
                vec2(10.0, 10.0),
                vec2(3.0, 3.0),
                vec2(2.0, 1.0),
                vec2(1.0, 0.0),
                vec2(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_is_zero_length_since_point() {
        let mut p = Path::new();
        p.move_to(1.0, 1.0);
        assert!(p.is_zero_length_since_point(0));
        p.line_to(1.0, 1.0);
        assert!(p.is_zero_length_since_point(0));
        p.line_to(2.0, 1.0);
        assert!(!p.is_zero_length_since_point(0));
        assert!(p.is_zero_length_since_point(2));
        assert!(p.is_zero_length_since_point(10));
    }

    #[test]
    fn test_to_polygons() {
        let mut p = triangle();
        p.move_to(50.0, 50.0);
        p.line_to(60.0, 50.0);
        let polys = p.to_polygons(0.25, true);
        assert_eq!(polys.len(), 2);
        assert_eq!(polys[0].len(), 4);
        assert_eq!(polys[0][3], vec2(0.0, 0.0));
        assert_eq!(polys[1], vec![vec2(50.0, 50.0), vec2(60.0, 50.0)]);
        assert_eq!(p.to_polygons(0.25, false)[0].len(), 3);
    }

    #[test]
    fn test_set_last_point() {
        let mut p = Path::new();
        p.set_last_point(vec2(2.0, 3.0));
        assert_eq!(p.verbs(), &[Verb::Move]);
        p.line_to(5.0, 5.0);
        p.set_last_point(vec2(6.0, 6.0));
        assert_eq!(p.last_point(), Some(vec2(6.0, 6.0)));
    }

    #[test]
    fn test_add_polygon() {
        let mut p = Path::new();
        p.add_polygon(&[vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(1.0, 1.0)], true);
        assert_eq!(p, triangle().transformed(&TransAffine::new_scaling(0.1, 0.1)));
        p.add_polygon(&[], true);
        assert_eq!(p.len(), 4);
    }
}
