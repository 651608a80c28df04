//! Closed shape contours: rectangles, ovals, circles, rounded rectangles.

use crate::basics::{RectD, SCALAR_ROOT2_OVER2};
use crate::path_storage::Path;
use crate::vector2::{vec2, Vector2};

/// Winding direction of an added shape, as seen on screen (y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathDirection {
    #[default]
    Cw,
    Ccw,
}

/// Walks four corner points of a shape starting at an index, forwards
/// for clockwise and backwards for counter-clockwise.
struct CornerIter {
    pts: [Vector2; 4],
    index: usize,
    advance: usize,
}

impl CornerIter {
    fn new(pts: [Vector2; 4], dir: PathDirection, start_index: usize) -> Self {
        Self {
            pts,
            index: start_index % 4,
            advance: match dir {
                PathDirection::Cw => 1,
                PathDirection::Ccw => 3,
            },
        }
    }

    /// Left-top, right-top, right-bottom, left-bottom.
    fn rect(r: &RectD, dir: PathDirection, start_index: usize) -> Self {
        Self::new(
            [vec2(r.x1, r.y1), vec2(r.x2, r.y1), vec2(r.x2, r.y2), vec2(r.x1, r.y2)],
            dir,
            start_index,
        )
    }

    /// Top, right, bottom, left side midpoints.
    fn oval(r: &RectD, dir: PathDirection, start_index: usize) -> Self {
        let (cx, cy) = (r.center_x(), r.center_y());
        Self::new(
            [vec2(cx, r.y1), vec2(r.x2, cy), vec2(cx, r.y2), vec2(r.x1, cy)],
            dir,
            start_index,
        )
    }

    fn current(&self) -> Vector2 {
        self.pts[self.index]
    }

    fn next(&mut self) -> Vector2 {
        self.index = (self.index + self.advance) % 4;
        self.pts[self.index]
    }
}

impl Path {
    /// Closed rectangle starting at corner `start_index` (0 is left-top,
    /// then clockwise).
    pub fn add_rect(&mut self, rect: &RectD, dir: PathDirection, start_index: usize) {
        let mut it = CornerIter::rect(rect, dir, start_index);
        let p = it.current();
        self.move_to(p.x, p.y);
        for _ in 0..3 {
            let p = it.next();
            self.line_to(p.x, p.y);
        }
        self.close();
    }

    /// Closed ellipse inscribed in `oval`, as four quarter conics.
    /// `start_index` picks the starting side midpoint (0 is top, then
    /// clockwise).
    pub fn add_oval(&mut self, oval: &RectD, dir: PathDirection, start_index: usize) {
        let mut on_curve = CornerIter::oval(oval, dir, start_index);
        let corner_start = match dir {
            PathDirection::Cw => start_index,
            PathDirection::Ccw => start_index + 1,
        };
        let mut ctrl = CornerIter::rect(oval, dir, corner_start);

        let p = on_curve.current();
        self.move_to(p.x, p.y);
        for _ in 0..4 {
            let c = ctrl.next();
            let p = on_curve.next();
            self.conic_to(c.x, c.y, p.x, p.y, SCALAR_ROOT2_OVER2);
        }
        self.close();
    }

    /// Closed circle starting at its rightmost point. Negative radii are
    /// ignored.
    pub fn add_circle(&mut self, cx: f64, cy: f64, r: f64, dir: PathDirection) {
        if r >= 0.0 {
            self.add_oval(&RectD::new(cx - r, cy - r, cx + r, cy + r), dir, 1);
        }
    }

    /// Closed rectangle with rounded corners, built from tangent arcs.
    ///
    /// `radii` are top-left, top-right, bottom-right, bottom-left. They
    /// are scaled down together when two on one side would overlap.
    pub fn add_round_rect(&mut self, rect: &RectD, radii: [f64; 4]) {
        let mut r = *rect;
        r.normalize();
        let (x, y, w, h) = (r.x1, r.y1, r.width(), r.height());
        let [mut tl, mut tr, mut br, mut bl] =
            radii.map(|v| if v.is_finite() { v.max(0.0) } else { 0.0 });

        let mut scale: f64 = 1.0;
        for (side, a, b) in [(w, tl, tr), (h, tr, br), (w, br, bl), (h, bl, tl)] {
            if a + b > side && a + b > 0.0 {
                scale = scale.min(side / (a + b));
            }
        }
        tl *= scale;
        tr *= scale;
        br *= scale;
        bl *= scale;

        self.move_to(x + tl, y);
        self.line_to(x + w - tr, y);
        self.arc_to(x + w, y, x + w, y + tr, tr);
        self.line_to(x + w, y + h - br);
        self.arc_to(x + w, y + h, x + w - br, y + h, br);
        self.line_to(x + bl, y + h);
        self.arc_to(x, y + h, x, y + h - bl, bl);
        self.line_to(x, y + tl);
        self.arc_to(x, y, x + tl, y, tl);
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_storage::Verb;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_add_rect_cw() {
        let mut p = Path::new();
        p.add_rect(&RectD::new(0.0, 0.0, 10.0, 20.0), PathDirection::Cw, 0);
        assert_eq!(p.verbs(), &[Verb::Move, Verb::Line, Verb::Line, Verb::Line, Verb::Close]);
        assert_eq!(
            p.points(),
            &[vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(10.0, 20.0), vec2(0.0, 20.0)]
        );
    }

    #[test]
    fn test_add_rect_ccw_start_index() {
        let mut p = Path::new();
        p.add_rect(&RectD::new(0.0, 0.0, 10.0, 20.0), PathDirection::Ccw, 2);
        assert_eq!(
            p.points(),
            &[vec2(10.0, 20.0), vec2(10.0, 0.0), vec2(0.0, 0.0), vec2(0.0, 20.0)]
        );
    }

    #[test]
    fn test_add_oval() {
        let mut p = Path::new();
        p.add_oval(&RectD::new(0.0, 0.0, 100.0, 50.0), PathDirection::Cw, 1);
        assert_eq!(p.points()[0], vec2(100.0, 25.0));
        assert_eq!(p.last_verb(), Some(Verb::Close));
        assert_eq!(p.contour_count(), 1);
        let b = p.compute_tight_bounds().unwrap();
        assert!(b.x1.abs() < EPS && (b.x2 - 100.0).abs() < EPS);
        assert!(b.y1.abs() < EPS && (b.y2 - 50.0).abs() < EPS);
        // Clockwise from the right goes down first.
        assert!(p.points()[2].y > 25.0);
    }

    #[test]
    fn test_add_oval_ccw() {
        let mut p = Path::new();
        p.add_oval(&RectD::new(0.0, 0.0, 100.0, 50.0), PathDirection::Ccw, 1);
        assert_eq!(p.points()[0], vec2(100.0, 25.0));
        assert!(p.points()[2].y < 25.0);
    }

    #[test]
    fn test_add_circle() {
        let mut p = Path::new();
        p.add_circle(50.0, 50.0, 10.0, PathDirection::Cw);
        for q in p.flatten(0.01).points() {
            assert!((q.distance(vec2(50.0, 50.0)) - 10.0).abs() < 0.3);
        }

        let mut p = Path::new();
        p.add_circle(0.0, 0.0, -1.0, PathDirection::Cw);
        assert!(p.is_empty());
    }

    #[test]
    fn test_add_round_rect() {
        let mut p = Path::new();
        p.add_round_rect(&RectD::new(0.0, 0.0, 100.0, 60.0), [10.0; 4]);
        assert_eq!(p.points()[0], vec2(10.0, 0.0));
        assert_eq!(p.last_verb(), Some(Verb::Close));
        let b = p.compute_tight_bounds().unwrap();
        assert!(b.x1.abs() < EPS && (b.x2 - 100.0).abs() < EPS);
        assert!(b.y1.abs() < EPS && (b.y2 - 60.0).abs() < EPS);
        // The corner itself is cut off.
        assert!(!p.flatten(0.1).points().iter().any(|q| q.equals_eps(vec2(100.0, 60.0), 1.0)));
    }

    #[test]
    fn test_add_round_rect_scales_radii() {
        let mut p = Path::new();
        p.add_round_rect(&RectD::new(0.0, 0.0, 40.0, 40.0), [30.0, 30.0, 30.0, 30.0]);
        // Radii shrink to 20 so the shape is a circle.
        for q in p.flatten(0.01).points() {
            assert!((q.distance(vec2(20.0, 20.0)) - 20.0).abs() < 0.3);
        }
    }
}
