//! Bounding rectangle calculation.
//!
//! Loose bounds take every control point; tight bounds add the interior
//! extrema of quadratic and cubic segments, since control points can lie
//! well outside the curve.

use crate::basics::RectD;
use crate::curves::{eval_cubic, eval_quad};
use crate::math::{find_cubic_extrema, find_quad_extrema};
use crate::vector2::Vector2;

/// Incrementally grown bounding box. Empty until the first point.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsAccumulator {
    rect: Option<RectD>,
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self { rect: None }
    }

    pub fn add_point(&mut self, p: Vector2) {
        match &mut self.rect {
            Some(r) => r.add_point(p.x, p.y),
            None => self.rect = Some(RectD::new(p.x, p.y, p.x, p.y)),
        }
    }

    pub fn add_points(&mut self, pts: &[Vector2]) {
        for &p in pts {
            self.add_point(p);
        }
    }

    /// Add the end point and interior extrema of a quadratic. The start
    /// point is assumed to be already included.
    pub fn add_quad_extrema(&mut self, src: &[Vector2; 3]) {
        self.add_point(src[2]);
        let tx = find_quad_extrema(src[0].x, src[1].x, src[2].x);
        let ty = find_quad_extrema(src[0].y, src[1].y, src[2].y);
        for t in tx.into_iter().chain(ty) {
            self.add_point(eval_quad(src, t));
        }
    }

    /// Add the end point and interior extrema of a cubic. The start point
    /// is assumed to be already included.
    pub fn add_cubic_extrema(&mut self, src: &[Vector2; 4]) {
        self.add_point(src[3]);
        let tx = find_cubic_extrema(src[0].x, src[1].x, src[2].x, src[3].x);
        let ty = find_cubic_extrema(src[0].y, src[1].y, src[2].y, src[3].y);
        for t in tx.into_iter().chain(ty) {
            self.add_point(eval_cubic(src, t));
        }
    }

    pub fn rect(&self) -> Option<RectD> {
        self.rect
    }
}

/// Bounding box of a point set, or `None` when it is empty.
pub fn bounding_rect_points(pts: &[Vector2]) -> Option<RectD> {
    let mut acc = BoundsAccumulator::new();
    acc.add_points(pts);
    acc.rect()
}
