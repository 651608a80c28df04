//! Affine transformation matrix.
//!
//! 2D affine transformations used by the path model (transforming paths,
//! placing unit arcs) and by the stroker, which derives its resolution
//! scale from the matrix that will later be applied to the outline.

use crate::basics::is_equal_eps;
use crate::vector2::Vector2;

/// Epsilon for affine matrix comparisons.
pub const AFFINE_EPSILON: f64 = 1e-14;

/// 2D affine transformation matrix.
///
/// Stores six components: `[sx, shy, shx, sy, tx, ty]` representing the
/// matrix:
///
/// ```text
///   | sx  shx tx |
///   | shy  sy ty |
///   |  0    0  1 |
/// ```
///
/// Transform: `x' = x*sx + y*shx + tx`, `y' = x*shy + y*sy + ty`.
///
/// `a.multiply(&b)` yields the transform that applies `a` first and
/// then `b`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct TransAffine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl TransAffine {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Identity matrix.
    pub const fn new() -> Self {
        Self {
            sx: 1.0,
            shy: 0.0,
            shx: 0.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub const fn new_custom(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    /// Rotation by `a` radians.
    pub fn new_rotation(a: f64) -> Self {
        let (sa, ca) = a.sin_cos();
        Self::new_sin_cos(sa, ca)
    }

    /// Rotation given the sine and cosine directly, with no trig call.
    pub const fn new_sin_cos(sin: f64, cos: f64) -> Self {
        Self::new_custom(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub const fn new_scaling(x: f64, y: f64) -> Self {
        Self::new_custom(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    pub const fn new_translation(x: f64, y: f64) -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Scale by `(rx, ry)`, then move the origin to `(cx, cy)`.
    pub const fn new_scale_translate(rx: f64, ry: f64, cx: f64, cy: f64) -> Self {
        Self::new_custom(rx, 0.0, 0.0, ry, cx, cy)
    }

    // ====================================================================
    // Operations (mutate self)
    // ====================================================================

    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.tx += x;
        self.ty += y;
        self
    }

    /// Rotate by angle `a` (radians), applied after the current transform.
    pub fn rotate(&mut self, a: f64) -> &mut Self {
        let r = Self::new_rotation(a);
        self.multiply(&r)
    }

    /// Scale applied before the current transform.
    pub fn pre_scale(&mut self, x: f64, y: f64) -> &mut Self {
        self.sx *= x;
        self.shy *= x;
        self.shx *= y;
        self.sy *= y;
        self
    }

    /// `self = self * m`: apply `self`, then `m`.
    pub fn multiply(&mut self, m: &TransAffine) -> &mut Self {
        let t0 = self.sx * m.sx + self.shy * m.shx;
        let t2 = self.shx * m.sx + self.sy * m.shx;
        let t4 = self.tx * m.sx + self.ty * m.shx + m.tx;
        self.shy = self.sx * m.shy + self.shy * m.sy;
        self.sy = self.shx * m.shy + self.sy * m.sy;
        self.ty = self.tx * m.shy + self.ty * m.sy + m.ty;
        self.sx = t0;
        self.shx = t2;
        self.tx = t4;
        self
    }

    /// `self = m * self`: apply `m`, then `self`.
    pub fn premultiply(&mut self, m: &TransAffine) -> &mut Self {
        let mut t = *m;
        t.multiply(self);
        *self = t;
        self
    }

    /// Inverse of the matrix, or `None` when it is singular.
    pub fn inverted(&self) -> Option<TransAffine> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let d = 1.0 / det;
        let sx = self.sy * d;
        let sy = self.sx * d;
        let shy = -self.shy * d;
        let shx = -self.shx * d;
        let tx = -self.tx * sx - self.ty * shx;
        let ty = -self.tx * shy - self.ty * sy;
        Some(Self::new_custom(sx, shy, shx, sy, tx, ty))
    }

    // ====================================================================
    // Transformations
    // ====================================================================

    /// Forward transform of a point.
    #[inline]
    pub fn transform(&self, p: Vector2) -> Vector2 {
        Vector2::new(
            p.x * self.sx + p.y * self.shx + self.tx,
            p.x * self.shy + p.y * self.sy + self.ty,
        )
    }

    /// Forward transform of a direction (no translation).
    #[inline]
    pub fn transform_vector(&self, v: Vector2) -> Vector2 {
        Vector2::new(v.x * self.sx + v.y * self.shx, v.x * self.shy + v.y * self.sy)
    }

    pub fn transform_points(&self, pts: &mut [Vector2]) {
        for p in pts.iter_mut() {
            *p = self.transform(*p);
        }
    }

    // ====================================================================
    // Auxiliary
    // ====================================================================

    /// Determinant of the 2x2 portion.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.shy * self.shx
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.is_equal(&Self::new(), epsilon)
    }

    pub fn is_equal(&self, m: &TransAffine, epsilon: f64) -> bool {
        is_equal_eps(self.sx, m.sx, epsilon)
            && is_equal_eps(self.shy, m.shy, epsilon)
            && is_equal_eps(self.shx, m.shx, epsilon)
            && is_equal_eps(self.sy, m.sy, epsilon)
            && is_equal_eps(self.tx, m.tx, epsilon)
            && is_equal_eps(self.ty, m.ty, epsilon)
    }

    pub fn is_finite(&self) -> bool {
        [self.sx, self.shy, self.shx, self.sy, self.tx, self.ty]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Lengths of the two row vectors `(sx, shx)` and `(shy, sy)`.
    pub fn scaling_abs(&self) -> (f64, f64) {
        (
            (self.sx * self.sx + self.shx * self.shx).sqrt(),
            (self.shy * self.shy + self.sy * self.sy).sqrt(),
        )
    }

    /// The larger row-vector length.
    pub fn max_scale(&self) -> f64 {
        let (a, b) = self.scaling_abs();
        a.max(b)
    }
}

impl Default for TransAffine {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TransAffine {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other, AFFINE_EPSILON)
    }
}

impl std::ops::Mul for TransAffine {
    type Output = TransAffine;
    fn mul(self, rhs: TransAffine) -> TransAffine {
        let mut result = self;
        result.multiply(&rhs);
        result
    }
}

impl std::ops::MulAssign for TransAffine {
    fn mul_assign(&mut self, rhs: TransAffine) {
        self.multiply(&rhs);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector2::vec2;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-10;

    fn close(a: Vector2, b: Vector2) -> bool {
        a.equals_eps(b, EPS)
    }

    #[test]
    fn test_identity() {
        let m = TransAffine::new();
        assert!(m.is_identity(AFFINE_EPSILON));
        assert_eq!(m.transform(vec2(3.0, -4.0)), vec2(3.0, -4.0));
    }

    #[test]
    fn test_rotation() {
        let m = TransAffine::new_rotation(PI / 2.0);
        assert!(close(m.transform(vec2(1.0, 0.0)), vec2(0.0, 1.0)));
    }

    #[test]
    fn test_multiply_order() {
        // Scale first, then translate.
        let m = TransAffine::new_scaling(2.0, 3.0) * TransAffine::new_translation(10.0, 20.0);
        assert!(close(m.transform(vec2(1.0, 1.0)), vec2(12.0, 23.0)));
        // Translate first, then scale.
        let m = TransAffine::new_translation(10.0, 20.0) * TransAffine::new_scaling(2.0, 3.0);
        assert!(close(m.transform(vec2(1.0, 1.0)), vec2(22.0, 63.0)));
    }

    #[test]
    fn test_premultiply() {
        let mut m = TransAffine::new_translation(5.0, 0.0);
        m.premultiply(&TransAffine::new_scaling(2.0, 2.0));
        assert!(close(m.transform(vec2(1.0, 1.0)), vec2(7.0, 2.0)));
    }

    #[test]
    fn test_pre_scale() {
        let mut m = TransAffine::new_rotation(PI / 2.0);
        m.pre_scale(1.0, -1.0);
        // (0, 1) flips to (0, -1) and then rotates to (1, 0).
        assert!(close(m.transform(vec2(0.0, 1.0)), vec2(1.0, 0.0)));
    }

    #[test]
    fn test_inverted() {
        let m = TransAffine::new_custom(2.0, 0.5, -1.0, 3.0, 7.0, -2.0);
        let inv = m.inverted().unwrap();
        let p = vec2(4.5, -8.25);
        assert!(close(inv.transform(m.transform(p)), p));
        assert!(TransAffine::new_scaling(0.0, 1.0).inverted().is_none());
    }

    #[test]
    fn test_transform_vector_ignores_translation() {
        let m = TransAffine::new_translation(100.0, 100.0);
        assert_eq!(m.transform_vector(vec2(1.0, 2.0)), vec2(1.0, 2.0));
    }

    #[test]
    fn test_max_scale() {
        assert_eq!(TransAffine::new().max_scale(), 1.0);
        assert!((TransAffine::new_scaling(2.0, 5.0).max_scale() - 5.0).abs() < EPS);
        let r = TransAffine::new_rotation(0.3) * TransAffine::new_scaling(3.0, 3.0);
        assert!((r.max_scale() - 3.0).abs() < EPS);
    }
}
