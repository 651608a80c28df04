//! 2D point / vector value type.
//!
//! `Vector2` is `Copy` and every operation returns a new value; there is no
//! pooling or shared scratch state. The same type is used for points and
//! for directions, the way the rest of the crate mixes them freely.
//!
//! Rotation helpers follow the y-down device convention: `rotate_cw` turns
//! `(1, 0)` into `(0, 1)`.

use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::basics::SCALAR_NEARLY_ZERO;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

/// Shorthand constructor.
#[inline]
pub const fn vec2(x: f64, y: f64) -> Vector2 {
    Vector2 { x, y }
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians.
    #[inline]
    pub fn from_angle(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c, s)
    }

    #[inline]
    pub fn dot(self, o: Vector2) -> f64 {
        self.x * o.x + self.y * o.y
    }

    /// Z component of the 3D cross product.
    #[inline]
    pub fn cross(self, o: Vector2) -> f64 {
        self.x * o.y - self.y * o.x
    }

    #[inline]
    pub fn length_sq(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn distance(self, o: Vector2) -> f64 {
        (o - self).length()
    }

    #[inline]
    pub fn distance_sq(self, o: Vector2) -> f64 {
        (o - self).length_sq()
    }

    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Rescale to `length`. Returns `None` when the direction is undefined
    /// (zero vector) or the result overflows.
    pub fn with_length(self, length: f64) -> Option<Vector2> {
        let mag = self.length();
        let scale = length / mag;
        let r = Vector2::new(self.x * scale, self.y * scale);
        if !r.is_finite() || r.is_zero() {
            return None;
        }
        Some(r)
    }

    #[inline]
    pub fn normalize(self) -> Option<Vector2> {
        self.with_length(1.0)
    }

    /// `true` if both components are within `tolerance` of `o`.
    #[inline]
    pub fn equals_eps(self, o: Vector2, tolerance: f64) -> bool {
        (self.x - o.x).abs() <= tolerance && (self.y - o.y).abs() <= tolerance
    }

    /// `true` when the two points are closer than `SCALAR_NEARLY_ZERO`
    /// on both axes.
    #[inline]
    pub fn nearly_equals(self, o: Vector2) -> bool {
        self.equals_eps(o, SCALAR_NEARLY_ZERO)
    }

    #[inline]
    pub fn rotate_cw(self) -> Vector2 {
        Vector2::new(-self.y, self.x)
    }

    #[inline]
    pub fn rotate_ccw(self) -> Vector2 {
        Vector2::new(self.y, -self.x)
    }

    #[inline]
    pub fn lerp(self, o: Vector2, t: f64) -> Vector2 {
        Vector2::new(self.x + (o.x - self.x) * t, self.y + (o.y - self.y) * t)
    }

    #[inline]
    pub fn midpoint(self, o: Vector2) -> Vector2 {
        Vector2::new((self.x + o.x) * 0.5, (self.y + o.y) * 0.5)
    }

    #[inline]
    pub fn min(self, o: Vector2) -> Vector2 {
        Vector2::new(self.x.min(o.x), self.y.min(o.y))
    }

    #[inline]
    pub fn max(self, o: Vector2) -> Vector2 {
        Vector2::new(self.x.max(o.x), self.y.max(o.y))
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    #[inline]
    fn add(self, o: Vector2) -> Vector2 {
        Vector2::new(self.x + o.x, self.y + o.y)
    }
}

impl AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, o: Vector2) {
        self.x += o.x;
        self.y += o.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    #[inline]
    fn sub(self, o: Vector2) -> Vector2 {
        Vector2::new(self.x - o.x, self.y - o.y)
    }
}

impl SubAssign for Vector2 {
    #[inline]
    fn sub_assign(&mut self, o: Vector2) {
        self.x -= o.x;
        self.y -= o.y;
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;
    #[inline]
    fn mul(self, s: f64) -> Vector2 {
        Vector2::new(self.x * s, self.y * s)
    }
}

impl MulAssign<f64> for Vector2 {
    #[inline]
    fn mul_assign(&mut self, s: f64) {
        self.x *= s;
        self.y *= s;
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;
    #[inline]
    fn div(self, s: f64) -> Vector2 {
        Vector2::new(self.x / s, self.y / s)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    #[inline]
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vector2 {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Vector2::new(x, y)
    }
}

impl From<Vector2> for (f64, f64) {
    #[inline]
    fn from(v: Vector2) -> Self {
        (v.x, v.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_arithmetic() {
        let a = vec2(1.0, 2.0);
        let b = vec2(3.0, -1.0);
        assert_eq!(a + b, vec2(4.0, 1.0));
        assert_eq!(a - b, vec2(-2.0, 3.0));
        assert_eq!(a * 2.0, vec2(2.0, 4.0));
        assert_eq!(-a, vec2(-1.0, -2.0));
        assert_eq!(a.dot(b), 1.0);
        assert_eq!(a.cross(b), -7.0);
    }

    #[test]
    fn test_normalize() {
        let n = vec2(3.0, 4.0).normalize().unwrap();
        assert!((n.x - 0.6).abs() < EPS);
        assert!((n.y - 0.8).abs() < EPS);
        assert!(Vector2::ZERO.normalize().is_none());
        assert!(vec2(f64::NAN, 1.0).normalize().is_none());
    }

    #[test]
    fn test_with_length() {
        let v = vec2(0.0, -2.0).with_length(5.0).unwrap();
        assert!((v.y + 5.0).abs() < EPS);
        assert_eq!(v.x, 0.0);
    }

    #[test]
    fn test_rotation_is_y_down() {
        assert_eq!(vec2(1.0, 0.0).rotate_cw(), vec2(-0.0, 1.0));
        assert_eq!(vec2(1.0, 0.0).rotate_ccw(), vec2(0.0, -1.0));
        let v = vec2(2.0, 5.0);
        assert_eq!(v.rotate_cw().rotate_ccw(), v);
    }

    #[test]
    fn test_lerp_and_distance() {
        let a = vec2(0.0, 0.0);
        let b = vec2(10.0, 0.0);
        assert_eq!(a.lerp(b, 0.25), vec2(2.5, 0.0));
        assert_eq!(a.distance(b), 10.0);
        assert!(a.nearly_equals(vec2(1e-5, -1e-5)));
    }
}
