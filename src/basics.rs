//! Foundation types, constants, and numeric helpers.
//!
//! Everything else in the crate depends on these: rounding, tolerance
//! comparisons, fixed-point scales for the rasterizer, the filling rule,
//! and the axis-aligned rectangle used for bounds and clipping.

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round a double to the nearest integer (round half away from zero).
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

// ============================================================================
// Tolerances
// ============================================================================

/// Distances below this are treated as zero by the path and stroke code.
pub const SCALAR_NEARLY_ZERO: f64 = 1.0 / 4096.0;

/// `cos(45°)`, the conic weight of a quarter circle.
pub const SCALAR_ROOT2_OVER2: f64 = 0.707_106_781;

/// Default tolerance (in device pixels) for flattening and conic splitting.
pub const DEFAULT_FLATTEN_TOLERANCE: f64 = 0.25;

#[inline]
pub fn is_nearly_zero(v: f64) -> bool {
    v.abs() <= SCALAR_NEARLY_ZERO
}

/// Compare two doubles with an absolute epsilon.
#[inline]
pub fn is_equal_eps(v1: f64, v2: f64, epsilon: f64) -> bool {
    (v1 - v2).abs() <= epsilon
}

// ============================================================================
// Fixed point
// ============================================================================

/// Fractional bits of the 26.6 fixed-point input to the rasterizer.
pub const INPUT_SUBPIXEL_SHIFT: u32 = 6;
pub const INPUT_SUBPIXEL_SCALE: i32 = 1 << INPUT_SUBPIXEL_SHIFT;

/// Fractional bits used by the cell accumulator.
pub const PIXEL_BITS: u32 = 8;

/// Maximum 8-bit coverage value.
pub const MAX_ALPHA: u8 = 255;

/// Convert a device-space coordinate to 26.6 fixed point.
#[inline]
pub fn to_fixed_26_6(v: f64) -> i32 {
    iround(v * INPUT_SUBPIXEL_SCALE as f64)
}

// ============================================================================
// Filling rule
// ============================================================================

/// Winding rule used when converting accumulated area to coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum FillingRule {
    #[default]
    NonZero,
    EvenOdd,
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by two corner points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Normalize so that x1 <= x2 and y1 <= y2, swapping if needed.
    pub fn normalize(&mut self) -> &Self {
        if self.x1 > self.x2 {
            core::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            core::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }
}

impl Rect<f64> {
    /// Grow the rectangle to include `(x, y)`.
    pub fn add_point(&mut self, x: f64, y: f64) {
        if x < self.x1 {
            self.x1 = x;
        }
        if y < self.y1 {
            self.y1 = y;
        }
        if x > self.x2 {
            self.x2 = x;
        }
        if y > self.y2 {
            self.y2 = y;
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn center_x(&self) -> f64 {
        (self.x1 + self.x2) * 0.5
    }

    pub fn center_y(&self) -> f64 {
        (self.y1 + self.y2) * 0.5
    }
}

/// Rectangle with `i32` coordinates.
pub type RectI = Rect<i32>;
/// Rectangle with `f64` coordinates.
pub type RectD = Rect<f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iround() {
        assert_eq!(iround(0.5), 1);
        assert_eq!(iround(-0.5), -1);
        assert_eq!(iround(1.49), 1);
        assert_eq!(iround(-1.51), -2);
    }

    #[test]
    fn test_to_fixed_26_6() {
        assert_eq!(to_fixed_26_6(1.0), 64);
        assert_eq!(to_fixed_26_6(0.5), 32);
        assert_eq!(to_fixed_26_6(-2.25), -144);
    }

    #[test]
    fn test_rect_normalize() {
        let mut r = RectD::new(10.0, 20.0, 0.0, 5.0);
        r.normalize();
        assert_eq!(r, RectD::new(0.0, 5.0, 10.0, 20.0));
        let mut r = RectI::new(3, -1, -2, 4);
        r.normalize();
        assert_eq!(r, RectI::new(-2, -1, 3, 4));
    }

    #[test]
    fn test_rect_add_point() {
        let mut r = RectD::new(0.0, 0.0, 0.0, 0.0);
        r.add_point(-3.0, 4.0);
        r.add_point(2.0, -1.0);
        assert_eq!(r, RectD::new(-3.0, -1.0, 2.0, 4.0));
        assert_eq!(r.width(), 5.0);
        assert_eq!(r.height(), 5.0);
    }

    #[test]
    fn test_nearly_zero() {
        assert!(is_nearly_zero(1e-5));
        assert!(!is_nearly_zero(1e-3));
        assert!(is_equal_eps(1.0, 1.0 + 1e-12, 1e-9));
    }
}
