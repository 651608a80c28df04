//! Stroke math: line caps, line joins and the miter limit.
//!
//! The stroker keeps two offset outlines per contour, *outer* and
//! *inner*. Joins append the corner geometry to whichever outline is on
//! the outside of the turn; caps close the gap between the two outlines
//! at the ends of an open contour.

use crate::basics::SCALAR_ROOT2_OVER2;
use crate::conic::{build_unit_arc, RotationDirection};
use crate::path_storage::Path;
use crate::trans_affine::TransAffine;
use crate::vector2::{vec2, Vector2};

// ============================================================================
// Enums
// ============================================================================

/// Line cap style for open contour ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum LineCap {
    /// No extension past the end point.
    #[default]
    Butt,
    /// Half circle around the end point.
    Round,
    /// Half square around the end point.
    Square,
}

/// Line join style at corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum LineJoin {
    /// Sharp corner up to the miter limit, bevel beyond it.
    #[default]
    Miter,
    /// Sharp corner up to the miter limit, clipped at the limit beyond it.
    MiterClip,
    /// Circular arc around the corner.
    Round,
    /// Straight edge between the two offset points.
    Bevel,
}

// ============================================================================
// StrokeStyle
// ============================================================================

/// Stroke configuration: width, miter limit, cap and join.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokeStyle {
    width: f64,
    miter_limit: f64,
    cap: LineCap,
    join: LineJoin,
}

impl StrokeStyle {
    pub fn new() -> Self {
        Self {
            width: 1.0,
            miter_limit: 4.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_miter_limit(mut self, miter_limit: f64) -> Self {
        self.miter_limit = miter_limit;
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_miter_limit(&mut self, miter_limit: f64) {
        self.miter_limit = miter_limit;
    }
    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    /// Set the miter limit from the smallest corner angle (radians) that
    /// still gets a sharp miter.
    pub fn set_miter_limit_theta(&mut self, theta: f64) {
        self.miter_limit = 1.0 / (theta * 0.5).sin();
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.cap = cap;
    }
    pub fn line_cap(&self) -> LineCap {
        self.cap
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.join = join;
    }
    pub fn line_join(&self) -> LineJoin {
        self.join
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Angle classification
// ============================================================================

/// Corner classification from the dot product of two unit normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AngleType {
    Nearly180,
    Sharp,
    Shallow,
    NearlyLine,
}

pub(crate) fn dot_to_angle_type(dot: f64) -> AngleType {
    if dot >= 0.0 {
        if (1.0 - dot).abs() <= 1e-6 {
            AngleType::NearlyLine
        } else {
            AngleType::Shallow
        }
    } else if (1.0 + dot).abs() <= 1e-6 {
        AngleType::Nearly180
    } else {
        AngleType::Sharp
    }
}

/// `true` if turning from `before` to `after` goes clockwise on screen.
#[inline]
pub(crate) fn is_clockwise(before: Vector2, after: Vector2) -> bool {
    before.x * after.y > before.y * after.x
}

// ============================================================================
// Outline pair
// ============================================================================

/// The two outlines a join writes to. `outer` is always the outside of
/// the current turn; joins swap the two for turns the other way.
pub(crate) struct SwappableBuilders<'a> {
    pub inner: &'a mut Path,
    pub outer: &'a mut Path,
}

impl SwappableBuilders<'_> {
    fn swap(&mut self) {
        core::mem::swap(&mut self.inner, &mut self.outer);
    }
}

/// Route the inner outline through the pivot so a radius larger than the
/// segments does not leave a diagonal showing through.
fn handle_inner_join(pivot: Vector2, after: Vector2, inner: &mut Path) {
    inner.line_to(pivot.x, pivot.y);
    inner.line_to(pivot.x - after.x, pivot.y - after.y);
}

// ============================================================================
// Caps
// ============================================================================

impl LineCap {
    /// Append the cap at `pivot` to `path`, ending at `stop`.
    ///
    /// `normal` points from the pivot to the outline being capped and has
    /// the stroke radius as length. `other_is_line` says the outline
    /// arriving at the cap is a straight line, so its last point may be
    /// moved instead of adding a new one.
    pub(crate) fn apply(
        self,
        pivot: Vector2,
        normal: Vector2,
        stop: Vector2,
        other_is_line: bool,
        path: &mut Path,
    ) {
        match self {
            LineCap::Butt => path.line_to(stop.x, stop.y),
            LineCap::Round => {
                let parallel = normal.rotate_cw();
                let center = pivot + parallel;
                let c1 = center + normal;
                let c2 = center - normal;
                path.conic_to(c1.x, c1.y, center.x, center.y, SCALAR_ROOT2_OVER2);
                path.conic_to(c2.x, c2.y, stop.x, stop.y, SCALAR_ROOT2_OVER2);
            }
            LineCap::Square => {
                let parallel = normal.rotate_cw();
                let a = pivot + normal + parallel;
                let b = pivot - normal + parallel;
                if other_is_line {
                    path.set_last_point(a);
                    path.line_to(b.x, b.y);
                } else {
                    path.line_to(a.x, a.y);
                    path.line_to(b.x, b.y);
                    path.line_to(stop.x, stop.y);
                }
            }
        }
    }
}

// ============================================================================
// Joins
// ============================================================================

impl LineJoin {
    /// Append the corner at `pivot` between two segments with unit normals
    /// `before` and `after`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn apply(
        self,
        before: Vector2,
        pivot: Vector2,
        after: Vector2,
        radius: f64,
        inv_miter_limit: f64,
        prev_is_line: bool,
        curr_is_line: bool,
        builders: SwappableBuilders<'_>,
    ) {
        match self {
            LineJoin::Bevel => bevel_join(before, pivot, after, radius, builders),
            LineJoin::Round => round_join(before, pivot, after, radius, builders),
            LineJoin::Miter | LineJoin::MiterClip => miter_join(
                before,
                pivot,
                after,
                radius,
                inv_miter_limit,
                self == LineJoin::MiterClip,
                prev_is_line,
                curr_is_line,
                builders,
            ),
        }
    }
}

fn bevel_join(
    before: Vector2,
    pivot: Vector2,
    after: Vector2,
    radius: f64,
    mut builders: SwappableBuilders<'_>,
) {
    let mut after = after * radius;
    if !is_clockwise(before, after) {
        builders.swap();
        after = -after;
    }
    builders.outer.line_to(pivot.x + after.x, pivot.y + after.y);
    handle_inner_join(pivot, after, builders.inner);
}

fn round_join(
    before: Vector2,
    pivot: Vector2,
    after: Vector2,
    radius: f64,
    mut builders: SwappableBuilders<'_>,
) {
    if dot_to_angle_type(before.dot(after)) == AngleType::NearlyLine {
        return;
    }

    let (mut before, mut after) = (before, after);
    let mut dir = RotationDirection::Clockwise;
    if !is_clockwise(before, after) {
        builders.swap();
        before = -before;
        after = -after;
        dir = RotationDirection::CounterClockwise;
    }

    let m = TransAffine::new_scale_translate(radius, radius, pivot.x, pivot.y);
    for c in build_unit_arc(before, after, dir, Some(&m)) {
        builders
            .outer
            .conic_to(c.points[1].x, c.points[1].y, c.points[2].x, c.points[2].y, c.weight);
    }
    handle_inner_join(pivot, after * radius, builders.inner);
}

#[allow(clippy::too_many_arguments)]
fn miter_join(
    before: Vector2,
    pivot: Vector2,
    after: Vector2,
    radius: f64,
    inv_miter_limit: f64,
    miter_clip: bool,
    prev_is_line: bool,
    curr_is_line: bool,
    mut builders: SwappableBuilders<'_>,
) {
    let dot = before.dot(after);
    let angle_type = dot_to_angle_type(dot);
    if angle_type == AngleType::NearlyLine {
        return;
    }

    let (mut before, mut after) = (before, after);

    if angle_type == AngleType::Nearly180 {
        let mid = (after - before) * (radius / 2.0);
        let corner = Corner { pivot, radius, prev_is_line, curr_is_line: false };
        corner.blunt_or_clipped(builders, before, mid, after, inv_miter_limit, miter_clip);
        return;
    }

    let ccw = !is_clockwise(before, after);
    if ccw {
        builders.swap();
        before = -before;
        after = -after;
    }

    // Upright right angle, as when stroking rectangles: the miter point is
    // the sum of the offsets.
    if dot == 0.0 && inv_miter_limit <= SCALAR_ROOT2_OVER2 {
        let mid = (before + after) * radius;
        Corner { pivot, radius, prev_is_line, curr_is_line }.miter(builders, mid, after);
        return;
    }

    let mut mid = if angle_type == AngleType::Sharp {
        let m = vec2(after.y - before.y, before.x - after.x);
        if ccw {
            -m
        } else {
            m
        }
    } else {
        before + after
    };

    // Normals rather than tangents, hence 1 + dot.
    let sin_half_angle = ((1.0 + dot) * 0.5).sqrt();
    if sin_half_angle < inv_miter_limit {
        let corner = Corner { pivot, radius, prev_is_line, curr_is_line: false };
        corner.blunt_or_clipped(builders, before, mid, after, inv_miter_limit, miter_clip);
        return;
    }

    mid = mid.with_length(radius / sin_half_angle).unwrap_or(mid);
    Corner { pivot, radius, prev_is_line, curr_is_line }.miter(builders, mid, after);
}

/// Shared state of the two miter outcomes.
struct Corner {
    pivot: Vector2,
    radius: f64,
    prev_is_line: bool,
    curr_is_line: bool,
}

impl Corner {
    /// Place `p` on the outer outline, replacing the end of a preceding
    /// line instead of adding a point when possible.
    fn extend_outer(&self, outer: &mut Path, p: Vector2) {
        if self.prev_is_line {
            outer.set_last_point(p);
        } else {
            outer.line_to(p.x, p.y);
        }
    }

    fn miter(&self, builders: SwappableBuilders<'_>, mid: Vector2, after: Vector2) {
        let after = after * self.radius;
        self.extend_outer(builders.outer, self.pivot + mid);
        if !self.curr_is_line {
            builders.outer.line_to(self.pivot.x + after.x, self.pivot.y + after.y);
        }
        handle_inner_join(self.pivot, after, builders.inner);
    }

    fn blunt_or_clipped(
        &self,
        builders: SwappableBuilders<'_>,
        before: Vector2,
        mid: Vector2,
        after: Vector2,
        inv_miter_limit: f64,
        miter_clip: bool,
    ) {
        let after = after * self.radius;

        if miter_clip {
            let mid = mid.normalize().unwrap_or(mid);
            let cos_beta = before.dot(mid);
            let sin_beta = before.cross(mid);
            let x = if sin_beta.abs() <= crate::basics::SCALAR_NEARLY_ZERO {
                1.0 / inv_miter_limit
            } else {
                (1.0 / inv_miter_limit - cos_beta) / sin_beta
            };

            let before = before * self.radius;
            let c1 = self.pivot + before + before.rotate_cw() * x;
            let c2 = self.pivot + after + after.rotate_ccw() * x;
            self.extend_outer(builders.outer, c1);
            builders.outer.line_to(c2.x, c2.y);
        }

        if !self.curr_is_line {
            builders.outer.line_to(self.pivot.x + after.x, self.pivot.y + after.y);
        }
        handle_inner_join(self.pivot, after, builders.inner);
    }
}
