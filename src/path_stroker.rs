//! Path stroker.
//!
//! Turns a centerline path into a fillable outline. For each contour two
//! offset outlines are built at `±width/2`: *outer* and *inner*. Lines
//! are offset directly. Quadratics and cubics are approximated by offset
//! quadratics that are refined by subdivision until their midpoint lies
//! within `1/(4*res_scale)` of the true offset curve. Open contours are
//! finished with caps, closed contours with a final join, and in both
//! cases the inner outline is appended in reverse.

use arrayvec::ArrayVec;
use log::{debug, trace};

use crate::basics::{is_nearly_zero, SCALAR_NEARLY_ZERO};
use crate::curves::{chop_cubic_at, eval_cubic, eval_cubic_tangent, eval_quad, eval_quad_tangent};
use crate::math::{
    find_cubic_cusp, find_cubic_inflections, find_cubic_max_curvature, find_quad_max_curvature,
    find_unit_quad_roots,
};
use crate::math_stroke::{LineCap, LineJoin, StrokeStyle, SwappableBuilders};
use crate::path_shapes::PathDirection;
use crate::path_storage::{AddPathMode, Path, Segment};
use crate::trans_affine::TransAffine;
use crate::vector2::{vec2, Vector2};

// ============================================================================
// Constants
// ============================================================================

/// Subdivision ceilings: cubic before its tangents meet, cubic after,
/// quadratic, and the spare slot for conics (stored as quadratics).
const RECURSIVE_LIMITS: [u32; 4] = [15, 78, 33, 33];
const QUAD_RECURSIVE_LIMIT: usize = 2;

// ============================================================================
// Helper types
// ============================================================================

/// Which outline a curve offset is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrokeType {
    Outer,
    Inner,
}

impl StrokeType {
    fn axis_flip(self) -> f64 {
        match self {
            StrokeType::Outer => 1.0,
            StrokeType::Inner => -1.0,
        }
    }
}

/// Outcome of fitting an offset quad to a curve piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FitResult {
    /// The rays are parallel or meet behind; use a line.
    Degenerate,
    /// The quad is a good fit.
    Quad,
    /// Subdivide and try again.
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntersectRayType {
    CtrlPt,
    ResultType,
}

enum QuadReduction {
    Point,
    Line,
    Quad,
    /// The curve folds back on its line; the extra point is the overshoot.
    Degenerate(Vector2),
}

enum CubicReduction {
    Point,
    Line,
    /// A real curve; carries the point used for the start tangent.
    Quad(Vector2),
    /// Collinear with overshoots at the listed points.
    Degenerate(ArrayVec<Vector2, 3>),
}

/// One offset quad being fitted to the `[start_t, end_t]` piece of a curve.
#[derive(Debug, Clone, Copy, Default)]
struct QuadConstruct {
    quad: [Vector2; 3],
    tangent_start: Vector2,
    tangent_end: Vector2,
    start_t: f64,
    mid_t: f64,
    end_t: f64,
    start_set: bool,
    end_set: bool,
    opposite_tangents: bool,
}

impl QuadConstruct {
    /// `false` if the interval is too small to halve.
    fn init(&mut self, start: f64, end: f64) -> bool {
        self.start_t = start;
        self.mid_t = ((start + end) * 0.5).clamp(0.0, 1.0);
        self.end_t = end;
        self.start_set = false;
        self.end_set = false;
        self.start_t < self.mid_t && self.mid_t < self.end_t
    }

    /// First half of `parent`, reusing its start point and tangent.
    fn init_with_start(&mut self, parent: &QuadConstruct) -> bool {
        if !self.init(parent.start_t, parent.mid_t) {
            return false;
        }
        self.quad[0] = parent.quad[0];
        self.tangent_start = parent.tangent_start;
        self.start_set = true;
        true
    }

    /// Second half of `parent`, reusing its end point and tangent.
    fn init_with_end(&mut self, parent: &QuadConstruct) -> bool {
        if !self.init(parent.mid_t, parent.end_t) {
            return false;
        }
        self.quad[2] = parent.quad[2];
        self.tangent_end = parent.tangent_end;
        self.end_set = true;
        true
    }
}

// ============================================================================
// PathStroker
// ============================================================================

/// Reusable stroker. Keeps its scratch outlines between calls.
#[derive(Debug, Clone)]
pub struct PathStroker {
    radius: f64,
    inv_miter_limit: f64,
    res_scale: f64,
    inv_res_scale: f64,
    inv_res_scale_squared: f64,

    first_normal: Vector2,
    prev_normal: Vector2,
    first_unit_normal: Vector2,
    prev_unit_normal: Vector2,

    first_pt: Vector2,
    prev_pt: Vector2,
    first_outer_pt: Vector2,
    first_outer_pt_index: usize,
    segment_count: i32,
    prev_is_line: bool,

    capper: LineCap,
    joiner: LineJoin,

    inner: Path,
    outer: Path,
    cusper: Path,

    stroke_type: StrokeType,
    recursion_depth: u32,
    found_tangents: bool,
    join_completed: bool,
}

impl Default for PathStroker {
    fn default() -> Self {
        Self::new()
    }
}

impl PathStroker {
    pub fn new() -> Self {
        Self {
            radius: 0.0,
            inv_miter_limit: 0.0,
            res_scale: 1.0,
            inv_res_scale: 1.0,
            inv_res_scale_squared: 1.0,
            first_normal: Vector2::ZERO,
            prev_normal: Vector2::ZERO,
            first_unit_normal: Vector2::ZERO,
            prev_unit_normal: Vector2::ZERO,
            first_pt: Vector2::ZERO,
            prev_pt: Vector2::ZERO,
            first_outer_pt: Vector2::ZERO,
            first_outer_pt_index: 0,
            segment_count: -1,
            prev_is_line: false,
            capper: LineCap::Butt,
            joiner: LineJoin::Miter,
            inner: Path::new(),
            outer: Path::new(),
            cusper: Path::new(),
            stroke_type: StrokeType::Outer,
            recursion_depth: 0,
            found_tangents: false,
            join_completed: false,
        }
    }

    /// Resolution scale for stroking a path that will later be drawn
    /// through `ts`: the longer of the matrix's row vectors. Degenerate or
    /// non-finite matrices give 1.
    pub fn compute_resolution_scale(ts: &TransAffine) -> f64 {
        let scale = ts.max_scale();
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    /// Stroke `path` into a fillable outline.
    ///
    /// `res_scale` is the device scale the result will be drawn at; larger
    /// values produce finer curve approximations. A non-positive or
    /// non-finite width yields an empty path.
    pub fn stroke(&mut self, path: &Path, style: &StrokeStyle, res_scale: f64) -> Path {
        let width = style.width();
        if !(width.is_finite() && width > 0.0) {
            debug!("stroke skipped: width {}", width);
            return Path::new();
        }
        let res_scale = if res_scale.is_finite() && res_scale > 0.0 { res_scale } else { 1.0 };

        let mut join = style.line_join();
        let mut inv_miter_limit = 0.0;
        match join {
            LineJoin::Miter => {
                if style.miter_limit() <= 1.0 {
                    join = LineJoin::Bevel;
                } else {
                    inv_miter_limit = 1.0 / style.miter_limit();
                }
            }
            LineJoin::MiterClip => inv_miter_limit = 1.0 / style.miter_limit(),
            LineJoin::Round | LineJoin::Bevel => {}
        }

        self.radius = width * 0.5;
        self.inv_miter_limit = inv_miter_limit;
        self.res_scale = res_scale;
        self.inv_res_scale = 1.0 / (res_scale * 4.0);
        self.inv_res_scale_squared = self.inv_res_scale * self.inv_res_scale;
        self.capper = style.line_cap();
        self.joiner = join;

        self.first_normal = Vector2::ZERO;
        self.prev_normal = Vector2::ZERO;
        self.first_unit_normal = Vector2::ZERO;
        self.prev_unit_normal = Vector2::ZERO;
        self.first_pt = Vector2::ZERO;
        self.prev_pt = Vector2::ZERO;
        self.first_outer_pt = Vector2::ZERO;
        self.first_outer_pt_index = 0;
        self.segment_count = -1;
        self.prev_is_line = false;
        self.join_completed = false;
        self.inner.reset();
        self.outer.reset();
        self.cusper.reset();

        // A closed contour gets its closing edge as an explicit line.
        let mut segments: Vec<Segment> = Vec::with_capacity(path.len() + 4);
        for seg in path.segments() {
            if let Segment::Close(last, start) = seg {
                if last != start {
                    segments.push(Segment::Line(last, start));
                }
            }
            segments.push(seg);
        }

        let mut last_is_line = false;
        for (i, seg) in segments.iter().enumerate() {
            match *seg {
                Segment::Move(p) => self.move_to(p),
                Segment::Line(_, p) => {
                    self.line_to(p, Some(&segments[i + 1..]));
                    last_is_line = true;
                }
                Segment::Quad(q) => {
                    self.quad_to(q[1], q[2]);
                    last_is_line = false;
                }
                Segment::Cubic(c) => {
                    self.cubic_to(c[1], c[2], c[3]);
                    last_is_line = false;
                }
                Segment::Close(..) => {
                    if self.capper != LineCap::Butt {
                        // A lone MoveTo gets a zero-length line so it
                        // renders as a dot.
                        if self.has_only_move_to() {
                            self.line_to(self.first_pt, None);
                            last_is_line = true;
                            continue;
                        }
                        // Zero-length closed contour: cap it as a dot
                        // instead of joining it to itself.
                        if self.is_current_contour_empty() {
                            last_is_line = true;
                            continue;
                        }
                    }
                    self.close(last_is_line);
                }
            }
        }
        self.finish_contour(false, last_is_line);

        core::mem::take(&mut self.outer)
    }

    fn builders(&mut self) -> SwappableBuilders<'_> {
        SwappableBuilders {
            inner: &mut self.inner,
            outer: &mut self.outer,
        }
    }

    /// Join the previous segment to the next one, whose unit normal at
    /// `prev_pt` is `unit_normal`.
    fn join(&mut self, unit_normal: Vector2, curr_is_line: bool) {
        let joiner = self.joiner;
        let (before, pivot) = (self.prev_unit_normal, self.prev_pt);
        let (radius, inv_miter) = (self.radius, self.inv_miter_limit);
        let prev_is_line = self.prev_is_line;
        joiner.apply(
            before,
            pivot,
            unit_normal,
            radius,
            inv_miter,
            prev_is_line,
            curr_is_line,
            self.builders(),
        );
    }

    fn stroke_path(&mut self) -> &mut Path {
        match self.stroke_type {
            StrokeType::Outer => &mut self.outer,
            StrokeType::Inner => &mut self.inner,
        }
    }

    fn has_only_move_to(&self) -> bool {
        self.segment_count == 0
    }

    fn is_current_contour_empty(&self) -> bool {
        self.inner.is_zero_length_since_point(0)
            && self.outer.is_zero_length_since_point(self.first_outer_pt_index)
    }

    // ------------------------------------------------------------------
    // Contours
    // ------------------------------------------------------------------

    fn move_to(&mut self, p: Vector2) {
        if self.segment_count > 0 {
            self.finish_contour(false, false);
        }
        self.segment_count = 0;
        self.first_pt = p;
        self.prev_pt = p;
        self.join_completed = false;
    }

    fn close(&mut self, is_line: bool) {
        self.finish_contour(true, is_line);
    }

    fn finish_contour(&mut self, close: bool, curr_is_line: bool) {
        if self.segment_count > 0 {
            if close {
                self.join(self.first_unit_normal, curr_is_line);
                self.outer.close();

                // Inner outline as its own reversed contour.
                let pt = self.inner.last_point().unwrap_or(Vector2::ZERO);
                self.outer.move_to(pt.x, pt.y);
                self.outer.add_reverse_path(&self.inner);
                self.outer.close();
            } else {
                let pt = self.inner.last_point().unwrap_or(Vector2::ZERO);
                let other_is_line = self.prev_is_line;
                self.capper
                    .apply(self.prev_pt, self.prev_normal, pt, curr_is_line, &mut self.outer);
                self.outer.add_reverse_path(&self.inner);
                self.capper.apply(
                    self.first_pt,
                    -self.first_normal,
                    self.first_outer_pt,
                    other_is_line,
                    &mut self.outer,
                );
                self.outer.close();
            }

            debug!(
                "stroked contour: {} segments, {}",
                self.segment_count,
                if close { "closed" } else { "capped" }
            );

            if !self.cusper.is_empty() {
                self.outer.add_path(&self.cusper, AddPathMode::Append);
                self.cusper.reset();
            }
        }

        self.inner.reset();
        self.segment_count = -1;
        self.first_outer_pt_index = self.outer.points().len();
    }

    /// Start a segment towards `p`: record the first normal or join to
    /// the previous segment. Returns the segment's normal and unit normal,
    /// or `None` when a zero-length segment is to be skipped.
    fn pre_join_to(&mut self, p: Vector2, curr_is_line: bool) -> Option<(Vector2, Vector2)> {
        let prev_x = self.prev_pt.x;
        let prev_y = self.prev_pt.y;

        let normals = set_normal_unit_normal(self.prev_pt, p, self.res_scale, self.radius);
        let (normal, unit_normal) = match normals {
            Some(n) => n,
            None => {
                if self.capper == LineCap::Butt {
                    return None;
                }
                // Square and round caps still draw for a zero-length
                // segment; pick an upright orientation.
                (vec2(self.radius, 0.0), vec2(1.0, 0.0))
            }
        };

        if self.segment_count == 0 {
            self.first_normal = normal;
            self.first_unit_normal = unit_normal;
            self.first_outer_pt = vec2(prev_x + normal.x, prev_y + normal.y);

            self.outer.move_to(self.first_outer_pt.x, self.first_outer_pt.y);
            self.inner.move_to(prev_x - normal.x, prev_y - normal.y);
        } else {
            self.join(unit_normal, curr_is_line);
        }
        self.prev_is_line = curr_is_line;
        Some((normal, unit_normal))
    }

    fn post_join_to(&mut self, p: Vector2, normal: Vector2, unit_normal: Vector2) {
        self.join_completed = true;
        self.prev_pt = p;
        self.prev_unit_normal = unit_normal;
        self.prev_normal = normal;
        self.segment_count += 1;
    }

    // ------------------------------------------------------------------
    // Lines
    // ------------------------------------------------------------------

    /// `rest` holds the segments after this one, for deciding whether a
    /// teeny line should still contribute its direction.
    fn line_to(&mut self, p: Vector2, rest: Option<&[Segment]>) {
        let teeny_line = self.prev_pt.equals_eps(p, SCALAR_NEARLY_ZERO * self.inv_res_scale);
        if self.capper == LineCap::Butt && teeny_line {
            return;
        }
        if teeny_line && (self.join_completed || rest.is_some_and(has_valid_tangent)) {
            return;
        }

        let Some((normal, unit_normal)) = self.pre_join_to(p, true) else {
            return;
        };
        self.outer.line_to(p.x + normal.x, p.y + normal.y);
        self.inner.line_to(p.x - normal.x, p.y - normal.y);
        self.post_join_to(p, normal, unit_normal);
    }

    /// Draw `p2` after `p1` with round joins, for curves that reduced to
    /// straight pieces folding back on themselves.
    fn lines_with_round_joins(&mut self, pts: &[Vector2], end: Vector2) {
        let Some((first, rest)) = pts.split_first() else {
            self.line_to(end, None);
            return;
        };
        self.line_to(*first, None);
        let save_joiner = self.joiner;
        self.joiner = LineJoin::Round;
        for &p in rest {
            self.line_to(p, None);
        }
        self.line_to(end, None);
        self.joiner = save_joiner;
    }

    // ------------------------------------------------------------------
    // Quadratics
    // ------------------------------------------------------------------

    fn quad_to(&mut self, p1: Vector2, p2: Vector2) {
        let quad = [self.prev_pt, p1, p2];
        match check_quad_linear(&quad) {
            QuadReduction::Point | QuadReduction::Line => {
                self.line_to(p2, None);
                return;
            }
            QuadReduction::Degenerate(reduction) => {
                self.lines_with_round_joins(&[reduction], p2);
                return;
            }
            QuadReduction::Quad => {}
        }

        let Some((normal_ab, unit_ab)) = self.pre_join_to(p1, false) else {
            self.line_to(p2, None);
            return;
        };

        let mut quad_points = QuadConstruct::default();
        self.init_quad(StrokeType::Outer, 0.0, 1.0, &mut quad_points);
        self.quad_stroke(&quad, &mut quad_points);
        self.init_quad(StrokeType::Inner, 0.0, 1.0, &mut quad_points);
        self.quad_stroke(&quad, &mut quad_points);

        let (normal_bc, unit_bc) =
            set_normal_unit_normal(quad[1], quad[2], self.res_scale, self.radius)
                .unwrap_or((normal_ab, unit_ab));
        self.post_join_to(p2, normal_bc, unit_bc);
    }

    fn init_quad(
        &mut self,
        stroke_type: StrokeType,
        start: f64,
        end: f64,
        quad_points: &mut QuadConstruct,
    ) {
        self.stroke_type = stroke_type;
        self.found_tangents = false;
        self.recursion_depth = 0;
        quad_points.init(start, end);
    }

    fn quad_stroke(&mut self, quad: &[Vector2; 3], quad_points: &mut QuadConstruct) -> bool {
        match self.compare_quad_quad(quad, quad_points) {
            FitResult::Quad => {
                let [_, c, p] = quad_points.quad;
                self.stroke_path().quad_to(c.x, c.y, p.x, p.y);
                return true;
            }
            FitResult::Degenerate => {
                self.add_degenerate_line(quad_points);
                return true;
            }
            FitResult::Split => {}
        }

        if !quad_points.quad[2].is_finite() {
            return false;
        }

        self.recursion_depth += 1;
        let fitted = self.quad_stroke_halves(quad, quad_points);
        self.recursion_depth -= 1;
        fitted
    }

    /// Stroke both halves of `quad_points`, or a line once it can no
    /// longer be split.
    fn quad_stroke_halves(&mut self, quad: &[Vector2; 3], quad_points: &mut QuadConstruct) -> bool {
        if self.recursion_depth > RECURSIVE_LIMITS[QUAD_RECURSIVE_LIMIT] {
            trace!("quad stroke reached depth {}; emitting a line", self.recursion_depth);
            self.add_degenerate_line(quad_points);
            return true;
        }

        let mut half = QuadConstruct::default();
        if !half.init_with_start(quad_points) {
            self.add_degenerate_line(quad_points);
            return true;
        }
        if !self.quad_stroke(quad, &mut half) {
            return false;
        }
        if !half.init_with_end(quad_points) {
            self.add_degenerate_line(quad_points);
            return true;
        }
        self.quad_stroke(quad, &mut half)
    }

    fn compare_quad_quad(&self, quad: &[Vector2; 3], quad_points: &mut QuadConstruct) -> FitResult {
        if !quad_points.start_set {
            let (_, on, tangent) = self.quad_perp_ray(quad, quad_points.start_t);
            quad_points.quad[0] = on;
            quad_points.tangent_start = tangent;
            quad_points.start_set = true;
        }
        if !quad_points.end_set {
            let (_, on, tangent) = self.quad_perp_ray(quad, quad_points.end_t);
            quad_points.quad[2] = on;
            quad_points.tangent_end = tangent;
            quad_points.end_set = true;
        }

        let result = self.intersect_ray(IntersectRayType::CtrlPt, quad_points);
        if result != FitResult::Quad {
            return result;
        }

        let (ray1, ray0, _) = self.quad_perp_ray(quad, quad_points.mid_t);
        let stroke = quad_points.quad;
        self.stroke_close_enough(&stroke, &[ray0, ray1], quad_points)
    }

    /// Point on the curve at `t`, its offset point and a point further
    /// along the offset tangent.
    fn quad_perp_ray(&self, quad: &[Vector2; 3], t: f64) -> (Vector2, Vector2, Vector2) {
        let tp = eval_quad(quad, t);
        let mut dxy = eval_quad_tangent(quad, t);
        if dxy.is_zero() {
            dxy = quad[2] - quad[0];
        }
        let (on, tangent) = self.set_ray_pts(tp, dxy);
        (tp, on, tangent)
    }

    // ------------------------------------------------------------------
    // Cubics
    // ------------------------------------------------------------------

    fn cubic_to(&mut self, p1: Vector2, p2: Vector2, p3: Vector2) {
        let cubic = [self.prev_pt, p1, p2, p3];
        let tangent_pt = match check_cubic_linear(&cubic) {
            CubicReduction::Point | CubicReduction::Line => {
                self.line_to(p3, None);
                return;
            }
            CubicReduction::Degenerate(reduction) => {
                self.lines_with_round_joins(&reduction, p3);
                return;
            }
            CubicReduction::Quad(tangent_pt) => tangent_pt,
        };

        let Some((normal_ab, unit_ab)) = self.pre_join_to(tangent_pt, false) else {
            self.line_to(p3, None);
            return;
        };

        let inflections = find_cubic_inflections(&cubic);
        let mut last_t = 0.0;
        for next_t in inflections.iter().copied().chain(core::iter::once(1.0)) {
            let mut quad_points = QuadConstruct::default();
            self.init_quad(StrokeType::Outer, last_t, next_t, &mut quad_points);
            self.cubic_stroke(&cubic, &mut quad_points);
            self.init_quad(StrokeType::Inner, last_t, next_t, &mut quad_points);
            self.cubic_stroke(&cubic, &mut quad_points);
            last_t = next_t;
        }

        if let Some(cusp) = find_cubic_cusp(&cubic) {
            let loc = eval_cubic(&cubic, cusp);
            self.cusper.add_circle(loc.x, loc.y, self.radius, PathDirection::Cw);
        }

        let (normal_cd, unit_cd) = self.cubic_end_normal(&cubic, normal_ab, unit_ab);
        self.post_join_to(p3, normal_cd, unit_cd);
    }

    /// Normal at the end of a cubic, skipping degenerate control legs.
    fn cubic_end_normal(
        &self,
        cubic: &[Vector2; 4],
        normal_ab: Vector2,
        unit_ab: Vector2,
    ) -> (Vector2, Vector2) {
        let mut ab = cubic[1] - cubic[0];
        let mut cd = cubic[3] - cubic[2];

        let mut degenerate_ab = degenerate_vector(ab);
        let mut degenerate_cd = degenerate_vector(cd);
        if degenerate_ab && degenerate_cd {
            return (normal_ab, unit_ab);
        }
        if degenerate_ab {
            ab = cubic[2] - cubic[0];
            degenerate_ab = degenerate_vector(ab);
        }
        if degenerate_cd {
            cd = cubic[3] - cubic[1];
            degenerate_cd = degenerate_vector(cd);
        }
        if degenerate_ab || degenerate_cd {
            return (normal_ab, unit_ab);
        }
        set_normal_unit_normal2(cd, self.radius).unwrap_or((normal_ab, unit_ab))
    }

    fn cubic_stroke(&mut self, cubic: &[Vector2; 4], quad_points: &mut QuadConstruct) -> bool {
        if !self.found_tangents {
            let result = self.tangents_meet(cubic, quad_points);
            if result != FitResult::Quad {
                let [start, _, end] = quad_points.quad;
                let ends_close = points_within_dist(start, end, self.inv_res_scale);
                if (result == FitResult::Degenerate || ends_close)
                    && self.cubic_mid_on_line(cubic, quad_points)
                {
                    self.add_degenerate_line(quad_points);
                    return true;
                }
            } else {
                self.found_tangents = true;
            }
        }

        if self.found_tangents {
            let result = self.compare_quad_cubic(cubic, quad_points);
            if result == FitResult::Quad {
                let [_, c, p] = quad_points.quad;
                self.stroke_path().quad_to(c.x, c.y, p.x, p.y);
                return true;
            }
            if result == FitResult::Degenerate && !quad_points.opposite_tangents {
                self.add_degenerate_line(quad_points);
                return true;
            }
        }

        if !quad_points.quad[2].is_finite() {
            return false;
        }

        self.recursion_depth += 1;
        let fitted = self.cubic_stroke_halves(cubic, quad_points);
        self.recursion_depth -= 1;
        fitted
    }

    fn cubic_stroke_halves(
        &mut self,
        cubic: &[Vector2; 4],
        quad_points: &mut QuadConstruct,
    ) -> bool {
        if self.recursion_depth > RECURSIVE_LIMITS[self.found_tangents as usize] {
            trace!("cubic stroke reached depth {}; emitting a line", self.recursion_depth);
            self.add_degenerate_line(quad_points);
            return true;
        }

        let mut half = QuadConstruct::default();
        if !half.init_with_start(quad_points) {
            self.add_degenerate_line(quad_points);
            return true;
        }
        if !self.cubic_stroke(cubic, &mut half) {
            return false;
        }
        if !half.init_with_end(quad_points) {
            self.add_degenerate_line(quad_points);
            return true;
        }
        self.cubic_stroke(cubic, &mut half)
    }

    fn tangents_meet(&self, cubic: &[Vector2; 4], quad_points: &mut QuadConstruct) -> FitResult {
        self.cubic_quad_ends(cubic, quad_points);
        self.intersect_ray(IntersectRayType::ResultType, quad_points)
    }

    fn compare_quad_cubic(
        &self,
        cubic: &[Vector2; 4],
        quad_points: &mut QuadConstruct,
    ) -> FitResult {
        self.cubic_quad_ends(cubic, quad_points);
        let result = self.intersect_ray(IntersectRayType::CtrlPt, quad_points);
        if result != FitResult::Quad {
            return result;
        }
        let (ray1, ray0, _) = self.cubic_perp_ray(cubic, quad_points.mid_t);
        let stroke = quad_points.quad;
        self.stroke_close_enough(&stroke, &[ray0, ray1], quad_points)
    }

    fn cubic_quad_ends(&self, cubic: &[Vector2; 4], quad_points: &mut QuadConstruct) {
        if !quad_points.start_set {
            let (_, on, tangent) = self.cubic_perp_ray(cubic, quad_points.start_t);
            quad_points.quad[0] = on;
            quad_points.tangent_start = tangent;
            quad_points.start_set = true;
        }
        if !quad_points.end_set {
            let (_, on, tangent) = self.cubic_perp_ray(cubic, quad_points.end_t);
            quad_points.quad[2] = on;
            quad_points.tangent_end = tangent;
            quad_points.end_set = true;
        }
    }

    fn cubic_mid_on_line(&self, cubic: &[Vector2; 4], quad_points: &QuadConstruct) -> bool {
        let (_, stroke_mid, _) = self.cubic_perp_ray(cubic, quad_points.mid_t);
        let [start, _, end] = quad_points.quad;
        pt_to_line(stroke_mid, start, end) < self.inv_res_scale_squared
    }

    fn cubic_perp_ray(&self, cubic: &[Vector2; 4], t: f64) -> (Vector2, Vector2, Vector2) {
        let tp = eval_cubic(cubic, t);
        let mut dxy = eval_cubic_tangent(cubic, t);
        if dxy.is_zero() {
            let mut c_points = *cubic;
            if is_nearly_zero(t) {
                dxy = cubic[2] - cubic[0];
            } else if is_nearly_zero(1.0 - t) {
                dxy = cubic[3] - cubic[1];
            } else {
                // Zero tangent inside the curve: use the chopped halves'
                // control legs instead.
                let chopped = chop_cubic_at(cubic, t);
                dxy = chopped[3] - chopped[2];
                if dxy.is_zero() {
                    dxy = chopped[3] - chopped[1];
                    c_points = [chopped[0], chopped[1], chopped[2], chopped[3]];
                }
            }
            if dxy.is_zero() {
                dxy = c_points[3] - c_points[0];
            }
        }
        let (on, tangent) = self.set_ray_pts(tp, dxy);
        (tp, on, tangent)
    }

    // ------------------------------------------------------------------
    // Offset quad fitting
    // ------------------------------------------------------------------

    /// Offset point of `tp` along direction `dxy`, on the side of the
    /// current outline, and a second point along the tangent.
    fn set_ray_pts(&self, tp: Vector2, dxy: Vector2) -> (Vector2, Vector2) {
        let dxy = dxy.with_length(self.radius).unwrap_or(vec2(self.radius, 0.0));
        let flip = self.stroke_type.axis_flip();
        let on = vec2(tp.x + flip * dxy.y, tp.y - flip * dxy.x);
        (on, on + dxy)
    }

    fn add_degenerate_line(&mut self, quad_points: &QuadConstruct) {
        let p = quad_points.quad[2];
        self.stroke_path().line_to(p.x, p.y);
    }

    /// Intersect the start and end tangent rays; with
    /// [`IntersectRayType::CtrlPt`] the meeting point becomes the quad's
    /// control point.
    fn intersect_ray(&self, kind: IntersectRayType, quad_points: &mut QuadConstruct) -> FitResult {
        let start = quad_points.quad[0];
        let end = quad_points.quad[2];
        let a_len = quad_points.tangent_start - start;
        let b_len = quad_points.tangent_end - end;

        // Parallel rays: degenerate, with a note on whether they face
        // opposite ways.
        let denom = a_len.cross(b_len);
        if denom == 0.0 || !denom.is_finite() {
            quad_points.opposite_tangents = a_len.dot(b_len) < 0.0;
            return FitResult::Degenerate;
        }

        quad_points.opposite_tangents = false;
        let ab0 = start - end;
        let mut numer_a = b_len.cross(ab0);
        let numer_b = a_len.cross(ab0);
        if (numer_a >= 0.0) == (numer_b >= 0.0) {
            // The rays meet behind the start or end. If the offset ends
            // are close together a line will do.
            let dist1 = pt_to_line(start, end, quad_points.tangent_end);
            let dist2 = pt_to_line(end, start, quad_points.tangent_start);
            return if dist1.max(dist2) <= self.inv_res_scale_squared {
                FitResult::Degenerate
            } else {
                FitResult::Split
            };
        }

        numer_a /= denom;
        let valid_divide = numer_a > numer_a - 1.0;
        if valid_divide {
            if kind == IntersectRayType::CtrlPt {
                quad_points.quad[1] = start * (1.0 - numer_a) + quad_points.tangent_start * numer_a;
            }
            return FitResult::Quad;
        }

        quad_points.opposite_tangents = a_len.dot(b_len) < 0.0;
        FitResult::Degenerate
    }

    /// Decide whether `stroke` matches the offset curve, given the ray
    /// from the offset midpoint (`ray[0]`) through the curve midpoint.
    fn stroke_close_enough(
        &self,
        stroke: &[Vector2; 3],
        ray: &[Vector2; 2],
        quad_points: &QuadConstruct,
    ) -> FitResult {
        let stroke_mid = eval_quad(stroke, 0.5);
        if points_within_dist(ray[0], stroke_mid, self.inv_res_scale) {
            return if sharp_angle(&quad_points.quad) { FitResult::Split } else { FitResult::Quad };
        }

        if !pt_in_quad_bounds(stroke, ray[0], self.inv_res_scale) {
            return FitResult::Split;
        }

        let roots = intersect_quad_ray(ray, stroke);
        if roots.len() != 1 {
            return FitResult::Split;
        }

        let quad_pt = eval_quad(stroke, roots[0]);
        let error = self.inv_res_scale * (1.0 - (roots[0] - 0.5).abs() * 2.0);
        if points_within_dist(ray[0], quad_pt, error) {
            return if sharp_angle(&quad_points.quad) { FitResult::Split } else { FitResult::Quad };
        }

        FitResult::Split
    }
}

// ============================================================================
// Free helpers
// ============================================================================

/// `true` if a line segment starts a valid direction: the next drawing
/// segment of the contour is not zero-length.
fn has_valid_tangent(rest: &[Segment]) -> bool {
    for seg in rest {
        match *seg {
            Segment::Move(_) | Segment::Close(..) => return false,
            Segment::Line(a, b) => {
                if a != b {
                    return true;
                }
            }
            Segment::Quad(q) => {
                if q[0] != q[1] || q[0] != q[2] {
                    return true;
                }
            }
            Segment::Cubic(c) => {
                if c[0] != c[1] || c[0] != c[2] || c[0] != c[3] {
                    return true;
                }
            }
        }
    }
    false
}

fn degenerate_vector(v: Vector2) -> bool {
    v.normalize().is_none()
}

/// Normal (length `radius`) and unit normal of the direction from
/// `before` to `after`, measured at `scale`.
fn set_normal_unit_normal(
    before: Vector2,
    after: Vector2,
    scale: f64,
    radius: f64,
) -> Option<(Vector2, Vector2)> {
    let unit = ((after - before) * scale).normalize()?.rotate_ccw();
    Some((unit * radius, unit))
}

fn set_normal_unit_normal2(vec: Vector2, radius: f64) -> Option<(Vector2, Vector2)> {
    let unit = vec.normalize()?.rotate_ccw();
    Some((unit * radius, unit))
}

fn points_within_dist(a: Vector2, b: Vector2, dist: f64) -> bool {
    a.distance_sq(b) <= dist * dist
}

/// Squared distance from `pt` to the segment `line_start..line_end`,
/// measured to `line_start` when the projection falls outside.
fn pt_to_line(pt: Vector2, line_start: Vector2, line_end: Vector2) -> f64 {
    let dxy = line_end - line_start;
    let ab0 = pt - line_start;
    let numer = dxy.dot(ab0);
    let denom = dxy.dot(dxy);
    let t = numer / denom;
    if (0.0..=1.0).contains(&t) {
        let hit = line_start * (1.0 - t) + line_end * t;
        hit.distance_sq(pt)
    } else {
        ab0.length_sq()
    }
}

/// Parameters where the line through `line` crosses `quad`.
fn intersect_quad_ray(line: &[Vector2; 2], quad: &[Vector2; 3]) -> ArrayVec<f64, 2> {
    let vec = line[1] - line[0];
    let r = quad.map(|q| (q.y - line[0].y) * vec.x - (q.x - line[0].x) * vec.y);
    let a = r[2] + r[0] - 2.0 * r[1];
    let b = r[1] - r[0];
    find_unit_quad_roots(a, 2.0 * b, r[0])
}

/// `true` if the quad's control legs fold back sharply.
fn sharp_angle(quad: &[Vector2; 3]) -> bool {
    let mut smaller = quad[1] - quad[0];
    let mut larger = quad[1] - quad[2];
    let smaller_len = smaller.length_sq();
    let mut larger_len = larger.length_sq();
    if smaller_len > larger_len {
        core::mem::swap(&mut smaller, &mut larger);
        larger_len = smaller_len;
    }
    match smaller.with_length(larger_len) {
        Some(s) => s.dot(larger) > 0.0,
        None => false,
    }
}

fn pt_in_quad_bounds(quad: &[Vector2; 3], pt: Vector2, slack: f64) -> bool {
    let x_min = quad[0].x.min(quad[1].x).min(quad[2].x);
    if pt.x < x_min - slack {
        return false;
    }
    let x_max = quad[0].x.max(quad[1].x).max(quad[2].x);
    if pt.x > x_max + slack {
        return false;
    }
    let y_min = quad[0].y.min(quad[1].y).min(quad[2].y);
    if pt.y < y_min - slack {
        return false;
    }
    let y_max = quad[0].y.max(quad[1].y).max(quad[2].y);
    pt.y <= y_max + slack
}

/// Index pair of the two points furthest apart along an axis.
fn find_outer_pair(pts: &[Vector2]) -> (usize, usize, f64) {
    let mut pt_max = -1.0;
    let mut outer1 = 0;
    let mut outer2 = 0;
    for i in 0..pts.len() - 1 {
        for j in i + 1..pts.len() {
            let d = pts[j] - pts[i];
            let m = d.x.abs().max(d.y.abs());
            if pt_max < m {
                outer1 = i;
                outer2 = j;
                pt_max = m;
            }
        }
    }
    (outer1, outer2, pt_max)
}

/// `true` if the middle point lies on the line through the outer two.
fn quad_in_line(quad: &[Vector2; 3]) -> bool {
    let (outer1, outer2, pt_max) = find_outer_pair(quad);
    debug_assert!(outer1 <= 1 && (1..=2).contains(&outer2) && outer1 < outer2);
    let mid = outer1 ^ outer2 ^ 3;
    const CURVATURE_SLOP: f64 = 0.000005;
    let line_slop = pt_max * pt_max * CURVATURE_SLOP;
    pt_to_line(quad[mid], quad[outer1], quad[outer2]) <= line_slop
}

/// `true` if both inner points lie on the line through the outer two.
fn cubic_in_line(cubic: &[Vector2; 4]) -> bool {
    let (outer1, outer2, pt_max) = find_outer_pair(cubic);
    debug_assert!(outer1 <= 2 && (1..=3).contains(&outer2) && outer1 < outer2);
    let mid1 = (1 + (2 >> outer2)) >> outer1;
    let mid2 = outer1 ^ outer2 ^ mid1;
    let line_slop = pt_max * pt_max * 0.00001;
    pt_to_line(cubic[mid1], cubic[outer1], cubic[outer2]) <= line_slop
        && pt_to_line(cubic[mid2], cubic[outer1], cubic[outer2]) <= line_slop
}

fn check_quad_linear(quad: &[Vector2; 3]) -> QuadReduction {
    let degenerate_ab = degenerate_vector(quad[1] - quad[0]);
    let degenerate_bc = degenerate_vector(quad[2] - quad[1]);
    if degenerate_ab && degenerate_bc {
        return QuadReduction::Point;
    }
    if degenerate_ab || degenerate_bc {
        return QuadReduction::Line;
    }
    if !quad_in_line(quad) {
        return QuadReduction::Quad;
    }
    let t = find_quad_max_curvature(quad);
    if t == 0.0 || t == 1.0 {
        return QuadReduction::Line;
    }
    QuadReduction::Degenerate(eval_quad(quad, t))
}

fn check_cubic_linear(cubic: &[Vector2; 4]) -> CubicReduction {
    let degenerate_ab = degenerate_vector(cubic[1] - cubic[0]);
    let degenerate_bc = degenerate_vector(cubic[2] - cubic[1]);
    let degenerate_cd = degenerate_vector(cubic[3] - cubic[2]);
    if degenerate_ab && degenerate_bc && degenerate_cd {
        return CubicReduction::Point;
    }
    if degenerate_ab as u8 + degenerate_bc as u8 + degenerate_cd as u8 == 2 {
        return CubicReduction::Line;
    }
    if !cubic_in_line(cubic) {
        return CubicReduction::Quad(if degenerate_ab { cubic[2] } else { cubic[1] });
    }

    let mut reduction = ArrayVec::<Vector2, 3>::new();
    for t in find_cubic_max_curvature(cubic) {
        if t <= 0.0 || t >= 1.0 {
            continue;
        }
        let p = eval_cubic(cubic, t);
        if p != cubic[0] && p != cubic[3] {
            reduction.push(p);
        }
    }
    if reduction.is_empty() {
        CubicReduction::Line
    } else {
        CubicReduction::Degenerate(reduction)
    }
}
