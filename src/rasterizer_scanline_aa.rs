//! Antialiased polygon rasterizer.
//!
//! Contours are fed in floating point (or as a whole [`Path`]), converted
//! to 26.6 fixed point and accumulated as cells by
//! [`RasterizerCellsAa`]. [`rasterize`](RasterizerScanlineAa::rasterize)
//! then sweeps every row left to right, turns accumulated area into
//! coverage with the filling rule, and hands runs of equal coverage to a
//! [`Painter`].

use log::debug;

use crate::basics::{
    to_fixed_26_6, FillingRule, RectI, DEFAULT_FLATTEN_TOLERANCE, MAX_ALPHA, PIXEL_BITS,
};
use crate::path_storage::{Path, PathVisitor};
use crate::rasterizer_cells_aa::RasterizerCellsAa;
use crate::vector2::Vector2;

// ============================================================================
// AA scale constants
// ============================================================================

const AA_SHIFT: u32 = 8;
const AA_SCALE: i32 = 1 << AA_SHIFT;
const AA_MASK: i32 = AA_SCALE - 1;
const AA_SCALE2: i32 = AA_SCALE * 2;
const AA_MASK2: i32 = AA_SCALE2 - 1;

/// Spans handed to the painter per call, except for the last call.
pub const SPAN_BATCH: usize = 256;

/// Input coordinates are clamped to this many 26.6 units so that the
/// 24.8 cell arithmetic cannot overflow.
const COORD_LIMIT: i32 = 1 << 28;

// ============================================================================
// Span / Painter
// ============================================================================

/// Pixels `x0..x1` of row `y`, all with coverage `alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub y: i32,
    pub x0: i32,
    pub x1: i32,
    pub alpha: u8,
}

impl Span {
    #[inline]
    pub fn len(&self) -> i32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0
    }
}

/// Receives the rasterizer output.
///
/// Spans arrive in increasing `(y, x0)` order. The last call has `done`
/// set and carries whatever remains, possibly nothing.
pub trait Painter {
    fn paint(&mut self, spans: &[Span], done: bool);
}

/// Painter that keeps every span.
#[derive(Debug, Clone, Default)]
pub struct SpanCollector {
    pub spans: Vec<Span>,
    pub done: bool,
    pub calls: usize,
}

impl SpanCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of `alpha * width` over all spans, in pixels.
    pub fn coverage(&self) -> f64 {
        self.spans
            .iter()
            .map(|s| s.alpha as f64 / MAX_ALPHA as f64 * s.len() as f64)
            .sum()
    }
}

impl Painter for SpanCollector {
    fn paint(&mut self, spans: &[Span], done: bool) {
        self.spans.extend_from_slice(spans);
        self.done = done;
        self.calls += 1;
    }
}

impl<F: FnMut(&[Span], bool)> Painter for F {
    fn paint(&mut self, spans: &[Span], done: bool) {
        self(spans, done)
    }
}

// ============================================================================
// Coverage
// ============================================================================

/// Coverage of a cell from `2 * area` in 24.8 (cover scaled by
/// `2 * 256` minus the cell's area), under the filling rule.
#[inline]
pub fn area_to_alpha(area: i32, rule: FillingRule) -> u8 {
    let mut cover = (area >> (PIXEL_BITS * 2 + 1 - AA_SHIFT)).abs();
    if rule == FillingRule::EvenOdd {
        cover &= AA_MASK2;
        if cover > AA_SCALE {
            cover = AA_SCALE2 - cover;
        }
    }
    cover.min(AA_MASK) as u8
}

/// Merges neighbouring spans and hands them to the painter in batches.
struct SpanSink<'a, P: Painter + ?Sized> {
    painter: &'a mut P,
    clip: Option<RectI>,
    batch: Vec<Span>,
    pending: Option<Span>,
    count: usize,
}

impl<'a, P: Painter + ?Sized> SpanSink<'a, P> {
    fn new(painter: &'a mut P, clip: Option<RectI>) -> Self {
        Self {
            painter,
            clip,
            batch: Vec::with_capacity(SPAN_BATCH),
            pending: None,
            count: 0,
        }
    }

    fn push(&mut self, y: i32, x0: i32, x1: i32, alpha: u8) {
        let (mut x0, mut x1) = (x0, x1);
        if let Some(clip) = self.clip {
            x0 = x0.max(clip.x1);
            x1 = x1.min(clip.x2);
        }
        if alpha == 0 || x1 <= x0 {
            return;
        }
        if let Some(p) = self.pending.as_mut() {
            if p.y == y && p.x1 == x0 && p.alpha == alpha {
                p.x1 = x1;
                return;
            }
        }
        if let Some(p) = self.pending.replace(Span { y, x0, x1, alpha }) {
            self.emit(p);
        }
    }

    fn emit(&mut self, span: Span) {
        self.batch.push(span);
        self.count += 1;
        if self.batch.len() == SPAN_BATCH {
            self.painter.paint(&self.batch, false);
            self.batch.clear();
        }
    }

    fn finish(mut self) -> usize {
        if let Some(p) = self.pending.take() {
            self.emit(p);
        }
        self.painter.paint(&self.batch, true);
        self.count
    }
}

// ============================================================================
// RasterizerScanlineAa
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Initial,
    MoveTo,
    LineTo,
    Closed,
}

/// Polygon rasterizer with antialiased output.
///
/// Usage:
/// 1. Optionally set `filling_rule()`, `clip_box()` and `set_tolerance()`
/// 2. Define contours with `move_to_d()` / `line_to_d()` / ... or `add_path()`
/// 3. Call `rasterize()` with a [`Painter`]
///
/// Open contours are closed for filling. Rasterizing does not consume
/// the outline, so more contours may be added and the result swept again.
#[derive(Debug, Clone)]
pub struct RasterizerScanlineAa {
    outline: RasterizerCellsAa,
    filling_rule: FillingRule,
    tolerance: f64,
    start_x: i32,
    start_y: i32,
    status: Status,
}

#[inline]
fn coord(v: f64) -> i32 {
    to_fixed_26_6(v).clamp(-COORD_LIMIT, COORD_LIMIT)
}

impl RasterizerScanlineAa {
    pub fn new() -> Self {
        Self {
            outline: RasterizerCellsAa::new(),
            filling_rule: FillingRule::NonZero,
            tolerance: DEFAULT_FLATTEN_TOLERANCE,
            start_x: 0,
            start_y: 0,
            status: Status::Initial,
        }
    }

    /// Discard all contours. Settings are kept.
    pub fn reset(&mut self) {
        self.outline.reset();
        self.status = Status::Initial;
    }

    /// Set the filling rule (non-zero winding or even-odd).
    pub fn filling_rule(&mut self, rule: FillingRule) {
        self.filling_rule = rule;
    }

    pub fn get_filling_rule(&self) -> FillingRule {
        self.filling_rule
    }

    /// Restrict output to pixels `[x1, x2) x [y1, y2)`. Discards the
    /// current contours.
    pub fn clip_box(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.reset();
        let mut r = RectI::new(x1, y1, x2, y2);
        r.normalize();
        self.outline.set_clip_box(Some(r));
    }

    /// Disable clipping. Discards the current contours.
    pub fn reset_clipping(&mut self) {
        self.reset();
        self.outline.set_clip_box(None);
    }

    /// Maximum distance in pixels between a curve and its approximation.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        if tolerance.is_finite() && tolerance > 0.0 {
            self.tolerance = tolerance;
            self.outline.set_tolerance(tolerance);
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    // ========================================================================
    // Path building
    // ========================================================================

    /// Close the current contour.
    pub fn close_polygon(&mut self) {
        if self.status == Status::LineTo {
            self.outline.line_to(self.start_x, self.start_y);
            self.status = Status::Closed;
        }
    }

    /// Start a new contour, closing the previous one.
    pub fn move_to_d(&mut self, x: f64, y: f64) {
        self.close_polygon();
        self.start_x = coord(x);
        self.start_y = coord(y);
        self.outline.move_to(self.start_x, self.start_y);
        self.status = Status::MoveTo;
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        self.outline.line_to(coord(x), coord(y));
        self.status = Status::LineTo;
    }

    pub fn quad_to_d(&mut self, x1: f64, y1: f64, x: f64, y: f64) {
        self.outline.quad_to(coord(x1), coord(y1), coord(x), coord(y));
        self.status = Status::LineTo;
    }

    pub fn cubic_to_d(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.outline
            .cubic_to(coord(x1), coord(y1), coord(x2), coord(y2), coord(x), coord(y));
        self.status = Status::LineTo;
    }

    /// Add every contour of `path`.
    pub fn add_path(&mut self, path: &Path) {
        path.visit(&mut OutlineBuilder { ras: self });
    }

    // ========================================================================
    // Bounding box
    // ========================================================================

    /// Pixel bounds of the accumulated cells (inclusive), if any.
    pub fn bounds(&mut self) -> Option<RectI> {
        self.outline.flush();
        let (x1, x2) = self.outline.x_range()?;
        let (y1, y2) = self.outline.row_range()?;
        Some(RectI::new(x1, y1, x2, y2))
    }

    // ========================================================================
    // Sweep
    // ========================================================================

    fn prepare(&mut self) {
        self.close_polygon();
        self.outline.flush();
    }

    /// Sweep all rows and paint the coverage spans.
    pub fn rasterize<P: Painter + ?Sized>(&mut self, painter: &mut P) {
        self.prepare();
        let clip = self.outline.clip_box();
        let mut sink = SpanSink::new(painter, clip);
        let rule = self.filling_rule;

        let rows = self.outline.row_range();
        if let Some((y_min, y_max)) = rows {
            for y in y_min..=y_max {
                let mut cover = 0;
                let mut cells = self.outline.row(y).peekable();
                while let Some(cell) = cells.next() {
                    cover += cell.cover;
                    let alpha = area_to_alpha((cover << (PIXEL_BITS + 1)) - cell.area, rule);
                    sink.push(y, cell.x, cell.x + 1, alpha);

                    if let Some(next) = cells.peek() {
                        if cover != 0 && next.x > cell.x + 1 {
                            let alpha = area_to_alpha(cover << (PIXEL_BITS + 1), rule);
                            sink.push(y, cell.x + 1, next.x, alpha);
                        }
                    }
                }
            }
        }

        let spans = sink.finish();
        debug!(
            "rasterize: {} cells, rows {:?}, {} spans",
            self.outline.total_cells(),
            rows,
            spans
        );
    }

    /// Whether pixel `(tx, ty)` has non-zero coverage.
    pub fn hit_test(&mut self, tx: i32, ty: i32) -> bool {
        self.prepare();
        if let Some(clip) = self.outline.clip_box() {
            if tx < clip.x1 || tx >= clip.x2 || ty < clip.y1 || ty >= clip.y2 {
                return false;
            }
        }

        let mut cover = 0;
        for cell in self.outline.row(ty) {
            if cell.x > tx {
                break;
            }
            cover += cell.cover;
            if cell.x == tx {
                let area = (cover << (PIXEL_BITS + 1)) - cell.area;
                return area_to_alpha(area, self.filling_rule) != 0;
            }
        }
        area_to_alpha(cover << (PIXEL_BITS + 1), self.filling_rule) != 0
    }
}

impl Default for RasterizerScanlineAa {
    fn default() -> Self {
        Self::new()
    }
}

/// Feeds path segments to the rasterizer.
struct OutlineBuilder<'a> {
    ras: &'a mut RasterizerScanlineAa,
}

impl PathVisitor for OutlineBuilder<'_> {
    fn move_to(&mut self, p: Vector2) {
        self.ras.move_to_d(p.x, p.y);
    }

    fn line_to(&mut self, _from: Vector2, to: Vector2) {
        self.ras.line_to_d(to.x, to.y);
    }

    fn quad_to(&mut self, pts: &[Vector2; 3]) {
        self.ras.quad_to_d(pts[1].x, pts[1].y, pts[2].x, pts[2].y);
    }

    fn cubic_to(&mut self, pts: &[Vector2; 4]) {
        self.ras
            .cubic_to_d(pts[1].x, pts[1].y, pts[2].x, pts[2].y, pts[3].x, pts[3].y);
    }

    fn close(&mut self, _last: Vector2, _start: Vector2) {
        self.ras.close_polygon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::RectD;
    use crate::path_shapes::PathDirection;

    fn rect(ras: &mut RasterizerScanlineAa, x1: f64, y1: f64, x2: f64, y2: f64) {
        ras.move_to_d(x1, y1);
        ras.line_to_d(x2, y1);
        ras.line_to_d(x2, y2);
        ras.line_to_d(x1, y2);
        ras.close_polygon();
    }

    fn collect(ras: &mut RasterizerScanlineAa) -> SpanCollector {
        let mut sc = SpanCollector::new();
        ras.rasterize(&mut sc);
        sc
    }

    #[test]
    fn test_area_to_alpha() {
        let full = AA_SCALE << (PIXEL_BITS + 1);
        assert_eq!(area_to_alpha(0, FillingRule::NonZero), 0);
        assert_eq!(area_to_alpha(full, FillingRule::NonZero), 255);
        assert_eq!(area_to_alpha(-full, FillingRule::NonZero), 255);
        assert_eq!(area_to_alpha(full / 2, FillingRule::NonZero), 128);
        assert_eq!(area_to_alpha(2 * full, FillingRule::NonZero), 255);
        assert_eq!(area_to_alpha(2 * full, FillingRule::EvenOdd), 0);
        assert_eq!(area_to_alpha(3 * full, FillingRule::EvenOdd), 255);
        // 1.5 windings reflect back to half coverage.
        assert_eq!(area_to_alpha(full * 3 / 2, FillingRule::EvenOdd), 128);
    }

    #[test]
    fn test_empty_rasterize_paints_done() {
        let mut ras = RasterizerScanlineAa::new();
        let sc = collect(&mut ras);
        assert!(sc.spans.is_empty());
        assert!(sc.done);
        assert_eq!(sc.calls, 1);
    }

    #[test]
    fn test_integer_square() {
        let mut ras = RasterizerScanlineAa::new();
        rect(&mut ras, 10.0, 10.0, 20.0, 20.0);
        let sc = collect(&mut ras);
        assert_eq!(sc.spans.len(), 10);
        for (i, s) in sc.spans.iter().enumerate() {
            assert_eq!(*s, Span { y: 10 + i as i32, x0: 10, x1: 20, alpha: MAX_ALPHA });
        }
    }

    #[test]
    fn test_square_either_winding() {
        let mut ras = RasterizerScanlineAa::new();
        ras.move_to_d(0.0, 0.0);
        ras.line_to_d(0.0, 4.0);
        ras.line_to_d(4.0, 4.0);
        ras.line_to_d(4.0, 0.0);
        let sc = collect(&mut ras);
        assert_eq!(sc.spans.len(), 4);
        assert!(sc.spans.iter().all(|s| s.alpha == 255 && s.x0 == 0 && s.x1 == 4));
    }

    #[test]
    fn test_half_pixel_edges() {
        let mut ras = RasterizerScanlineAa::new();
        rect(&mut ras, 10.5, 0.0, 20.5, 1.0);
        let sc = collect(&mut ras);
        assert_eq!(
            sc.spans,
            vec![
                Span { y: 0, x0: 10, x1: 11, alpha: 128 },
                Span { y: 0, x0: 11, x1: 20, alpha: 255 },
                Span { y: 0, x0: 20, x1: 21, alpha: 128 },
            ]
        );
        assert!((sc.coverage() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_filling_rules() {
        let mut ras = RasterizerScanlineAa::new();
        rect(&mut ras, 0.0, 0.0, 10.0, 10.0);
        rect(&mut ras, 2.0, 2.0, 8.0, 8.0);

        let sc = collect(&mut ras);
        let row5: Vec<_> = sc.spans.iter().filter(|s| s.y == 5).collect();
        assert_eq!(row5.len(), 1);
        assert_eq!((row5[0].x0, row5[0].x1), (0, 10));

        ras.filling_rule(FillingRule::EvenOdd);
        let sc = collect(&mut ras);
        let row5: Vec<_> = sc.spans.iter().filter(|s| s.y == 5).map(|s| (s.x0, s.x1)).collect();
        assert_eq!(row5, vec![(0, 2), (8, 10)]);
    }

    #[test]
    fn test_clip_box() {
        let mut ras = RasterizerScanlineAa::new();
        ras.clip_box(2, 3, 6, 5);
        rect(&mut ras, 0.0, 0.0, 10.0, 10.0);
        let sc = collect(&mut ras);
        assert_eq!(
            sc.spans,
            vec![
                Span { y: 3, x0: 2, x1: 6, alpha: 255 },
                Span { y: 4, x0: 2, x1: 6, alpha: 255 },
            ]
        );

        ras.reset_clipping();
        rect(&mut ras, 0.0, 0.0, 10.0, 10.0);
        assert_eq!(collect(&mut ras).spans.len(), 10);
    }

    #[test]
    fn test_clip_box_shape_left_of_box() {
        let mut ras = RasterizerScanlineAa::new();
        ras.clip_box(20, 0, 30, 10);
        rect(&mut ras, 0.0, 0.0, 10.0, 10.0);
        assert!(collect(&mut ras).spans.is_empty());
    }

    #[test]
    fn test_hit_test() {
        let mut ras = RasterizerScanlineAa::new();
        rect(&mut ras, 0.0, 0.0, 10.0, 10.0);
        assert!(ras.hit_test(5, 5));
        assert!(ras.hit_test(0, 0));
        assert!(ras.hit_test(9, 9));
        assert!(!ras.hit_test(10, 5));
        assert!(!ras.hit_test(5, 10));
        assert!(!ras.hit_test(-1, 5));
    }

    #[test]
    fn test_span_batches() {
        let mut ras = RasterizerScanlineAa::new();
        // Three spans per row for 100 rows.
        rect(&mut ras, 10.5, 0.0, 20.5, 100.0);
        let sc = collect(&mut ras);
        assert_eq!(sc.spans.len(), 300);
        assert_eq!(sc.calls, 2);
        assert!(sc.done);

        let mut sizes = Vec::new();
        ras.rasterize(&mut |spans: &[Span], done: bool| sizes.push((spans.len(), done)));
        assert_eq!(sizes, vec![(256, false), (44, true)]);
    }

    #[test]
    fn test_spans_ordered() {
        let mut ras = RasterizerScanlineAa::new();
        let mut path = Path::new();
        path.add_circle(30.0, 30.0, 20.0, PathDirection::Cw);
        ras.add_path(&path);
        let sc = collect(&mut ras);
        for w in sc.spans.windows(2) {
            assert!((w[0].y, w[0].x0) < (w[1].y, w[1].x0));
            assert!(w[0].y < w[1].y || w[0].x1 <= w[1].x0);
        }
    }

    #[test]
    fn test_circle_area() {
        let mut ras = RasterizerScanlineAa::new();
        let mut path = Path::new();
        path.add_circle(50.0, 50.0, 20.0, PathDirection::Ccw);
        ras.add_path(&path);
        let sc = collect(&mut ras);
        let expected = std::f64::consts::PI * 400.0;
        assert!((sc.coverage() - expected).abs() / expected < 0.01);
    }

    #[test]
    fn test_curves_direct() {
        let mut ras = RasterizerScanlineAa::new();
        ras.move_to_d(0.0, 0.0);
        ras.quad_to_d(20.0, 10.0, 0.0, 20.0);
        ras.close_polygon();
        // Area under the parabola is two thirds of its hull rectangle.
        let quad = collect(&mut ras).coverage();
        assert!((quad - 2.0 / 3.0 * 10.0 * 20.0).abs() < 2.0);

        ras.reset();
        ras.move_to_d(0.0, 0.0);
        ras.cubic_to_d(20.0, 0.0, 20.0, 20.0, 0.0, 20.0);
        let cubic = collect(&mut ras).coverage();
        // Integral of x dy over the curve.
        assert!((cubic - 240.0).abs() < 2.0);
    }

    #[test]
    fn test_rasterize_is_repeatable() {
        let mut ras = RasterizerScanlineAa::new();
        ras.move_to_d(1.2, 3.4);
        ras.line_to_d(30.7, 8.1);
        ras.line_to_d(12.3, 25.9);
        let a = collect(&mut ras).spans;
        let b = collect(&mut ras).spans;
        assert_eq!(a, b);
    }

    #[test]
    fn test_bounds() {
        let mut ras = RasterizerScanlineAa::new();
        assert!(ras.bounds().is_none());
        let mut path = Path::new();
        path.add_rect(&RectD::new(2.5, 3.0, 7.5, 9.0), PathDirection::Cw, 0);
        ras.add_path(&path);
        assert_eq!(ras.bounds(), Some(RectI::new(2, 3, 7, 8)));
    }

    /// Square `[-e, e]` traced with one kind of segment per side.
    fn far_square(ras: &mut RasterizerScanlineAa, e: f64, verb: usize) {
        let corners = [(-e, -e), (e, -e), (e, e), (-e, e)];
        ras.move_to_d(-e, -e);
        for i in 0..4 {
            let (x0, y0) = corners[i];
            let (x1, y1) = corners[(i + 1) % 4];
            let at = |t: f64| (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
            match verb {
                0 => ras.line_to_d(x1, y1),
                1 => {
                    let (cx, cy) = at(0.5);
                    ras.quad_to_d(cx, cy, x1, y1);
                }
                _ => {
                    let (ax, ay) = at(1.0 / 3.0);
                    let (bx, by) = at(2.0 / 3.0);
                    ras.cubic_to_d(ax, ay, bx, by, x1, y1);
                }
            }
        }
        ras.close_polygon();
    }

    #[test]
    fn test_far_out_of_range_geometry_is_clipped() {
        let full: Vec<Span> = (0..20)
            .map(|y| Span { y, x0: 0, x1: 20, alpha: MAX_ALPHA })
            .collect();
        let mut ras = RasterizerScanlineAa::new();
        for e in [1.0e7, 1.0e12] {
            for verb in 0..3 {
                ras.clip_box(0, 0, 20, 20);
                far_square(&mut ras, e, verb);
                assert_eq!(collect(&mut ras).spans, full, "extent {} verb {}", e, verb);
            }
        }

        // Curved edges running far outside the box on both axes.
        for e in [1.0e7, -1.0e7, 1.0e12, -1.0e12] {
            ras.clip_box(0, 0, 20, 20);
            ras.move_to_d(e, 0.0);
            ras.cubic_to_d(e, 5.0, e, 10.0, e, 20.0);
            ras.line_to_d(-e, 20.0);
            ras.quad_to_d(10.0, e, -e, -e);
            ras.cubic_to_d(e, -e, 5.0, -e, 15.0, e);
            let sc = collect(&mut ras);
            assert!(sc.done);
            for s in &sc.spans {
                assert!((0..20).contains(&s.y), "{:?}", s);
                assert!(s.x0 >= 0 && s.x1 <= 20 && s.x0 < s.x1, "{:?}", s);
                assert!(s.alpha > 0);
            }
        }
    }

    #[test]
    fn test_tolerance() {
        let mut ras = RasterizerScanlineAa::new();
        assert_eq!(ras.tolerance(), DEFAULT_FLATTEN_TOLERANCE);
        ras.set_tolerance(0.1);
        assert_eq!(ras.tolerance(), 0.1);
        ras.set_tolerance(-1.0);
        assert_eq!(ras.tolerance(), 0.1);
    }
}
