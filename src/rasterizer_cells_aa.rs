//! Cell accumulation for the scanline rasterizer.
//!
//! Edges arrive in 26.6 fixed point and are rendered into cells at 24.8.
//! Per pixel, `cover` sums the signed height of the edges crossing it and
//! `area` sums twice the signed area between those edges and the pixel's
//! left side. All cells live in one arena; each pixel row keeps a singly
//! linked list of its cells in increasing `x`, so rows never need sorting.
//!
//! Quadratics and cubics are cut into lines by a fixed number of midpoint
//! splits, chosen up front from the control polygon's deviation.

use log::trace;

use crate::basics::{
    RectI, DEFAULT_FLATTEN_TOLERANCE, INPUT_SUBPIXEL_SCALE, INPUT_SUBPIXEL_SHIFT, PIXEL_BITS,
};

// ============================================================================
// Constants
// ============================================================================

const PIXEL_SCALE: i32 = 1 << PIXEL_BITS;
const PIXEL_MASK: i32 = PIXEL_SCALE - 1;

/// 26.6 input to 24.8 cells.
const UPSCALE_SHIFT: u32 = PIXEL_BITS - INPUT_SUBPIXEL_SHIFT;

/// Lines wider than this are halved before rendering so that the
/// per-row arithmetic stays within `i32`.
const DX_LIMIT: i64 = 16384 << PIXEL_BITS;

/// Ceiling on the number of recursive halvings of one curve.
pub const MAX_CURVE_SPLITS: u32 = 16;

// ============================================================================
// CellAa
// ============================================================================

/// Accumulated coverage of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAa {
    pub x: i32,
    pub cover: i32,
    pub area: i32,
    next: Option<u32>,
}

/// A point in 26.6 fixed point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Point26 {
    x: i32,
    y: i32,
}

impl Point26 {
    #[inline]
    fn mid(a: Point26, b: Point26) -> Point26 {
        Point26 { x: (a.x + b.x) >> 1, y: (a.y + b.y) >> 1 }
    }

    /// `sum(w * p) / total`. The sum is taken in `i64`: at the coordinate
    /// limit it exceeds `i32`, the quotient does not.
    #[inline]
    fn weighted(terms: &[(Point26, i64)], total: i64) -> Point26 {
        let (x, y) = terms.iter().fold((0i64, 0i64), |(x, y), &(p, w)| {
            (x + w * p.x as i64, y + w * p.y as i64)
        });
        Point26 { x: (x / total) as i32, y: (y / total) as i32 }
    }
}

/// `p / q` rounded towards negative infinity, and the non-negative
/// remainder. `q` must be positive.
#[inline]
fn floor_div(p: i64, q: i64) -> (i32, i64) {
    let mut d = p / q;
    let mut r = p % q;
    if r < 0 {
        d -= 1;
        r += q;
    }
    (d as i32, r)
}

/// Number of halvings that brings `dev` to zero when each halving
/// divides it by `factor`, capped at [`MAX_CURVE_SPLITS`].
fn split_count(mut dev: i64, factor: i64) -> u32 {
    let mut n = 0;
    while dev > 0 {
        dev /= factor;
        n += 1;
    }
    if n > MAX_CURVE_SPLITS {
        trace!("curve needs {} splits; capped at {}", n, MAX_CURVE_SPLITS);
        n = MAX_CURVE_SPLITS;
    }
    n
}

// ============================================================================
// RasterizerCellsAa
// ============================================================================

/// Edge-to-cell engine behind
/// [`RasterizerScanlineAa`](crate::rasterizer_scanline_aa::RasterizerScanlineAa).
#[derive(Debug, Clone)]
pub struct RasterizerCellsAa {
    cells: Vec<CellAa>,
    /// Head of each row's cell list; index 0 is row `row_origin`.
    rows: Vec<Option<u32>>,
    row_origin: i32,
    clip: Option<RectI>,
    /// Second difference (26.6) per unit of curve deviation.
    split_divisor: i64,

    pen: Point26,
    curr_x: i32,
    curr_y: i32,
    area: i32,
    cover: i32,
    min_x: i32,
    max_x: i32,
}

impl RasterizerCellsAa {
    pub fn new() -> Self {
        let mut ras = Self {
            cells: Vec::new(),
            rows: Vec::new(),
            row_origin: 0,
            clip: None,
            split_divisor: 1,
            pen: Point26::default(),
            curr_x: i32::MAX,
            curr_y: i32::MAX,
            area: 0,
            cover: 0,
            min_x: i32::MAX,
            max_x: i32::MIN,
        };
        ras.set_tolerance(DEFAULT_FLATTEN_TOLERANCE);
        ras
    }

    /// Discard all cells. Clip box and tolerance are kept.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.rows.clear();
        self.row_origin = 0;
        self.pen = Point26::default();
        self.curr_x = i32::MAX;
        self.curr_y = i32::MAX;
        self.area = 0;
        self.cover = 0;
        self.min_x = i32::MAX;
        self.max_x = i32::MIN;
    }

    /// Pixel box `[x1, x2) x [y1, y2)` cells are confined to, or `None`
    /// for no clipping. Applies to cells saved from now on.
    pub fn set_clip_box(&mut self, clip: Option<RectI>) {
        self.clip = clip;
    }

    pub fn clip_box(&self) -> Option<RectI> {
        self.clip
    }

    /// Maximum distance in pixels between a curve and the lines it is
    /// split into.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        let t = if tolerance.is_finite() && tolerance > 0.0 {
            tolerance
        } else {
            DEFAULT_FLATTEN_TOLERANCE
        };
        self.split_divisor = ((4.0 * t * INPUT_SUBPIXEL_SCALE as f64) as i64).max(1);
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Smallest and largest cell column, once any cell exists.
    pub fn x_range(&self) -> Option<(i32, i32)> {
        (self.min_x <= self.max_x).then_some((self.min_x, self.max_x))
    }

    /// First and last row that may hold cells.
    pub fn row_range(&self) -> Option<(i32, i32)> {
        if self.rows.is_empty() {
            None
        } else {
            Some((self.row_origin, self.row_origin + self.rows.len() as i32 - 1))
        }
    }

    /// Cells of row `y` in increasing `x`.
    pub fn row(&self, y: i32) -> RowCells<'_> {
        let head = y
            .checked_sub(self.row_origin)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.rows.get(i).copied().flatten());
        RowCells { cells: &self.cells, next: head }
    }

    // ========================================================================
    // Cell storage
    // ========================================================================

    /// Slot of row `y` in `rows`, growing the table as needed.
    fn row_slot(&mut self, y: i32) -> usize {
        if self.rows.is_empty() {
            self.row_origin = y;
            self.rows.push(None);
        } else if y < self.row_origin {
            let grow = (self.row_origin - y) as usize;
            self.rows.splice(0..0, core::iter::repeat(None).take(grow));
            self.row_origin = y;
        } else if y >= self.row_origin + self.rows.len() as i32 {
            self.rows.resize((y - self.row_origin) as usize + 1, None);
        }
        (y - self.row_origin) as usize
    }

    /// Index of the cell at `(x, y)`, created if missing. `None` when the
    /// row is clipped away. Columns left of the clip box collapse into
    /// the column just outside it, which still carries their cover.
    fn find_cell(&mut self, x: i32, y: i32) -> Option<u32> {
        let mut x = x;
        if let Some(clip) = self.clip {
            if y < clip.y1 || y >= clip.y2 {
                return None;
            }
            x = x.clamp(clip.x1 - 1, clip.x2);
        }

        let slot = self.row_slot(y);
        let mut prev: Option<u32> = None;
        let mut it = self.rows[slot];
        while let Some(i) = it {
            let cell = &self.cells[i as usize];
            if cell.x > x {
                break;
            }
            if cell.x == x {
                return Some(i);
            }
            prev = Some(i);
            it = cell.next;
        }

        let idx = self.cells.len() as u32;
        self.cells.push(CellAa { x, cover: 0, area: 0, next: it });
        match prev {
            Some(p) => self.cells[p as usize].next = Some(idx),
            None => self.rows[slot] = Some(idx),
        }
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        Some(idx)
    }

    /// Add the pending area and cover into the arena.
    fn add_curr_cell(&mut self) {
        if self.area != 0 || self.cover != 0 {
            if let Some(i) = self.find_cell(self.curr_x, self.curr_y) {
                let cell = &mut self.cells[i as usize];
                cell.area += self.area;
                cell.cover += self.cover;
            }
            self.area = 0;
            self.cover = 0;
        }
    }

    #[inline]
    fn set_curr_cell(&mut self, x: i32, y: i32) {
        if self.curr_x != x || self.curr_y != y {
            self.add_curr_cell();
            self.curr_x = x;
            self.curr_y = y;
        }
    }

    /// Save the cell still being accumulated. Call before sweeping.
    pub fn flush(&mut self) {
        self.add_curr_cell();
        self.curr_x = i32::MAX;
        self.curr_y = i32::MAX;
    }

    // ========================================================================
    // Lines (24.8)
    // ========================================================================

    /// Part of an edge inside pixel row `ey`, from `(x1, y1)` to
    /// `(x2, y2)` where `y1`, `y2` are fractions of the row.
    fn render_hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = x1 >> PIXEL_BITS;
        let ex2 = x2 >> PIXEL_BITS;
        let fx1 = x1 & PIXEL_MASK;
        let fx2 = x2 & PIXEL_MASK;

        // Flat: contributes nothing, but the pen moves.
        if y1 == y2 {
            self.set_curr_cell(ex2, ey);
            return;
        }

        if ex1 == ex2 {
            let delta = y2 - y1;
            self.cover += delta;
            self.area += (fx1 + fx2) * delta;
            return;
        }

        // Crosses several columns: step through them, splitting the height
        // in proportion with an error term.
        let dy = (y2 - y1) as i64;
        let mut dx = x2 as i64 - x1 as i64;
        let (p, first, incr) = if dx < 0 {
            dx = -dx;
            (fx1 as i64 * dy, 0, -1)
        } else {
            ((PIXEL_SCALE - fx1) as i64 * dy, PIXEL_SCALE, 1)
        };

        let (mut delta, mut rem) = floor_div(p, dx);
        self.cover += delta;
        self.area += (fx1 + first) * delta;

        let mut ex = ex1 + incr;
        self.set_curr_cell(ex, ey);
        let mut y = y1 + delta;

        if ex != ex2 {
            let (lift, step_rem) =
                floor_div(PIXEL_SCALE as i64 * (y2 - y + delta) as i64, dx);
            rem -= dx;
            while ex != ex2 {
                delta = lift;
                rem += step_rem;
                if rem >= 0 {
                    rem -= dx;
                    delta += 1;
                }
                self.cover += delta;
                self.area += PIXEL_SCALE * delta;
                y += delta;
                ex += incr;
                self.set_curr_cell(ex, ey);
            }
        }

        delta = y2 - y;
        self.cover += delta;
        self.area += (fx2 + PIXEL_SCALE - first) * delta;
    }

    /// Render an edge given in 24.8.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 as i64 - x1 as i64;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((x1 as i64 + x2 as i64) >> 1) as i32;
            let cy = ((y1 as i64 + y2 as i64) >> 1) as i32;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }

        let dy = y2 as i64 - y1 as i64;
        let ex1 = x1 >> PIXEL_BITS;
        let mut ey1 = y1 >> PIXEL_BITS;
        let ey2 = y2 >> PIXEL_BITS;
        let fy1 = y1 & PIXEL_MASK;
        let fy2 = y2 & PIXEL_MASK;

        self.set_curr_cell(ex1, ey1);

        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        let (first, incr) = if dy < 0 { (0, -1) } else { (PIXEL_SCALE, 1) };

        // Vertical: same column all the way, constant area per row.
        if dx == 0 {
            let two_fx = (x1 & PIXEL_MASK) << 1;

            let mut delta = first - fy1;
            self.cover += delta;
            self.area += two_fx * delta;
            ey1 += incr;
            self.set_curr_cell(ex1, ey1);

            delta = first + first - PIXEL_SCALE;
            while ey1 != ey2 {
                self.cover += delta;
                self.area += two_fx * delta;
                ey1 += incr;
                self.set_curr_cell(ex1, ey1);
            }

            delta = fy2 - PIXEL_SCALE + first;
            self.cover += delta;
            self.area += two_fx * delta;
            return;
        }

        // General case: one hline per row crossed.
        let dy_abs = dy.abs();
        let p = if dy < 0 { fy1 as i64 * dx } else { (PIXEL_SCALE - fy1) as i64 * dx };
        let (delta, mut rem) = floor_div(p, dy_abs);

        let mut x_from = x1 + delta;
        self.render_hline(ey1, x1, fy1, x_from, first);
        ey1 += incr;
        self.set_curr_cell(x_from >> PIXEL_BITS, ey1);

        if ey1 != ey2 {
            let (lift, step_rem) = floor_div(PIXEL_SCALE as i64 * dx, dy_abs);
            rem -= dy_abs;
            while ey1 != ey2 {
                let mut delta = lift;
                rem += step_rem;
                if rem >= 0 {
                    rem -= dy_abs;
                    delta += 1;
                }
                let x_to = x_from + delta;
                self.render_hline(ey1, x_from, PIXEL_SCALE - first, x_to, first);
                x_from = x_to;
                ey1 += incr;
                self.set_curr_cell(x_from >> PIXEL_BITS, ey1);
            }
        }
        self.render_hline(ey1, x_from, PIXEL_SCALE - first, x2, fy2);
    }

    // ========================================================================
    // Pen interface (26.6)
    // ========================================================================

    /// Start a new edge chain at `(x, y)` (26.6).
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.pen = Point26 { x, y };
    }

    /// Edge from the pen to `(x, y)` (26.6).
    pub fn line_to(&mut self, x: i32, y: i32) {
        let a = self.pen;
        self.line(
            a.x << UPSCALE_SHIFT,
            a.y << UPSCALE_SHIFT,
            x << UPSCALE_SHIFT,
            y << UPSCALE_SHIFT,
        );
        self.pen = Point26 { x, y };
    }

    fn line_to_point(&mut self, p: Point26) {
        self.line_to(p.x, p.y);
    }

    /// Quadratic from the pen through control `(x1, y1)` to `(x, y)` (26.6).
    pub fn quad_to(&mut self, x1: i32, y1: i32, x: i32, y: i32) {
        let a = self.pen;
        let b = Point26 { x: x1, y: y1 };
        let c = Point26 { x, y };

        let dev = (a.x as i64 - 2 * b.x as i64 + c.x as i64)
            .abs()
            .max((a.y as i64 - 2 * b.y as i64 + c.y as i64).abs());
        let nsplit = split_count(dev / self.split_divisor, 4);

        // Pieces are stored end first; the piece nearest the pen is on top.
        const LEN: usize = 2 * MAX_CURVE_SPLITS as usize + 3;
        let mut stack = [Point26::default(); LEN];
        let mut splits = [0u32; MAX_CURVE_SPLITS as usize + 1];
        stack[0] = c;
        stack[1] = b;
        stack[2] = a;
        splits[0] = nsplit;

        let mut i = 0usize;
        loop {
            let s = splits[i];
            if s > 0 {
                let p = &mut stack[2 * i..2 * i + 5];
                p[4] = p[2];
                p[3] = Point26::mid(p[4], p[1]);
                p[1] = Point26::mid(p[0], p[1]);
                p[2] = Point26::mid(p[1], p[3]);
                splits[i] = s - 1;
                splits[i + 1] = s - 1;
                i += 1;
            } else {
                let p = &stack[2 * i..2 * i + 3];
                let mid = Point26::weighted(&[(p[0], 1), (p[1], 2), (p[2], 1)], 4);
                let end = p[0];
                self.line_to_point(mid);
                self.line_to_point(end);
                if i == 0 {
                    break;
                }
                i -= 1;
            }
        }
    }

    /// Cubic from the pen through `(x1, y1)`, `(x2, y2)` to `(x, y)` (26.6).
    pub fn cubic_to(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, x: i32, y: i32) {
        let a = self.pen;
        let b = Point26 { x: x1, y: y1 };
        let c = Point26 { x: x2, y: y2 };
        let d = Point26 { x, y };

        let second_diff = |p: Point26, q: Point26, r: Point26| {
            (p.x as i64 - 2 * q.x as i64 + r.x as i64)
                .abs()
                .max((p.y as i64 - 2 * q.y as i64 + r.y as i64).abs())
        };
        let dev = 3 * second_diff(a, b, c).max(second_diff(b, c, d));
        let nsplit = split_count(dev / self.split_divisor, 4);

        const LEN: usize = 3 * MAX_CURVE_SPLITS as usize + 4;
        let mut stack = [Point26::default(); LEN];
        let mut splits = [0u32; MAX_CURVE_SPLITS as usize + 1];
        stack[0] = d;
        stack[1] = c;
        stack[2] = b;
        stack[3] = a;
        splits[0] = nsplit;

        let mut i = 0usize;
        loop {
            let s = splits[i];
            if s > 0 {
                let p = &mut stack[3 * i..3 * i + 7];
                let m01 = Point26::mid(p[0], p[1]);
                let m12 = Point26::mid(p[1], p[2]);
                let m23 = Point26::mid(p[2], p[3]);
                p[6] = p[3];
                p[5] = m23;
                p[1] = m01;
                p[2] = Point26::mid(m01, m12);
                p[4] = Point26::mid(m12, m23);
                p[3] = Point26::mid(p[2], p[4]);
                splits[i] = s - 1;
                splits[i + 1] = s - 1;
                i += 1;
            } else {
                let p = &stack[3 * i..3 * i + 4];
                let mid = Point26::weighted(&[(p[0], 1), (p[1], 3), (p[2], 3), (p[3], 1)], 8);
                let end = p[0];
                self.line_to_point(mid);
                self.line_to_point(end);
                if i == 0 {
                    break;
                }
                i -= 1;
            }
        }
    }
}

impl Default for RasterizerCellsAa {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Row iteration
// ============================================================================

/// Cells of one row, left to right.
pub struct RowCells<'a> {
    cells: &'a [CellAa],
    next: Option<u32>,
}

impl<'a> Iterator for RowCells<'a> {
    type Item = &'a CellAa;

    fn next(&mut self) -> Option<&'a CellAa> {
        let cell = self.cells.get(self.next? as usize)?;
        self.next = cell.next;
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: i32 = INPUT_SUBPIXEL_SCALE;

    fn row_cover(ras: &RasterizerCellsAa, y: i32) -> i32 {
        ras.row(y).map(|c| c.cover).sum()
    }

    fn total_cover(ras: &RasterizerCellsAa) -> i32 {
        let Some((y0, y1)) = ras.row_range() else {
            return 0;
        };
        (y0..=y1).map(|y| row_cover(ras, y)).sum()
    }

    #[test]
    fn test_new_is_empty() {
        let ras = RasterizerCellsAa::new();
        assert_eq!(ras.total_cells(), 0);
        assert!(ras.row_range().is_none());
        assert!(ras.x_range().is_none());
    }

    #[test]
    fn test_floor_div() {
        assert_eq!(floor_div(7, 2), (3, 1));
        assert_eq!(floor_div(-7, 2), (-4, 1));
        assert_eq!(floor_div(-8, 2), (-4, 0));
    }

    #[test]
    fn test_split_count() {
        assert_eq!(split_count(0, 4), 0);
        assert_eq!(split_count(3, 4), 1);
        assert_eq!(split_count(4, 4), 2);
        assert_eq!(split_count(i64::MAX, 4), MAX_CURVE_SPLITS);
    }

    #[test]
    fn test_horizontal_line_no_cells() {
        let mut ras = RasterizerCellsAa::new();
        ras.move_to(0, 10 * S);
        ras.line_to(8 * S, 10 * S);
        ras.flush();
        assert_eq!(ras.total_cells(), 0);
    }

    #[test]
    fn test_vertical_line_cover() {
        let mut ras = RasterizerCellsAa::new();
        let x = 10 * S + S / 2;
        ras.move_to(x, 5 * S);
        ras.line_to(x, 8 * S);
        ras.flush();
        assert_eq!(ras.row_range(), Some((5, 7)));
        for y in 5..8 {
            let cells: Vec<_> = ras.row(y).collect();
            assert_eq!(cells.len(), 1);
            assert_eq!(cells[0].x, 10);
            assert_eq!(cells[0].cover, PIXEL_SCALE);
            // Half of the pixel lies left of the edge.
            assert_eq!(cells[0].area, PIXEL_SCALE * PIXEL_SCALE);
        }
        assert_eq!(total_cover(&ras), 3 * PIXEL_SCALE);
    }

    #[test]
    fn test_upward_line_negative_cover() {
        let mut ras = RasterizerCellsAa::new();
        ras.move_to(3 * S, 6 * S);
        ras.line_to(3 * S, 2 * S);
        ras.flush();
        assert_eq!(total_cover(&ras), -4 * PIXEL_SCALE);
    }

    #[test]
    fn test_diagonal_cover_sum() {
        let mut ras = RasterizerCellsAa::new();
        ras.move_to(0, 0);
        ras.line_to(5 * S, 5 * S);
        ras.flush();
        assert_eq!(total_cover(&ras), 5 * PIXEL_SCALE);
        assert_eq!(ras.x_range(), Some((0, 4)));
    }

    #[test]
    fn test_row_cells_sorted_and_merged() {
        let mut ras = RasterizerCellsAa::new();
        // Two edges through the same pixels: cells are shared.
        for _ in 0..2 {
            ras.move_to(10 * S, 0);
            ras.line_to(0, S);
        }
        ras.move_to(S / 2, 0);
        ras.line_to(S / 2, S);
        ras.flush();
        let xs: Vec<i32> = ras.row(0).map(|c| c.x).collect();
        let mut sorted = xs.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(xs, sorted);
        assert_eq!(row_cover(&ras, 0), 3 * PIXEL_SCALE);
    }

    #[test]
    fn test_rows_grow_both_ways() {
        let mut ras = RasterizerCellsAa::new();
        ras.move_to(0, 10 * S);
        ras.line_to(0, 11 * S);
        ras.move_to(0, -3 * S);
        ras.line_to(0, -2 * S);
        ras.flush();
        assert_eq!(ras.row_range(), Some((-3, 10)));
        assert_eq!(row_cover(&ras, -3), PIXEL_SCALE);
        assert_eq!(row_cover(&ras, 10), PIXEL_SCALE);
        assert_eq!(ras.row(0).count(), 0);
        assert_eq!(ras.row(100).count(), 0);
    }

    #[test]
    fn test_clip_rows_and_left_carrier() {
        let mut ras = RasterizerCellsAa::new();
        ras.set_clip_box(Some(RectI::new(2, 0, 6, 4)));
        ras.move_to(0, 0);
        ras.line_to(0, 8 * S);
        ras.flush();
        // Rows below the box are gone; the edge left of the box lands in
        // the carrier column.
        assert_eq!(ras.row_range(), Some((0, 3)));
        let cells: Vec<_> = ras.row(1).collect();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].x, 1);
        assert_eq!(cells[0].cover, PIXEL_SCALE);
    }

    #[test]
    fn test_large_dx_subdivision() {
        let mut ras = RasterizerCellsAa::new();
        ras.move_to(0, 0);
        ras.line_to(20000 * S, S);
        ras.flush();
        assert_eq!(total_cover(&ras), PIXEL_SCALE);
    }

    #[test]
    fn test_quad_cover_matches_height() {
        let mut ras = RasterizerCellsAa::new();
        ras.move_to(0, 0);
        ras.quad_to(40 * S, 10 * S, 0, 20 * S);
        ras.flush();
        assert_eq!(total_cover(&ras), 20 * PIXEL_SCALE);
        let (_, max_x) = ras.x_range().unwrap();
        // The curve reaches x = 20 at its middle.
        assert!((18..=20).contains(&max_x));
    }

    #[test]
    fn test_cubic_cover_matches_height() {
        let mut ras = RasterizerCellsAa::new();
        ras.move_to(0, 0);
        ras.cubic_to(30 * S, 5 * S, -30 * S, 15 * S, 0, 20 * S);
        ras.flush();
        assert_eq!(total_cover(&ras), 20 * PIXEL_SCALE);
    }

    #[test]
    fn test_curves_at_coordinate_limit() {
        // Largest 26.6 magnitude the scanline rasterizer passes in.
        const L: i32 = 1 << 28;
        let mut ras = RasterizerCellsAa::new();
        ras.move_to(L, 0);
        ras.cubic_to(L, 5 * S, L, 10 * S, L, 20 * S);
        ras.move_to(-L, 20 * S);
        ras.quad_to(-L, 10 * S, -L, 0);
        ras.flush();
        assert_eq!(ras.x_range(), Some((-L >> INPUT_SUBPIXEL_SHIFT, L >> INPUT_SUBPIXEL_SHIFT)));
        assert_eq!(ras.row_range(), Some((0, 19)));
        for y in 0..20 {
            let cells: Vec<_> = ras.row(y).collect();
            assert_eq!(cells.len(), 2);
            assert_eq!(cells[0].cover, -PIXEL_SCALE);
            assert_eq!(cells[1].cover, PIXEL_SCALE);
        }
    }

    #[test]
    fn test_weighted_midpoint() {
        let l = Point26 { x: 1 << 28, y: -(1 << 28) };
        assert_eq!(Point26::weighted(&[(l, 1), (l, 3), (l, 3), (l, 1)], 8), l);
        let a = Point26 { x: 0, y: 8 };
        let b = Point26 { x: 16, y: 0 };
        assert_eq!(Point26::weighted(&[(a, 1), (b, 2), (a, 1)], 4), Point26 { x: 8, y: 4 });
    }

    #[test]
    fn test_reset() {
        let mut ras = RasterizerCellsAa::new();
        ras.move_to(0, 0);
        ras.line_to(S, 4 * S);
        ras.flush();
        assert!(ras.total_cells() > 0);
        ras.reset();
        assert_eq!(ras.total_cells(), 0);
        assert!(ras.row_range().is_none());
    }
}
