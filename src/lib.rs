//! # vgeom
//!
//! CPU-side 2D vector geometry: paths, curves, stroking and antialiased
//! scan conversion, with no graphics backend.
//!
//! - Quadratic, cubic and conic (rational quadratic) curves
//! - SVG, tangent and oval arcs built from exact conics
//! - Adaptive flattening with an explicit tolerance
//! - Stroking with butt/round/square caps and miter/miter-clip/round/bevel joins
//! - Non-zero and even-odd filling with 8-bit coverage
//!
//! ## Architecture
//!
//! The pipeline has three stages:
//!
//! 1. **Path**: a verb/point stream built with `move_to`, `line_to`,
//!    `quad_to`, `cubic_to`, `conic_to`, arcs and shapes
//! 2. **Stroker**: turns a centerline path into a fillable outline path
//! 3. **Scanline Rasterizer**: accumulates signed area per pixel in fixed
//!    point and sweeps rows into coverage spans for a `Painter`
//!
//! ```
//! use vgeom::math_stroke::{LineCap, StrokeStyle};
//! use vgeom::path_storage::Path;
//! use vgeom::path_stroker::PathStroker;
//! use vgeom::rasterizer_scanline_aa::{RasterizerScanlineAa, SpanCollector};
//!
//! let mut path = Path::new();
//! path.move_to(10.0, 10.0);
//! path.line_to(90.0, 10.0);
//!
//! let style = StrokeStyle::new().with_width(4.0).with_cap(LineCap::Round);
//! let outline = PathStroker::new().stroke(&path, &style, 1.0);
//!
//! let mut ras = RasterizerScanlineAa::new();
//! ras.add_path(&outline);
//! let mut spans = SpanCollector::new();
//! ras.rasterize(&mut spans);
//! assert!(spans.done);
//! ```

// Phase 1: Foundation Types & Math
pub mod basics;
pub mod error;
pub mod math;
pub mod trans_affine;
pub mod vector2;

// Phase 2: Curves & Path Geometry
pub mod bezier_arc;
pub mod bounding_rect;
pub mod conic;
pub mod curves;
pub mod path_arc;
pub mod path_shapes;
pub mod path_storage;

// Phase 3: Stroking
pub mod math_stroke;
pub mod path_stroker;

// Phase 4: Scanline Rasterizer
pub mod rasterizer_cells_aa;
pub mod rasterizer_scanline_aa;
