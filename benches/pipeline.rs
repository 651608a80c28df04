use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use vgeom::math_stroke::{LineCap, LineJoin, StrokeStyle};
use vgeom::path_shapes::PathDirection;
use vgeom::path_storage::Path;
use vgeom::path_stroker::PathStroker;
use vgeom::rasterizer_scanline_aa::{RasterizerScanlineAa, Span};

static TOLERANCES: [f64; 4] = [0.05, 0.1, 0.25, 1.0];

fn scene() -> Path {
    let mut p = Path::new();
    for i in 0..20 {
        let x = (i % 5) as f64 * 120.0;
        let y = (i / 5) as f64 * 120.0;
        p.move_to(x, y + 50.0);
        p.cubic_to(x + 30.0, y - 20.0, x + 90.0, y + 120.0, x + 110.0, y + 40.0);
        p.quad_to(x + 60.0, y + 110.0, x + 10.0, y + 90.0);
        p.close();
        p.add_circle(x + 60.0, y + 60.0, 25.0, PathDirection::Ccw);
        p.move_to(x + 5.0, y + 5.0);
        p.svg_arc_to(40.0, 25.0, 20.0, false, true, x + 100.0, y + 15.0)
            .unwrap_or(());
    }
    p
}

fn flatten(c: &mut Criterion) {
    let path = scene();
    let mut g = c.benchmark_group("flatten");
    for tol in &TOLERANCES {
        g.bench_with_input(BenchmarkId::from_parameter(tol), tol, |b, tol| {
            b.iter(|| black_box(path.flatten(*tol)))
        });
    }
    g.finish();
}

fn stroke(c: &mut Criterion) {
    let path = scene();
    let mut stroker = PathStroker::new();
    let mut g = c.benchmark_group("stroke");
    for join in [LineJoin::Miter, LineJoin::Round, LineJoin::Bevel] {
        let style = StrokeStyle::new()
            .with_width(6.0)
            .with_cap(LineCap::Round)
            .with_join(join);
        g.bench_function(format!("{:?}", join), |b| {
            b.iter(|| black_box(stroker.stroke(&path, &style, 1.0)))
        });
    }
    g.finish();
}

fn rasterize(c: &mut Criterion) {
    let path = scene();
    let outline = PathStroker::new().stroke(&path, &StrokeStyle::new().with_width(6.0), 1.0);

    c.bench_function("rasterize fill", |b| {
        b.iter(|| {
            let mut ras = RasterizerScanlineAa::new();
            ras.add_path(&path);
            let mut count = 0usize;
            ras.rasterize(&mut |spans: &[Span], _done: bool| count += spans.len());
            black_box(count)
        })
    });

    c.bench_function("rasterize stroke", |b| {
        b.iter(|| {
            let mut ras = RasterizerScanlineAa::new();
            ras.add_path(&outline);
            let mut count = 0usize;
            ras.rasterize(&mut |spans: &[Span], _done: bool| count += spans.len());
            black_box(count)
        })
    });
}

criterion_group!(benches, flatten, stroke, rasterize);
criterion_main!(benches);
