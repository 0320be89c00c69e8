use connector_router::{Path, Rect, Router, RouterConfig, parse_scene};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// A `size` x `size` grid of square obstacles with paths crossing it corner to
/// corner and edge to edge.
fn grid_router(size: i32, paths: usize) -> Router {
    let mut router = Router::new();
    let pitch = 60;
    for row in 0..size {
        for col in 0..size {
            router.add_obstacle(Rect::new(40 + col * pitch, 40 + row * pitch, 30, 30));
        }
    }
    let extent = 40 + size * pitch + 20;
    for i in 0..paths {
        let step = (i as i32 * 7) % extent;
        let path = match i % 4 {
            0 => Path::new((0, step), (extent, extent - step)),
            1 => Path::new((step, 0), (extent - step, extent)),
            2 => Path::new((0, extent - step), (extent, step)),
            _ => Path::new((extent - step, 0), (step, extent)),
        };
        router.add_path(path);
    }
    router
}

fn fixture(name: &str) -> &'static str {
    match name {
        "grid" => include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/grid.json")),
        "shared_corner" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/shared_corner.json"
        )),
        "bend_points" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/bend_points.json5"
        )),
        _ => panic!("unknown fixture"),
    }
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    for (size, paths) in [(3, 4), (5, 12), (8, 24)] {
        let name = format!("grid{size}x{size}_{paths}paths");
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let mut router = grid_router(size, paths);
                let solved = router.solve().expect("solve failed");
                black_box(solved.len());
            });
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let mut router = grid_router(5, 12);
    router.solve().expect("solve failed");
    let moving = Rect::new(1, 1, 10, 10);
    router.add_obstacle(moving);
    group.bench_function("toggle_obstacle", |b| {
        b.iter(|| {
            router.remove_obstacle(black_box(moving));
            router.solve().expect("solve failed");
            router.add_obstacle(black_box(moving));
            let solved = router.solve().expect("solve failed");
            black_box(solved.len());
        });
    });
    group.finish();
}

fn bench_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");
    let config = RouterConfig::default();
    for name in ["grid", "shared_corner", "bend_points"] {
        let scene = parse_scene(fixture(name)).expect("parse failed");
        group.bench_with_input(BenchmarkId::from_parameter(name), &scene, |b, scene| {
            b.iter(|| {
                let dump = scene.route(black_box(&config)).expect("route failed");
                black_box(dump.routes.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_solve, bench_resolve, bench_scene);
criterion_main!(benches);
