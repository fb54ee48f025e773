// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use escapebrot::{compute_boundary_map, BoundaryConfig, Polynomial, Symmetry, ViewBounds};

fn bench_workers(c: &mut Criterion) {
    let bounds = ViewBounds::new((-2.0, 1.0), (-1.25, 1.25)).unwrap();
    let size = (300, bounds.height_for(300));
    let map = Polynomial::new(2);
    let mut group = c.benchmark_group("boundary_map_workers");
    group.sample_size(10);
    for workers in 1..=num_cpus::get() {
        let config = BoundaryConfig {
            max_iterations: 200,
            workers,
            symmetry: Symmetry::Conjugate,
            ..BoundaryConfig::mandelbrot()
        };
        group.bench_with_input(BenchmarkId::from_parameter(workers), &config, |b, config| {
            b.iter(|| {
                let result = compute_boundary_map(bounds, size, &map, config).unwrap();
                criterion::black_box(result)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_workers);
criterion_main!(benches);
