//! # Vineyard Benchmarks
//!
//! Cold reduction against a vine update over the same step, on triangulated
//! grids of growing size.
//!
//! Run: `cargo bench --bench vineyard_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{array, Array2};
use tda_vineyards::{reduce, vine_update, Complex};

/// `side × side` cells, two triangles each
fn grid(side: usize) -> Complex {
    let n = side + 1;
    let mut points = Array2::zeros((n * n, 2));
    for row in 0..n {
        for col in 0..n {
            // shear keeps distances to the query points distinct
            points[[row * n + col, 0]] = col as f64 + 0.013 * row as f64;
            points[[row * n + col, 1]] = row as f64 + 0.007 * col as f64;
        }
    }
    let mut faces = Vec::new();
    for row in 0..side {
        for col in 0..side {
            let a = row * n + col;
            faces.push([a, a + 1, a + n + 1]);
            faces.push([a, a + n + 1, a + n]);
        }
    }
    Complex::from_triangles(points, &faces).expect("grid is a valid complex")
}

fn bench_cold_vs_vine(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_vs_vine");
    group.sample_size(20);

    for side in [4usize, 8, 12] {
        let complex = grid(side);
        let from = array![side as f64 * 0.5, side as f64 * 0.5];
        let to = array![side as f64 * 0.5 + 0.3, side as f64 * 0.5 - 0.2];
        let start = reduce(&complex, from.view()).expect("reduction succeeds");

        group.bench_with_input(BenchmarkId::new("cold_reduce", side), &side, |b, _| {
            b.iter(|| black_box(reduce(&complex, to.view())))
        });

        group.bench_with_input(BenchmarkId::new("vine_update", side), &side, |b, _| {
            b.iter(|| black_box(vine_update(&complex, &start, to.view())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cold_vs_vine);
criterion_main!(benches);
