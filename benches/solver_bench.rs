// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use eikonal_fmm::{signed_distance, unsigned_distance, Algorithm, SpeedField};

fn center_seed_2d(n: usize) -> (Vec<[i32; 2]>, Vec<f64>) {
    let c = (n / 2) as i32;
    (vec![[c, c]], vec![0.0])
}

fn square_shell_2d(n: usize) -> (Vec<[i32; 2]>, Vec<f64>) {
    let c = (n / 2) as i32;
    let r = (n / 4) as i32;
    let mut indices = Vec::new();
    for i in (c - r)..=(c + r) {
        for j in (c - r)..=(c + r) {
            if i == c - r || i == c + r || j == c - r || j == c + r {
                indices.push([i, j]);
            }
        }
    }
    let distances = vec![0.0; indices.len()];
    (indices, distances)
}

/// First-order unsigned march, 256^2 homogeneous.
fn bench_unsigned_2d_first_order(c: &mut Criterion) {
    let n = 256;
    let (indices, distances) = center_seed_2d(n);
    c.bench_function("unsigned_2d_256_first", |b| {
        b.iter(|| {
            let buffer = unsigned_distance(
                [n, n],
                [1.0, 1.0],
                SpeedField::Uniform(1.0),
                black_box(&indices),
                black_box(&distances),
                Algorithm::FirstOrder,
            )
            .unwrap();
            black_box(buffer)
        });
    });
}

/// High-order unsigned march, 256^2 homogeneous.
fn bench_unsigned_2d_high_order(c: &mut Criterion) {
    let n = 256;
    let (indices, distances) = center_seed_2d(n);
    c.bench_function("unsigned_2d_256_high", |b| {
        b.iter(|| {
            let buffer = unsigned_distance(
                [n, n],
                [1.0, 1.0],
                SpeedField::Uniform(1.0),
                black_box(&indices),
                black_box(&distances),
                Algorithm::HighOrder,
            )
            .unwrap();
            black_box(buffer)
        });
    });
}

/// Per-cell speed field march, 256^2.
fn bench_unsigned_2d_varying_speed(c: &mut Criterion) {
    let n = 256;
    let (indices, distances) = center_seed_2d(n);
    let speed: Vec<f64> = (0..n * n).map(|i| 1.0 + (i % 7) as f64 * 0.1).collect();
    c.bench_function("unsigned_2d_256_varying", |b| {
        b.iter(|| {
            let buffer = unsigned_distance(
                [n, n],
                [1.0, 1.0],
                SpeedField::Varying(black_box(&speed)),
                black_box(&indices),
                black_box(&distances),
                Algorithm::FirstOrder,
            )
            .unwrap();
            black_box(buffer)
        });
    });
}

/// First-order unsigned march, 64^3 homogeneous.
fn bench_unsigned_3d(c: &mut Criterion) {
    let n = 64;
    let center = (n / 2) as i32;
    let indices = vec![[center, center, center]];
    let distances = vec![0.0];
    c.bench_function("unsigned_3d_64_first", |b| {
        b.iter(|| {
            let buffer = unsigned_distance(
                [n, n, n],
                [1.0, 1.0, 1.0],
                SpeedField::Uniform(1.0),
                black_box(&indices),
                black_box(&distances),
                Algorithm::FirstOrder,
            )
            .unwrap();
            black_box(buffer)
        });
    });
}

/// Signed dual march around a square shell, 128^2.
fn bench_signed_2d(c: &mut Criterion) {
    let n = 128;
    let (indices, distances) = square_shell_2d(n);
    c.bench_function("signed_2d_128_first", |b| {
        b.iter(|| {
            let buffer = signed_distance(
                [n, n],
                [1.0, 1.0],
                SpeedField::Uniform(1.0),
                black_box(&indices),
                black_box(&distances),
                Algorithm::FirstOrder,
            )
            .unwrap();
            black_box(buffer)
        });
    });
}

criterion_group!(
    benches,
    bench_unsigned_2d_first_order,
    bench_unsigned_2d_high_order,
    bench_unsigned_2d_varying_speed,
    bench_unsigned_3d,
    bench_signed_2d,
);
criterion_main!(benches);
