use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::hint::black_box;
use alumine::{Matrix, Vector};

const SIZES: [usize; 4] = [4, 16, 64, 128];

fn xrng() -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(0x5EED)
}

fn random_matrix(rng: &mut impl Rng, n: usize) -> Matrix<f64> {
    Matrix::new(n, n, |_, _| rng.gen_range(-1.0..1.0))
}

/// 1. DOT PRODUCT (compensated summation cost)
fn bench_dot(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector/dot");
    let mut rng = xrng();

    for &size in &[100, 1_000, 10_000] {
        let a = Vector::new(size, |_| rng.gen_range(-1.0..1.0_f64));
        let b = Vector::new(size, |_| rng.gen_range(-1.0..1.0_f64));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &(a, b), |bench, (a, b)| {
            bench.iter(|| black_box(black_box(a).dot(black_box(b))));
        });
    }
    group.finish();
}

/// 2. MATRIX PRODUCT (serial, or row-parallel with the `rayon` feature)
fn bench_matmul(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix/mul");
    let mut rng = xrng();

    for &n in &SIZES {
        let a = random_matrix(&mut rng, n);
        let b = random_matrix(&mut rng, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(a, b), |bench, (a, b)| {
            bench.iter(|| black_box(black_box(a) * black_box(b)));
        });
    }
    group.finish();
}

/// 3. DETERMINANT AND INVERSE (elimination kernels)
fn bench_elimination(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix/elimination");
    let mut rng = xrng();

    for &n in &SIZES {
        let a = random_matrix(&mut rng, n);
        group.bench_with_input(BenchmarkId::new("determinant", n), &a, |bench, a| {
            bench.iter(|| black_box(black_box(a).determinant()));
        });
        group.bench_with_input(BenchmarkId::new("inverse", n), &a, |bench, a| {
            bench.iter(|| black_box(black_box(a).inverse()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_dot, bench_matmul, bench_elimination);
criterion_main!(benches);
