use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mvnad_density::{
    dense_mvn_logpdf, mvn_derivatives, sparse_mvn_logpdf, Covariance, DenseMatrix, MvnTape, SparseSymmetric,
    TapeOptions,
};

/// Tridiagonal SPD covariance of order `k`.
fn tridiagonal(k: usize) -> SparseSymmetric<f64> {
    let mut t = Vec::new();
    for i in 0..k {
        t.push((i, i, 2.5));
        if i + 1 < k {
            t.push((i + 1, i, -1.0));
        }
    }
    SparseSymmetric::from_triplets(k, &t).unwrap()
}

fn block(k: usize, n: usize) -> (DenseMatrix<f64>, DenseMatrix<f64>) {
    let x = DenseMatrix::from_fn(k, n, |i, j| ((i * 7 + j * 3) % 11) as f64 * 0.1 - 0.5);
    let mu = DenseMatrix::from_fn(k, 1, |i, _| 0.01 * i as f64);
    (x, mu)
}

fn bench_direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct");
    for k in [4, 16, 64] {
        let (x, mu) = block(k, 32);
        let s = tridiagonal(k);
        let g = s.to_dense();
        group.bench_with_input(BenchmarkId::new("dense", k), &k, |b, _| {
            b.iter(|| black_box(dense_mvn_logpdf(&x, &mu, black_box(&g), false)))
        });
        group.bench_with_input(BenchmarkId::new("sparse", k), &k, |b, _| {
            b.iter(|| black_box(sparse_mvn_logpdf(&x, &mu, black_box(&s), false)))
        });
    }
    group.finish();
}

fn bench_tape(c: &mut Criterion) {
    let mut group = c.benchmark_group("tape");
    for k in [2, 4, 8] {
        let (x, mu) = block(k, 4);
        let cov = Covariance::Sparse(tridiagonal(k));
        let opts = TapeOptions::default();
        group.bench_with_input(BenchmarkId::new("record", k), &k, |b, _| {
            b.iter(|| black_box(MvnTape::record(&mu, &cov, false, &x, &opts)))
        });
        let tape = MvnTape::record(&mu, &cov, false, &x, &opts).unwrap();
        group.bench_with_input(BenchmarkId::new("jacobian", k), &k, |b, _| {
            b.iter(|| black_box(tape.jacobian(black_box(&x))))
        });
        group.bench_with_input(BenchmarkId::new("hessian", k), &k, |b, _| {
            b.iter(|| black_box(tape.hessian(black_box(&x), 0)))
        });
        group.bench_with_input(BenchmarkId::new("all", k), &k, |b, _| {
            b.iter(|| black_box(mvn_derivatives(&x, &mu, &cov, false, &opts)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_direct, bench_tape);
criterion_main!(benches);
