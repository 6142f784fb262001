use approx::assert_relative_eq;
use mvnad_density::{CholeskyFactor, DenseCholesky, DenseMatrix, Error, Ordering, SparseCholesky, SparseSymmetric};
use proptest::prelude::*;

/// `BᵗB + n·I` from an `n × n` buffer.
fn spd_from(n: usize, b: &[f64]) -> DenseMatrix<f64> {
    DenseMatrix::from_fn(n, n, |i, j| {
        let mut s: f64 = (0..n).map(|p| b[p + i * n] * b[p + j * n]).sum();
        if i == j {
            s += n as f64;
        }
        s
    })
}

/// Diagonally dominant symmetric matrix with the given sparse lower pattern.
fn dominant(n: usize, lower: &[(usize, usize, f64)]) -> SparseSymmetric<f64> {
    let mut diag = vec![1.0; n];
    let mut triplets = Vec::new();
    for &(r, c, v) in lower {
        if r > c {
            diag[r] += v.abs();
            diag[c] += v.abs();
            triplets.push((r, c, v));
        }
    }
    for (i, d) in diag.into_iter().enumerate() {
        triplets.push((i, i, d));
    }
    SparseSymmetric::from_triplets(n, &triplets).unwrap()
}

fn assert_matrix_eq(a: &DenseMatrix<f64>, b: &DenseMatrix<f64>, tol: f64) {
    assert_eq!((a.nrows(), a.ncols()), (b.nrows(), b.ncols()));
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            assert!(
                (a.get(i, j) - b.get(i, j)).abs() <= tol,
                "({i}, {j}): {} vs {}",
                a.get(i, j),
                b.get(i, j)
            );
        }
    }
}

fn mat_vec(a: &DenseMatrix<f64>, x: &[f64]) -> Vec<f64> {
    (0..a.nrows()).map(|i| (0..a.ncols()).map(|j| a.get(i, j) * x[j]).sum()).collect()
}

proptest! {
    #[test]
    fn dense_reconstructs_spd(b in prop::collection::vec(-1.0..1.0_f64, 16)) {
        let a = spd_from(4, &b);
        let f = DenseCholesky::factor(&a).unwrap();
        assert_matrix_eq(&f.reconstruct(), &a, 1e-12);
    }

    #[test]
    fn sparse_reconstructs_spd(
        entries in prop::collection::vec((0..8usize, 0..8usize, -1.0..1.0_f64), 0..20)
    ) {
        let s = dominant(8, &entries);
        for ordering in [Ordering::Natural, Ordering::MinimumDegree] {
            let f = SparseCholesky::factor_with(&s, ordering).unwrap();
            assert_matrix_eq(&f.reconstruct(), &s.to_dense(), 1e-12);
        }
    }

    #[test]
    fn dense_and_sparse_log_det_agree(b in prop::collection::vec(-1.0..1.0_f64, 25)) {
        let a = spd_from(5, &b);
        let dense = DenseCholesky::factor(&a).unwrap();
        let sparse = SparseCholesky::factor(&SparseSymmetric::from_dense(&a).unwrap()).unwrap();
        prop_assert!((dense.log_det() - sparse.log_det()).abs() < 1e-11);
    }
}

#[test]
fn sparse_solve_inverts_the_matrix() {
    let s = dominant(6, &[(1, 0, 0.5), (3, 1, -0.7), (5, 0, 0.3), (4, 2, 0.9), (5, 4, -0.2)]);
    let b = [1.0, -2.0, 0.5, 3.0, 0.0, -1.5];
    for ordering in [Ordering::Natural, Ordering::MinimumDegree] {
        let f = SparseCholesky::factor_with(&s, ordering).unwrap();
        let x = f.solve(&b);
        let back = mat_vec(&s.to_dense(), &x);
        for (u, v) in back.iter().zip(&b) {
            assert_relative_eq!(u, v, epsilon = 1e-12);
        }
    }
}

#[test]
fn dense_solve_matches_sparse_solve() {
    let s = dominant(5, &[(1, 0, 0.5), (2, 1, -0.7), (4, 0, 0.3), (3, 2, 0.9)]);
    let b = [0.3, 1.0, -1.0, 2.0, 0.5];
    let xd = DenseCholesky::factor(&s.to_dense()).unwrap().solve(&b);
    let xs = SparseCholesky::factor(&s).unwrap().solve(&b);
    for (u, v) in xd.iter().zip(&xs) {
        assert_relative_eq!(u, v, epsilon = 1e-12);
    }
}

#[test]
fn permutation_is_a_bijection() {
    let s = dominant(
        7,
        &[(6, 0, 1.0), (6, 1, 1.0), (6, 2, 1.0), (6, 3, 1.0), (5, 4, 0.5), (2, 1, 0.1)],
    );
    let f = SparseCholesky::factor(&s).unwrap();
    let mut perm = f.permutation().unwrap().to_vec();
    perm.sort_unstable();
    assert_eq!(perm, (0..7).collect::<Vec<_>>());
    assert!(DenseCholesky::factor(&s.to_dense()).unwrap().permutation().is_none());
}

#[test]
fn orderings_agree_on_quadratic_forms() {
    let s = dominant(6, &[(5, 0, 1.0), (5, 1, -1.0), (5, 2, 0.5), (5, 3, 0.25), (3, 2, 0.1)]);
    let r = [0.4, -1.0, 2.0, 0.0, 1.5, -0.3];
    let natural = SparseCholesky::factor_with(&s, Ordering::Natural).unwrap();
    let md = SparseCholesky::factor_with(&s, Ordering::MinimumDegree).unwrap();
    let norm = |v: Vec<f64>| v.iter().map(|x| x * x).sum::<f64>();
    assert_relative_eq!(norm(natural.solve_lower(&r)), norm(md.solve_lower(&r)), max_relative = 1e-12);
    assert_relative_eq!(
        norm(natural.mul_lower_transpose(&r)),
        norm(md.mul_lower_transpose(&r)),
        max_relative = 1e-12
    );
    assert_relative_eq!(natural.log_det(), md.log_det(), max_relative = 1e-12);
}

#[test]
fn indefinite_matrix_fails_in_both_storages() {
    let g = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 1.0]]).unwrap();
    assert_eq!(
        DenseCholesky::factor(&g).unwrap_err(),
        Error::NonPositiveDefinite { pivot: 1 }
    );
    let s = SparseSymmetric::from_dense(&g).unwrap();
    for ordering in [Ordering::Natural, Ordering::MinimumDegree] {
        assert!(matches!(
            SparseCholesky::factor_with(&s, ordering),
            Err(Error::NonPositiveDefinite { pivot: 1 })
        ));
    }
}

#[test]
fn rounding_positive_pivots_are_accepted_in_both_storages() {
    // Singular in exact arithmetic; both elimination orders leave a pivot of
    // order 1e-16 that is still positive.
    let g = DenseMatrix::<f64>::from_rows(&[vec![0.5, 1.0], vec![1.0, 2.0]]).unwrap();
    let dense = DenseCholesky::factor(&g).unwrap();
    assert!(dense.l(1, 1) > 0.0);
    assert!(dense.log_det().is_finite());
    let s = SparseSymmetric::from_dense(&g).unwrap();
    for ordering in [Ordering::Natural, Ordering::MinimumDegree] {
        let f = SparseCholesky::factor_with(&s, ordering).unwrap();
        assert!(f.log_det().is_finite());
        assert!(f.log_det() < -30.0);
    }
}

#[test]
fn diagonal_factor_is_elementwise_sqrt() {
    let s = SparseSymmetric::from_triplets(3, &[(0, 0, 4.0), (1, 1, 9.0), (2, 2, 0.25)]).unwrap();
    let f = SparseCholesky::factor(&s).unwrap();
    assert_eq!(f.nnz(), 3);
    assert_relative_eq!(f.log_det(), 9.0_f64.ln(), max_relative = 1e-14);
}

#[test]
fn triplets_sum_duplicates_and_reject_out_of_range() {
    let s = SparseSymmetric::from_triplets(2, &[(0, 0, 1.0), (0, 0, 2.0), (1, 1, 1.0)]).unwrap();
    assert_eq!(s.nnz(), 2);
    assert_eq!(s.to_dense().get(0, 0), 3.0);
    assert!(matches!(
        SparseSymmetric::<f64>::from_triplets(2, &[(2, 0, 1.0)]),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn upper_triangle_entries_are_ignored() {
    let s = SparseSymmetric::from_triplets(2, &[(0, 0, 4.0), (0, 1, 100.0), (1, 0, 2.0), (1, 1, 5.0)])
        .unwrap();
    let f = SparseCholesky::factor(&s).unwrap();
    assert_relative_eq!(f.log_det(), 16.0_f64.ln(), max_relative = 1e-14);
}
