use approx::assert_relative_eq;
use mvnad_density::{
    dense_mvn_logpdf, mvn_logpdf, mvn_logpdf_into, sparse_mvn_logpdf, CovarianceFactor, DenseCholesky, DenseMatrix,
    Error, SparseCholesky, SparseSymmetric,
};

const LN_2PI: f64 = 1.837_877_066_409_345_5;

fn rows(r: &[&[f64]]) -> DenseMatrix<f64> {
    DenseMatrix::from_rows(&r.iter().map(|v| v.to_vec()).collect::<Vec<_>>()).unwrap()
}

fn sigma() -> DenseMatrix<f64> {
    rows(&[&[2.0, 0.3, 0.0], &[0.3, 1.0, -0.4], &[0.0, -0.4, 1.5]])
}

/// Inverse of an SPD matrix, column by column.
fn inverse(a: &DenseMatrix<f64>) -> DenseMatrix<f64> {
    let f = DenseCholesky::factor(a).unwrap();
    let n = a.nrows();
    let cols: Vec<Vec<f64>> = (0..n)
        .map(|j| {
            let mut e = vec![0.0; n];
            e[j] = 1.0;
            f.solve(&e)
        })
        .collect();
    DenseMatrix::from_fn(n, n, |i, j| 0.5 * (cols[j][i] + cols[i][j]))
}

fn observations() -> (DenseMatrix<f64>, DenseMatrix<f64>) {
    let x = rows(&[&[0.5, -1.0, 2.0, 0.0], &[1.5, 0.2, -0.3, 1.0], &[-0.7, 0.9, 0.4, 2.5]]);
    let mu = rows(&[&[0.1], &[-0.2], &[0.3]]);
    (x, mu)
}

#[test]
fn univariate_closed_form() {
    let (m, var) = (0.5, 4.0);
    let x = rows(&[&[1.5, -2.0, 0.5]]);
    let mu = rows(&[&[m]]);
    let cov = rows(&[&[var]]);
    let out = dense_mvn_logpdf(&x, &mu, &cov, false).unwrap();
    for (j, v) in out.iter().enumerate() {
        let r = x.get(0, j) - m;
        let expected = -0.5 * LN_2PI - 0.5 * var.ln() - 0.5 * r * r / var;
        assert_relative_eq!(*v, expected, max_relative = 1e-14);
    }

    let prec = rows(&[&[1.0 / var]]);
    let out_prec = dense_mvn_logpdf(&x, &mu, &prec, true).unwrap();
    for (u, v) in out.iter().zip(&out_prec) {
        assert_relative_eq!(u, v, max_relative = 1e-14);
    }
}

#[test]
fn diagonal_covariance_is_a_sum_of_univariates() {
    let vars = [0.5, 2.0, 3.0];
    let diag = DenseMatrix::from_fn(3, 3, |i, j| if i == j { vars[i] } else { 0.0 });
    let (x, mu) = observations();
    let out = dense_mvn_logpdf(&x, &mu, &diag, false).unwrap();
    for (j, v) in out.iter().enumerate() {
        let expected: f64 = (0..3)
            .map(|i| {
                let r = x.get(i, j) - mu.get(i, 0);
                -0.5 * LN_2PI - 0.5 * vars[i].ln() - 0.5 * r * r / vars[i]
            })
            .sum();
        assert_relative_eq!(*v, expected, max_relative = 1e-13);
    }
}

#[test]
fn covariance_and_precision_agree() {
    let (x, mu) = observations();
    let by_cov = dense_mvn_logpdf(&x, &mu, &sigma(), false).unwrap();
    let by_prec = dense_mvn_logpdf(&x, &mu, &inverse(&sigma()), true).unwrap();
    for (u, v) in by_cov.iter().zip(&by_prec) {
        assert_relative_eq!(u, v, max_relative = 1e-12);
    }
}

#[test]
fn dense_and_sparse_agree() {
    let (x, mu) = observations();
    let sparse = SparseSymmetric::from_dense(&sigma()).unwrap();
    for is_prec in [false, true] {
        let d = dense_mvn_logpdf(&x, &mu, &sigma(), is_prec).unwrap();
        let s = sparse_mvn_logpdf(&x, &mu, &sparse, is_prec).unwrap();
        for (u, v) in d.iter().zip(&s) {
            assert_relative_eq!(u, v, max_relative = 1e-13);
        }
    }
}

#[test]
fn per_observation_means() {
    let (x, _) = observations();
    let mu = DenseMatrix::from_fn(3, 4, |i, j| 0.1 * (i + j) as f64);
    let all = dense_mvn_logpdf(&x, &mu, &sigma(), false).unwrap();
    for j in 0..4 {
        let xj = DenseMatrix::from_col_major(3, 1, x.col(j).to_vec()).unwrap();
        let mj = DenseMatrix::from_col_major(3, 1, mu.col(j).to_vec()).unwrap();
        let single = dense_mvn_logpdf(&xj, &mj, &sigma(), false).unwrap();
        assert_relative_eq!(all[j], single[0], max_relative = 1e-14);
    }
}

#[test]
fn density_peaks_at_the_mean() {
    let (_, mu) = observations();
    let at_mean = dense_mvn_logpdf(&mu, &mu, &sigma(), false).unwrap()[0];
    let f = DenseCholesky::factor(&sigma()).unwrap();
    let expected = -1.5 * LN_2PI - 0.5 * mvnad_density::CholeskyFactor::log_det(&f);
    assert_relative_eq!(at_mean, expected, max_relative = 1e-14);
}

#[test]
fn runtime_factor_choice() {
    let (x, mu) = observations();
    let dense = CovarianceFactor::Dense(DenseCholesky::factor(&sigma()).unwrap());
    let sparse = CovarianceFactor::Sparse(
        SparseCholesky::factor(&SparseSymmetric::from_dense(&sigma()).unwrap()).unwrap(),
    );
    let a = mvn_logpdf(&x, &mu, &dense, false).unwrap();
    let b = mvn_logpdf(&x, &mu, &sparse, false).unwrap();
    for (u, v) in a.iter().zip(&b) {
        assert_relative_eq!(u, v, max_relative = 1e-13);
    }

    let mut out = vec![0.0; 4];
    mvn_logpdf_into(&x, &mu, &dense, false, &mut out).unwrap();
    assert_eq!(out, a);
    let mut short = vec![0.0; 3];
    assert!(matches!(
        mvn_logpdf_into(&x, &mu, &dense, false, &mut short),
        Err(Error::DimensionMismatch { what: "output length", .. })
    ));
}

#[test]
fn shape_errors() {
    let (x, mu) = observations();
    let two = rows(&[&[1.0, 0.0], &[0.0, 1.0]]);
    assert!(matches!(
        dense_mvn_logpdf(&x, &mu, &two, false),
        Err(Error::DimensionMismatch { .. })
    ));
    let wide = DenseMatrix::from_col_major(3, 2, vec![0.0; 6]).unwrap();
    assert!(matches!(
        dense_mvn_logpdf(&x, &wide, &sigma(), false),
        Err(Error::DimensionMismatch { what: "mean columns", .. })
    ));
    let non_square = DenseMatrix::from_col_major(3, 2, vec![1.0; 6]).unwrap();
    assert!(matches!(
        dense_mvn_logpdf(&x, &mu, &non_square, false),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn non_finite_inputs_are_rejected_in_order() {
    let (x, mu) = observations();
    let mut xs = x.clone().into_vec();
    xs[5] = f64::NAN;
    let bad_x = DenseMatrix::from_col_major(3, 4, xs).unwrap();
    let bad_mu = rows(&[&[0.0], &[f64::INFINITY], &[0.0]]);

    assert_eq!(
        dense_mvn_logpdf(&bad_x, &mu, &sigma(), false).unwrap_err(),
        Error::NonFiniteInput { what: "observations", index: 5 }
    );
    assert_eq!(
        dense_mvn_logpdf(&x, &bad_mu, &sigma(), false).unwrap_err(),
        Error::NonFiniteInput { what: "mean", index: 1 }
    );
    // Observations are checked before the mean.
    assert_eq!(
        dense_mvn_logpdf(&bad_x, &bad_mu, &sigma(), false).unwrap_err(),
        Error::NonFiniteInput { what: "observations", index: 5 }
    );
}

#[test]
fn zero_observations_give_an_empty_result() {
    let x = DenseMatrix::<f64>::from_col_major(3, 0, Vec::new()).unwrap();
    let (_, mu) = observations();
    assert!(dense_mvn_logpdf(&x, &mu, &sigma(), false).unwrap().is_empty());
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_matches_serial() {
    let (x, mu) = observations();
    let f = DenseCholesky::factor(&sigma()).unwrap();
    let serial = mvn_logpdf(&x, &mu, &f, true).unwrap();
    let par = mvnad_density::mvn_logpdf_par(&x, &mu, &f, true).unwrap();
    assert_eq!(serial, par);
}
