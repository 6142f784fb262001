use faer::sparse::{SparseColMat, Triplet};
use faer::Mat;
use mvnad_density::faer_support::{dense_from_faer, dense_to_faer, sparse_from_faer};
use mvnad_density::{dense_mvn_logpdf, sparse_mvn_logpdf, DenseMatrix};

#[test]
fn dense_conversion_keeps_layout() {
    let m = Mat::from_fn(2, 3, |i, j| (10 * i + j) as f64);
    let d = dense_from_faer(&m);
    assert_eq!((d.nrows(), d.ncols()), (2, 3));
    assert_eq!(d.get(1, 2), 12.0);
    assert_eq!(d.as_slice(), &[0.0, 10.0, 1.0, 11.0, 2.0, 12.0]);
    let back = dense_to_faer(&d);
    assert_eq!((back.nrows(), back.ncols()), (2, 3));
    for i in 0..2 {
        for j in 0..3 {
            assert_eq!(back[(i, j)], m[(i, j)]);
        }
    }
}

#[test]
fn sparse_conversion_reads_either_triangle() {
    let full = SparseColMat::<usize, f64>::try_new_from_triplets(
        2,
        2,
        &[
            Triplet::new(0, 0, 0.5),
            Triplet::new(1, 0, 0.1),
            Triplet::new(0, 1, 0.1),
            Triplet::new(1, 1, 2.0),
        ],
    )
    .unwrap();
    let s = sparse_from_faer(&full).unwrap();
    let dense = s.to_dense();
    assert_eq!(dense.get(0, 1), 0.1);
    assert_eq!(dense.get(1, 1), 2.0);

    let x = DenseMatrix::from_rows(&[vec![1.0, 3.0], vec![2.0, 4.0]]).unwrap();
    let mu = DenseMatrix::from_rows(&[vec![0.1], vec![0.3]]).unwrap();
    let a = sparse_mvn_logpdf(&x, &mu, &s, false).unwrap();
    let b = dense_mvn_logpdf(&x, &mu, &dense, false).unwrap();
    for (u, v) in a.iter().zip(&b) {
        assert!((u - v).abs() < 1e-13);
    }
}

#[test]
fn non_square_sparse_is_rejected() {
    let m = SparseColMat::<usize, f64>::try_new_from_triplets(2, 3, &[Triplet::new(0, 0, 1.0)]).unwrap();
    assert!(sparse_from_faer(&m).is_err());
}
