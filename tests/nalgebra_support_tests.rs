#![cfg(feature = "nalgebra")]

use approx::assert_relative_eq;
use mvnad::nalgebra_support::{
    grad_nalgebra, jacobian_nalgebra, tape_forward_nalgebra, tape_hessian_nalgebra, tape_jacobian_nalgebra,
};
use mvnad::record_multi;
use nalgebra::DVector;

#[test]
fn gradient_as_dvector() {
    let x = DVector::from_vec(vec![2.0, 3.0]);
    let (val, g) = grad_nalgebra(|v| v[0] * v[0] * v[1], &x).unwrap();
    assert_eq!(val, 12.0);
    assert_relative_eq!(g[0], 12.0);
    assert_relative_eq!(g[1], 4.0);
}

#[test]
fn jacobian_is_row_major_per_output() {
    let x = DVector::from_vec(vec![2.0_f64, 3.0]);
    let j = jacobian_nalgebra(|v| vec![v[0] * v[1], v[1].ln()], &x).unwrap();
    assert_eq!(j.shape(), (2, 2));
    assert_relative_eq!(j[(0, 0)], 3.0);
    assert_relative_eq!(j[(0, 1)], 2.0);
    assert_relative_eq!(j[(1, 0)], 0.0);
    assert_relative_eq!(j[(1, 1)], 1.0 / 3.0, max_relative = 1e-15);
}

#[test]
fn tape_queries_as_nalgebra() {
    let (tape, _) = record_multi(|v| vec![v[0] * v[0] * v[1]], &[1.0_f32, 1.0]).unwrap();
    let x = DVector::from_vec(vec![2.0_f32, 3.0]);
    assert_eq!(tape_forward_nalgebra(&tape, &x).unwrap()[0], 12.0);
    let j = tape_jacobian_nalgebra(&tape, &x).unwrap();
    assert_eq!(j.shape(), (1, 2));
    assert_eq!(j[(0, 0)], 12.0);
    let h = tape_hessian_nalgebra(&tape, &x, 0).unwrap();
    assert_relative_eq!(h[(0, 0)], 6.0);
    assert_relative_eq!(h[(1, 0)], 4.0);
    assert_relative_eq!(h[(0, 1)], 4.0);
    assert!(tape_hessian_nalgebra(&tape, &x, 1).is_err());
}
