use approx::assert_relative_eq;
use mvnad::{is_finite, log_mvgamma, record, Active, Dual, Error, Float, OpCode, Scalar};

#[test]
fn polygamma_reference_values() {
    assert_relative_eq!(1.0_f64.polygamma(0), -0.577_215_664_901_533, max_relative = 1e-13);
    assert_relative_eq!(1.0_f64.polygamma(1), 1.644_934_066_848_23, max_relative = 1e-13);
    assert_relative_eq!(1.0_f64.polygamma(2), -2.404_113_806_319_19, max_relative = 1e-13);
    assert_relative_eq!(0.5_f64.polygamma(0), -1.963_510_026_021_42, max_relative = 1e-13);
    assert_relative_eq!(2.5_f64.polygamma(0), 0.703_156_640_645_243, max_relative = 1e-13);
    assert_relative_eq!(2.5_f64.polygamma(1), 0.490_357_756_100_235, max_relative = 1e-13);
    assert_relative_eq!(2.5_f64.polygamma(2), -0.236_204_051_641_727, max_relative = 1e-13);
    assert_relative_eq!(2.5_f32.polygamma(0), 0.703_156_6, max_relative = 1e-6);
}

#[test]
fn polygamma_poles_and_infinities() {
    assert_eq!(0.0_f64.polygamma(1), f64::INFINITY);
    assert!((-2.0_f64).polygamma(0).is_nan());
    assert_eq!(f64::INFINITY.polygamma(0), f64::INFINITY);
    assert_eq!(f64::INFINITY.polygamma(1), 0.0);
    assert!(f64::NAN.polygamma(2).is_nan());
}

#[test]
fn polygamma_at_negative_arguments() {
    assert_relative_eq!((-0.5_f64).polygamma(0), 0.036_489_973_978_576_5, max_relative = 1e-12);
    assert_relative_eq!((-2.3_f64).polygamma(0), 3.317_323_157_561_82, max_relative = 1e-12);
    assert_relative_eq!((-2.3_f64).polygamma(1), 14.725_912_160_961_3, max_relative = 1e-12);
    assert_relative_eq!((-2.3_f64).polygamma(2), 68.713_792_529_270_3, max_relative = 1e-11);
    assert_relative_eq!((-7.25_f64).polygamma(1), 19.610_354_539_293_3, max_relative = 1e-12);
}

#[test]
fn polygamma_far_below_zero_reflects_instead_of_recursing() {
    // Half-integers: cot(πx) = 0 and sin²(πx) = 1.
    let x = -1.0e12 - 0.5;
    let mirror = 1.0e12 + 1.5;
    assert_relative_eq!(x.polygamma(0), mirror.polygamma(0), max_relative = 1e-14);
    assert_relative_eq!(x.polygamma(0), 27.631_021_115_930, max_relative = 1e-12);
    let pi2 = std::f64::consts::PI * std::f64::consts::PI;
    assert_relative_eq!(x.polygamma(1), pi2 - mirror.polygamma(1), max_relative = 1e-14);
    assert!(x.polygamma(2).abs() < 1e-14);

    let (tape, _) = record(|v| v[0].lgamma(), &[x]).unwrap();
    let g = tape.gradient(&[x], 0).unwrap();
    let h = tape.hessian(&[x], 0).unwrap();
    assert_relative_eq!(g[0], x.polygamma(0), max_relative = 1e-14);
    assert_relative_eq!(h[0][0], x.polygamma(1), max_relative = 1e-14);
}

#[test]
fn lgamma_on_plain_floats() {
    assert_relative_eq!(2.5_f64.lgamma(), 0.284_682_870_472_919, max_relative = 1e-13);
    assert_relative_eq!(0.3_f64.lgamma(), 1.095_797_994_818_08, max_relative = 1e-13);
    assert_eq!(0.0_f64.lgamma(), f64::INFINITY);
}

#[test]
fn dual_lgamma_carries_digamma() {
    let d = Dual::variable(2.5_f64).lgamma();
    assert_relative_eq!(d.re, 0.284_682_870_472_919, max_relative = 1e-13);
    assert_relative_eq!(d.eps, 0.703_156_640_645_243, max_relative = 1e-13);
}

#[test]
fn log_mvgamma_of_order_one_is_lgamma() {
    for v in [0.3, 1.0, 2.5, 7.25] {
        assert_relative_eq!(log_mvgamma(v, 1), v.lgamma(), max_relative = 1e-15);
    }
}

#[test]
fn log_mvgamma_of_order_two() {
    // ½·ln π + lgamma(3) + lgamma(2.5)
    let expected = 0.572_364_942_924_700_1 + std::f64::consts::LN_2 + 0.284_682_870_472_919;
    assert_relative_eq!(log_mvgamma(3.0_f64, 2), expected, max_relative = 1e-13);
}

#[test]
fn log_mvgamma_records_and_differentiates() {
    let (tape, value) = record(|x| log_mvgamma(x[0], 2), &[3.0]).unwrap();
    assert_relative_eq!(value, log_mvgamma(3.0, 2), max_relative = 1e-15);
    let g = tape.gradient(&[3.0], 0).unwrap();
    assert_relative_eq!(g[0], 3.0_f64.polygamma(0) + 2.5_f64.polygamma(0), max_relative = 1e-13);
}

#[test]
fn log_mvgamma_pole_fails_validation() {
    let (tape, value) = record(|x| log_mvgamma(x[0], 2), &[0.5_f64]).unwrap();
    assert!(value.is_infinite());
    assert!(matches!(
        tape.validate(),
        Err(Error::NonFiniteIntermediate {
            opcode: OpCode::Lgamma,
            ..
        })
    ));
}

#[test]
fn finiteness_predicate_on_every_backend() {
    for v in [0.0, -3.5, f64::MAX, f64::MIN_POSITIVE] {
        assert!(is_finite(&v));
        assert!(is_finite(&Dual::constant(v)));
        assert!(is_finite(&Active::constant(v)));
    }
    for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(!is_finite(&v));
        assert!(!is_finite(&Dual::variable(v)));
        assert!(!is_finite(&Active::constant(v)));
    }
    assert!(!is_finite(&f32::NAN));
    assert!(is_finite(&<f32 as Scalar>::lit(1.5)));
}
