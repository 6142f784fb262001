#![cfg(feature = "serde")]

use mvnad::{record_multi, Active, BytecodeTape, TapeState};

fn sample() -> BytecodeTape<f64> {
    let f = |x: &[Active<f64>]| vec![(x[0] * x[1]).exp(), x[1].lgamma() - x[0].sqrt()];
    let (mut tape, _) = record_multi(f, &[0.5, 2.0]).unwrap();
    tape.optimize();
    tape.set_check_for_nan(true);
    tape
}

#[test]
fn tape_survives_json() {
    let tape = sample();
    let json = serde_json::to_string(&tape).unwrap();
    let back: BytecodeTape<f64> = serde_json::from_str(&json).unwrap();

    assert_eq!(back.state(), TapeState::Optimized);
    assert!(back.check_for_nan());
    assert_eq!(back.num_ops(), tape.num_ops());
    let x = [1.5, 0.75];
    assert_eq!(back.forward(&x).unwrap(), tape.forward(&x).unwrap());
    assert_eq!(back.jacobian(&x).unwrap(), tape.jacobian(&x).unwrap());
    assert_eq!(back.hessian(&x, 1).unwrap(), tape.hessian(&x, 1).unwrap());
}

#[test]
fn out_of_range_output_is_rejected() {
    let mut v = serde_json::to_value(sample()).unwrap();
    v["output_indices"] = serde_json::json!([0, 999]);
    assert!(serde_json::from_value::<BytecodeTape<f64>>(v).is_err());
}

#[test]
fn forward_reference_is_rejected() {
    let tape = sample();
    let mut v = serde_json::to_value(&tape).unwrap();
    let last = tape.num_ops() - 1;
    v["arg_indices"][last] = serde_json::json!([last, last]);
    assert!(serde_json::from_value::<BytecodeTape<f64>>(v).is_err());
}

#[test]
fn truncated_values_are_rejected() {
    let mut v = serde_json::to_value(sample()).unwrap();
    if let Some(values) = v["values"].as_array_mut() {
        values.pop();
    }
    assert!(serde_json::from_value::<BytecodeTape<f64>>(v).is_err());
}
