use super::*;
use crate::clamp::ClampParams;
use crate::expression::parser::parse_postfix;

const D8: SampleDepth = SampleDepth::Integer(8);

#[test]
fn clamp_expression_runs_over_whole_plane() {
    let src = Plane::new(3, 2, vec![128.0, 128.0, 100.0, 100.0, 50.0, 0.0]).unwrap();
    let flt = Plane::new(3, 2, vec![200.0, 128.5, 103.0, 90.0, 52.0, 0.0]).unwrap();
    let p = ClampParams::new(3.0, 24, D8).unwrap();

    let out = eval_planes(&p.expr(), &[&src, &flt], D8).unwrap();
    assert_eq!(out.get(0, 0), Some(137.0));
    assert_eq!(out.get(1, 0), Some(128.0));
    assert_eq!(out.get(2, 0), Some(103.0));
    assert_eq!(out.get(1, 1), Some(52.0));
    assert_eq!(out.get(2, 1), Some(0.0));
    assert_eq!(out.get(3, 1), None);
}

#[test]
fn results_are_rounded_and_saturated() {
    let a = Plane::filled(4, 4, 250.0);
    let out = eval_planes(&parse_postfix("x 10 +").unwrap(), &[&a], D8).unwrap();
    assert!(out.data.iter().all(|&v| v == 255.0));
}

#[test]
fn mismatched_planes_are_rejected() {
    let a = Plane::filled(4, 4, 1.0);
    let b = Plane::filled(4, 3, 1.0);
    let err = eval_planes(&parse_postfix("x y +").unwrap(), &[&a, &b], D8).unwrap_err();
    assert!(err.to_string().contains("plane dimensions differ"));

    let err = eval_planes(&parse_postfix("x y +").unwrap(), &[&a], D8).unwrap_err();
    assert!(err.to_string().contains("reads 2 planes"));
}

#[test]
fn non_finite_results_are_evaluation_errors() {
    let a = Plane::filled(2, 2, 0.0);
    let err = eval_planes(&parse_postfix("x x /").unwrap(), &[&a], SampleDepth::Float).unwrap_err();
    assert!(matches!(err, crate::foundation::error::XvsError::Evaluation(_)));
}

#[test]
fn plane_constructor_checks_length() {
    assert!(Plane::new(2, 2, vec![0.0; 3]).is_err());
}
