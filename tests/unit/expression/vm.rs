use super::*;
use crate::expression::parser::parse_postfix;

#[test]
fn comparisons_yield_unit_truth_values() {
    let e = parse_postfix("x y <").unwrap();
    assert_eq!(eval(&e, &[1.0, 2.0]).unwrap(), 1.0);
    assert_eq!(eval(&e, &[2.0, 1.0]).unwrap(), 0.0);
}

#[test]
fn select_takes_then_branch_for_positive_condition() {
    let e = parse_postfix("x 10 - y z ?").unwrap();
    assert_eq!(eval(&e, &[11.0, 1.0, 2.0]).unwrap(), 1.0);
    assert_eq!(eval(&e, &[10.0, 1.0, 2.0]).unwrap(), 2.0);
}

#[test]
fn division_by_zero_follows_ieee() {
    let e = parse_postfix("x y /").unwrap();
    assert!(eval(&e, &[1.0, 0.0]).unwrap().is_infinite());
    assert!(eval(&e, &[0.0, 0.0]).unwrap().is_nan());
}

#[test]
fn missing_inputs_are_reported() {
    let e = parse_postfix("x z +").unwrap();
    let err = eval(&e, &[1.0, 2.0]).unwrap_err();
    assert!(err.to_string().contains("reads 3 inputs"));
}

#[test]
fn compiled_program_is_reusable_across_samples() {
    let p = Program::compile(&parse_postfix("x y max 2 pow").unwrap());
    assert_eq!(p.operands(), 2);
    let mut stack = Stack::new();
    assert_eq!(p.eval_with_stack(&[3.0, 1.0], &mut stack).unwrap(), 9.0);
    assert_eq!(p.eval_with_stack(&[1.0, 4.0], &mut stack).unwrap(), 16.0);
}

#[test]
fn logic_operators_treat_positive_as_true() {
    let e = parse_postfix("x y and not").unwrap();
    assert_eq!(eval(&e, &[1.0, 1.0]).unwrap(), 0.0);
    assert_eq!(eval(&e, &[1.0, -1.0]).unwrap(), 1.0);
}
