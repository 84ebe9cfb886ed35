use imv_types::{EvalErrorKind, Position};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn ints(values: &[i32]) -> Value {
    Value::list(
        Some(VariableType::int()),
        values.iter().map(|n| Some(Value::Int(*n))).collect(),
    )
}

#[test]
fn test_widening() {
    assert_eq!(
        evaluate_binary(Value::Byte(2), Value::Int(3), BinaryOp::Add).unwrap(),
        Value::Int(5)
    );
    assert_eq!(
        evaluate_binary(Value::Int(1), Value::Double(0.5), BinaryOp::Add).unwrap(),
        Value::Double(1.5)
    );
    assert_eq!(
        evaluate_binary(Value::Long(7), Value::Float(2.0), BinaryOp::Div).unwrap(),
        Value::Float(3.5)
    );
}

#[test]
fn test_integer_wrapping() {
    assert_eq!(
        evaluate_binary(Value::Byte(127), Value::Byte(1), BinaryOp::Add).unwrap(),
        Value::Byte(-128)
    );
    assert_eq!(
        evaluate_binary(Value::Int(i32::MAX), Value::Int(2), BinaryOp::Mul).unwrap(),
        Value::Int(-2)
    );
    assert_eq!(
        evaluate_binary(Value::Int(i32::MIN), Value::Int(-1), BinaryOp::Div).unwrap(),
        Value::Int(i32::MIN)
    );
}

#[test]
fn test_division_by_zero() {
    for op in [BinaryOp::Div, BinaryOp::Rem] {
        let err = evaluate_binary(Value::Int(1), Value::Int(0), op).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    }
    assert_eq!(
        evaluate_binary(Value::Double(1.0), Value::Double(0.0), BinaryOp::Div).unwrap(),
        Value::Double(f64::INFINITY)
    );
}

#[test]
fn test_shifts_mask_amount() {
    assert_eq!(
        evaluate_binary(Value::Int(1), Value::Int(33), BinaryOp::Shl).unwrap(),
        Value::Int(2)
    );
    assert_eq!(
        evaluate_binary(Value::Byte(-128), Value::Byte(7), BinaryOp::Shr).unwrap(),
        Value::Byte(-1)
    );
    assert_eq!(
        evaluate_binary(Value::Long(1), Value::Long(40), BinaryOp::Shl).unwrap(),
        Value::Long(1 << 40)
    );
}

#[test]
fn test_bitwise_needs_integers() {
    assert_eq!(
        evaluate_binary(Value::Int(0b1100), Value::Int(0b1010), BinaryOp::BitXor).unwrap(),
        Value::Int(0b0110)
    );
    let err = evaluate_binary(Value::Double(1.0), Value::Int(1), BinaryOp::BitAnd).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::IncompatibleType { .. }));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        evaluate_binary(Value::string("ab"), Value::string("cd"), BinaryOp::Add).unwrap(),
        Value::string("abcd")
    );
    let units = Value::list(Some(VariableType::short()), Value::code_units("!"));
    assert_eq!(
        evaluate_binary(Value::string("hi"), units, BinaryOp::Add).unwrap(),
        Value::string("hi!")
    );
}

#[test]
fn test_string_and_number_are_incompatible() {
    let err = evaluate_binary(Value::Int(1), Value::string("a"), BinaryOp::Add).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::IncompatibleType { .. }));
}

#[test]
fn test_list_concatenation_and_count() {
    assert_eq!(
        evaluate_binary(ints(&[1]), ints(&[2, 3]), BinaryOp::Add).unwrap(),
        ints(&[1, 2, 3])
    );
    // A list meets an int at its count.
    assert_eq!(
        evaluate_binary(ints(&[1, 2, 3]), Value::Int(10), BinaryOp::Mul).unwrap(),
        Value::Int(30)
    );
}

#[test]
fn test_map_merge_right_wins() {
    let map = |pairs: &[(&str, i32)]| {
        let entries: IndexMap<Value, Option<Value>> = pairs
            .iter()
            .map(|(k, v)| (Value::string(*k), Some(Value::Int(*v))))
            .collect();
        Value::Map(MapValue::new(
            Some(VariableType::string()),
            Some(VariableType::int()),
            entries,
        ))
    };
    let merged = evaluate_binary(map(&[("a", 1), ("b", 2)]), map(&[("b", 5), ("c", 3)]), BinaryOp::Add)
        .unwrap();
    assert_eq!(merged.to_string(), r#"{{"a" : 1}, {"b" : 5}, {"c" : 3}}"#);
}

#[test]
fn test_position_vectors() {
    let a = Value::Position(Position::new(1.0, 2.0, 3.0));
    let b = Value::Position(Position::new(0.5, 0.5, 0.5));
    assert_eq!(
        evaluate_binary(a.clone(), b.clone(), BinaryOp::Sub).unwrap(),
        Value::Position(Position::new(0.5, 1.5, 2.5))
    );
    assert!(evaluate_binary(a.clone(), b, BinaryOp::Mul).is_err());
    assert_eq!(
        evaluate_unary(a, UnaryOp::Neg).unwrap(),
        Value::Position(Position::new(-1.0, -2.0, -3.0))
    );
}

#[test]
fn test_unary_negation() {
    assert_eq!(evaluate_unary(Value::Short(5), UnaryOp::Neg).unwrap(), Value::Short(-5));
    assert_eq!(
        evaluate_unary(Value::Byte(i8::MIN), UnaryOp::Neg).unwrap(),
        Value::Byte(i8::MIN)
    );
    assert_eq!(
        evaluate_unary(Value::Double(0.25), UnaryOp::Neg).unwrap(),
        Value::Double(-0.25)
    );
    let err = evaluate_unary(Value::string("x"), UnaryOp::Neg).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::IncompatibleType { .. }));
}

#[test]
fn test_range_is_inclusive() {
    let values: Vec<Value> = evaluate_range(Value::Int(2), Value::Int(5)).unwrap().collect();
    assert_eq!(
        values,
        vec![Value::Int(2), Value::Int(3), Value::Int(4), Value::Int(5)]
    );
    let values: Vec<Value> = evaluate_range(Value::Byte(1), Value::Long(2)).unwrap().collect();
    assert_eq!(values, vec![Value::Long(1), Value::Long(2)]);
    assert_eq!(evaluate_range(Value::Int(3), Value::Int(1)).unwrap().count(), 0);
    assert!(evaluate_range(Value::Double(0.0), Value::Int(1)).is_err());
}

proptest! {
    #[test]
    fn int_addition_matches_wrapping(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(
            evaluate_binary(Value::Int(a), Value::Int(b), BinaryOp::Add).unwrap(),
            Value::Int(a.wrapping_add(b))
        );
    }

    #[test]
    fn short_shift_matches_native(a in any::<i16>(), s in 0i16..64) {
        prop_assert_eq!(
            evaluate_binary(Value::Short(a), Value::Short(s), BinaryOp::Shl).unwrap(),
            Value::Short(a.wrapping_shl(s as u32))
        );
    }
}
