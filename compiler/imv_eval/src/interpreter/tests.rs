use imv_ir::VariableId;
use imv_types::{EvalErrorKind, TypedValue, VariableType};
use pretty_assertions::assert_eq;

use super::*;
use crate::{CollectingSink, DetachedHost, Evaluated, MemoryStore, VariableStore};

fn constant(value: Value) -> Instruction {
    Instruction::LoadConstant(Some(value))
}

fn run(code: &[Instruction], store: &MemoryStore, sink: &CollectingSink) -> EvalResult<Evaluated> {
    let ctx = EvalContext::new(store, &DetachedHost, sink);
    execute(code, ctx).map(Operand::collect)
}

fn run_detached(code: &[Instruction]) -> EvalResult<Evaluated> {
    run(code, &MemoryStore::new(), &CollectingSink::new())
}

#[test]
fn test_arithmetic() {
    let code = [
        constant(Value::Int(6)),
        constant(Value::Int(7)),
        Instruction::Binary(BinaryOp::Mul),
        Instruction::Unary(UnaryOp::Neg),
    ];
    assert_eq!(run_detached(&code).unwrap(), Evaluated::Single(Some(Value::Int(-42))));
}

#[test]
fn test_null_operand() {
    let code = [
        Instruction::LoadConstant(None),
        constant(Value::Int(1)),
        Instruction::Binary(BinaryOp::Add),
    ];
    let err = run_detached(&code).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NullOperand { .. }));
}

#[test]
fn test_unbalanced_code_is_rejected() {
    let err = run_detached(&[Instruction::Binary(BinaryOp::Add)]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidCode { .. }));
    let err = run_detached(&[constant(Value::Int(1)), constant(Value::Int(2))]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidCode { .. }));
    let err = run_detached(&[]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidCode { .. }));
}

#[test]
fn test_load_variable() {
    let mut store = MemoryStore::new();
    let id = VariableId::new("global", "x");
    store
        .set(id.clone(), TypedValue::new(VariableType::int(), Some(Value::Int(4))).unwrap())
        .unwrap();
    let code = [
        Instruction::LoadVariable(id),
        constant(Value::Int(1)),
        Instruction::Binary(BinaryOp::Add),
    ];
    let sink = CollectingSink::new();
    assert_eq!(run(&code, &store, &sink).unwrap(), Evaluated::Single(Some(Value::Int(5))));

    let missing = [Instruction::LoadVariable(VariableId::new("global", "y"))];
    let err = run(&missing, &store, &sink).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotFound { .. }));
}

#[test]
fn test_build_list_lowers_elements() {
    let code = [
        constant(Value::Int(1)),
        constant(Value::Long(2)),
        constant(Value::Double(3.0)),
        Instruction::BuildList { len: 3 },
    ];
    let list = run_detached(&code).unwrap().into_single().unwrap().unwrap();
    assert_eq!(list.to_string(), "{1.0, 2.0, 3.0}");
    assert_eq!(list.variable_type(), VariableType::list(Some(VariableType::double())));
}

#[test]
fn test_build_list_of_nulls_is_untyped() {
    let code = [
        Instruction::LoadConstant(None),
        Instruction::BuildList { len: 1 },
    ];
    let list = run_detached(&code).unwrap().into_single().unwrap().unwrap();
    assert_eq!(list, Value::list(None, vec![None]));
    let empty = run_detached(&[Instruction::BuildList { len: 0 }]).unwrap();
    assert_eq!(empty, Evaluated::Single(Some(Value::list(None, Vec::new()))));
}

#[test]
fn test_entries_build_a_map() {
    let code = [
        constant(Value::string("a")),
        constant(Value::Int(1)),
        Instruction::BuildEntry,
        constant(Value::string("b")),
        constant(Value::Double(2.5)),
        Instruction::BuildEntry,
        Instruction::BuildList { len: 2 },
    ];
    let map = run_detached(&code).unwrap().into_single().unwrap().unwrap();
    assert_eq!(map.to_string(), r#"{{"a" : 1.0}, {"b" : 2.5}}"#);
    assert_eq!(map.variable_type().to_string(), "map<string, double>");
}

#[test]
fn test_range_streams_and_fans_out() {
    let code = [
        constant(Value::Int(1)),
        constant(Value::Int(3)),
        Instruction::Binary(BinaryOp::Range),
        constant(Value::Int(10)),
        Instruction::Binary(BinaryOp::Mul),
    ];
    assert_eq!(
        run_detached(&code).unwrap(),
        Evaluated::Many(vec![
            Some(Value::Int(10)),
            Some(Value::Int(20)),
            Some(Value::Int(30))
        ])
    );
}

#[test]
fn test_stream_errors_are_skipped() {
    // 10 / (-1..1): the zero divisor is dropped.
    let code = [
        constant(Value::Int(10)),
        constant(Value::Int(-1)),
        constant(Value::Int(1)),
        Instruction::Binary(BinaryOp::Range),
        Instruction::Binary(BinaryOp::Div),
    ];
    let sink = CollectingSink::new();
    let result = run(&code, &MemoryStore::new(), &sink).unwrap();
    assert_eq!(
        result,
        Evaluated::Many(vec![Some(Value::Int(-10)), Some(Value::Int(10))])
    );
    let errors = sink.take();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, EvalErrorKind::DivisionByZero);
}

#[test]
fn test_all_concatenates() {
    let code = [
        constant(Value::Int(1)),
        constant(Value::Int(2)),
        constant(Value::Int(3)),
        Instruction::Binary(BinaryOp::Range),
        Instruction::Call {
            builtin: Builtin::All,
            argc: 2,
        },
    ];
    assert_eq!(
        run_detached(&code).unwrap(),
        Evaluated::Many(vec![
            Some(Value::Int(1)),
            Some(Value::Int(2)),
            Some(Value::Int(3))
        ])
    );
}

#[test]
fn test_all_keeps_nulls() {
    let code = [
        constant(Value::Int(1)),
        Instruction::LoadConstant(None),
        constant(Value::Int(2)),
        Instruction::Call {
            builtin: Builtin::All,
            argc: 3,
        },
    ];
    assert_eq!(
        run_detached(&code).unwrap(),
        Evaluated::Many(vec![Some(Value::Int(1)), None, Some(Value::Int(2))])
    );
}

#[test]
fn test_indexing_instructions() {
    let list = Value::list(
        Some(VariableType::int()),
        (0..5).map(|n| Some(Value::Int(n * 10))).collect(),
    );
    let code = [
        constant(list.clone()),
        constant(Value::Int(1)),
        constant(Value::Int(2)),
        Instruction::GetRangeIndexedContents,
    ];
    assert_eq!(
        run_detached(&code).unwrap(),
        Evaluated::Many(vec![Some(Value::Int(10)), Some(Value::Int(20))])
    );

    let code = [
        constant(list.clone()),
        constant(Value::Int(9)),
        Instruction::GetOptionalIndexedContents,
    ];
    assert_eq!(run_detached(&code).unwrap(), Evaluated::Many(Vec::new()));

    let code = [
        constant(list),
        Instruction::GetAllContents,
        Instruction::Cast(VariableType::string()),
    ];
    assert_eq!(run_detached(&code).unwrap().values().len(), 5);
}

#[test]
fn test_indexing_a_stream_of_lists() {
    let row = |n: i32| Value::list(Some(VariableType::int()), vec![Some(Value::Int(n))]);
    let code = [
        constant(row(1)),
        constant(row(2)),
        Instruction::Call {
            builtin: Builtin::All,
            argc: 2,
        },
        constant(Value::Int(0)),
        Instruction::GetIndexedContents,
    ];
    assert_eq!(
        run_detached(&code).unwrap(),
        Evaluated::Many(vec![Some(Value::Int(1)), Some(Value::Int(2))])
    );
}
