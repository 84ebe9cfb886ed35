use imv_parse::{compile, parse_type_name, CompileErrorKind, CompileOptions};
use imv_types::{EvalErrorKind, TypeRegistry};
use pretty_assertions::assert_eq;

use crate::common::Session;

fn compile_error(source: &str) -> CompileErrorKind {
    compile(source, &TypeRegistry::new(), &CompileOptions::default())
        .unwrap_err()
        .kind
}

#[test]
fn string_plus_number_is_incompatible() {
    let session = Session::new();
    let err = session.eval(r#"1 + "a""#).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::IncompatibleType { .. }));
}

#[test]
fn unknown_function_names_arity() {
    let kind = compile_error("unknown_fn(1)");
    assert_eq!(
        kind,
        CompileErrorKind::UnknownFunction {
            name: "unknown_fn".to_owned(),
            arity: 1
        }
    );
    assert!(kind.to_string().contains("unknown_fn"));
}

#[test]
fn known_function_with_wrong_arity() {
    assert!(matches!(
        compile_error("abs(1, 2)"),
        CompileErrorKind::UnknownFunction { arity: 2, .. }
    ));
}

#[test]
fn unknown_type() {
    let err = parse_type_name("vector", &TypeRegistry::new()).unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::UnknownType { .. }));
    assert_eq!(
        compile_error("(vector) 1"),
        CompileErrorKind::UnknownType {
            name: "vector".to_owned()
        }
    );
    assert_eq!(
        compile_error("(list<int, int>) {1}"),
        CompileErrorKind::WrongTypeArity {
            name: "list".to_owned(),
            expected: 1,
            found: 2
        }
    );
    assert_eq!(
        compile_error("(map<int>) {1}"),
        CompileErrorKind::WrongTypeArity {
            name: "map".to_owned(),
            expected: 2,
            found: 1
        }
    );
}

#[test]
fn stream_errors_go_to_the_sink() {
    let session = Session::new();
    assert_eq!(session.show("12 / (-1..1)"), "[-12, 12]");
    let errors = session.sink.take();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, EvalErrorKind::DivisionByZero);
}

#[test]
fn missing_variable() {
    let session = Session::new();
    let err = session.eval("nowhere + 1").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotFound { .. }));
}

#[test]
fn out_of_bounds_index() {
    let session = Session::new();
    let err = session.eval("{1, 2}[2]").unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::IndexOutOfBounds { index: 2, len: 2 });
}
