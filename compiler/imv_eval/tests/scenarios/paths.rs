use imv_types::EvalErrorKind;
use pretty_assertions::assert_eq;

use crate::common::Session;

fn numbers(values: &str) -> Session {
    let mut session = Session::new();
    session.declare("l", "list<int>");
    session.set("l", values).unwrap();
    session
}

#[test]
fn set_past_the_end_extends_with_nulls() {
    let mut session = numbers("{1, 2}");
    assert_eq!(session.set("l[5]", "6").unwrap(), 1);
    assert_eq!(session.show("l"), "{1, 2, null, null, null, 6}");
    assert_eq!(session.value("size(l)").to_string(), "6");
}

#[test]
fn remove_last_shrinks_and_middle_nulls() {
    let mut session = numbers("{1, 2, 3}");
    assert_eq!(session.remove("l[2]").unwrap(), 1);
    assert_eq!(session.show("l"), "{1, 2}");

    let mut session = numbers("{1, 2, 3}");
    assert_eq!(session.remove("l[1]").unwrap(), 1);
    assert_eq!(session.show("l"), "{1, null, 3}");
}

#[test]
fn stream_assignment() {
    let mut session = numbers("{0, 0, 0, 0}");
    assert_eq!(session.set("l[1..2]", "7").unwrap(), 2);
    assert_eq!(session.show("l"), "{0, 7, 7, 0}");
    assert_eq!(session.set("l[]", "(1..9) * 10").unwrap(), 4);
    assert_eq!(session.show("l"), "{10, 20, 30, 40}");
}

#[test]
fn stream_into_single_slot_fails() {
    let mut session = numbers("{0}");
    let err = session.set("l[0]", "1..2").unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::MultipleValuesToSingleVariable);
}

#[test]
fn index_expressions_read_other_variables() {
    let mut session = numbers("{5, 6, 7}");
    session.declare("i", "int");
    session.set("i", "2").unwrap();
    assert_eq!(session.set("l[i - 1]", "l[i] * 2").unwrap(), 1);
    assert_eq!(session.show("l"), "{5, 14, 7}");
}

#[test]
fn nested_maps() {
    let mut session = Session::new();
    session.declare("m", "map<string, list<int>>");
    assert_eq!(session.set(r#"m["a"]"#, "{1, 2}").unwrap(), 1);
    assert_eq!(session.set(r#"m["a"][0]"#, "9").unwrap(), 1);
    assert_eq!(session.show(r#"m["a"]"#), "{9, 2}");
    assert_eq!(session.remove(r#"m["a"]"#).unwrap(), 1);
    assert_eq!(session.value("size(m)").to_string(), "0");
}

#[test]
fn entry_halves() {
    let mut session = Session::new();
    session.declare("e", "entry<string, int>");
    session.set("e", r#"{"k" : 1}"#).unwrap();
    assert_eq!(session.set("value(e)", "2").unwrap(), 1);
    assert_eq!(session.show("value(e)"), "2");
    let err = session.remove("key(e)").unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UnableToRemoveFromEntry);
}

#[test]
fn remove_whole_variable() {
    let mut session = numbers("{1}");
    assert_eq!(session.remove("l").unwrap(), 1);
    let err = session.eval("l").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotFound { .. }));
}
