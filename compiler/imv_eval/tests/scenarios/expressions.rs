use imv_types::Value;
use pretty_assertions::assert_eq;

use crate::common::Session;

#[test]
fn precedence_and_associativity() {
    let session = Session::new();
    assert_eq!(session.value("1 + 2 * 3"), Value::Int(7));
    assert_eq!(session.value("(1 + 2) * 3"), Value::Int(9));
    assert_eq!(session.value("8 - 3 - 2"), Value::Int(3));
    assert_eq!(session.value("1 | 6 & 3 << 1"), Value::Int(7));
    assert_eq!(session.value("-2 * -3"), Value::Int(6));
}

#[test]
fn numeric_kinds_widen() {
    let session = Session::new();
    assert_eq!(session.value("1B + 2S"), Value::Short(3));
    assert_eq!(session.value("7 / 2"), Value::Int(3));
    assert_eq!(session.value("7 / 2.0"), Value::Double(3.5));
    assert_eq!(session.value("0xFF + 1L"), Value::Long(256));
}

#[test]
fn stream_broadcasts_against_single() {
    let session = Session::new();
    assert_eq!(session.show("(1..3) + 10"), "[11, 12, 13]");
    assert_eq!(session.show("10 - (1..3)"), "[9, 8, 7]");
}

#[test]
fn streams_zip_to_the_shorter() {
    let session = Session::new();
    assert_eq!(session.show("(1..3) + all(10, 20)"), "[11, 22]");
}

#[test]
fn all_concatenates_nulls_too() {
    let session = Session::new();
    assert_eq!(session.show("all(1, null, 2)"), "[1, null, 2]");
    assert_eq!(session.show("all(null, 1..2)"), "[null, 1, 2]");
}

#[test]
fn list_literal_lowers_elements() {
    let session = Session::new();
    assert_eq!(session.value("{1, 2L, 3.0}").to_string(), "{1.0, 2.0, 3.0}");
    assert_eq!(session.value("{}").to_string(), "{}");
    assert_eq!(session.value(r#"{"a" : 1}"#).to_string(), r#"{"a" : 1}"#);
    assert_eq!(
        session.value(r#"{{"a" : 1}, {"b" : 2}}"#).to_string(),
        r#"{{"a" : 1}, {"b" : 2}}"#
    );
}

#[test]
fn list_literal_over_a_stream() {
    let session = Session::new();
    assert_eq!(session.show("{1..2, 0}"), "[{1, 0}, {2, 0}]");
}

#[test]
fn casts() {
    let session = Session::new();
    assert_eq!(session.value("(long) 5"), Value::Long(5));
    assert_eq!(session.value("(string) 42"), Value::string("42"));
    assert_eq!(session.value(r#"(int) "17""#), Value::Int(17));
    assert_eq!(session.value("(list<byte>) {1, 2}").to_string(), "{1B, 2B}");
}

#[test]
fn indexing() {
    let session = Session::new();
    assert_eq!(session.value("{10, 20, 30}[1]"), Value::Int(20));
    assert_eq!(session.show("{10, 20, 30}[]"), "[10, 20, 30]");
    assert_eq!(session.show("{10, 20, 30}[1..9]"), "[20, 30]");
    assert_eq!(session.show("{10, 20, 30}[7?]"), "[]");
    assert_eq!(session.value(r#"{{"a" : 1}, {"b" : 2}}["b"]"#), Value::Int(2));
}

#[test]
fn strings() {
    let session = Session::new();
    assert_eq!(session.value(r#""ab" + "cd""#), Value::string("abcd"));
    assert_eq!(session.value(r#""a\tb""#), Value::string("a\tb"));
    assert_eq!(session.value(r#"size("hello")"#), Value::Int(5));
    assert_eq!(session.value("'A'"), Value::Short(65));
}

#[test]
fn builtins() {
    let session = Session::new();
    assert_eq!(session.value("abs(-4)"), Value::Int(4));
    assert_eq!(session.value("max(3, 4.5)"), Value::Double(4.5));
    assert_eq!(session.value("size({1, 2, 3})"), Value::Int(3));
    assert_eq!(session.value(r#"type({"a" : 1})"#), Value::string("entry<string, int>"));
    assert_eq!(session.show(r#"keys({{"a" : 1}, {"b" : 2}})"#), r#"["a", "b"]"#);
    assert_eq!(session.value(r#"value({"a" : 1})"#), Value::Int(1));
    assert_eq!(session.value("random(0, 8)"), Value::Int(2));
    assert_eq!(session.value("here()").to_string(), "(1.0, 2.0, 3.0)");
}

#[test]
fn entity_selection_fans_out() {
    let session = Session::new();
    assert_eq!(session.show(r#"pos(entity("@e"))"#), "[(1.0, 0.0, 0.0), (2.0, 0.0, 0.0)]");
    assert_eq!(session.show(r#"entity("@nobody")"#), "[]");
}

#[test]
fn variables() {
    let mut session = Session::new();
    session.declare("counter", "int");
    session.set("counter", "41").unwrap();
    assert_eq!(session.value("counter + 1"), Value::Int(42));
    assert_eq!(session.value("global:counter * 2"), Value::Int(82));
}
