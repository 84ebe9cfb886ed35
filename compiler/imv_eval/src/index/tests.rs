use imv_types::EvalErrorKind;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use super::*;

fn ints(values: &[i32]) -> Value {
    Value::list(
        Some(VariableType::int()),
        values.iter().map(|n| Some(Value::Int(*n))).collect(),
    )
}

fn record(pairs: &[(&str, i32)]) -> MapValue {
    let entries: IndexMap<Value, Option<Value>> = pairs
        .iter()
        .map(|(k, v)| (Value::string(*k), Some(Value::Int(*v))))
        .collect();
    MapValue::new(Some(VariableType::string()), Some(VariableType::int()), entries)
}

fn values(fanned: Fanned<'_>) -> Vec<Option<Value>> {
    match fanned {
        Fanned::One(value) => vec![value],
        Fanned::Spread(values) => values.collect(),
    }
}

#[test]
fn test_all_contents() {
    let items = values(all_contents(Some(ints(&[1, 2]))).unwrap());
    assert_eq!(items, vec![Some(Value::Int(1)), Some(Value::Int(2))]);
    let map_values = values(all_contents(Some(Value::Map(record(&[("a", 3)])))).unwrap());
    assert_eq!(map_values, vec![Some(Value::Int(3))]);
    let err = all_contents(Some(Value::Int(1))).err().unwrap();
    assert!(matches!(err.kind, EvalErrorKind::NotIndexable { .. }));
    assert!(all_contents(None).is_err());
}

#[test]
fn test_numeric_index() {
    let item = values(indexed(Some(ints(&[4, 5, 6])), Some(Value::Long(1))).unwrap());
    assert_eq!(item, vec![Some(Value::Int(5))]);
    let err = indexed(Some(ints(&[4])), Some(Value::Int(1))).err().unwrap();
    assert_eq!(err.kind, EvalErrorKind::IndexOutOfBounds { index: 1, len: 1 });
    let err = indexed(Some(ints(&[4])), Some(Value::Int(-1))).err().unwrap();
    assert_eq!(err.kind, EvalErrorKind::IndexOutOfBounds { index: -1, len: 1 });
    let err = indexed(Some(ints(&[4])), Some(Value::string("x"))).err().unwrap();
    assert!(matches!(err.kind, EvalErrorKind::IncompatibleType { .. }));
}

#[test]
fn test_map_index_casts_key() {
    let entries: IndexMap<Value, Option<Value>> =
        [(Value::Long(7), Some(Value::string("seven")))].into_iter().collect();
    let map = MapValue::new(Some(VariableType::long()), Some(VariableType::string()), entries);
    let found = values(indexed(Some(Value::Map(map.clone())), Some(Value::Int(7))).unwrap());
    assert_eq!(found, vec![Some(Value::string("seven"))]);
    let err = indexed(Some(Value::Map(map)), Some(Value::Int(8))).err().unwrap();
    assert!(matches!(err.kind, EvalErrorKind::KeyNotFound { .. }));
}

#[test]
fn test_fuzzy_match_over_list_of_maps() {
    let people = Value::list(
        Some(VariableType::map(
            Some(VariableType::string()),
            Some(VariableType::int()),
        )),
        vec![
            Some(Value::Map(record(&[("age", 30), ("team", 1)]))),
            Some(Value::Map(record(&[("age", 41), ("team", 2)]))),
            None,
            Some(Value::Map(record(&[("age", 30), ("team", 2)]))),
        ],
    );
    let pattern = Value::Map(record(&[("age", 30)]));
    let matched = values(indexed(Some(people.clone()), Some(pattern)).unwrap());
    assert_eq!(matched.len(), 2);
    assert_eq!(matched[1], Some(Value::Map(record(&[("age", 30), ("team", 2)]))));

    let nobody = Value::Map(record(&[("age", 30), ("team", 3)]));
    assert!(values(indexed(Some(people), Some(nobody)).unwrap()).is_empty());
}

#[test]
fn test_optional_index_never_fails() {
    let present = values(optionally_indexed(Some(ints(&[9])), Some(Value::Int(0))).unwrap());
    assert_eq!(present, vec![Some(Value::Int(9))]);
    let absent = values(optionally_indexed(Some(ints(&[9])), Some(Value::Int(3))).unwrap());
    assert!(absent.is_empty());
    let not_indexable = values(optionally_indexed(Some(Value::Int(1)), Some(Value::Int(0))).unwrap());
    assert!(not_indexable.is_empty());
}

#[test]
fn test_range_is_inclusive_and_clamped() {
    let list = || Some(ints(&[0, 1, 2, 3, 4]));
    let middle = values(range_indexed(list(), Some(Value::Int(1)), Some(Value::Int(3))).unwrap());
    assert_eq!(middle, vec![Some(Value::Int(1)), Some(Value::Int(2)), Some(Value::Int(3))]);
    let clamped = values(range_indexed(list(), Some(Value::Int(-2)), Some(Value::Int(40))).unwrap());
    assert_eq!(clamped.len(), 5);
    let backwards = values(range_indexed(list(), Some(Value::Int(3)), Some(Value::Int(1))).unwrap());
    assert!(backwards.is_empty());
    assert!(range_indexed(list(), None, Some(Value::Int(1))).is_err());
}

#[test]
fn test_clamp_range_on_empty_list() {
    assert_eq!(clamp_range(&Value::Int(0), &Value::Int(5), 0).unwrap(), 0..0);
}
