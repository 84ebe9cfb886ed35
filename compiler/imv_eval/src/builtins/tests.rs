use imv_types::{EvalErrorKind, MapValue};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use smallvec::smallvec;

use super::*;
use crate::{CollectingSink, HostEnvironment, MemoryStore};

struct FixedHost {
    unit: f64,
}

impl HostEnvironment for FixedHost {
    fn select_entities(&self, selector: &str) -> EvalResult<Vec<EntityRef>> {
        match selector {
            "@pigs" => Ok(vec![EntityRef::new(1), EntityRef::new(2)]),
            _ => Ok(Vec::new()),
        }
    }

    fn position_of(&self, entity: EntityRef) -> EvalResult<Position> {
        Ok(Position::new(entity.low_bits() as f64, 64.0, 0.0))
    }

    fn origin(&self) -> Position {
        Position::new(10.0, 20.0, 30.0)
    }

    fn random_unit(&self) -> EvalResult<f64> {
        Ok(self.unit)
    }
}

fn run(builtin: Builtin, args: Slots, host: &dyn HostEnvironment) -> EvalResult<Vec<Option<Value>>> {
    let store = MemoryStore::new();
    let sink = CollectingSink::new();
    let ctx = EvalContext::new(&store, host, &sink);
    let values = match call(builtin, args, ctx)? {
        Fanned::One(value) => vec![value],
        Fanned::Spread(values) => values.collect(),
    };
    Ok(values)
}

fn single(builtin: Builtin, args: Slots) -> Value {
    let host = FixedHost { unit: 0.5 };
    let mut values = run(builtin, args, &host).unwrap();
    assert_eq!(values.len(), 1);
    values.pop().flatten().unwrap()
}

fn scores() -> Value {
    let entries: IndexMap<Value, Option<Value>> = [("a", 1), ("b", 2)]
        .into_iter()
        .map(|(k, v)| (Value::string(k), Some(Value::Int(v))))
        .collect();
    Value::Map(MapValue::new(
        Some(VariableType::string()),
        Some(VariableType::int()),
        entries,
    ))
}

fn ints(values: &[i32]) -> Value {
    Value::list(
        Some(VariableType::int()),
        values.iter().map(|n| Some(Value::Int(*n))).collect(),
    )
}

#[test]
fn test_all_is_not_a_tuple_builtin() {
    let host = FixedHost { unit: 0.5 };
    let err = run(Builtin::All, smallvec![Some(Value::Int(1)), None], &host).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidCode { .. }));
}

#[test]
fn test_entry_halves() {
    let entry = Value::entry(Some(Value::string("k")), Some(Value::Int(7)));
    assert_eq!(single(Builtin::Key, smallvec![Some(entry.clone())]), Value::string("k"));
    assert_eq!(single(Builtin::Value, smallvec![Some(entry)]), Value::Int(7));
    let host = FixedHost { unit: 0.5 };
    let err = run(Builtin::Key, smallvec![Some(Value::Int(1))], &host).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotEntry { .. }));
}

#[test]
fn test_map_streams() {
    let host = FixedHost { unit: 0.5 };
    let keys = run(Builtin::Keys, smallvec![Some(scores())], &host).unwrap();
    assert_eq!(keys, vec![Some(Value::string("a")), Some(Value::string("b"))]);
    let values = run(Builtin::Values, smallvec![Some(scores())], &host).unwrap();
    assert_eq!(values, vec![Some(Value::Int(1)), Some(Value::Int(2))]);
    let entries = run(Builtin::Entries, smallvec![Some(scores())], &host).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[1].as_ref().unwrap().to_string(),
        r#"{"b" : 2}"#
    );
}

#[test]
fn test_list_streams_use_indices() {
    let host = FixedHost { unit: 0.5 };
    let keys = run(Builtin::Keys, smallvec![Some(ints(&[5, 6]))], &host).unwrap();
    assert_eq!(keys, vec![Some(Value::Int(0)), Some(Value::Int(1))]);
    let entries = run(Builtin::Entries, smallvec![Some(ints(&[5]))], &host).unwrap();
    assert_eq!(entries[0].as_ref().unwrap().to_string(), "{0 : 5}");
}

#[test]
fn test_size() {
    assert_eq!(single(Builtin::Size, smallvec![Some(ints(&[1, 2, 3]))]), Value::Int(3));
    assert_eq!(single(Builtin::Size, smallvec![Some(scores())]), Value::Int(2));
    assert_eq!(single(Builtin::Size, smallvec![Some(Value::string("héllo"))]), Value::Int(5));
    let host = FixedHost { unit: 0.5 };
    let err = run(Builtin::Size, smallvec![Some(Value::Int(1))], &host).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotIndexable { .. }));
}

#[test]
fn test_iter_snapshots_maps_as_entries() {
    let iter = single(Builtin::Iter, smallvec![Some(scores())]);
    assert_eq!(iter.variable_type().to_string(), "iterator<entry<string, int>>");
}

#[test]
fn test_type_names() {
    assert_eq!(single(Builtin::Type, smallvec![Some(ints(&[]))]), Value::string("list<int>"));
    assert_eq!(single(Builtin::Type, smallvec![None]), Value::string("null"));
}

#[test]
fn test_abs_min_max() {
    assert_eq!(single(Builtin::Abs, smallvec![Some(Value::Short(-4))]), Value::Short(4));
    assert_eq!(single(Builtin::Abs, smallvec![Some(Value::Int(i32::MIN))]), Value::Int(i32::MIN));
    assert_eq!(
        single(Builtin::Min, smallvec![Some(Value::Int(3)), Some(Value::Double(2.5))]),
        Value::Double(2.5)
    );
    assert_eq!(
        single(Builtin::Max, smallvec![Some(Value::Byte(9)), Some(Value::Long(2))]),
        Value::Long(9)
    );
    assert_eq!(
        single(Builtin::Max, smallvec![Some(Value::string("a")), Some(Value::string("b"))]),
        Value::string("b")
    );
}

#[test]
fn test_null_argument_is_an_error() {
    let host = FixedHost { unit: 0.5 };
    let err = run(Builtin::Min, smallvec![None, Some(Value::Int(1))], &host).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NullOperand { .. }));
}

#[test]
fn test_positions() {
    assert_eq!(
        single(
            Builtin::Pos,
            smallvec![Some(Value::Int(1)), Some(Value::Float(2.5)), Some(Value::Long(-3))]
        ),
        Value::Position(Position::new(1.0, 2.5, -3.0))
    );
    assert_eq!(
        single(Builtin::Here, smallvec![]),
        Value::Position(Position::new(10.0, 20.0, 30.0))
    );
    assert_eq!(
        single(Builtin::EntityPos, smallvec![Some(Value::Entity(EntityRef::new(4)))]),
        Value::Position(Position::new(4.0, 64.0, 0.0))
    );
}

#[test]
fn test_entity_selection() {
    let host = FixedHost { unit: 0.5 };
    let pigs = run(Builtin::Entity, smallvec![Some(Value::string("@pigs"))], &host).unwrap();
    assert_eq!(
        pigs,
        vec![
            Some(Value::Entity(EntityRef::new(1))),
            Some(Value::Entity(EntityRef::new(2)))
        ]
    );
    let id = EntityRef::new(0xabc);
    let by_id = run(Builtin::Entity, smallvec![Some(Value::string(id.to_string()))], &host).unwrap();
    assert_eq!(by_id, vec![Some(Value::Entity(id))]);
}

#[test]
fn test_detached_host_has_no_services() {
    let host = crate::DetachedHost;
    let err = run(Builtin::Random, smallvec![], &host).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Host { .. }));
    let selected = run(Builtin::Entity, smallvec![Some(Value::string("@a"))], &host);
    assert!(selected.is_err());
}

#[test]
fn test_random_range_is_inclusive() {
    let args = || -> Slots { smallvec![Some(Value::Int(1)), Some(Value::Int(6))] };
    let low = run(Builtin::RandomRange, args(), &FixedHost { unit: 0.0 }).unwrap();
    assert_eq!(low, vec![Some(Value::Int(1))]);
    let high = run(Builtin::RandomRange, args(), &FixedHost { unit: 0.999_999 }).unwrap();
    assert_eq!(high, vec![Some(Value::Int(6))]);
    let long = run(
        Builtin::RandomRange,
        smallvec![Some(Value::Byte(0)), Some(Value::Long(10))],
        &FixedHost { unit: 0.5 },
    )
    .unwrap();
    assert_eq!(long, vec![Some(Value::Long(5))]);
    let err = run(
        Builtin::RandomRange,
        smallvec![Some(Value::Int(3)), Some(Value::Int(1))],
        &FixedHost { unit: 0.5 },
    )
    .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Host { .. }));
}
