//! Casting between value kinds.
//!
//! Direct enum-based dispatch on the target's tag: the type set is fixed,
//! so pattern matching is preferred over per-template caster objects.
//!
//! # Rules
//!
//! - A null value casts to null; no target type passes the value through.
//! - Numeric targets accept anything with a numeric coercion.
//! - Container targets recast every element with the resolved child type.
//!   An unset target child is inferred from the source's child type, then
//!   from the common lowered type of the source's elements. List/iterator
//!   elements and map keys require a type: an empty, untyped source fails.
//! - Anything else is `IncompatibleType(target, source)`.

use indexmap::IndexMap;

use crate::{
    common_type_of, ensure_sufficient_stack, incompatible_type, EntityRef, EntryValue, EvalError,
    EvalResult, IteratorValue, ListValue, MapValue, Tag, Value, VariableType,
};


/// Cast a possibly-null value to a possibly-absent target type.
pub fn cast_variable(
    target: Option<&VariableType>,
    value: Option<Value>,
) -> EvalResult<Option<Value>> {
    match (target, value) {
        (_, None) => Ok(None),
        (None, value) => Ok(value),
        (Some(target), Some(value)) => cast_value(target, value).map(Some),
    }
}

/// Cast a value to `target`.
pub fn cast_value(target: &VariableType, value: Value) -> EvalResult<Value> {
    ensure_sufficient_stack(|| cast_inner(target, value))
}

#[cold]
fn mismatch(target: &VariableType, value: &Value) -> EvalError {
    incompatible_type(target, value.variable_type())
}

fn cast_inner(target: &VariableType, value: Value) -> EvalResult<Value> {
    let converted = match target.tag() {
        Tag::Byte => value.as_byte().map(Value::Byte),
        Tag::Short => value.as_short().map(Value::Short),
        Tag::Int => value.as_int().map(Value::Int),
        Tag::Long => value.as_long().map(Value::Long),
        Tag::Float => value.as_float().map(Value::Float),
        Tag::Double => value.as_double().map(Value::Double),
        Tag::Str => return cast_to_string(target, value),
        Tag::Entity => match &value {
            Value::Entity(entity) => Some(Value::Entity(*entity)),
            Value::Str(text) => EntityRef::parse(text).map(Value::Entity),
            _ => None,
        },
        Tag::Position => match &value {
            Value::Position(position) => Some(Value::Position(*position)),
            _ => None,
        },
        Tag::List => {
            let (elem_type, items) = cast_sequence(target, value)?;
            return Ok(Value::List(ListValue::new(Some(elem_type), items)));
        }
        Tag::Iterator => {
            let (elem_type, items) = cast_sequence(target, value)?;
            return Ok(Value::Iterator(IteratorValue::new(Some(elem_type), items)));
        }
        Tag::Map => return cast_to_map(target, value),
        Tag::Entry => return cast_to_entry(target, value),
    };
    converted.ok_or_else(|| mismatch(target, &value))
}

fn cast_to_string(target: &VariableType, value: Value) -> EvalResult<Value> {
    match value {
        Value::Str(s) => Ok(Value::Str(s)),
        Value::List(list) if is_code_unit_list(&list) => {
            let units: Vec<u16> = list
                .items
                .iter()
                .flatten()
                .filter_map(Value::as_short)
                .map(|unit| unit as u16)
                .collect();
            Ok(Value::Str(String::from_utf16_lossy(&units)))
        }
        Value::List(_) | Value::Map(_) | Value::Entry(_) | Value::Iterator(_) => {
            Err(mismatch(target, &value))
        }
        scalar => Ok(Value::Str(scalar.to_plain_string())),
    }
}

/// A list of shorts, either declared so or holding nothing but shorts.
fn is_code_unit_list(list: &ListValue) -> bool {
    match &list.elem_type {
        Some(elem) => elem.tag() == Tag::Short,
        None => list
            .items
            .iter()
            .all(|item| matches!(item, Some(Value::Short(_)))),
    }
}

/// Split a sequence-like value into its child type and elements.
fn sequence_parts(value: Value) -> Result<(Option<VariableType>, Vec<Option<Value>>), Value> {
    match value {
        Value::List(list) => Ok((list.elem_type, list.items)),
        Value::Iterator(iter) => Ok((iter.elem_type, iter.items)),
        Value::Str(s) => Ok((Some(VariableType::short()), Value::code_units(&s))),
        Value::Map(map) => {
            let elem = VariableType::entry(map.key_type.clone(), map.value_type.clone());
            let items = map.entry_values().map(Some).collect();
            Ok((Some(elem), items))
        }
        other => Err(other),
    }
}

/// Resolve a required child type: the target's, else the source's, else
/// the common type of the elements.
fn resolve_required<'a>(
    target: &VariableType,
    target_child: Option<&VariableType>,
    source_child: Option<VariableType>,
    source_type: &VariableType,
    elements: impl IntoIterator<Item = &'a Value>,
) -> EvalResult<VariableType> {
    if let Some(child) = target_child {
        return Ok(child.clone());
    }
    if let Some(child) = source_child {
        return Ok(child);
    }
    common_type_of(elements)?.ok_or_else(|| incompatible_type(target, source_type))
}

/// Resolve an optional child type; stays unset when nothing is known.
fn resolve_optional<'a>(
    target_child: Option<&VariableType>,
    source_child: Option<VariableType>,
    elements: impl IntoIterator<Item = &'a Value>,
) -> EvalResult<Option<VariableType>> {
    match (target_child, source_child) {
        (Some(child), _) => Ok(Some(child.clone())),
        (None, Some(child)) => Ok(Some(child)),
        (None, None) => common_type_of(elements),
    }
}

fn cast_sequence(
    target: &VariableType,
    value: Value,
) -> EvalResult<(VariableType, Vec<Option<Value>>)> {
    let source_type = value.variable_type();
    let (source_child, items) = sequence_parts(value).map_err(|v| mismatch(target, &v))?;
    let elem_type = resolve_required(
        target,
        target.child(0),
        source_child,
        &source_type,
        items.iter().flatten(),
    )?;
    let items = items
        .into_iter()
        .map(|item| cast_variable(Some(&elem_type), item))
        .collect::<EvalResult<Vec<_>>>()?;
    Ok((elem_type, items))
}

fn cast_to_map(target: &VariableType, value: Value) -> EvalResult<Value> {
    let source_type = value.variable_type();
    let (source_key, source_value, pairs) = match value {
        Value::Map(map) => (
            map.key_type,
            map.value_type,
            map.entries.into_iter().collect::<Vec<_>>(),
        ),
        Value::List(ListValue { elem_type, items })
        | Value::Iterator(IteratorValue { elem_type, items }) => {
            let mut pairs = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Some(Value::Entry(entry)) => match entry.key {
                        Some(key) => pairs.push((key, entry.value)),
                        None => return Err(incompatible_type(target, &source_type)),
                    },
                    _ => return Err(incompatible_type(target, &source_type)),
                }
            }
            let (key, val) = match elem_type {
                Some(elem) if elem.tag() == Tag::Entry => {
                    (elem.child(0).cloned(), elem.child(1).cloned())
                }
                _ => (None, None),
            };
            (key, val, pairs)
        }
        other => return Err(mismatch(target, &other)),
    };

    let key_type = resolve_required(
        target,
        target.child(0),
        source_key,
        &source_type,
        pairs.iter().map(|(key, _)| key),
    )?;
    let value_type = resolve_optional(
        target.child(1),
        source_value,
        pairs.iter().filter_map(|(_, value)| value.as_ref()),
    )?;

    let mut entries = IndexMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        let key = cast_value(&key_type, key)?;
        let value = cast_variable(value_type.as_ref(), value)?;
        entries.insert(key, value);
    }
    Ok(Value::Map(MapValue::new(Some(key_type), value_type, entries)))
}

fn cast_to_entry(target: &VariableType, value: Value) -> EvalResult<Value> {
    let entry = match value {
        Value::Entry(entry) => entry,
        other => return Err(mismatch(target, &other)),
    };
    let EntryValue {
        key_type,
        value_type,
        key,
        value,
    } = *entry;
    let key_type = resolve_optional(target.child(0), key_type, key.as_ref())?;
    let value_type = resolve_optional(target.child(1), value_type, value.as_ref())?;
    let key = cast_variable(key_type.as_ref(), key)?;
    let value = cast_variable(value_type.as_ref(), value)?;
    Ok(Value::Entry(Box::new(EntryValue::new(
        key_type, value_type, key, value,
    ))))
}
