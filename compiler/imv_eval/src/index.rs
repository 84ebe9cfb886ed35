//! Indexing: reading the children of list, iterator and map values.
//!
//! - A numeric index selects one list element; it must be in bounds.
//! - A map index on a list of maps is a pattern: every element map that has
//!   each of the pattern's keys with an equal value matches.
//! - An index on a map is a key, cast to the map's key type.
//! - `[start..end]` is inclusive and clamped to the list's bounds.
//!
//! The path engine resolves mutation targets with the same rules.

use imv_types::{
    cast_value, incompatible_type, index_out_of_bounds, key_not_found, not_indexable,
    null_operand, EvalResult, IteratorValue, ListValue, MapValue, Value, VariableType,
};

use crate::compare::values_equal;
use crate::Fanned;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;

/// A list position from an index value. Negative positions are out of
/// bounds; the upper bound is the caller's to check.
pub(crate) fn slot_index(index: &Value, len: usize) -> EvalResult<usize> {
    if !index.tag().is_numeric() {
        return Err(incompatible_type(VariableType::int(), index.variable_type()));
    }
    let position = index.as_long().unwrap_or_default();
    usize::try_from(position).map_err(|_| index_out_of_bounds(position, len))
}

/// A map key from an index value, cast to the map's key type.
pub(crate) fn map_key(map: &MapValue, index: Value) -> EvalResult<Value> {
    match &map.key_type {
        Some(key_type) => cast_value(key_type, index),
        None => Ok(index),
    }
}

/// Whether a list element matches a map pattern.
pub(crate) fn matches_pattern(item: Option<&Value>, pattern: &MapValue) -> bool {
    let Some(Value::Map(map)) = item else {
        return false;
    };
    pattern.entries.iter().all(|(key, expected)| {
        let found = map_key(map, key.clone())
            .ok()
            .and_then(|key| map.entries.get(&key));
        match found {
            Some(actual) => values_equal(actual.as_ref(), expected.as_ref()),
            None => false,
        }
    })
}

/// Inclusive positions `start..=end` clamped to a list of `len` elements.
pub(crate) fn clamp_range(
    start: &Value,
    end: &Value,
    len: usize,
) -> EvalResult<std::ops::Range<usize>> {
    for bound in [start, end] {
        if !bound.tag().is_numeric() {
            return Err(incompatible_type(VariableType::int(), bound.variable_type()));
        }
    }
    let last = len as i64 - 1;
    let first = start.as_long().unwrap_or_default().max(0);
    let end = end.as_long().unwrap_or_default().min(last);
    if first > end {
        return Ok(0..0);
    }
    Ok(first as usize..end as usize + 1)
}

/// The elements of a list or iterator, if `value` is one.
fn into_items(value: Value) -> Result<Vec<Option<Value>>, Value> {
    match value {
        Value::List(ListValue { items, .. }) | Value::Iterator(IteratorValue { items, .. }) => {
            Ok(items)
        }
        other => Err(other),
    }
}

/// `value[]`: every element of a list or iterator, every value of a map.
pub(crate) fn all_contents<'a>(target: Option<Value>) -> EvalResult<Fanned<'a>> {
    let target = target.ok_or_else(|| null_operand("[]"))?;
    match into_items(target) {
        Ok(items) => Ok(Fanned::spread(items.into_iter())),
        Err(Value::Map(map)) => Ok(Fanned::spread(map.entries.into_values())),
        Err(other) => Err(not_indexable(other.type_name())),
    }
}

/// `target[index]`.
pub(crate) fn indexed<'a>(target: Option<Value>, index: Option<Value>) -> EvalResult<Fanned<'a>> {
    let target = target.ok_or_else(|| null_operand("[...]"))?;
    let index = index.ok_or_else(|| null_operand("[...]"))?;
    match into_items(target) {
        Ok(items) => match index {
            Value::Map(pattern) => Ok(Fanned::spread(
                items
                    .into_iter()
                    .filter(move |item| matches_pattern(item.as_ref(), &pattern)),
            )),
            index => {
                let mut items = items;
                let len = items.len();
                let position = slot_index(&index, len)?;
                if position >= len {
                    return Err(index_out_of_bounds(position as i64, len));
                }
                Ok(Fanned::One(items.swap_remove(position)))
            }
        },
        Err(Value::Map(map)) => {
            let key = map_key(&map, index)?;
            let MapValue { mut entries, .. } = map;
            match entries.swap_remove(&key) {
                Some(value) => Ok(Fanned::One(value)),
                None => Err(key_not_found(&key)),
            }
        }
        Err(other) => Err(not_indexable(other.type_name())),
    }
}

/// `target[index?]`: the element when it exists, otherwise nothing.
pub(crate) fn optionally_indexed<'a>(
    target: Option<Value>,
    index: Option<Value>,
) -> EvalResult<Fanned<'a>> {
    Ok(indexed(target, index).unwrap_or_else(|_| Fanned::nothing()))
}

/// `target[start..end]`.
pub(crate) fn range_indexed<'a>(
    target: Option<Value>,
    start: Option<Value>,
    end: Option<Value>,
) -> EvalResult<Fanned<'a>> {
    let (Some(target), Some(start), Some(end)) = (target, start, end) else {
        return Err(null_operand("[..]"));
    };
    match into_items(target) {
        Ok(mut items) => {
            let range = clamp_range(&start, &end, items.len())?;
            items.truncate(range.end);
            items.drain(..range.start);
            Ok(Fanned::spread(items.into_iter()))
        }
        Err(other) => Err(not_indexable(other.type_name())),
    }
}
