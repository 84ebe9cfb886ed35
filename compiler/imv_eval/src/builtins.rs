//! Built-in function implementations.
//!
//! Each call receives one tuple of arguments (the interpreter applies the
//! fan-out contract around it) and produces one value, or a spread of
//! values for the stream-producing functions (`entries`, `keys`, `values`,
//! `entity`). `all(...)` concatenates whole operands and is handled by the
//! interpreter.

use imv_ir::{BinaryOp, Builtin};
use imv_types::{
    cast_value, find_lowered_common_type, find_operable_type, host_error, incompatible_type,
    invalid_code, not_entry, not_indexable, null_operand, Capabilities, EntityRef, EvalResult,
    IteratorValue, Position, Value, VariableType,
};

use crate::compare::order_values;
use crate::operand::Slots;
use crate::operators::integer_value;
use crate::{EvalContext, Fanned};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;

/// Apply a built-in to one tuple of arguments.
pub(crate) fn call<'a>(
    builtin: Builtin,
    args: Slots,
    ctx: EvalContext<'a>,
) -> EvalResult<Fanned<'a>> {
    let mut args = args.into_iter();
    let mut next = move || args.next().flatten();
    match builtin {
        Builtin::All => Err(invalid_code("all(...) concatenates operands, not tuples")),
        Builtin::Key => entry_half(builtin, next(), true).map(Fanned::One),
        Builtin::Value => entry_half(builtin, next(), false).map(Fanned::One),
        Builtin::Entries => entries(required(builtin, next())?),
        Builtin::Keys => keys(required(builtin, next())?),
        Builtin::Values => values(required(builtin, next())?),
        Builtin::Size => size(required(builtin, next())?).map(one),
        Builtin::Iter => iter(required(builtin, next())?).map(one),
        Builtin::Type => Ok(one(Value::string(match next() {
            Some(value) => value.variable_type().to_string(),
            None => "null".to_owned(),
        }))),
        Builtin::Abs => abs(required(builtin, next())?).map(one),
        Builtin::Min | Builtin::Max => {
            let left = required(builtin, next())?;
            let right = required(builtin, next())?;
            extreme(builtin, left, right).map(one)
        }
        Builtin::Pos => {
            let x = coordinate(builtin, next())?;
            let y = coordinate(builtin, next())?;
            let z = coordinate(builtin, next())?;
            Ok(one(Value::Position(Position::new(x, y, z))))
        }
        Builtin::EntityPos => {
            let entity = cast_value(&VariableType::entity(), required(builtin, next())?)?;
            let Value::Entity(entity) = entity else {
                return Err(incompatible_type(VariableType::entity(), entity.variable_type()));
            };
            Ok(one(Value::Position(ctx.host.position_of(entity)?)))
        }
        Builtin::Here => Ok(one(Value::Position(ctx.host.origin()))),
        Builtin::Entity => select(ctx, required(builtin, next())?),
        Builtin::Random => Ok(one(Value::Double(ctx.host.random_unit()?))),
        Builtin::RandomRange => {
            let low = required(builtin, next())?;
            let high = required(builtin, next())?;
            random_range(ctx, low, high).map(one)
        }
    }
}

#[inline]
fn one<'a>(value: Value) -> Fanned<'a> {
    Fanned::One(Some(value))
}

fn required(builtin: Builtin, value: Option<Value>) -> EvalResult<Value> {
    value.ok_or_else(|| null_operand(builtin.name()))
}

fn entry_half(builtin: Builtin, value: Option<Value>, key: bool) -> EvalResult<Option<Value>> {
    match required(builtin, value)? {
        Value::Entry(entry) if key => Ok(entry.key),
        Value::Entry(entry) => Ok(entry.value),
        other => Err(not_entry(other.type_name())),
    }
}

fn entries<'a>(value: Value) -> EvalResult<Fanned<'a>> {
    match value {
        Value::Map(map) => {
            let entries: Vec<Option<Value>> = map.entry_values().map(Some).collect();
            Ok(Fanned::spread(entries.into_iter()))
        }
        Value::List(list) => Ok(Fanned::spread(indexed_entries(list.items))),
        Value::Iterator(iter) => Ok(Fanned::spread(indexed_entries(iter.items))),
        other => Err(not_indexable(other.type_name())),
    }
}

fn indexed_entries(items: Vec<Option<Value>>) -> impl Iterator<Item = Option<Value>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| Some(Value::entry(Some(Value::Int(i as i32)), item)))
}

fn keys<'a>(value: Value) -> EvalResult<Fanned<'a>> {
    match value {
        Value::Map(map) => Ok(Fanned::spread(map.entries.into_keys().map(Some))),
        Value::List(list) => Ok(Fanned::spread(index_values(list.len()))),
        Value::Iterator(iter) => Ok(Fanned::spread(index_values(iter.items.len()))),
        other => Err(not_indexable(other.type_name())),
    }
}

fn index_values(len: usize) -> impl Iterator<Item = Option<Value>> {
    (0..len).map(|i| Some(Value::Int(i as i32)))
}

fn values<'a>(value: Value) -> EvalResult<Fanned<'a>> {
    match value {
        Value::Map(map) => Ok(Fanned::spread(map.entries.into_values())),
        Value::List(list) => Ok(Fanned::spread(list.items.into_iter())),
        Value::Iterator(iter) => Ok(Fanned::spread(iter.items.into_iter())),
        other => Err(not_indexable(other.type_name())),
    }
}

fn size(value: Value) -> EvalResult<Value> {
    let len = match &value {
        Value::Str(s) => s.encode_utf16().count(),
        other => other
            .element_count()
            .ok_or_else(|| not_indexable(other.type_name()))?,
    };
    Ok(Value::Int(len as i32))
}

/// A snapshot iterator over a container.
fn iter(value: Value) -> EvalResult<Value> {
    let snapshot = match value {
        Value::List(list) => IteratorValue::new(list.elem_type, list.items),
        Value::Iterator(iter) => iter,
        Value::Map(map) => {
            let elem = VariableType::entry(map.key_type.clone(), map.value_type.clone());
            IteratorValue::new(Some(elem), map.entry_values().map(Some).collect())
        }
        Value::Str(s) => IteratorValue::new(Some(VariableType::short()), Value::code_units(&s)),
        other => return Err(not_indexable(other.type_name())),
    };
    Ok(Value::Iterator(snapshot))
}

fn abs(value: Value) -> EvalResult<Value> {
    let ty = value
        .variable_type()
        .lowering_chain()
        .find(|ty| ty.tag().is_numeric())
        .ok_or_else(|| incompatible_type(VariableType::double(), value.variable_type()))?;
    Ok(match cast_value(&ty, value)? {
        Value::Byte(n) => Value::Byte(n.wrapping_abs()),
        Value::Short(n) => Value::Short(n.wrapping_abs()),
        Value::Int(n) => Value::Int(n.wrapping_abs()),
        Value::Long(n) => Value::Long(n.wrapping_abs()),
        Value::Float(f) => Value::Float(f.abs()),
        Value::Double(f) => Value::Double(f.abs()),
        other => return Err(incompatible_type(VariableType::double(), other.variable_type())),
    })
}

/// `min`/`max`: the chosen operand, in the operands' common type.
fn extreme(builtin: Builtin, left: Value, right: Value) -> EvalResult<Value> {
    let ty = find_lowered_common_type(&left.variable_type(), &right.variable_type())
        .ok_or_else(|| incompatible_type(left.variable_type(), right.variable_type()))?;
    let ordering = order_values(&left, &right)?;
    let pick_left = match (builtin, ordering) {
        (Builtin::Min, Some(ordering)) => ordering.is_le(),
        (_, Some(ordering)) => ordering.is_ge(),
        // Unordered (NaN): keep the left operand.
        (_, None) => true,
    };
    cast_value(&ty, if pick_left { left } else { right })
}

fn coordinate(builtin: Builtin, value: Option<Value>) -> EvalResult<f64> {
    let value = required(builtin, value)?;
    value
        .as_double()
        .ok_or_else(|| incompatible_type(VariableType::double(), value.variable_type()))
}

/// `entity(selector)`: a string selector resolves through the host; an
/// entity or entity id selects itself.
fn select<'a>(ctx: EvalContext<'a>, selector: Value) -> EvalResult<Fanned<'a>> {
    match selector {
        Value::Entity(entity) => Ok(one(Value::Entity(entity))),
        Value::Str(text) => match EntityRef::parse(&text) {
            Some(entity) => Ok(one(Value::Entity(entity))),
            None => {
                let entities = ctx.host.select_entities(&text)?;
                tracing::trace!(selector = %text, count = entities.len(), "selected entities");
                Ok(Fanned::spread(
                    entities.into_iter().map(|entity| Some(Value::Entity(entity))),
                ))
            }
        },
        other => Err(incompatible_type(VariableType::entity(), other.variable_type())),
    }
}

/// `random(low, high)`: an integer in `[low, high]` of the bounds' common
/// integer kind.
fn random_range(ctx: EvalContext<'_>, low: Value, high: Value) -> EvalResult<Value> {
    let ty = find_operable_type(&low.variable_type(), &high.variable_type(), Capabilities::RANGE)
        .ok_or_else(|| incompatible_type(low.variable_type(), high.variable_type()))?;
    let (Some(first), Some(last)) = (low.as_long(), high.as_long()) else {
        return Err(incompatible_type(ty, low.variable_type()));
    };
    if first > last {
        return Err(host_error(format!(
            "empty random range {first}{}{last}",
            BinaryOp::Range
        )));
    }
    let span = (i128::from(last) - i128::from(first) + 1) as f64;
    let offset = (ctx.host.random_unit()? * span).floor() as i128;
    let n = (i128::from(first) + offset).min(i128::from(last)) as i64;
    Ok(integer_value(ty.tag(), n))
}
