//! Arithmetic operator implementations for the interpreter.
//!
//! Operand types are unified first: both operands are cast to the first
//! type on their shared lowering chain that has the operator's capability
//! ([`find_operable_type`]). Evaluation then uses direct enum-based dispatch
//! on the unified kind. The type set is fixed, so pattern matching is
//! preferred over per-type operator objects.
//!
//! Integer arithmetic wraps at the kind's width. Shift amounts are masked
//! to the width. Integer division or remainder by zero is an error; float
//! division follows IEEE 754.

use imv_ir::{BinaryOp, UnaryOp};
use imv_types::{
    cast_value, division_by_zero, find_operable_type, incompatible_type, Capabilities, EvalError,
    EvalResult, ListValue, MapValue, Tag, Value, VariableType,
};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;

#[cold]
fn unsupported(op: impl std::fmt::Display, left: &Value, right: &Value) -> EvalError {
    incompatible_type(
        format!("{} for {op}", left.variable_type()),
        right.variable_type(),
    )
}

/// The type both operands are cast to before applying an operator.
fn operable_type(left: &Value, right: &Value, required: Capabilities) -> Option<VariableType> {
    find_operable_type(&left.variable_type(), &right.variable_type(), required)
}

/// Rebuild an integer of kind `tag` from a wide result, wrapping.
pub(crate) fn integer_value(tag: Tag, n: i64) -> Value {
    match tag {
        Tag::Byte => Value::Byte(n as i8),
        Tag::Short => Value::Short(n as i16),
        Tag::Int => Value::Int(n as i32),
        _ => Value::Long(n),
    }
}

const fn integer_bits(tag: Tag) -> u32 {
    match tag {
        Tag::Byte => 8,
        Tag::Short => 16,
        Tag::Int => 32,
        _ => 64,
    }
}

// Direct Dispatch Functions

/// Evaluate a binary operator other than `..`.
///
/// `..` yields many values; see [`evaluate_range`].
pub fn evaluate_binary(left: Value, right: Value, op: BinaryOp) -> EvalResult<Value> {
    let Some(ty) = operable_type(&left, &right, op.capability()) else {
        return Err(incompatible_type(left.variable_type(), right.variable_type()));
    };
    let left = cast_value(&ty, left)?;
    let right = cast_value(&ty, right)?;

    match (left, right) {
        (Value::Byte(a), Value::Byte(b)) => eval_integer(a.into(), b.into(), Tag::Byte, op),
        (Value::Short(a), Value::Short(b)) => eval_integer(a.into(), b.into(), Tag::Short, op),
        (Value::Int(a), Value::Int(b)) => eval_integer(a.into(), b.into(), Tag::Int, op),
        (Value::Long(a), Value::Long(b)) => eval_integer(a, b, Tag::Long, op),
        (Value::Float(a), Value::Float(b)) => {
            eval_float(a.into(), b.into(), op).map(|f| Value::Float(f as f32))
        }
        (Value::Double(a), Value::Double(b)) => eval_float(a, b, op).map(Value::Double),
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => Ok(Value::Str(a + &b)),
        (Value::List(a), Value::List(b)) if op == BinaryOp::Add => Ok(eval_list_concat(a, b)),
        (Value::Map(a), Value::Map(b)) if op == BinaryOp::Add => Ok(eval_map_merge(a, b)),
        (Value::Position(a), Value::Position(b)) => match op {
            BinaryOp::Add => Ok(Value::Position(a.offset(b))),
            BinaryOp::Sub => Ok(Value::Position(a.offset(b.negate()))),
            _ => Err(unsupported(op, &Value::Position(a), &Value::Position(b))),
        },
        (left, right) => Err(unsupported(op, &left, &right)),
    }
}

/// Integer arithmetic, computed wide and wrapped to the kind of `tag`.
fn eval_integer(a: i64, b: i64, tag: Tag, op: BinaryOp) -> EvalResult<Value> {
    let bits = integer_bits(tag);
    let shift = (b as u32) & (bits - 1);
    let n = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div if b == 0 => return Err(division_by_zero()),
        BinaryOp::Div => a.wrapping_div(b),
        BinaryOp::Rem if b == 0 => return Err(division_by_zero()),
        BinaryOp::Rem => a.wrapping_rem(b),
        BinaryOp::Shl => a.wrapping_shl(shift),
        BinaryOp::Shr => a >> shift,
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::BitOr => a | b,
        BinaryOp::Range => {
            let (a, b) = (integer_value(tag, a), integer_value(tag, b));
            return Err(unsupported(op, &a, &b));
        }
    };
    Ok(integer_value(tag, n))
}

/// Floating-point arithmetic.
fn eval_float(a: f64, b: f64, op: BinaryOp) -> EvalResult<f64> {
    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Sub => Ok(a - b),
        BinaryOp::Mul => Ok(a * b),
        BinaryOp::Div => Ok(a / b),
        BinaryOp::Rem => Ok(a % b),
        _ => Err(unsupported(op, &Value::Double(a), &Value::Double(b))),
    }
}

/// Both operands were cast to the same list type.
fn eval_list_concat(mut a: ListValue, b: ListValue) -> Value {
    a.items.extend(b.items);
    Value::List(a)
}

/// Right-hand entries win; existing keys keep their position.
fn eval_map_merge(mut a: MapValue, b: MapValue) -> Value {
    a.entries.extend(b.entries);
    Value::Map(a)
}

/// Evaluate `start..end`: every integer from `start` to `end` inclusive,
/// in the operands' common integer kind. Empty when `start > end`.
pub fn evaluate_range(
    start: Value,
    end: Value,
) -> EvalResult<impl Iterator<Item = Value> + 'static> {
    let Some(ty) = operable_type(&start, &end, Capabilities::RANGE) else {
        return Err(unsupported(BinaryOp::Range, &start, &end));
    };
    let tag = ty.tag();
    let (Some(first), Some(last)) = (start.as_long(), end.as_long()) else {
        return Err(unsupported(BinaryOp::Range, &start, &end));
    };
    Ok((first..=last).map(move |n| integer_value(tag, n)))
}

/// Evaluate a unary operator.
pub fn evaluate_unary(value: Value, op: UnaryOp) -> EvalResult<Value> {
    let source = value.variable_type();
    let Some(ty) = source
        .lowering_chain()
        .find(|candidate| candidate.supports(op.capability()))
    else {
        return Err(incompatible_type(format!("operand of {op}"), source));
    };

    match (cast_value(&ty, value)?, op) {
        (Value::Byte(n), UnaryOp::Neg) => Ok(Value::Byte(n.wrapping_neg())),
        (Value::Short(n), UnaryOp::Neg) => Ok(Value::Short(n.wrapping_neg())),
        (Value::Int(n), UnaryOp::Neg) => Ok(Value::Int(n.wrapping_neg())),
        (Value::Long(n), UnaryOp::Neg) => Ok(Value::Long(n.wrapping_neg())),
        (Value::Float(f), UnaryOp::Neg) => Ok(Value::Float(-f)),
        (Value::Double(f), UnaryOp::Neg) => Ok(Value::Double(-f)),
        (Value::Position(p), UnaryOp::Neg) => Ok(Value::Position(p.negate())),
        (other, _) => Err(incompatible_type(
            format!("operand of {op}"),
            other.variable_type(),
        )),
    }
}
