//! Comparison of evaluated values.
//!
//! Operands are brought to their common lowered type before comparing, so
//! `1 == 1L` and `"ab" == {97S, 98S}` hold. Values without a common type
//! are never equal and cannot be ordered. Numbers, strings and entities
//! are ordered; other kinds support equality only.
//!
//! Null equals null. Ordering a null is an error.

use std::cmp::Ordering;

use imv_ir::CompareOp;
use imv_types::{
    cast_value, find_lowered_common_type, incompatible_type, null_operand, EvalResult, Value,
};

use crate::operand::{skip_on_error, Tuples};
use crate::{ErrorSink, Operand};


/// The outcome of comparing two operands under the fan-out contract.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comparison {
    /// One result per compared pair, in order.
    pub results: Vec<bool>,
}

impl Comparison {
    /// Number of pairs for which the comparison held.
    pub fn matched(&self) -> usize {
        self.results.iter().filter(|held| **held).count()
    }

    /// Whether at least one pair was compared and every one held.
    pub fn all_held(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|held| *held)
    }
}

/// Compare two operands pairwise.
///
/// Errors comparing single operands propagate; errors for one pair of a
/// stream are reported to `sink` and the pair is dropped.
pub fn compare(
    left: Operand<'_>,
    op: CompareOp,
    right: Operand<'_>,
    sink: &dyn ErrorSink,
) -> EvalResult<Comparison> {
    let all_single = left.is_single() && right.is_single();
    let mut results = Vec::new();
    for pair in Tuples::new(smallvec::smallvec![left, right]) {
        let (left, right) = crate::operand::pair(pair);
        let held = compare_values(left.as_ref(), op, right.as_ref());
        if all_single {
            results.push(held?);
        } else if let Some(held) = skip_on_error(sink, held) {
            results.push(held);
        }
    }
    tracing::trace!(%op, matched = results.iter().filter(|held| **held).count(), "compared");
    Ok(Comparison { results })
}

/// Compare two possibly-null values.
pub fn compare_values(
    left: Option<&Value>,
    op: CompareOp,
    right: Option<&Value>,
) -> EvalResult<bool> {
    match (left, right) {
        (Some(left), Some(right)) if op.is_equality() => {
            Ok(equal(left, right)? == (op == CompareOp::Eq))
        }
        (Some(left), Some(right)) => Ok(order_values(left, right)?.is_some_and(|o| op.holds(o))),
        _ if op.is_equality() => Ok((left.is_none() && right.is_none()) == (op == CompareOp::Eq)),
        _ => Err(null_operand(op)),
    }
}

/// Equality that never fails; values that cannot be compared are unequal.
pub(crate) fn values_equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    compare_values(left, CompareOp::Eq, right).unwrap_or(false)
}

fn equal(left: &Value, right: &Value) -> EvalResult<bool> {
    let Some(ty) = find_lowered_common_type(&left.variable_type(), &right.variable_type()) else {
        return Ok(false);
    };
    let left = cast_value(&ty, left.clone())?;
    let right = cast_value(&ty, right.clone())?;
    if ty.tag().is_numeric() {
        return Ok(numeric_order(&left, &right) == Some(Ordering::Equal));
    }
    Ok(left == right)
}

/// Order two values in their common lowered type. `None` when the values
/// are unordered (a NaN is involved).
pub(crate) fn order_values(left: &Value, right: &Value) -> EvalResult<Option<Ordering>> {
    let Some(ty) = find_lowered_common_type(&left.variable_type(), &right.variable_type()) else {
        return Err(incompatible_type(left.variable_type(), right.variable_type()));
    };
    let left = cast_value(&ty, left.clone())?;
    let right = cast_value(&ty, right.clone())?;
    match (&left, &right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Entity(a), Value::Entity(b)) => Ok(Some(a.bits().cmp(&b.bits()))),
        _ if ty.tag().is_numeric() => Ok(numeric_order(&left, &right)),
        _ => Err(incompatible_type(format!("ordered {ty}"), ty.clone())),
    }
}

/// Integers compare exactly; anything involving a float compares as f64.
fn numeric_order(left: &Value, right: &Value) -> Option<Ordering> {
    if left.tag().is_integer() && right.tag().is_integer() {
        return Some(left.as_long()?.cmp(&right.as_long()?));
    }
    left.as_double()?.partial_cmp(&right.as_double()?)
}
