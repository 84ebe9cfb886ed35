//! The stack machine.
//!
//! Instructions run in order against an operand stack. Every instruction
//! pops its declared operands and pushes one result, combining operands
//! under the fan-out contract (see [`crate::operand`]). Streams stay lazy:
//! a stream element is only computed when the final consumer pulls it.

use imv_ir::{BinaryOp, Builtin, Instruction, UnaryOp};
use imv_types::{
    cast_variable, common_type_of, invalid_code, null_operand, EntryValue, EvalResult, MapValue,
    Value,
};
use indexmap::IndexMap;

use crate::operand::{pair, triple};
use crate::operators::{evaluate_binary, evaluate_range, evaluate_unary};
use crate::{
    builtins, concat, fan_out, fan_out_one, index, EvalContext, Fanned, Operand, Operands, Slots,
};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;

/// Run `code` to completion and return the one operand it leaves.
pub fn execute<'a>(code: &[Instruction], ctx: EvalContext<'a>) -> EvalResult<Operand<'a>> {
    let mut machine = Machine {
        ctx,
        stack: Vec::with_capacity(code.len().min(16)),
    };
    for instruction in code {
        machine.step(instruction)?;
    }
    machine.finish()
}

struct Machine<'a> {
    ctx: EvalContext<'a>,
    stack: Vec<Operand<'a>>,
}

impl<'a> Machine<'a> {
    fn pop_n(&mut self, n: usize, instruction: &Instruction) -> EvalResult<Operands<'a>> {
        let Some(start) = self.stack.len().checked_sub(n) else {
            return Err(invalid_code(format!(
                "{instruction} pops {n} operands but the stack holds {}",
                self.stack.len()
            )));
        };
        Ok(self.stack.drain(start..).collect())
    }

    fn pop_one(&mut self, instruction: &Instruction) -> EvalResult<Operand<'a>> {
        self.stack.pop().ok_or_else(|| {
            invalid_code(format!("{instruction} pops 1 operand but the stack is empty"))
        })
    }

    fn step(&mut self, instruction: &Instruction) -> EvalResult<()> {
        let ctx = self.ctx;
        let sink = ctx.sink;
        let result = match instruction {
            Instruction::LoadConstant(value) => Operand::Single(value.clone()),
            Instruction::LoadVariable(id) => Operand::Single(ctx.load(id)?),
            Instruction::Unary(op) => {
                let op = *op;
                fan_out_one(self.pop_one(instruction)?, sink, move |value| unary(op, value))?
            }
            Instruction::Binary(op) => {
                let op = *op;
                fan_out(self.pop_n(2, instruction)?, sink, move |slots| binary(op, slots))?
            }
            Instruction::Cast(ty) => {
                let ty = ty.clone();
                fan_out_one(self.pop_one(instruction)?, sink, move |value| {
                    cast_variable(Some(&ty), value).map(Fanned::One)
                })?
            }
            Instruction::BuildList { len } => {
                fan_out(self.pop_n(*len, instruction)?, sink, |items| {
                    build_list(items).map(|list| Fanned::One(Some(list)))
                })?
            }
            Instruction::BuildEntry => fan_out(self.pop_n(2, instruction)?, sink, |slots| {
                let (key, value) = pair(slots);
                Ok(Fanned::One(Some(Value::entry(key, value))))
            })?,
            Instruction::Call {
                builtin: Builtin::All,
                argc,
            } => concat(self.pop_n(*argc, instruction)?),
            Instruction::Call { builtin, argc } => {
                let builtin = *builtin;
                fan_out(self.pop_n(*argc, instruction)?, sink, move |args| {
                    builtins::call(builtin, args, ctx)
                })?
            }
            Instruction::GetAllContents => {
                fan_out_one(self.pop_one(instruction)?, sink, index::all_contents)?
            }
            Instruction::GetIndexedContents => {
                fan_out(self.pop_n(2, instruction)?, sink, |slots| {
                    let (target, at) = pair(slots);
                    index::indexed(target, at)
                })?
            }
            Instruction::GetOptionalIndexedContents => {
                fan_out(self.pop_n(2, instruction)?, sink, |slots| {
                    let (target, at) = pair(slots);
                    index::optionally_indexed(target, at)
                })?
            }
            Instruction::GetRangeIndexedContents => {
                fan_out(self.pop_n(3, instruction)?, sink, |slots| {
                    let (target, start, end) = triple(slots);
                    index::range_indexed(target, start, end)
                })?
            }
        };
        self.stack.push(result);
        Ok(())
    }

    fn finish(mut self) -> EvalResult<Operand<'a>> {
        let result = self.stack.pop();
        match result {
            Some(result) if self.stack.is_empty() => Ok(result),
            Some(_) => Err(invalid_code(format!(
                "code left {} operands on the stack",
                self.stack.len() + 1
            ))),
            None => Err(invalid_code("code produced no result")),
        }
    }
}

fn unary<'a>(op: UnaryOp, value: Option<Value>) -> EvalResult<Fanned<'a>> {
    let value = value.ok_or_else(|| null_operand(op))?;
    evaluate_unary(value, op).map(|value| Fanned::One(Some(value)))
}

fn binary<'a>(op: BinaryOp, slots: Slots) -> EvalResult<Fanned<'a>> {
    let (Some(left), Some(right)) = pair(slots) else {
        return Err(null_operand(op));
    };
    if op == BinaryOp::Range {
        return Ok(Fanned::spread(evaluate_range(left, right)?.map(Some)));
    }
    evaluate_binary(left, right, op).map(|value| Fanned::One(Some(value)))
}

/// A list literal: elements cast to their common lowered type. A literal
/// made only of entries builds a map instead.
fn build_list(items: Slots) -> EvalResult<Value> {
    let items = items.into_vec();
    if !items.is_empty() && items.iter().all(|item| matches!(item, Some(Value::Entry(_)))) {
        return build_map(items);
    }
    let Some(elem_type) = common_type_of(items.iter().flatten())? else {
        return Ok(Value::list(None, items));
    };
    let items = items
        .into_iter()
        .map(|item| cast_variable(Some(&elem_type), item))
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(Value::list(Some(elem_type), items))
}

fn build_map(items: Vec<Option<Value>>) -> EvalResult<Value> {
    let entries: Vec<EntryValue> = items
        .into_iter()
        .filter_map(|item| match item {
            Some(Value::Entry(entry)) => Some(*entry),
            _ => None,
        })
        .collect();
    let key_type = common_type_of(entries.iter().filter_map(|entry| entry.key.as_ref()))?;
    let value_type = common_type_of(entries.iter().filter_map(|entry| entry.value.as_ref()))?;
    let mut map = IndexMap::with_capacity(entries.len());
    for entry in entries {
        let key = cast_variable(key_type.as_ref(), entry.key)?
            .ok_or_else(|| null_operand("map literal key"))?;
        map.insert(key, cast_variable(value_type.as_ref(), entry.value)?);
    }
    Ok(Value::Map(MapValue::new(key_type, value_type, map)))
}
