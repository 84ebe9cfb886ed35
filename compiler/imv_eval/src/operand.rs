//! Operands of the stack machine: one value or a lazy stream of values.
//!
//! # Fan-out
//!
//! Every instruction that combines operands follows one contract:
//!
//! - Only singles: the operation runs once; its error aborts evaluation.
//! - Singles mixed with streams: each single is repeated for every element.
//! - Several streams: zipped element-wise, stopping at the shortest. A
//!   count mismatch is not reported.
//!
//! An error while producing one stream element is reported to the
//! [`ErrorSink`] and that element is dropped; the stream continues.

use std::fmt;

use imv_types::{multiple_values_to_single_variable, EvalResult, Value};
use smallvec::SmallVec;

use crate::ErrorSink;


/// A lazy stream of possibly-null values.
pub type Stream<'a> = Box<dyn Iterator<Item = Option<Value>> + 'a>;

/// The operands an instruction pops.
pub type Operands<'a> = SmallVec<[Operand<'a>; 4]>;

/// One value per popped operand, for a single application of an operation.
pub type Slots = SmallVec<[Option<Value>; 4]>;

/// A stack entry.
pub enum Operand<'a> {
    Single(Option<Value>),
    Many(Stream<'a>),
}

impl<'a> Operand<'a> {
    #[inline]
    pub fn value(value: Value) -> Self {
        Operand::Single(Some(value))
    }

    #[inline]
    pub fn null() -> Self {
        Operand::Single(None)
    }

    pub fn stream(values: impl Iterator<Item = Option<Value>> + 'a) -> Self {
        Operand::Many(Box::new(values))
    }

    #[inline]
    pub fn is_single(&self) -> bool {
        matches!(self, Operand::Single(_))
    }

    /// The single value, or `MultipleValuesToSingleVariable` for a stream.
    pub fn into_single(self) -> EvalResult<Option<Value>> {
        match self {
            Operand::Single(value) => Ok(value),
            Operand::Many(_) => Err(multiple_values_to_single_variable()),
        }
    }

    /// Every value, a single one included.
    pub fn into_stream(self) -> Stream<'a> {
        match self {
            Operand::Single(value) => Box::new(std::iter::once(value)),
            Operand::Many(stream) => stream,
        }
    }

    /// Drain a stream, detaching the result from the evaluation context.
    pub fn collect(self) -> Evaluated {
        match self {
            Operand::Single(value) => Evaluated::Single(value),
            Operand::Many(stream) => Evaluated::Many(stream.collect()),
        }
    }
}

impl fmt::Debug for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Single(value) => f.debug_tuple("Single").field(value).finish(),
            Operand::Many(_) => f.write_str("Many(..)"),
        }
    }
}

/// A fully evaluated operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluated {
    Single(Option<Value>),
    Many(Vec<Option<Value>>),
}

impl Evaluated {
    #[inline]
    pub fn is_single(&self) -> bool {
        matches!(self, Evaluated::Single(_))
    }

    pub fn values(&self) -> &[Option<Value>] {
        match self {
            Evaluated::Single(value) => std::slice::from_ref(value),
            Evaluated::Many(values) => values,
        }
    }

    pub fn into_values(self) -> Vec<Option<Value>> {
        match self {
            Evaluated::Single(value) => vec![value],
            Evaluated::Many(values) => values,
        }
    }

    /// The single value, or `MultipleValuesToSingleVariable` for a stream.
    pub fn into_single(self) -> EvalResult<Option<Value>> {
        match self {
            Evaluated::Single(value) => Ok(value),
            Evaluated::Many(_) => Err(multiple_values_to_single_variable()),
        }
    }
}

impl fmt::Display for Evaluated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn slot(f: &mut fmt::Formatter<'_>, value: Option<&Value>) -> fmt::Result {
            match value {
                Some(value) => write!(f, "{value}"),
                None => f.write_str("null"),
            }
        }

        match self {
            Evaluated::Single(value) => slot(f, value.as_ref()),
            Evaluated::Many(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    slot(f, value.as_ref())?;
                }
                f.write_str("]")
            }
        }
    }
}

/// What one application of an operation produced.
pub enum Fanned<'a> {
    One(Option<Value>),
    /// Any number of values, spliced into the surrounding stream.
    Spread(Stream<'a>),
}

impl<'a> Fanned<'a> {
    pub fn spread(values: impl Iterator<Item = Option<Value>> + 'a) -> Self {
        Fanned::Spread(Box::new(values))
    }

    #[inline]
    pub fn nothing() -> Self {
        Fanned::Spread(Box::new(std::iter::empty()))
    }

    fn into_operand(self) -> Operand<'a> {
        match self {
            Fanned::One(value) => Operand::Single(value),
            Fanned::Spread(values) => Operand::Many(values),
        }
    }

    fn into_stream(self) -> Stream<'a> {
        match self {
            Fanned::One(value) => Box::new(std::iter::once(value)),
            Fanned::Spread(values) => values,
        }
    }
}

enum Column<'a> {
    Fixed(Option<Value>),
    Stream(Stream<'a>),
}

/// Argument tuples drawn from a set of operands.
///
/// Singles repeat in every tuple; streams advance together and the first
/// one to end ends the iteration. Without any stream exactly one tuple is
/// produced.
pub struct Tuples<'a> {
    columns: SmallVec<[Column<'a>; 4]>,
    streaming: bool,
    done: bool,
}

impl<'a> Tuples<'a> {
    pub fn new(operands: Operands<'a>) -> Self {
        let columns: SmallVec<[Column<'a>; 4]> = operands
            .into_iter()
            .map(|operand| match operand {
                Operand::Single(value) => Column::Fixed(value),
                Operand::Many(stream) => Column::Stream(stream),
            })
            .collect();
        let streaming = columns
            .iter()
            .any(|column| matches!(column, Column::Stream(_)));
        Tuples {
            columns,
            streaming,
            done: false,
        }
    }
}

impl Iterator for Tuples<'_> {
    type Item = Slots;

    fn next(&mut self) -> Option<Slots> {
        if self.done {
            return None;
        }
        if !self.streaming {
            self.done = true;
        }
        let mut tuple = Slots::with_capacity(self.columns.len());
        for column in &mut self.columns {
            match column {
                Column::Fixed(value) => tuple.push(value.clone()),
                Column::Stream(stream) => match stream.next() {
                    Some(value) => tuple.push(value),
                    None => {
                        self.done = true;
                        return None;
                    }
                },
            }
        }
        Some(tuple)
    }
}

/// Report a stream element's error and drop the element.
#[inline]
pub(crate) fn skip_on_error<T>(sink: &dyn ErrorSink, result: EvalResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            sink.report(&error);
            None
        }
    }
}

/// Apply `op` to the operands under the fan-out contract.
pub fn fan_out<'a, F>(
    operands: Operands<'a>,
    sink: &'a dyn ErrorSink,
    mut op: F,
) -> EvalResult<Operand<'a>>
where
    F: FnMut(Slots) -> EvalResult<Fanned<'a>> + 'a,
{
    let all_single = operands.iter().all(Operand::is_single);
    let mut tuples = Tuples::new(operands);
    if all_single {
        let slots = tuples.next().unwrap_or_default();
        return op(slots).map(Fanned::into_operand);
    }
    Ok(Operand::stream(tuples.flat_map(move |slots| {
        skip_on_error(sink, op(slots))
            .map(Fanned::into_stream)
            .into_iter()
            .flatten()
    })))
}

/// [`fan_out`] for one operand.
pub fn fan_out_one<'a, F>(
    operand: Operand<'a>,
    sink: &'a dyn ErrorSink,
    mut op: F,
) -> EvalResult<Operand<'a>>
where
    F: FnMut(Option<Value>) -> EvalResult<Fanned<'a>> + 'a,
{
    match operand {
        Operand::Single(value) => op(value).map(Fanned::into_operand),
        Operand::Many(stream) => Ok(Operand::stream(stream.flat_map(move |value| {
            skip_on_error(sink, op(value))
                .map(Fanned::into_stream)
                .into_iter()
                .flatten()
        }))),
    }
}

/// Chain every operand into one stream, in order.
pub fn concat(operands: Operands<'_>) -> Operand<'_> {
    Operand::stream(operands.into_iter().flat_map(Operand::into_stream))
}

/// Split a two-operand tuple.
pub(crate) fn pair(slots: Slots) -> (Option<Value>, Option<Value>) {
    let mut slots = slots.into_iter();
    let first = slots.next().flatten();
    let second = slots.next().flatten();
    (first, second)
}

/// Split a three-operand tuple.
pub(crate) fn triple(slots: Slots) -> (Option<Value>, Option<Value>, Option<Value>) {
    let mut slots = slots.into_iter();
    let first = slots.next().flatten();
    let second = slots.next().flatten();
    let third = slots.next().flatten();
    (first, second, third)
}
