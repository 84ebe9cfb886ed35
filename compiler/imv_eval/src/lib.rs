//! Imv Eval - the stack interpreter and path engine for immediate values.
//!
//! This crate provides:
//! - Operands (`Operand`) and the fan-out contract for combining them
//! - The stack machine (`execute`) and compiled expressions with constant
//!   folding (`Expression`)
//! - Operator semantics, indexing, built-in functions and comparison
//! - The path engine (`PathEngine`) reading and mutating stored variables
//! - Variable storage (`VariableStore`, `MemoryStore`) and the execution
//!   context (`EvalContext`, `HostEnvironment`, `ErrorSink`)
//!
//! # Errors
//!
//! An error computing a single value aborts the evaluation and is returned.
//! An error computing one element of a stream is handed to the context's
//! [`ErrorSink`] and the element is dropped; the stream continues.

mod builtins;
mod compare;
mod context;
mod expression;
mod index;
mod interpreter;
mod operand;
mod operators;
mod path_engine;
mod store;

pub use compare::{compare, compare_values, Comparison};
pub use context::{CollectingSink, DetachedHost, ErrorSink, EvalContext, HostEnvironment, LogSink};
pub use expression::{fold_constants, Expression};
pub use interpreter::execute;
pub use operand::{
    concat, fan_out, fan_out_one, Evaluated, Fanned, Operand, Operands, Slots, Stream, Tuples,
};
pub use operators::{evaluate_binary, evaluate_range, evaluate_unary};
pub use path_engine::{path_code, BindingObserver, NoBindings, PathEngine};
pub use store::{MemoryStore, VariableStore};

pub use imv_types::{EvalError, EvalResult, Value};
