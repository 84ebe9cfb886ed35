//! Imv Types - runtime values and type descriptors for immediate values.
//!
//! This crate provides:
//! - Runtime values (`Value`) and their container payloads
//! - Type descriptors (`VariableType`) and the template registry (`TypeRegistry`)
//! - The lowering chain used to unify operand types of binary operators
//! - Casting (`cast_variable`) between value kinds
//! - `TypedValue`, the unit stored per named variable, and its binary codec
//! - Evaluation error types (`EvalError`, `EvalResult`)
//!
//! # Lowering
//!
//! Every type optionally names a single "lowered" successor:
//!
//! ```text
//! byte -> short -> int -> long -> float -> double
//! list<short> -> string
//! list<T> -> int
//! map<K, V> -> int
//! iterator<entry<K, V>> -> map<K, V>
//! iterator<T> -> list<T>
//! entity -> long
//! ```
//!
//! Binary operators resolve their operand types by searching for the first
//! type both chains share ([`find_lowered_common_type`]) and then walking
//! forward to a type with the operator's capability ([`find_operable_type`]).

mod capability;
pub mod cast;
pub mod codec;
mod errors;
mod registry;
pub mod stack;
mod tag;
mod ty;
mod typed_value;
mod value;

pub use capability::Capabilities;
pub use cast::{cast_value, cast_variable};
pub use errors::{
    already_exists, division_by_zero, host_error, incompatible_type, index_out_of_bounds,
    invalid_code, key_not_found, multiple_values_to_single_variable, not_entry, not_found,
    not_indexable, null_operand, unable_to_remove_from_entry, EvalError, EvalErrorKind,
    EvalResult,
};
pub use registry::{TypeRegistry, TypeTemplate};
pub use stack::ensure_sufficient_stack;
pub use tag::Tag;
pub use ty::{common_type_of, find_lowered_common_type, find_operable_type, VariableType};
pub use typed_value::TypedValue;
pub use value::{
    escape_string, EntityRef, EntryValue, IteratorValue, ListValue, MapValue, Position, Value,
};
