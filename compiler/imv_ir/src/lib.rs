//! Imv IR - the instruction set shared by the compiler and interpreter.
//!
//! This crate contains:
//! - Operators (`BinaryOp`, `UnaryOp`, `CompareOp`) with precedence and
//!   the capability each one requires
//! - Built-in functions (`Builtin`) keyed by name and arity
//! - The flat stack instruction set (`Instruction`)
//! - Variable ids (`VariableId`) and their character-set validation
//! - Path accessors (`Accessor`, `ChildKey`, `PathExpr`)
//!
//! # Design Philosophy
//!
//! - **Flat code**: an expression compiles to a `Vec<Instruction>` in
//!   postfix order; there is no AST node type.
//! - **Declared arity**: every instruction knows how many stack entries it
//!   pops and pushes, which is all the interpreter and constant folder need.

mod builtin;
mod instruction;
mod operators;
mod path;
mod variable_id;

pub use builtin::{Arity, Builtin};
pub use instruction::{Code, Instruction};
pub use operators::{BinaryOp, CompareOp, UnaryOp};
pub use path::{display_location, Accessor, ChildKey, PathExpr};
pub use variable_id::{is_id_char, is_id_start, VariableId, VariableIdError};
