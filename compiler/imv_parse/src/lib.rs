//! Imv Parse - the expression compiler for immediate values.
//!
//! Turns source text into a flat postfix [`Code`] sequence for the stack
//! interpreter, and path strings into [`PathExpr`]s for the path engine.
//!
//! # Architecture
//!
//! - `cursor`: character cursor with byte positions for error reporting
//! - `literal`: numeral, string and character scanners
//! - `ty`: type names used in casts
//! - `parser`: operator-precedence term parser and instruction emitter
//! - `path`: variable paths with entry wrappers and index suffixes
//!
//! Compilation is fail-fast: the first error aborts with the reader
//! position at the point of failure.

mod cursor;
mod error;
mod literal;
mod options;
mod parser;
mod path;
mod ty;

use imv_ir::Code;
pub use imv_ir::PathExpr;
use imv_types::TypeRegistry;

pub use error::{CompileError, CompileErrorKind, CompileResult};
pub use options::CompileOptions;
pub use parser::disassemble;
pub use path::compile_path;
pub use ty::parse_type_name;

/// Compile an expression into postfix code.
pub fn compile(
    source: &str,
    registry: &TypeRegistry,
    options: &CompileOptions,
) -> CompileResult<Code> {
    parser::compile_code(source, registry, options)
}
