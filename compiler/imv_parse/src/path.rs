//! Path parser: `base (functionWrap)* (indexOp)*`.
//!
//! A path names a stored variable, optionally wrapped in `key(...)` or
//! `value(...)` (which select an entry's half before any indexing), followed
//! by index suffixes. Wrappers apply to the base only and must be closed
//! before the first `[`. Index expressions compile with the expression
//! compiler.

use imv_ir::{Accessor, PathExpr, VariableId};
use imv_types::{ensure_sufficient_stack, TypeRegistry};

use crate::error::{CompileError, CompileErrorKind, CompileResult};
use crate::parser::{IndexForm, Parser};
use crate::CompileOptions;

/// Compile a path such as `value(global:m)["k"][0]`.
pub fn compile_path(
    source: &str,
    registry: &TypeRegistry,
    options: &CompileOptions,
) -> CompileResult<PathExpr> {
    let mut parser = Parser::new(source, registry, options);
    let (base, mut accessors) = parse_base(&mut parser)?;
    while let Some(index) = parser.parse_index()? {
        accessors.push(match index {
            IndexForm::All => Accessor::AllContents,
            IndexForm::Single(code) => Accessor::Index(code),
            IndexForm::Optional(code) => Accessor::OptionalIndex(code),
            IndexForm::Range(start, end) => Accessor::Range(start, end),
        });
    }
    parser.expect_end()?;
    let path = PathExpr::new(base, accessors);
    tracing::debug!(%path, "compiled path");
    Ok(path)
}

/// Parse the variable and any entry wrappers around it. Wrappers are
/// returned innermost first, the order they apply in.
fn parse_base(parser: &mut Parser<'_>) -> CompileResult<(VariableId, Vec<Accessor>)> {
    ensure_sufficient_stack(|| {
        parser.cursor.eat_whitespace();
        let start = parser.cursor.pos();
        let name = parser.scan_path_name()?;
        if !parser.cursor.eat('(') {
            let id = parser.finish_variable_id(name, start)?;
            return Ok((id, Vec::new()));
        }

        let wrap = match name {
            "key" => Accessor::EntryKey,
            "value" => Accessor::EntryValue,
            other => {
                return Err(CompileError::new(
                    CompileErrorKind::InvalidPathFunction {
                        name: other.to_owned(),
                    },
                    start,
                ))
            }
        };
        let (base, mut accessors) = parse_base(parser)?;
        parser.cursor.eat_whitespace();
        if !parser.cursor.eat(')') {
            return Err(CompileError::new(CompileErrorKind::UnterminatedParen, start));
        }
        accessors.push(wrap);
        Ok((base, accessors))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use imv_ir::{BinaryOp, Instruction};
    use imv_types::Value;
    use pretty_assertions::assert_eq;

    use super::*;

    fn path(source: &str) -> CompileResult<PathExpr> {
        compile_path(source, &TypeRegistry::new(), &CompileOptions::default())
    }

    fn constant(n: i32) -> Instruction {
        Instruction::LoadConstant(Some(Value::Int(n)))
    }

    #[test]
    fn test_bare_variable() {
        let parsed = path("my_list").unwrap();
        assert_eq!(parsed.base, VariableId::new("global", "my_list"));
        assert!(parsed.is_variable());
    }

    #[test]
    fn test_index_suffixes() {
        let parsed = path("game:scores[1 + 1][][0..2][3?]").unwrap();
        assert_eq!(parsed.base, VariableId::new("game", "scores"));
        assert_eq!(
            parsed.accessors,
            vec![
                Accessor::Index(vec![constant(1), constant(1), Instruction::Binary(BinaryOp::Add)]),
                Accessor::AllContents,
                Accessor::Range(vec![constant(0)], vec![constant(2)]),
                Accessor::OptionalIndex(vec![constant(3)]),
            ]
        );
    }

    #[test]
    fn test_entry_wrappers_apply_innermost_first() {
        let parsed = path("key(value(m))[0]").unwrap();
        assert_eq!(parsed.base, VariableId::new("global", "m"));
        assert_eq!(
            parsed.accessors,
            vec![
                Accessor::EntryValue,
                Accessor::EntryKey,
                Accessor::Index(vec![constant(0)]),
            ]
        );
    }

    #[test]
    fn test_path_errors() {
        assert!(matches!(
            path("size(m)").unwrap_err().kind,
            CompileErrorKind::InvalidPathFunction { .. }
        ));
        assert_eq!(
            path("key(m").unwrap_err().kind,
            CompileErrorKind::UnterminatedParen
        );
        assert_eq!(
            path("key(m)[0] + 1").unwrap_err().kind,
            CompileErrorKind::UnexpectedChar('+')
        );
        assert!(matches!(
            path("null").unwrap_err().kind,
            CompileErrorKind::InvalidVariableId(_)
        ));
    }
}
