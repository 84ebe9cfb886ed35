//! Type names as written in casts: `int`, `list<short>`, `map<string, ?>`.
//!
//! `?` marks an unset child slot. Omitting the `<...>` part leaves every
//! child unset; a partial child list is an arity error.

use imv_types::{ensure_sufficient_stack, TypeRegistry, VariableType};

use crate::cursor::Cursor;
use crate::error::{CompileError, CompileErrorKind, CompileResult};

/// Characters allowed in a type name.
#[inline]
pub(crate) fn is_type_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse a type at the cursor.
pub(crate) fn parse_type(
    cursor: &mut Cursor<'_>,
    registry: &TypeRegistry,
) -> CompileResult<VariableType> {
    ensure_sufficient_stack(|| parse_type_inner(cursor, registry))
}

fn parse_type_inner(
    cursor: &mut Cursor<'_>,
    registry: &TypeRegistry,
) -> CompileResult<VariableType> {
    cursor.eat_whitespace();
    let start = cursor.pos();
    let name = cursor.eat_while(is_type_name_char);
    let template = registry.lookup_name(name).ok_or_else(|| {
        CompileError::new(
            CompileErrorKind::UnknownType {
                name: name.to_owned(),
            },
            start,
        )
    })?;

    let mut probe = *cursor;
    probe.eat_whitespace();
    if !probe.eat('<') {
        return Ok(VariableType::leaf(template.tag));
    }
    *cursor = probe;

    let mut children = Vec::with_capacity(template.child_count);
    loop {
        cursor.eat_whitespace();
        if cursor.eat('?') {
            children.push(None);
        } else {
            children.push(Some(parse_type(cursor, registry)?));
        }
        cursor.eat_whitespace();
        if cursor.eat(',') {
            continue;
        }
        if cursor.eat('>') {
            break;
        }
        return Err(CompileError::new(
            CompileErrorKind::Expected {
                expected: "',' or '>'",
            },
            cursor.pos(),
        ));
    }

    let found = children.len();
    template.instantiate(children).ok_or_else(|| {
        CompileError::new(
            CompileErrorKind::WrongTypeArity {
                name: name.to_owned(),
                expected: template.child_count,
                found,
            },
            start,
        )
    })
}

/// Parse a complete type name, rejecting trailing input.
pub fn parse_type_name(source: &str, registry: &TypeRegistry) -> CompileResult<VariableType> {
    let mut cursor = Cursor::new(source);
    let ty = parse_type(&mut cursor, registry)?;
    cursor.eat_whitespace();
    match cursor.current() {
        None => Ok(ty),
        Some(c) => Err(CompileError::new(
            CompileErrorKind::UnexpectedChar(c),
            cursor.pos(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(source: &str) -> CompileResult<VariableType> {
        parse_type_name(source, &TypeRegistry::new())
    }

    #[test]
    fn test_leaf_and_alias() {
        assert_eq!(parse("int").unwrap(), VariableType::int());
        assert_eq!(parse(" str ").unwrap(), VariableType::string());
    }

    #[test]
    fn test_children() {
        assert_eq!(
            parse("map<string, list<int>>").unwrap(),
            VariableType::map(
                Some(VariableType::string()),
                Some(VariableType::list(Some(VariableType::int())))
            )
        );
        assert_eq!(
            parse("map<?, double>").unwrap(),
            VariableType::map(None, Some(VariableType::double()))
        );
        assert_eq!(parse("list").unwrap(), VariableType::list(None));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse("integer").unwrap_err().kind,
            CompileErrorKind::UnknownType {
                name: "integer".to_owned()
            }
        );
        assert_eq!(
            parse("map<int>").unwrap_err().kind,
            CompileErrorKind::WrongTypeArity {
                name: "map".to_owned(),
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            parse("int<int>").unwrap_err().kind,
            CompileErrorKind::WrongTypeArity {
                name: "int".to_owned(),
                expected: 0,
                found: 1
            }
        );
    }
}
