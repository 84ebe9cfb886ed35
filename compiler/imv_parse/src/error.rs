//! Compile error types.
//!
//! Compilation is fail-fast: the first malformed construct aborts with the
//! reader position at the point of failure. There is no recovery.

use std::fmt;

use imv_ir::VariableIdError;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileErrorKind {
    // === Structure ===
    /// A `(` without its matching `)`.
    UnterminatedParen,
    /// A closing delimiter was expected.
    Expected { expected: &'static str },
    /// A value (literal, variable, call, ...) was expected.
    ExpectedValue,
    /// Input remained after a complete expression.
    UnexpectedChar(char),

    // === Names ===
    UnknownFunction { name: String, arity: usize },
    UnknownType { name: String },
    WrongTypeArity { name: String, expected: usize, found: usize },
    InvalidVariableId(VariableIdError),
    /// Only `key(...)` and `value(...)` may wrap the base of a path.
    InvalidPathFunction { name: String },

    // === Literals ===
    MultipleRadixPoints,
    EmptyNumeral,
    NumberOutOfRange { literal: String },
    InvalidSuffix { suffix: char },
    UnterminatedString,
    InvalidEscape { escape: String },
    InvalidCharLiteral,
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedParen => f.write_str("unterminated parenthesis"),
            Self::Expected { expected } => write!(f, "expected {expected}"),
            Self::ExpectedValue => f.write_str("expected a value"),
            Self::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
            Self::UnknownFunction { name, arity } => {
                write!(f, "unknown function {name} with {arity} argument(s)")
            }
            Self::UnknownType { name } => write!(f, "unknown type '{name}'"),
            Self::WrongTypeArity {
                name,
                expected,
                found,
            } => write!(
                f,
                "type '{name}' takes {expected} child type(s), found {found}"
            ),
            Self::InvalidVariableId(err) => write!(f, "{err}"),
            Self::InvalidPathFunction { name } => {
                write!(f, "'{name}' cannot wrap a path; only key and value can")
            }
            Self::MultipleRadixPoints => f.write_str("multiple radix points in number"),
            Self::EmptyNumeral => f.write_str("number has no digits"),
            Self::NumberOutOfRange { literal } => write!(f, "number out of range: {literal}"),
            Self::InvalidSuffix { suffix } => write!(f, "invalid number suffix '{suffix}'"),
            Self::UnterminatedString => f.write_str("unterminated string"),
            Self::InvalidEscape { escape } => write!(f, "invalid escape sequence '\\{escape}'"),
            Self::InvalidCharLiteral => f.write_str("invalid character literal"),
        }
    }
}

/// A compile error at a byte offset of the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub position: usize,
}

impl CompileError {
    #[cold]
    pub fn new(kind: CompileErrorKind, position: usize) -> Self {
        CompileError { kind, position }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.position)
    }
}

impl std::error::Error for CompileError {}

pub type CompileResult<T> = Result<T, CompileError>;
