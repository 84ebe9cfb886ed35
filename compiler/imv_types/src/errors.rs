//! Error types for evaluation, casting and path mutation.
//!
//! `EvalErrorKind` carries structured data for each failure so callers can
//! match on the category instead of parsing messages. Factory functions
//! (e.g. `incompatible_type()`) are the public construction API.
//!
//! # Propagation
//!
//! An error raised while computing a single value aborts the whole
//! expression. An error raised while producing one element of a stream is
//! reported to the context's error sink and that element is dropped.

use std::fmt;

/// Result of evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Types
    IncompatibleType { target: String, source: String },
    NullOperand { operation: String },
    DivisionByZero,

    // Store
    NotFound { id: String },
    AlreadyExists { id: String },

    // Indexing
    NotIndexable { type_name: String },
    NotEntry { type_name: String },
    IndexOutOfBounds { index: i64, len: usize },
    KeyNotFound { key: String },

    // Mutation
    MultipleValuesToSingleVariable,
    UnableToRemoveFromEntry,

    // Host environment (entity/position resolution)
    Host { message: String },

    // Hand-built code that does not balance the operand stack
    InvalidCode { reason: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleType { target, source } => {
                write!(f, "incompatible type: cannot convert {source} to {target}")
            }
            Self::NullOperand { operation } => write!(f, "cannot apply {operation} to null"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::NotFound { id } => write!(f, "variable not found: {id}"),
            Self::AlreadyExists { id } => write!(f, "variable already exists: {id}"),
            Self::NotIndexable { type_name } => write!(f, "{type_name} is not indexable"),
            Self::NotEntry { type_name } => write!(f, "{type_name} is not a map entry"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::KeyNotFound { key } => write!(f, "key not found: {key}"),
            Self::MultipleValuesToSingleVariable => {
                write!(f, "cannot assign multiple values to a single variable")
            }
            Self::UnableToRemoveFromEntry => {
                write!(f, "cannot remove the key or value of a map entry")
            }
            Self::Host { message } => f.write_str(message),
            Self::InvalidCode { reason } => write!(f, "invalid code: {reason}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
}

impl EvalError {
    #[cold]
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError { kind }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for EvalError {}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

// Factory functions

#[cold]
pub fn incompatible_type(target: impl fmt::Display, source: impl fmt::Display) -> EvalError {
    EvalError::new(EvalErrorKind::IncompatibleType {
        target: target.to_string(),
        source: source.to_string(),
    })
}

#[cold]
pub fn null_operand(operation: impl fmt::Display) -> EvalError {
    EvalError::new(EvalErrorKind::NullOperand {
        operation: operation.to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn not_found(id: impl fmt::Display) -> EvalError {
    EvalError::new(EvalErrorKind::NotFound { id: id.to_string() })
}

#[cold]
pub fn already_exists(id: impl fmt::Display) -> EvalError {
    EvalError::new(EvalErrorKind::AlreadyExists { id: id.to_string() })
}

#[cold]
pub fn not_indexable(type_name: impl fmt::Display) -> EvalError {
    EvalError::new(EvalErrorKind::NotIndexable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn not_entry(type_name: impl fmt::Display) -> EvalError {
    EvalError::new(EvalErrorKind::NotEntry {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::new(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn key_not_found(key: impl fmt::Display) -> EvalError {
    EvalError::new(EvalErrorKind::KeyNotFound {
        key: key.to_string(),
    })
}

#[cold]
pub fn multiple_values_to_single_variable() -> EvalError {
    EvalError::new(EvalErrorKind::MultipleValuesToSingleVariable)
}

#[cold]
pub fn unable_to_remove_from_entry() -> EvalError {
    EvalError::new(EvalErrorKind::UnableToRemoveFromEntry)
}

#[cold]
pub fn host_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Host {
        message: message.into(),
    })
}

#[cold]
pub fn invalid_code(reason: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidCode {
        reason: reason.into(),
    })
}
