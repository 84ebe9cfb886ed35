//! The flat stack instruction set.
//!
//! Expressions compile to a postfix sequence of instructions. Each
//! instruction pops [`Instruction::consumes`] operands and pushes
//! [`Instruction::produces`] results; operands are either a single value or
//! a stream of values (see the interpreter).

use std::fmt;

use imv_types::{Value, VariableType};

use crate::{BinaryOp, Builtin, UnaryOp, VariableId};

/// A compiled instruction sequence in postfix order.
pub type Code = Vec<Instruction>;

/// A stack instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Push a constant (possibly null).
    LoadConstant(Option<Value>),
    /// Push the value of a stored variable.
    LoadVariable(VariableId),
    /// Pop one, push the operator applied to it.
    Unary(UnaryOp),
    /// Pop right then left, push `left op right`.
    Binary(BinaryOp),
    /// Pop one, push it cast to the type.
    Cast(VariableType),
    /// Pop `len` elements, push a list (or a map when every element is an entry).
    BuildList { len: usize },
    /// Pop value then key, push an entry.
    BuildEntry,
    /// Pop `argc` arguments, push the built-in's result.
    Call { builtin: Builtin, argc: usize },
    /// `x[]`: pop one, push every element.
    GetAllContents,
    /// `x[i]`: pop index then container, push the addressed element(s).
    GetIndexedContents,
    /// `x[i?]`: like `GetIndexedContents`, but a missing element yields nothing.
    GetOptionalIndexedContents,
    /// `x[a..b]`: pop end, start, container; push the elements in range.
    GetRangeIndexedContents,
}

impl Instruction {
    /// Number of stack entries popped.
    pub const fn consumes(&self) -> usize {
        match self {
            Self::LoadConstant(_) | Self::LoadVariable(_) => 0,
            Self::Unary(_) | Self::Cast(_) | Self::GetAllContents => 1,
            Self::Binary(_)
            | Self::BuildEntry
            | Self::GetIndexedContents
            | Self::GetOptionalIndexedContents => 2,
            Self::GetRangeIndexedContents => 3,
            Self::BuildList { len } => *len,
            Self::Call { argc, .. } => *argc,
        }
    }

    /// Number of stack entries pushed.
    #[inline]
    pub const fn produces(&self) -> usize {
        1
    }

    /// Whether the result depends on live context, which blocks constant
    /// folding of the whole sequence.
    pub const fn is_not_constant(&self) -> bool {
        match self {
            Self::LoadVariable(_) => true,
            Self::Call { builtin, .. } => builtin.is_not_constant(),
            _ => false,
        }
    }

    /// Net stack effect of a whole sequence, or `None` if it would pop an
    /// empty stack.
    pub fn stack_depth(code: &[Instruction]) -> Option<usize> {
        code.iter().try_fold(0usize, |depth, instruction| {
            depth
                .checked_sub(instruction.consumes())
                .map(|rest| rest + instruction.produces())
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadConstant(Some(value)) => write!(f, "LOAD_CONSTANT {value}"),
            Self::LoadConstant(None) => f.write_str("LOAD_CONSTANT null"),
            Self::LoadVariable(id) => write!(f, "LOAD_VARIABLE {id}"),
            Self::Unary(op) => write!(f, "UNARY {op}"),
            Self::Binary(op) => write!(f, "BINARY {op}"),
            Self::Cast(ty) => write!(f, "CAST {ty}"),
            Self::BuildList { len } => write!(f, "BUILD_LIST {len}"),
            Self::BuildEntry => f.write_str("BUILD_ENTRY"),
            Self::Call { builtin, argc } => write!(f, "CALL {} {argc}", builtin.name()),
            Self::GetAllContents => f.write_str("GET_ALL_CONTENTS"),
            Self::GetIndexedContents => f.write_str("GET_INDEXED_CONTENTS"),
            Self::GetOptionalIndexedContents => f.write_str("GET_OPTIONAL_INDEXED_CONTENTS"),
            Self::GetRangeIndexedContents => f.write_str("GET_RANGE_INDEXED_CONTENTS"),
        }
    }
}
