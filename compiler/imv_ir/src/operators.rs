//! Binary, unary and comparison operators.

use std::cmp::Ordering;
use std::fmt;

use imv_types::Capabilities;

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Mul,
    Div,
    Rem,
    Add,
    Sub,

    // Bitwise
    Shl,
    Shr,
    BitAnd,
    BitXor,
    BitOr,

    // Other
    Range,
}

impl BinaryOp {
    /// Every operator, longest symbols first so a scanner can match
    /// greedily (`<<` before any single-character symbol).
    pub const ALL: [BinaryOp; 11] = [
        Self::Shl,
        Self::Shr,
        Self::Range,
        Self::Mul,
        Self::Div,
        Self::Rem,
        Self::Add,
        Self::Sub,
        Self::BitAnd,
        Self::BitXor,
        Self::BitOr,
    ];

    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::BitOr => "|",
            Self::Range => "..",
        }
    }

    /// Returns the precedence level of this operator.
    ///
    /// Higher number = lower precedence (binds less tightly). All levels
    /// are left-associative.
    ///
    /// - 1: `*` `/` `%`
    /// - 2: `+` `-`
    /// - 3: `<<` `>>`
    /// - 4: `&`
    /// - 5: `^`
    /// - 6: `|`
    /// - 7: `..`
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Mul | Self::Div | Self::Rem => 1,
            Self::Add | Self::Sub => 2,
            Self::Shl | Self::Shr => 3,
            Self::BitAnd => 4,
            Self::BitXor => 5,
            Self::BitOr => 6,
            Self::Range => 7,
        }
    }

    /// Capability an operand type needs for this operator.
    pub const fn capability(self) -> Capabilities {
        match self {
            Self::Mul => Capabilities::MUL,
            Self::Div => Capabilities::DIV,
            Self::Rem => Capabilities::REM,
            Self::Add => Capabilities::ADD,
            Self::Sub => Capabilities::SUB,
            Self::Shl | Self::Shr => Capabilities::SHIFT,
            Self::BitAnd | Self::BitXor | Self::BitOr => Capabilities::BITWISE,
            Self::Range => Capabilities::RANGE,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
        }
    }

    pub const fn capability(self) -> Capabilities {
        match self {
            Self::Neg => Capabilities::NEGATE,
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Comparison operators used by the compare operation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub const ALL: [CompareOp; 6] = [
        Self::Eq,
        Self::NotEq,
        Self::Lt,
        Self::LtEq,
        Self::Gt,
        Self::GtEq,
    ];

    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_symbol() == symbol)
    }

    /// Whether the operator holds for two operands that compare as `ordering`.
    pub const fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::NotEq => !matches!(ordering, Ordering::Equal),
            Self::Lt => matches!(ordering, Ordering::Less),
            Self::LtEq => !matches!(ordering, Ordering::Greater),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::GtEq => !matches!(ordering, Ordering::Less),
        }
    }

    /// Whether the operator only needs equality, not an ordering.
    pub const fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::NotEq)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}
