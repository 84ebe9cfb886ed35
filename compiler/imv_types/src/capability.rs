//! Operator capabilities.
//!
//! Each template declares which operators its values support. Operator
//! resolution walks a lowering chain until it reaches a type whose
//! capability set contains the requested operator.

use bitflags::bitflags;

bitflags! {
    /// Operators supported by values of a type.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Capabilities: u16 {
        /// `a + b`
        const ADD = 1 << 0;
        /// `a - b`
        const SUB = 1 << 1;
        /// `a * b`
        const MUL = 1 << 2;
        /// `a / b`
        const DIV = 1 << 3;
        /// `a % b`
        const REM = 1 << 4;
        /// `-a`
        const NEGATE = 1 << 5;
        /// `a << b`, `a >> b`
        const SHIFT = 1 << 6;
        /// `a & b`, `a ^ b`, `a | b`
        const BITWISE = 1 << 7;
        /// `a .. b`
        const RANGE = 1 << 8;
    }
}

impl Capabilities {
    /// Everything the integer kinds support.
    pub const INTEGER: Self = Self::from_bits_truncate(
        Self::ADD.bits()
            | Self::SUB.bits()
            | Self::MUL.bits()
            | Self::DIV.bits()
            | Self::REM.bits()
            | Self::NEGATE.bits()
            | Self::SHIFT.bits()
            | Self::BITWISE.bits()
            | Self::RANGE.bits(),
    );

    /// Everything the floating-point kinds support.
    pub const FLOATING: Self = Self::from_bits_truncate(
        Self::ADD.bits()
            | Self::SUB.bits()
            | Self::MUL.bits()
            | Self::DIV.bits()
            | Self::REM.bits()
            | Self::NEGATE.bits(),
    );

    /// Vector arithmetic on positions.
    pub const VECTOR: Self =
        Self::from_bits_truncate(Self::ADD.bits() | Self::SUB.bits() | Self::NEGATE.bits());
}
