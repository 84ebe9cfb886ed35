//! Path accessors: steps from a stored variable down to the values a
//! command reads, writes or removes.
//!
//! An [`Accessor`] is the compiled form of one step (`[i]`, `[]`, `key(..)`).
//! A [`ChildKey`] is one concrete slot an accessor resolved to at runtime;
//! the sequence of keys from the variable to a slot is what external
//! bindings observe when that slot changes.

use std::fmt;

use imv_types::Value;

use crate::{Code, VariableId};

/// One compiled path step.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Accessor {
    /// `[]`: every element of a list or every value of a map.
    AllContents,
    /// `[expr]`
    Index(Code),
    /// `[expr?]`: a missing element is skipped instead of failing.
    OptionalIndex(Code),
    /// `[start..end]`, inclusive.
    Range(Code, Code),
    /// `key(...)`: the key of an entry.
    EntryKey,
    /// `value(...)`: the value of an entry.
    EntryValue,
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllContents => f.write_str("[]"),
            Self::Index(code) => write!(f, "[{}]", CodeDisplay(code)),
            Self::OptionalIndex(code) => write!(f, "[{}?]", CodeDisplay(code)),
            Self::Range(start, end) => {
                write!(f, "[{}..{}]", CodeDisplay(start), CodeDisplay(end))
            }
            Self::EntryKey => f.write_str(".key"),
            Self::EntryValue => f.write_str(".value"),
        }
    }
}

/// Renders a code block as `; `-separated instructions.
struct CodeDisplay<'a>(&'a Code);

impl fmt::Display for CodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instruction) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{instruction}")?;
        }
        Ok(())
    }
}

/// A concrete slot below a parent value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChildKey {
    /// A list element.
    Index(usize),
    /// The value stored under a map key.
    MapKey(Value),
    /// The key half of an entry.
    EntryKey,
    /// The value half of an entry.
    EntryValue,
}

impl fmt::Display for ChildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "[{i}]"),
            Self::MapKey(key) => write!(f, "[{key}]"),
            Self::EntryKey => f.write_str(".key"),
            Self::EntryValue => f.write_str(".value"),
        }
    }
}

/// A compiled path: a variable plus the steps below it.
///
/// Entry wrappers (`key(x)`, `value(x)`) apply to the base only, so they
/// appear as the leading accessors, innermost first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathExpr {
    pub base: VariableId,
    pub accessors: Vec<Accessor>,
}

impl PathExpr {
    pub fn new(base: VariableId, accessors: Vec<Accessor>) -> Self {
        PathExpr { base, accessors }
    }

    /// Whether the path names the variable itself.
    #[inline]
    pub fn is_variable(&self) -> bool {
        self.accessors.is_empty()
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for accessor in &self.accessors {
            write!(f, "{accessor}")?;
        }
        Ok(())
    }
}

/// Render a resolved slot location, e.g. `global:m["a"][2]`.
pub fn display_location(base: &VariableId, keys: &[ChildKey]) -> String {
    let mut out = base.to_string();
    for key in keys {
        out.push_str(&key.to_string());
    }
    out
}
