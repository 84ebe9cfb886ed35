//! Type kind tag (template id).
//!
//! The tag doubles as the one-byte template id used by the binary codec.
//!
//! # Tag Categories
//!
//! - 0-15: Leaf types (no child slots)
//! - 16-31: One-child containers
//! - 32-47: Two-child containers

use std::fmt;

use crate::Capabilities;

/// Type kind discriminant.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Tag {
    // === Leaf types (0-15) ===
    /// 8-bit signed integer.
    Byte = 0,
    /// 16-bit signed integer. Also the element kind of a string's code units.
    Short = 1,
    /// 32-bit signed integer.
    Int = 2,
    /// 64-bit signed integer.
    Long = 3,
    /// 32-bit float.
    Float = 4,
    /// 64-bit float.
    Double = 5,
    /// String.
    Str = 6,
    /// Reference to an entity of the host environment.
    Entity = 7,
    /// A position in the host environment.
    Position = 8,

    // === One-child containers (16-31) ===
    /// `list<T>`
    List = 16,
    /// `iterator<T>`
    Iterator = 17,

    // === Two-child containers (32-47) ===
    /// `map<K, V>`
    Map = 32,
    /// `entry<K, V>`
    Entry = 33,
}

impl Tag {
    /// Every tag, in template id order.
    pub const ALL: [Tag; 13] = [
        Tag::Byte,
        Tag::Short,
        Tag::Int,
        Tag::Long,
        Tag::Float,
        Tag::Double,
        Tag::Str,
        Tag::Entity,
        Tag::Position,
        Tag::List,
        Tag::Iterator,
        Tag::Map,
        Tag::Entry,
    ];

    /// The one-byte template id.
    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Look up a tag by template id.
    pub const fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => Tag::Byte,
            1 => Tag::Short,
            2 => Tag::Int,
            3 => Tag::Long,
            4 => Tag::Float,
            5 => Tag::Double,
            6 => Tag::Str,
            7 => Tag::Entity,
            8 => Tag::Position,
            16 => Tag::List,
            17 => Tag::Iterator,
            32 => Tag::Map,
            33 => Tag::Entry,
            _ => return None,
        })
    }

    /// Number of child type slots.
    #[inline]
    pub const fn child_count(self) -> usize {
        match self.id() {
            0..=15 => 0,
            16..=31 => 1,
            _ => 2,
        }
    }

    /// Canonical type name, as written in casts.
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Byte => "byte",
            Tag::Short => "short",
            Tag::Int => "int",
            Tag::Long => "long",
            Tag::Float => "float",
            Tag::Double => "double",
            Tag::Str => "string",
            Tag::Entity => "entity",
            Tag::Position => "position",
            Tag::List => "list",
            Tag::Iterator => "iterator",
            Tag::Map => "map",
            Tag::Entry => "entry",
        }
    }

    /// Byte, short, int or long.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self, Tag::Byte | Tag::Short | Tag::Int | Tag::Long)
    }

    /// Any of the six numeric kinds.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, Tag::Float | Tag::Double)
    }

    /// Operators values of this kind support.
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Tag::Byte | Tag::Short | Tag::Int | Tag::Long => Capabilities::INTEGER,
            Tag::Float | Tag::Double => Capabilities::FLOATING,
            Tag::Str | Tag::List | Tag::Map => Capabilities::ADD,
            Tag::Position => Capabilities::VECTOR,
            Tag::Entity | Tag::Iterator | Tag::Entry => Capabilities::empty(),
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        for tag in Tag::ALL {
            assert_eq!(Tag::from_id(tag.id()), Some(tag));
        }
        assert_eq!(Tag::from_id(9), None);
        assert_eq!(Tag::from_id(0xFF), None);
    }

    #[test]
    fn test_child_counts() {
        assert_eq!(Tag::Double.child_count(), 0);
        assert_eq!(Tag::Position.child_count(), 0);
        assert_eq!(Tag::List.child_count(), 1);
        assert_eq!(Tag::Iterator.child_count(), 1);
        assert_eq!(Tag::Map.child_count(), 2);
        assert_eq!(Tag::Entry.child_count(), 2);
    }

    #[test]
    fn test_capabilities() {
        assert!(Tag::Int.capabilities().contains(Capabilities::SHIFT));
        assert!(!Tag::Double.capabilities().contains(Capabilities::BITWISE));
        assert!(Tag::Str.capabilities().contains(Capabilities::ADD));
        assert!(!Tag::Str.capabilities().contains(Capabilities::NEGATE));
        assert!(Tag::Entity.capabilities().is_empty());
    }
}
