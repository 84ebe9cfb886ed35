//! Composite value payloads: containers, entity references and positions.
//!
//! Containers carry their (possibly unset) child types alongside their
//! contents. When a child type is set, every non-null element has been cast
//! to it. Structural equality and hashing consider contents only.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use super::Value;
use crate::VariableType;

/// Reference to an entity of the host environment (128-bit id).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct EntityRef {
    bits: u128,
}

impl EntityRef {
    pub const fn new(bits: u128) -> Self {
        EntityRef { bits }
    }

    #[inline]
    pub const fn bits(self) -> u128 {
        self.bits
    }

    /// Low 64 bits, reinterpreted as signed. Used when an entity lowers to `long`.
    #[inline]
    pub const fn low_bits(self) -> i64 {
        self.bits as u64 as i64
    }

    /// Parse the hyphenated `8-4-4-4-12` hex form.
    pub fn parse(text: &str) -> Option<Self> {
        const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
        let parts: Vec<&str> = text.trim().split('-').collect();
        if parts.len() != GROUPS.len()
            || parts.iter().zip(GROUPS).any(|(part, len)| part.len() != len)
        {
            return None;
        }
        u128::from_str_radix(&parts.concat(), 16).ok().map(EntityRef::new)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bits;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            b >> 96,
            (b >> 80) & 0xFFFF,
            (b >> 64) & 0xFFFF,
            (b >> 48) & 0xFFFF,
            b & 0xFFFF_FFFF_FFFF
        )
    }
}

/// A position in the host environment.
#[derive(Copy, Clone, Debug)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Position { x, y, z }
    }

    #[inline]
    pub fn offset(self, other: Position) -> Position {
        Position::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    #[inline]
    pub fn negate(self) -> Position {
        Position::new(-self.x, -self.y, -self.z)
    }

    fn bits(self) -> [u64; 3] {
        [self.x.to_bits(), self.y.to_bits(), self.z.to_bits()]
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?}, {:?})", self.x, self.y, self.z)
    }
}

/// Ordered list; elements may be null.
#[derive(Clone, Debug, Default)]
pub struct ListValue {
    pub elem_type: Option<VariableType>,
    pub items: Vec<Option<Value>>,
}

impl ListValue {
    pub fn new(elem_type: Option<VariableType>, items: Vec<Option<Value>>) -> Self {
        ListValue { elem_type, items }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PartialEq for ListValue {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for ListValue {}

impl Hash for ListValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

/// Insertion-ordered map with non-null keys.
#[derive(Clone, Debug, Default)]
pub struct MapValue {
    pub key_type: Option<VariableType>,
    pub value_type: Option<VariableType>,
    pub entries: IndexMap<Value, Option<Value>>,
}

impl MapValue {
    pub fn new(
        key_type: Option<VariableType>,
        value_type: Option<VariableType>,
        entries: IndexMap<Value, Option<Value>>,
    ) -> Self {
        MapValue {
            key_type,
            value_type,
            entries,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as standalone entry values, in insertion order.
    pub fn entry_values(&self) -> impl Iterator<Item = Value> + '_ {
        self.entries.iter().map(|(key, value)| {
            Value::Entry(Box::new(EntryValue::new(
                self.key_type.clone(),
                self.value_type.clone(),
                Some(key.clone()),
                value.clone(),
            )))
        })
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for MapValue {}

impl Hash for MapValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-insensitive, matching `IndexMap`'s equality.
        let mut combined: u64 = 0;
        for (key, value) in &self.entries {
            let mut hasher = FxHasher::default();
            key.hash(&mut hasher);
            value.hash(&mut hasher);
            combined = combined.wrapping_add(hasher.finish());
        }
        state.write_usize(self.entries.len());
        state.write_u64(combined);
    }
}

/// A single key/value pair.
#[derive(Clone, Debug, Default)]
pub struct EntryValue {
    pub key_type: Option<VariableType>,
    pub value_type: Option<VariableType>,
    pub key: Option<Value>,
    pub value: Option<Value>,
}

impl EntryValue {
    pub fn new(
        key_type: Option<VariableType>,
        value_type: Option<VariableType>,
        key: Option<Value>,
        value: Option<Value>,
    ) -> Self {
        EntryValue {
            key_type,
            value_type,
            key,
            value,
        }
    }
}

impl PartialEq for EntryValue {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl Eq for EntryValue {}

impl Hash for EntryValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.value.hash(state);
    }
}

/// Snapshot of a sequence taken when the iterator was created.
///
/// Later mutation of the source container does not affect the snapshot.
#[derive(Clone, Debug, Default)]
pub struct IteratorValue {
    pub elem_type: Option<VariableType>,
    pub items: Vec<Option<Value>>,
}

impl IteratorValue {
    pub fn new(elem_type: Option<VariableType>, items: Vec<Option<Value>>) -> Self {
        IteratorValue { elem_type, items }
    }
}

impl PartialEq for IteratorValue {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for IteratorValue {}

impl Hash for IteratorValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}
