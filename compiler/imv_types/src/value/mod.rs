//! Runtime values.
//!
//! A `Value` is never null; absence is `Option<Value>::None` wherever a
//! value may be missing (list elements, map values, entry halves, variable
//! slots). Scalar values are immutable. Lists and maps are mutated in place
//! only by the path engine, through the variable that owns them.

mod composite;

use std::fmt;
use std::hash::{Hash, Hasher};

pub use composite::{EntityRef, EntryValue, IteratorValue, ListValue, MapValue, Position};

use crate::{Tag, VariableType};


/// Runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Entity(EntityRef),
    Position(Position),
    List(ListValue),
    Map(MapValue),
    Entry(Box<EntryValue>),
    Iterator(IteratorValue),
}

// Factory Methods

impl Value {
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// A list with the given element type.
    #[inline]
    pub fn list(elem_type: Option<VariableType>, items: Vec<Option<Value>>) -> Self {
        Value::List(ListValue::new(elem_type, items))
    }

    /// An entry whose child types are taken from its halves.
    pub fn entry(key: Option<Value>, value: Option<Value>) -> Self {
        Value::Entry(Box::new(EntryValue::new(
            key.as_ref().map(Value::variable_type),
            value.as_ref().map(Value::variable_type),
            key,
            value,
        )))
    }

    /// A string as its UTF-16 code units.
    pub fn code_units(s: &str) -> Vec<Option<Value>> {
        s.encode_utf16()
            .map(|unit| Some(Value::Short(unit as i16)))
            .collect()
    }
}

// Value Methods

impl Value {
    /// Template tag of this value's kind.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Byte(_) => Tag::Byte,
            Value::Short(_) => Tag::Short,
            Value::Int(_) => Tag::Int,
            Value::Long(_) => Tag::Long,
            Value::Float(_) => Tag::Float,
            Value::Double(_) => Tag::Double,
            Value::Str(_) => Tag::Str,
            Value::Entity(_) => Tag::Entity,
            Value::Position(_) => Tag::Position,
            Value::List(_) => Tag::List,
            Value::Map(_) => Tag::Map,
            Value::Entry(_) => Tag::Entry,
            Value::Iterator(_) => Tag::Iterator,
        }
    }

    /// Kind name for error messages.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.tag().name()
    }

    /// The type of this value, including container child types.
    pub fn variable_type(&self) -> VariableType {
        match self {
            Value::List(list) => VariableType::list(list.elem_type.clone()),
            Value::Iterator(iter) => VariableType::iterator(iter.elem_type.clone()),
            Value::Map(map) => VariableType::map(map.key_type.clone(), map.value_type.clone()),
            Value::Entry(entry) => VariableType::entry(
                entry
                    .key_type
                    .clone()
                    .or_else(|| entry.key.as_ref().map(Value::variable_type)),
                entry
                    .value_type
                    .clone()
                    .or_else(|| entry.value.as_ref().map(Value::variable_type)),
            ),
            scalar => VariableType::leaf(scalar.tag()),
        }
    }

    /// Number of contained elements, for container kinds.
    pub fn element_count(&self) -> Option<usize> {
        match self {
            Value::List(list) => Some(list.len()),
            Value::Map(map) => Some(map.len()),
            Value::Iterator(iter) => Some(iter.items.len()),
            _ => None,
        }
    }

    /// Integer coercion (lossy where applicable).
    ///
    /// Numerics truncate, strings parse, containers yield their element
    /// count, entities their low 64 bits. Entries and positions have no
    /// integer meaning.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Byte(n) => Some(i64::from(*n)),
            Value::Short(n) => Some(i64::from(*n)),
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            Value::Float(f) => Some(*f as i64),
            Value::Double(f) => Some(*f as i64),
            Value::Str(s) => {
                let text = s.trim();
                text.parse::<i64>().ok().or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f as i64)
                })
            }
            Value::Entity(entity) => Some(entity.low_bits()),
            Value::List(_) | Value::Map(_) | Value::Iterator(_) => {
                self.element_count().map(|n| n as i64)
            }
            Value::Position(_) | Value::Entry(_) => None,
        }
    }

    /// Floating-point coercion (lossy where applicable).
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(f) => Some(*f),
            Value::Long(n) => Some(*n as f64),
            Value::Str(s) => s.trim().parse::<f64>().ok(),
            other => other.as_long().map(|n| n as f64),
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        self.as_long().map(|n| n as i32)
    }

    #[inline]
    pub fn as_short(&self) -> Option<i16> {
        self.as_long().map(|n| n as i16)
    }

    #[inline]
    pub fn as_byte(&self) -> Option<i8> {
        self.as_long().map(|n| n as i8)
    }

    #[inline]
    pub fn as_float(&self) -> Option<f32> {
        self.as_double().map(|f| f as f32)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_entry(&self) -> Option<&EntryValue> {
        match self {
            Value::Entry(entry) => Some(entry),
            _ => None,
        }
    }

    /// Rendering used by string casts: numbers without kind suffixes,
    /// strings without quotes. Other kinds use the canonical rendering.
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::Byte(n) => n.to_string(),
            Value::Short(n) => n.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Long(n) => n.to_string(),
            Value::Float(f) => format!("{f:?}"),
            Value::Double(f) => format!("{f:?}"),
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Quote and escape a string the way the compiler reads it back.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// Trait Implementations

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Entity(a), Value::Entity(b)) => a == b,
            (Value::Position(a), Value::Position(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Entry(a), Value::Entry(b)) => a == b,
            (Value::Iterator(a), Value::Iterator(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        match self {
            Value::Byte(n) => n.hash(state),
            Value::Short(n) => n.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Long(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Double(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::Entity(e) => e.hash(state),
            Value::Position(p) => p.hash(state),
            Value::List(l) => l.hash(state),
            Value::Map(m) => m.hash(state),
            Value::Entry(e) => e.hash(state),
            Value::Iterator(i) => i.hash(state),
        }
    }
}

/// Write a possibly-null slot.
fn write_slot(f: &mut fmt::Formatter<'_>, slot: Option<&Value>) -> fmt::Result {
    match slot {
        Some(value) => write!(f, "{value}"),
        None => f.write_str("null"),
    }
}

fn write_sequence(f: &mut fmt::Formatter<'_>, items: &[Option<Value>]) -> fmt::Result {
    f.write_str("{")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_slot(f, item.as_ref())?;
    }
    f.write_str("}")
}

/// Canonical rendering; reads back through the compiler to an equal value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Byte(n) => write!(f, "{n}B"),
            Value::Short(n) => write!(f, "{n}S"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}L"),
            Value::Float(n) => write!(f, "{n:?}F"),
            Value::Double(n) => write!(f, "{n:?}"),
            Value::Str(s) => f.write_str(&escape_string(s)),
            Value::Entity(e) => write!(f, "{e}"),
            Value::Position(p) => write!(f, "{p}"),
            Value::List(list) => write_sequence(f, &list.items),
            Value::Iterator(iter) => {
                f.write_str("iter(")?;
                write_sequence(f, &iter.items)?;
                f.write_str(")")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{{{key} : ")?;
                    write_slot(f, value.as_ref())?;
                    f.write_str("}")?;
                }
                f.write_str("}")
            }
            Value::Entry(entry) => {
                f.write_str("{")?;
                write_slot(f, entry.key.as_ref())?;
                f.write_str(" : ")?;
                write_slot(f, entry.value.as_ref())?;
                f.write_str("}")
            }
        }
    }
}
