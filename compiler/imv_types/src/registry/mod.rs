//! Registry of type templates.
//!
//! The `TypeRegistry` maps type names (as written in casts) and one-byte
//! template ids to [`TypeTemplate`]s. It is constructed once by the host and
//! passed by reference into the compiler and codec, so independent
//! registries can coexist.
//!
//! # Design
//!
//! - Name lookup: `FxHashMap` from name (and aliases) to tag
//! - Id lookup: `Tag::from_id`, since template ids are the tag discriminants
//! - Templates are plain data; casting and default construction dispatch on
//!   the tag

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::{Capabilities, IteratorValue, ListValue, MapValue, Position, Tag, Value, VariableType};


/// Descriptor shared by every type built from one tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeTemplate {
    /// Template id and kind.
    pub tag: Tag,

    /// Canonical name.
    pub name: &'static str,

    /// Number of child type slots.
    pub child_count: usize,

    /// Operators values of this template support.
    pub capabilities: Capabilities,
}

impl TypeTemplate {
    pub const fn of(tag: Tag) -> Self {
        TypeTemplate {
            tag,
            name: tag.name(),
            child_count: tag.child_count(),
            capabilities: tag.capabilities(),
        }
    }

    #[inline]
    pub const fn id(&self) -> u8 {
        self.tag.id()
    }

    /// Build a type from this template. `None` on wrong child arity.
    pub fn instantiate(&self, children: Vec<Option<VariableType>>) -> Option<VariableType> {
        VariableType::with_children(self.tag, children)
    }

    /// Zero-argument factory: the value a freshly added variable holds.
    ///
    /// Entities and entries have no meaningful default and start out null.
    pub fn default_value(&self, ty: &VariableType) -> Option<Value> {
        match self.tag {
            Tag::Byte => Some(Value::Byte(0)),
            Tag::Short => Some(Value::Short(0)),
            Tag::Int => Some(Value::Int(0)),
            Tag::Long => Some(Value::Long(0)),
            Tag::Float => Some(Value::Float(0.0)),
            Tag::Double => Some(Value::Double(0.0)),
            Tag::Str => Some(Value::Str(String::new())),
            Tag::Position => Some(Value::Position(Position::ORIGIN)),
            Tag::List => Some(Value::List(ListValue::new(ty.child(0).cloned(), Vec::new()))),
            Tag::Iterator => Some(Value::Iterator(IteratorValue::new(
                ty.child(0).cloned(),
                Vec::new(),
            ))),
            Tag::Map => Some(Value::Map(MapValue::new(
                ty.child(0).cloned(),
                ty.child(1).cloned(),
                IndexMap::new(),
            ))),
            Tag::Entity | Tag::Entry => None,
        }
    }
}

/// Name and id lookup for type templates.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    /// Names and aliases to tags.
    by_name: FxHashMap<String, Tag>,
}

impl TypeRegistry {
    /// A registry holding every built-in template under its canonical name,
    /// plus the short aliases `str`, `pos` and `uuid`.
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            by_name: FxHashMap::default(),
        };
        for tag in Tag::ALL {
            registry.by_name.insert(tag.name().to_owned(), tag);
        }
        registry.register_alias("str", Tag::Str);
        registry.register_alias("pos", Tag::Position);
        registry.register_alias("uuid", Tag::Entity);
        registry
    }

    /// Make `name` resolve to `tag`. Replaces any earlier binding of `name`.
    pub fn register_alias(&mut self, name: impl Into<String>, tag: Tag) {
        self.by_name.insert(name.into(), tag);
    }

    /// Look up a template by name.
    pub fn lookup_name(&self, name: &str) -> Option<TypeTemplate> {
        self.by_name.get(name).copied().map(TypeTemplate::of)
    }

    /// Look up a template by its one-byte id.
    pub fn from_id(&self, id: u8) -> Option<TypeTemplate> {
        Tag::from_id(id).map(TypeTemplate::of)
    }

    #[inline]
    pub fn template(&self, tag: Tag) -> TypeTemplate {
        TypeTemplate::of(tag)
    }

    /// Every registered name, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Default value of a variable of type `ty`.
    pub fn default_value(&self, ty: &VariableType) -> Option<Value> {
        self.template(ty.tag()).default_value(ty)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
