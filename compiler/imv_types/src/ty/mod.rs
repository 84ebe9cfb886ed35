//! Type descriptors and the lowering lattice.
//!
//! A `VariableType` is a small tree: a [`Tag`] plus one child slot per
//! template child. A child slot may be unset (`None`), meaning "inferred on
//! cast". Two types are equal iff their tags and all child slots are equal.

use std::fmt;

use crate::{incompatible_type, Capabilities, EvalResult, Tag, Value};


/// A type tree: template tag plus child type slots.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VariableType {
    tag: Tag,
    children: Box<[Option<VariableType>]>,
}

impl VariableType {
    /// A leaf type (no child slots). Container tags get unset children.
    pub fn leaf(tag: Tag) -> Self {
        VariableType {
            tag,
            children: vec![None; tag.child_count()].into_boxed_slice(),
        }
    }

    /// Build a type from a tag and its child slots.
    ///
    /// Returns `None` when `children` does not match the tag's child count.
    pub fn with_children(tag: Tag, children: Vec<Option<VariableType>>) -> Option<Self> {
        (children.len() == tag.child_count()).then(|| VariableType {
            tag,
            children: children.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn byte() -> Self {
        Self::leaf(Tag::Byte)
    }

    #[inline]
    pub fn short() -> Self {
        Self::leaf(Tag::Short)
    }

    #[inline]
    pub fn int() -> Self {
        Self::leaf(Tag::Int)
    }

    #[inline]
    pub fn long() -> Self {
        Self::leaf(Tag::Long)
    }

    #[inline]
    pub fn float() -> Self {
        Self::leaf(Tag::Float)
    }

    #[inline]
    pub fn double() -> Self {
        Self::leaf(Tag::Double)
    }

    #[inline]
    pub fn string() -> Self {
        Self::leaf(Tag::Str)
    }

    #[inline]
    pub fn entity() -> Self {
        Self::leaf(Tag::Entity)
    }

    #[inline]
    pub fn position() -> Self {
        Self::leaf(Tag::Position)
    }

    /// `list<element>`
    pub fn list(element: Option<VariableType>) -> Self {
        VariableType {
            tag: Tag::List,
            children: Box::new([element]),
        }
    }

    /// `iterator<element>`
    pub fn iterator(element: Option<VariableType>) -> Self {
        VariableType {
            tag: Tag::Iterator,
            children: Box::new([element]),
        }
    }

    /// `map<key, value>`
    pub fn map(key: Option<VariableType>, value: Option<VariableType>) -> Self {
        VariableType {
            tag: Tag::Map,
            children: Box::new([key, value]),
        }
    }

    /// `entry<key, value>`
    pub fn entry(key: Option<VariableType>, value: Option<VariableType>) -> Self {
        VariableType {
            tag: Tag::Entry,
            children: Box::new([key, value]),
        }
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    pub fn children(&self) -> &[Option<VariableType>] {
        &self.children
    }

    /// The type in child slot `index`, if that slot exists and is set.
    #[inline]
    pub fn child(&self, index: usize) -> Option<&VariableType> {
        self.children.get(index).and_then(Option::as_ref)
    }

    /// Whether every child slot, recursively, is set.
    pub fn is_complete(&self) -> bool {
        self.children
            .iter()
            .all(|child| child.as_ref().is_some_and(VariableType::is_complete))
    }

    /// Whether this is `list<short>`, the code-unit form of a string.
    pub fn is_code_unit_list(&self) -> bool {
        self.tag == Tag::List && self.child(0).is_some_and(|t| t.tag == Tag::Short)
    }

    /// The next type in this type's lowering chain.
    pub fn next_lowered_type(&self) -> Option<VariableType> {
        match self.tag {
            Tag::Byte => Some(Self::short()),
            Tag::Short => Some(Self::int()),
            Tag::Int => Some(Self::long()),
            Tag::Long => Some(Self::float()),
            Tag::Float => Some(Self::double()),
            Tag::List if self.is_code_unit_list() => Some(Self::string()),
            Tag::List | Tag::Map => Some(Self::int()),
            Tag::Iterator => match self.child(0) {
                Some(element) if element.tag == Tag::Entry => Some(Self::map(
                    element.child(0).cloned(),
                    element.child(1).cloned(),
                )),
                element => Some(Self::list(element.cloned())),
            },
            Tag::Entity => Some(Self::long()),
            Tag::Double | Tag::Str | Tag::Position | Tag::Entry => None,
        }
    }

    /// This type followed by every type it lowers to.
    pub fn lowering_chain(&self) -> impl Iterator<Item = VariableType> {
        std::iter::successors(Some(self.clone()), VariableType::next_lowered_type)
    }

    /// Whether values of this type support every operator in `required`.
    #[inline]
    pub fn supports(&self, required: Capabilities) -> bool {
        self.tag.capabilities().contains(required)
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag.name())?;
        if self.children.iter().all(Option::is_none) {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match child {
                Some(child) => write!(f, "{child}")?,
                None => f.write_str("?")?,
            }
        }
        f.write_str(">")
    }
}

impl fmt::Debug for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// First type on `a`'s lowering chain that also appears on `b`'s chain.
///
/// Both chains are short and acyclic, so the quadratic search is bounded
/// by a small constant.
pub fn find_lowered_common_type(a: &VariableType, b: &VariableType) -> Option<VariableType> {
    a.lowering_chain()
        .find(|candidate| b.lowering_chain().any(|other| &other == candidate))
}

/// Type both operands lower to that supports `required`.
///
/// Starts at the lowered common type and walks forward along its chain;
/// `None` when the chains never meet or no type on the remaining chain has
/// the capability.
pub fn find_operable_type(
    a: &VariableType,
    b: &VariableType,
    required: Capabilities,
) -> Option<VariableType> {
    find_lowered_common_type(a, b)?
        .lowering_chain()
        .find(|candidate| candidate.supports(required))
}

/// Common lowered type of a sequence of values.
///
/// Returns `Ok(None)` for an empty sequence and `IncompatibleType` naming
/// the first pair of types whose chains never meet.
pub fn common_type_of<'a>(
    values: impl IntoIterator<Item = &'a Value>,
) -> EvalResult<Option<VariableType>> {
    let mut common: Option<VariableType> = None;
    for value in values {
        let ty = value.variable_type();
        common = Some(match common {
            None => ty,
            Some(current) => find_lowered_common_type(&current, &ty)
                .ok_or_else(|| incompatible_type(&current, &ty))?,
        });
    }
    Ok(common)
}
