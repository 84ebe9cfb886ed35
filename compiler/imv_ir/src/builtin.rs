//! Built-in functions, resolved at compile time by name and arity.

use std::fmt;

/// Number of arguments a built-in accepts.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Arity {
    Fixed(usize),
    Variadic,
}

impl Arity {
    #[inline]
    pub const fn accepts(self, argc: usize) -> bool {
        match self {
            Arity::Fixed(n) => n == argc,
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{n}"),
            Arity::Variadic => f.write_str("*"),
        }
    }
}

/// A built-in function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Builtin {
    /// `all(...)`: concatenate every argument into one stream.
    All,
    /// `key(entry)`
    Key,
    /// `value(entry)`
    Value,
    /// `entries(container)`: stream of entries.
    Entries,
    /// `keys(container)`: stream of map keys or list indices.
    Keys,
    /// `values(container)`: stream of map values or list elements.
    Values,
    /// `size(value)`
    Size,
    /// `iter(container)`: snapshot iterator.
    Iter,
    /// `type(value)`: the value's type name.
    Type,
    Abs,
    Min,
    Max,
    /// `pos(x, y, z)`
    Pos,
    /// `pos(entity)`: an entity's position, from the host.
    EntityPos,
    /// `here()`: the invocation origin, from the host.
    Here,
    /// `entity(selector)`: entities matching a selector, from the host.
    Entity,
    /// `random()`: a double in `[0, 1)`.
    Random,
    /// `random(low, high)`: an integer in `[low, high]`.
    RandomRange,
}

impl Builtin {
    pub const ALL: [Builtin; 18] = [
        Self::All,
        Self::Key,
        Self::Value,
        Self::Entries,
        Self::Keys,
        Self::Values,
        Self::Size,
        Self::Iter,
        Self::Type,
        Self::Abs,
        Self::Min,
        Self::Max,
        Self::Pos,
        Self::EntityPos,
        Self::Here,
        Self::Entity,
        Self::Random,
        Self::RandomRange,
    ];

    /// Resolve a call site. `None` when no built-in has this name and arity.
    pub fn lookup(name: &str, argc: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|builtin| builtin.name() == name && builtin.arity().accepts(argc))
    }

    /// Whether any built-in is called `name`, whatever its arity.
    pub fn is_known_name(name: &str) -> bool {
        Self::ALL.iter().any(|builtin| builtin.name() == name)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Key => "key",
            Self::Value => "value",
            Self::Entries => "entries",
            Self::Keys => "keys",
            Self::Values => "values",
            Self::Size => "size",
            Self::Iter => "iter",
            Self::Type => "type",
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
            Self::Pos | Self::EntityPos => "pos",
            Self::Here => "here",
            Self::Entity => "entity",
            Self::Random | Self::RandomRange => "random",
        }
    }

    pub const fn arity(self) -> Arity {
        match self {
            Self::All => Arity::Variadic,
            Self::Here | Self::Random => Arity::Fixed(0),
            Self::Key
            | Self::Value
            | Self::Entries
            | Self::Keys
            | Self::Values
            | Self::Size
            | Self::Iter
            | Self::Type
            | Self::Abs
            | Self::EntityPos
            | Self::Entity => Arity::Fixed(1),
            Self::Min | Self::Max | Self::RandomRange => Arity::Fixed(2),
            Self::Pos => Arity::Fixed(3),
        }
    }

    /// Whether the result depends on live context (host state, randomness).
    pub const fn is_not_constant(self) -> bool {
        matches!(
            self,
            Self::EntityPos | Self::Here | Self::Entity | Self::Random | Self::RandomRange
        )
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name(), self.arity())
    }
}
