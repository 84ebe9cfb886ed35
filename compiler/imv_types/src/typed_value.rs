//! The unit stored per named variable.

use std::fmt;

use crate::{cast_variable, EvalResult, TypeRegistry, Value, VariableType};

/// A type paired with a possibly-null value of that type.
///
/// The value has always been cast to `ty`, so a stored value never drifts
/// from its declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypedValue {
    pub ty: VariableType,
    pub value: Option<Value>,
}

impl TypedValue {
    /// Cast `value` to `ty` and pair them.
    pub fn new(ty: VariableType, value: Option<Value>) -> EvalResult<Self> {
        let value = cast_variable(Some(&ty), value)?;
        Ok(TypedValue { ty, value })
    }

    /// A null value of type `ty`.
    pub fn empty(ty: VariableType) -> Self {
        TypedValue { ty, value: None }
    }

    /// The registry's default value for `ty`.
    pub fn with_default(registry: &TypeRegistry, ty: VariableType) -> Self {
        let value = registry.default_value(&ty);
        TypedValue { ty, value }
    }

    /// Replace the value, casting it to this slot's type.
    pub fn assign(&mut self, value: Option<Value>) -> EvalResult<()> {
        self.value = cast_variable(Some(&self.ty), value)?;
        Ok(())
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{value} ({})", self.ty),
            None => write!(f, "null ({})", self.ty),
        }
    }
}
