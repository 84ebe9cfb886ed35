//! Named variable storage.
//!
//! Variables are declared with a type (`add`), after which every value
//! written through the path engine is cast to that type. `get` hands out
//! the slot for mutation and marks it dirty so a persisting host knows what
//! to write back; `get_readonly` leaves the dirty set alone.

use imv_ir::VariableId;
use imv_types::{already_exists, not_found, EvalResult, TypeTemplate, TypedValue, VariableType};
use rustc_hash::{FxHashMap, FxHashSet};

/// Storage of typed named variables.
pub trait VariableStore {
    /// The slot of `id`, marked dirty.
    fn get(&mut self, id: &VariableId) -> EvalResult<&mut TypedValue>;

    /// The slot of `id`, without marking it dirty.
    fn get_readonly(&self, id: &VariableId) -> EvalResult<&TypedValue>;

    /// Declare `id` holding the default value of `ty`.
    fn add(&mut self, id: VariableId, ty: VariableType) -> EvalResult<()>;

    /// Insert or replace a whole slot.
    fn set(&mut self, id: VariableId, value: TypedValue) -> EvalResult<()>;

    fn remove(&mut self, id: &VariableId) -> EvalResult<TypedValue>;

    fn list_ids(&self) -> Vec<VariableId>;
}

/// A store kept in memory for the lifetime of the host.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slots: FxHashMap<VariableId, TypedValue>,
    dirty: FxHashSet<VariableId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_dirty(&self, id: &VariableId) -> bool {
        self.dirty.contains(id)
    }

    /// Ids handed out for mutation since the last call, sorted.
    pub fn take_dirty(&mut self) -> Vec<VariableId> {
        let mut ids: Vec<VariableId> = self.dirty.drain().collect();
        ids.sort_unstable();
        ids
    }
}

impl VariableStore for MemoryStore {
    fn get(&mut self, id: &VariableId) -> EvalResult<&mut TypedValue> {
        let slot = self.slots.get_mut(id).ok_or_else(|| not_found(id))?;
        self.dirty.insert(id.clone());
        Ok(slot)
    }

    fn get_readonly(&self, id: &VariableId) -> EvalResult<&TypedValue> {
        self.slots.get(id).ok_or_else(|| not_found(id))
    }

    fn add(&mut self, id: VariableId, ty: VariableType) -> EvalResult<()> {
        if self.slots.contains_key(&id) {
            return Err(already_exists(&id));
        }
        let value = TypeTemplate::of(ty.tag()).default_value(&ty);
        tracing::debug!(%id, %ty, "declared variable");
        self.dirty.insert(id.clone());
        self.slots.insert(id, TypedValue { ty, value });
        Ok(())
    }

    fn set(&mut self, id: VariableId, value: TypedValue) -> EvalResult<()> {
        self.dirty.insert(id.clone());
        self.slots.insert(id, value);
        Ok(())
    }

    fn remove(&mut self, id: &VariableId) -> EvalResult<TypedValue> {
        let removed = self.slots.remove(id).ok_or_else(|| not_found(id))?;
        self.dirty.remove(id);
        tracing::debug!(%id, "removed variable");
        Ok(removed)
    }

    fn list_ids(&self) -> Vec<VariableId> {
        let mut ids: Vec<VariableId> = self.slots.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}
