//! Reading and mutating stored variables through paths.
//!
//! A read lowers the path to instructions and runs them like any other
//! expression. A mutation works in two phases:
//!
//! 1. **Resolve** against a read-only view of the store: evaluate every
//!    index expression and turn the path into concrete slot locations, each
//!    a sequence of [`ChildKey`]s below the variable.
//! 2. **Apply** to the variable's slot, location by location.
//!
//! Locations fan out like operands do: an accessor that can address many
//! slots (`[]`, `[a..b]`, `[i?]`, a map pattern, a stream index) makes the
//! targets a stream. A stream of targets takes a single value for every
//! target or zips with a stream of values; a single target refuses a
//! stream. Errors on one target of a stream are reported to the sink and
//! that target is skipped.

use imv_ir::{Accessor, Builtin, ChildKey, Code, Instruction, PathExpr, VariableId};
use imv_types::{
    cast_variable, index_out_of_bounds, key_not_found, multiple_values_to_single_variable,
    not_entry, not_indexable, null_operand, unable_to_remove_from_entry, EvalResult,
    IteratorValue, ListValue, TypedValue, Value,
};

use crate::index::{clamp_range, map_key, matches_pattern, slot_index};
use crate::{execute, ErrorSink, EvalContext, Evaluated, HostEnvironment, Operand, VariableStore};


/// Told about every slot a mutation changed, so live bindings to it can
/// refresh.
pub trait BindingObserver {
    /// `steps` is empty when the variable itself changed.
    fn path_changed(&self, base: &VariableId, steps: &[ChildKey]);
}

/// An observer for hosts without bindings.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoBindings;

impl BindingObserver for NoBindings {
    fn path_changed(&self, _base: &VariableId, _steps: &[ChildKey]) {}
}

static NO_BINDINGS: NoBindings = NoBindings;

/// Lower a path to the instructions that read it.
pub fn path_code(path: &PathExpr) -> Code {
    let mut code = vec![Instruction::LoadVariable(path.base.clone())];
    for accessor in &path.accessors {
        match accessor {
            Accessor::AllContents => code.push(Instruction::GetAllContents),
            Accessor::Index(index) => {
                code.extend(index.iter().cloned());
                code.push(Instruction::GetIndexedContents);
            }
            Accessor::OptionalIndex(index) => {
                code.extend(index.iter().cloned());
                code.push(Instruction::GetOptionalIndexedContents);
            }
            Accessor::Range(start, end) => {
                code.extend(start.iter().cloned());
                code.extend(end.iter().cloned());
                code.push(Instruction::GetRangeIndexedContents);
            }
            Accessor::EntryKey => code.push(Instruction::Call {
                builtin: Builtin::Key,
                argc: 1,
            }),
            Accessor::EntryValue => code.push(Instruction::Call {
                builtin: Builtin::Value,
                argc: 1,
            }),
        }
    }
    code
}

/// Get, set and remove through paths.
#[derive(Copy, Clone)]
pub struct PathEngine<'a> {
    host: &'a dyn HostEnvironment,
    sink: &'a dyn ErrorSink,
    observer: &'a dyn BindingObserver,
}

impl<'a> PathEngine<'a> {
    pub fn new(host: &'a dyn HostEnvironment, sink: &'a dyn ErrorSink) -> Self {
        PathEngine {
            host,
            sink,
            observer: &NO_BINDINGS,
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn BindingObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Read the value(s) a path addresses.
    pub fn get<'s>(&self, path: &PathExpr, store: &'s dyn VariableStore) -> EvalResult<Operand<'s>>
    where
        'a: 's,
    {
        let ctx = EvalContext::new(store, self.host, self.sink);
        execute(&path_code(path), ctx)
    }

    /// Assign `values` to every slot the path addresses, creating the last
    /// step when it is missing. Returns the number of slots that changed.
    pub fn set(
        &self,
        path: &PathExpr,
        values: Evaluated,
        store: &mut dyn VariableStore,
    ) -> EvalResult<usize> {
        let targets = self.resolve(path, &*store, true)?;
        let assignments: Vec<(Vec<ChildKey>, Option<Value>)> = match values {
            Evaluated::Single(value) => targets
                .locations
                .into_iter()
                .map(|location| (location, value.clone()))
                .collect(),
            Evaluated::Many(_) if !targets.multi => {
                return Err(multiple_values_to_single_variable())
            }
            Evaluated::Many(values) => targets.locations.into_iter().zip(values).collect(),
        };

        let slot = store.get(&path.base)?;
        let mut changed = 0;
        for (location, value) in assignments {
            let result = assign_at(slot, &location, value);
            if self.settle(result, targets.multi)? == Some(true) {
                changed += 1;
                self.observer.path_changed(&path.base, &location);
            }
        }
        tracing::debug!(%path, changed, "set path");
        Ok(changed)
    }

    /// Remove every slot the path addresses. Without accessors the whole
    /// variable is removed from the store.
    ///
    /// The last element of a list is dropped; any other element is nulled
    /// so later indices stay put. Slots are processed last to first, so
    /// removing `list[]` empties the list.
    pub fn remove(&self, path: &PathExpr, store: &mut dyn VariableStore) -> EvalResult<usize> {
        match path.accessors.last() {
            None => {
                store.remove(&path.base)?;
                self.observer.path_changed(&path.base, &[]);
                tracing::debug!(%path, "removed variable");
                return Ok(1);
            }
            Some(Accessor::EntryKey | Accessor::EntryValue) => {
                return Err(unable_to_remove_from_entry())
            }
            Some(_) => {}
        }

        let targets = self.resolve(path, &*store, false)?;
        let slot = store.get(&path.base)?;
        let mut removed = 0;
        for location in targets.locations.iter().rev() {
            let result = remove_at(&mut slot.value, location);
            if self.settle(result, targets.multi)? == Some(true) {
                removed += 1;
                self.observer.path_changed(&path.base, location);
            }
        }
        tracing::debug!(%path, removed, "removed from path");
        Ok(removed)
    }

    /// Turn a path into slot locations. With `create_last`, the last step
    /// may name a list index past the end or a missing map key.
    fn resolve(
        &self,
        path: &PathExpr,
        store: &dyn VariableStore,
        create_last: bool,
    ) -> EvalResult<Targets> {
        let ctx = EvalContext::new(store, self.host, self.sink);
        let root = store.get_readonly(&path.base)?.value.as_ref();
        let mut targets = Targets {
            locations: vec![Vec::new()],
            multi: false,
        };
        let last = path.accessors.len().saturating_sub(1);
        for (depth, accessor) in path.accessors.iter().enumerate() {
            let selectors = Selectors::evaluate(accessor, ctx)?;
            targets = self.expand(root, targets, selectors, create_last && depth == last)?;
        }
        Ok(targets)
    }

    fn expand(
        &self,
        root: Option<&Value>,
        targets: Targets,
        selectors: Selectors,
        creating: bool,
    ) -> EvalResult<Targets> {
        let mut multi = targets.multi || selectors.fans();
        let pairs: Vec<(Vec<ChildKey>, Selector)> = match selectors {
            Selectors::One(selector) => targets
                .locations
                .into_iter()
                .map(|location| (location, selector.clone()))
                .collect(),
            Selectors::Many(selectors) if targets.multi => {
                targets.locations.into_iter().zip(selectors).collect()
            }
            Selectors::Many(selectors) => targets
                .locations
                .into_iter()
                .flat_map(|location| {
                    selectors
                        .iter()
                        .map(move |selector| (location.clone(), selector.clone()))
                })
                .collect(),
        };

        let mut locations = Vec::with_capacity(pairs.len());
        for (location, selector) in pairs {
            let resolved = lookup(root, &location)
                .and_then(|parent| children(parent, &selector, creating));
            let Some((keys, fanned)) = self.settle(resolved, multi)? else {
                continue;
            };
            multi |= fanned;
            for key in keys {
                let mut child = location.clone();
                child.push(key);
                locations.push(child);
            }
        }
        Ok(Targets { locations, multi })
    }

    /// Propagate an error for a single target; report and skip it for a
    /// stream of targets.
    fn settle<T>(&self, result: EvalResult<T>, multi: bool) -> EvalResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(error) if multi => {
                self.sink.report(&error);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}

struct Targets {
    locations: Vec<Vec<ChildKey>>,
    /// Whether the locations form a stream rather than one slot.
    multi: bool,
}

/// One evaluated accessor.
#[derive(Clone, Debug)]
enum Selector {
    All,
    Index(Option<Value>),
    Optional(Option<Value>),
    Range(Option<Value>, Option<Value>),
    EntryKey,
    EntryValue,
}

enum Selectors {
    One(Selector),
    /// An index expression that produced a stream.
    Many(Vec<Selector>),
}

impl Selectors {
    fn evaluate(accessor: &Accessor, ctx: EvalContext<'_>) -> EvalResult<Self> {
        Ok(match accessor {
            Accessor::AllContents => Selectors::One(Selector::All),
            Accessor::EntryKey => Selectors::One(Selector::EntryKey),
            Accessor::EntryValue => Selectors::One(Selector::EntryValue),
            Accessor::Index(code) => {
                Self::from_index(execute(code, ctx)?.collect(), Selector::Index)
            }
            Accessor::OptionalIndex(code) => {
                Self::from_index(execute(code, ctx)?.collect(), Selector::Optional)
            }
            Accessor::Range(start, end) => {
                let start = execute(start, ctx)?.into_single()?;
                let end = execute(end, ctx)?.into_single()?;
                Selectors::One(Selector::Range(start, end))
            }
        })
    }

    fn from_index(index: Evaluated, wrap: fn(Option<Value>) -> Selector) -> Self {
        match index {
            Evaluated::Single(value) => Selectors::One(wrap(value)),
            Evaluated::Many(values) => Selectors::Many(values.into_iter().map(wrap).collect()),
        }
    }

    fn fans(&self) -> bool {
        matches!(
            self,
            Selectors::Many(_)
                | Selectors::One(Selector::All | Selector::Optional(_) | Selector::Range(..))
        )
    }
}

/// The value at a location, read-only.
fn lookup<'v>(root: Option<&'v Value>, location: &[ChildKey]) -> EvalResult<Option<&'v Value>> {
    location.iter().try_fold(root, |parent, key| match (parent, key) {
        (
            Some(
                Value::List(ListValue { items, .. })
                | Value::Iterator(IteratorValue { items, .. }),
            ),
            ChildKey::Index(i),
        ) => items
            .get(*i)
            .map(Option::as_ref)
            .ok_or_else(|| index_out_of_bounds(*i as i64, items.len())),
        (Some(Value::Map(map)), ChildKey::MapKey(key)) => map
            .entries
            .get(key)
            .map(Option::as_ref)
            .ok_or_else(|| key_not_found(key)),
        (Some(Value::Entry(entry)), ChildKey::EntryKey) => Ok(entry.key.as_ref()),
        (Some(Value::Entry(entry)), ChildKey::EntryValue) => Ok(entry.value.as_ref()),
        (None, key) => Err(null_operand(key)),
        (Some(other), _) => Err(not_indexable(other.type_name())),
    })
}

/// The child slots a selector addresses below `parent`, and whether the
/// selection is a stream.
fn children(
    parent: Option<&Value>,
    selector: &Selector,
    creating: bool,
) -> EvalResult<(Vec<ChildKey>, bool)> {
    let parent = parent.ok_or_else(|| null_operand("path step"))?;
    match selector {
        Selector::All => match parent {
            Value::List(ListValue { items, .. }) | Value::Iterator(IteratorValue { items, .. }) => {
                Ok(((0..items.len()).map(ChildKey::Index).collect(), true))
            }
            Value::Map(map) => {
                let keys = map.entries.keys().cloned().map(ChildKey::MapKey).collect();
                Ok((keys, true))
            }
            other => Err(not_indexable(other.type_name())),
        },
        Selector::Index(index) => index_children(parent, index.as_ref(), creating),
        Selector::Optional(index) => {
            let keys = index_children(parent, index.as_ref(), false)
                .map(|(keys, _)| keys)
                .unwrap_or_default();
            Ok((keys, true))
        }
        Selector::Range(start, end) => {
            let (Some(start), Some(end)) = (start, end) else {
                return Err(null_operand("[..]"));
            };
            match parent {
                Value::List(ListValue { items, .. })
                | Value::Iterator(IteratorValue { items, .. }) => {
                    let range = clamp_range(start, end, items.len())?;
                    Ok((range.map(ChildKey::Index).collect(), true))
                }
                other => Err(not_indexable(other.type_name())),
            }
        }
        Selector::EntryKey | Selector::EntryValue => match parent {
            Value::Entry(_) if matches!(selector, Selector::EntryKey) => {
                Ok((vec![ChildKey::EntryKey], false))
            }
            Value::Entry(_) => Ok((vec![ChildKey::EntryValue], false)),
            other => Err(not_entry(other.type_name())),
        },
    }
}

fn index_children(
    parent: &Value,
    index: Option<&Value>,
    creating: bool,
) -> EvalResult<(Vec<ChildKey>, bool)> {
    let index = index.ok_or_else(|| null_operand("[...]"))?;
    match parent {
        Value::List(ListValue { items, .. }) | Value::Iterator(IteratorValue { items, .. }) => {
            if let Value::Map(pattern) = index {
                let matched = items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| matches_pattern(item.as_ref(), pattern))
                    .map(|(i, _)| ChildKey::Index(i))
                    .collect();
                return Ok((matched, true));
            }
            let position = slot_index(index, items.len())?;
            if position >= items.len() && !creating {
                return Err(index_out_of_bounds(position as i64, items.len()));
            }
            Ok((vec![ChildKey::Index(position)], false))
        }
        Value::Map(map) => {
            let key = map_key(map, index.clone())?;
            if !creating && !map.entries.contains_key(&key) {
                return Err(key_not_found(&key));
            }
            Ok((vec![ChildKey::MapKey(key)], false))
        }
        other => Err(not_indexable(other.type_name())),
    }
}

/// An existing child slot, for mutation.
fn child_slot_mut<'v>(
    parent: &'v mut Option<Value>,
    key: &ChildKey,
) -> EvalResult<&'v mut Option<Value>> {
    match (parent.as_mut(), key) {
        (
            Some(
                Value::List(ListValue { items, .. })
                | Value::Iterator(IteratorValue { items, .. }),
            ),
            ChildKey::Index(i),
        ) => {
            let len = items.len();
            items
                .get_mut(*i)
                .ok_or_else(|| index_out_of_bounds(*i as i64, len))
        }
        (Some(Value::Map(map)), ChildKey::MapKey(key)) => map
            .entries
            .get_mut(key)
            .ok_or_else(|| key_not_found(key)),
        (Some(Value::Entry(entry)), ChildKey::EntryKey) => Ok(&mut entry.key),
        (Some(Value::Entry(entry)), ChildKey::EntryValue) => Ok(&mut entry.value),
        (None, key) => Err(null_operand(key)),
        (Some(other), _) => Err(not_indexable(other.type_name())),
    }
}

/// Store `value` at `location`. Returns whether the slot changed.
fn assign_at(
    root: &mut TypedValue,
    location: &[ChildKey],
    value: Option<Value>,
) -> EvalResult<bool> {
    let Some((last, parents)) = location.split_last() else {
        let before = root.value.clone();
        root.assign(value)?;
        return Ok(root.value != before);
    };
    let mut slot = &mut root.value;
    for key in parents {
        slot = child_slot_mut(slot, key)?;
    }
    replace_child(slot, last, value)
}

/// Write a child of `parent`, cast to the parent's child type. A list grows
/// with nulls up to the index; a missing map key is inserted.
fn replace_child(
    parent: &mut Option<Value>,
    key: &ChildKey,
    value: Option<Value>,
) -> EvalResult<bool> {
    match (parent.as_mut(), key) {
        (Some(Value::List(ListValue { elem_type, items })), ChildKey::Index(i))
        | (Some(Value::Iterator(IteratorValue { elem_type, items })), ChildKey::Index(i)) => {
            let value = cast_variable(elem_type.as_ref(), value)?;
            let extended = *i >= items.len();
            if extended {
                items.resize(*i + 1, None);
            }
            let len = items.len();
            let slot = items
                .get_mut(*i)
                .ok_or_else(|| index_out_of_bounds(*i as i64, len))?;
            Ok(replace(slot, value) || extended)
        }
        (Some(Value::Map(map)), ChildKey::MapKey(key)) => {
            let value = cast_variable(map.value_type.as_ref(), value)?;
            match map.entries.get_mut(key) {
                Some(slot) => Ok(replace(slot, value)),
                None => {
                    map.entries.insert(key.clone(), value);
                    Ok(true)
                }
            }
        }
        (Some(Value::Entry(entry)), ChildKey::EntryKey) => {
            let value = cast_variable(entry.key_type.as_ref(), value)?;
            Ok(replace(&mut entry.key, value))
        }
        (Some(Value::Entry(entry)), ChildKey::EntryValue) => {
            let value = cast_variable(entry.value_type.as_ref(), value)?;
            Ok(replace(&mut entry.value, value))
        }
        (None, key) => Err(null_operand(key)),
        (Some(other), _) => Err(not_indexable(other.type_name())),
    }
}

#[inline]
fn replace(slot: &mut Option<Value>, value: Option<Value>) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Remove the slot at `location`. Returns whether anything changed.
fn remove_at(root: &mut Option<Value>, location: &[ChildKey]) -> EvalResult<bool> {
    let Some((last, parents)) = location.split_last() else {
        return Ok(false);
    };
    let mut slot = root;
    for key in parents {
        slot = child_slot_mut(slot, key)?;
    }
    match (slot.as_mut(), last) {
        (
            Some(
                Value::List(ListValue { items, .. })
                | Value::Iterator(IteratorValue { items, .. }),
            ),
            ChildKey::Index(i),
        ) => {
            if *i + 1 == items.len() {
                items.pop();
                return Ok(true);
            }
            Ok(items.get_mut(*i).is_some_and(|item| item.take().is_some()))
        }
        (Some(Value::Map(map)), ChildKey::MapKey(key)) => {
            Ok(map.entries.shift_remove(key).is_some())
        }
        (Some(Value::Entry(_)), _) => Err(unable_to_remove_from_entry()),
        (None, key) => Err(null_operand(key)),
        (Some(other), _) => Err(not_indexable(other.type_name())),
    }
}
