//! Execution context: everything an evaluation may consult besides its code.
//!
//! # Collaborators
//!
//! - [`VariableStore`]: named variables, read by `LoadVariable`
//! - [`HostEnvironment`]: entity selection, positions, the invocation
//!   origin and randomness
//! - [`ErrorSink`]: receives errors of stream elements that were skipped

use std::cell::RefCell;

use imv_ir::VariableId;
use imv_types::{
    host_error, not_found, EntityRef, EvalError, EvalResult, Position, TypedValue, Value,
    VariableType,
};

use crate::VariableStore;

/// Receives the error of every stream element that was dropped.
pub trait ErrorSink {
    fn report(&self, error: &EvalError);
}

/// Logs skipped elements at `warn` level.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, error: &EvalError) {
        tracing::warn!(%error, "skipped stream element");
    }
}

/// Keeps skipped elements' errors for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    errors: RefCell<Vec<EvalError>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.borrow().is_empty()
    }

    /// Remove and return everything reported so far.
    pub fn take(&self) -> Vec<EvalError> {
        std::mem::take(&mut *self.errors.borrow_mut())
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, error: &EvalError) {
        self.errors.borrow_mut().push(error.clone());
    }
}

/// Services of the environment hosting the evaluation.
///
/// Every method has a default for hosts that lack the service: lookups
/// fail with a host error and the origin is `(0, 0, 0)`.
pub trait HostEnvironment {
    /// Entities matching a selector such as `@e[type=cow]`.
    fn select_entities(&self, selector: &str) -> EvalResult<Vec<EntityRef>> {
        Err(host_error(format!("cannot resolve entity selector {selector}")))
    }

    fn position_of(&self, entity: EntityRef) -> EvalResult<Position> {
        Err(host_error(format!("no position known for entity {entity}")))
    }

    /// Where the current invocation happens.
    fn origin(&self) -> Position {
        Position::ORIGIN
    }

    /// A uniformly distributed double in `[0, 1)`.
    fn random_unit(&self) -> EvalResult<f64> {
        Err(host_error("no source of randomness"))
    }
}

/// A host without any services.
#[derive(Copy, Clone, Debug, Default)]
pub struct DetachedHost;

impl HostEnvironment for DetachedHost {}

/// A store with no variables that refuses declarations.
struct EmptyStore;

impl VariableStore for EmptyStore {
    fn get(&mut self, id: &VariableId) -> EvalResult<&mut TypedValue> {
        Err(not_found(id))
    }

    fn get_readonly(&self, id: &VariableId) -> EvalResult<&TypedValue> {
        Err(not_found(id))
    }

    fn add(&mut self, id: VariableId, _ty: VariableType) -> EvalResult<()> {
        Err(host_error(format!("cannot declare {id} without a store")))
    }

    fn set(&mut self, id: VariableId, _value: TypedValue) -> EvalResult<()> {
        Err(host_error(format!("cannot store {id} without a store")))
    }

    fn remove(&mut self, id: &VariableId) -> EvalResult<TypedValue> {
        Err(not_found(id))
    }

    fn list_ids(&self) -> Vec<VariableId> {
        Vec::new()
    }
}

static EMPTY_STORE: EmptyStore = EmptyStore;
static DETACHED_HOST: DetachedHost = DetachedHost;

/// What the interpreter reads while executing.
#[derive(Copy, Clone)]
pub struct EvalContext<'a> {
    pub store: &'a dyn VariableStore,
    pub host: &'a dyn HostEnvironment,
    pub sink: &'a dyn ErrorSink,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        store: &'a dyn VariableStore,
        host: &'a dyn HostEnvironment,
        sink: &'a dyn ErrorSink,
    ) -> Self {
        EvalContext { store, host, sink }
    }

    /// A context with no variables and no host services, used to
    /// pre-evaluate constant code.
    pub fn constant(sink: &'a dyn ErrorSink) -> Self {
        EvalContext {
            store: &EMPTY_STORE,
            host: &DETACHED_HOST,
            sink,
        }
    }

    /// The current value of a variable.
    pub fn load(&self, id: &VariableId) -> EvalResult<Option<Value>> {
        self.store
            .get_readonly(id)
            .map(|typed| typed.value.clone())
    }
}
