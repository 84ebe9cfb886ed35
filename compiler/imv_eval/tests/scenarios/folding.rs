use std::cell::Cell;

use imv_eval::{
    CollectingSink, DetachedHost, EvalContext, EvalResult, MemoryStore, VariableStore,
};
use imv_ir::VariableId;
use imv_types::{TypedValue, Value, VariableType};
use pretty_assertions::assert_eq;

use crate::common::Session;

/// Counts reads made through the evaluation context.
struct CountingStore {
    inner: MemoryStore,
    reads: Cell<usize>,
}

impl VariableStore for CountingStore {
    fn get(&mut self, id: &VariableId) -> EvalResult<&mut TypedValue> {
        self.inner.get(id)
    }

    fn get_readonly(&self, id: &VariableId) -> EvalResult<&TypedValue> {
        self.reads.set(self.reads.get() + 1);
        self.inner.get_readonly(id)
    }

    fn add(&mut self, id: VariableId, ty: VariableType) -> EvalResult<()> {
        self.inner.add(id, ty)
    }

    fn set(&mut self, id: VariableId, value: TypedValue) -> EvalResult<()> {
        self.inner.set(id, value)
    }

    fn remove(&mut self, id: &VariableId) -> EvalResult<TypedValue> {
        self.inner.remove(id)
    }

    fn list_ids(&self) -> Vec<VariableId> {
        self.inner.list_ids()
    }
}

fn counting_store() -> CountingStore {
    let mut inner = MemoryStore::new();
    inner
        .set(
            VariableId::new("global", "my_var"),
            TypedValue::new(VariableType::int(), Some(Value::Int(5))).unwrap(),
        )
        .unwrap();
    CountingStore {
        inner,
        reads: Cell::new(0),
    }
}

#[test]
fn constant_expression_needs_no_lookups() {
    let session = Session::new();
    let expression = session.compile("2 + 3");
    assert!(expression.is_constant());

    let store = counting_store();
    let sink = CollectingSink::new();
    let ctx = EvalContext::new(&store, &DetachedHost, &sink);
    let result = expression.evaluate(ctx).unwrap().collect();
    assert_eq!(result.to_string(), "5");
    assert_eq!(store.reads.get(), 0);
}

#[test]
fn variable_expression_never_folds() {
    let session = Session::new();
    let expression = session.compile("2 + my_var");
    assert!(!expression.is_constant());

    let store = counting_store();
    let sink = CollectingSink::new();
    for _ in 0..3 {
        let ctx = EvalContext::new(&store, &DetachedHost, &sink);
        let result = expression.evaluate(ctx).unwrap().collect();
        assert_eq!(result.to_string(), "7");
    }
    assert_eq!(store.reads.get(), 3);
}

#[test]
fn context_builtins_never_fold() {
    let session = Session::new();
    assert!(!session.compile("random()").is_constant());
    assert!(!session.compile("here()").is_constant());
    assert!(!session.compile(r#"entity("@e")"#).is_constant());
    assert!(session.compile("abs(-3) + size({1, 2})").is_constant());
}

#[test]
fn failing_constants_fail_at_evaluation() {
    let session = Session::new();
    let expression = session.compile("1 / 0");
    assert!(!expression.is_constant());
    assert!(session.eval("1 / 0").is_err());
}
