//! Shared session for scenario tests.

use imv_eval::{
    CollectingSink, EvalContext, Evaluated, Expression, HostEnvironment, MemoryStore, PathEngine,
    VariableStore,
};
use imv_ir::VariableId;
use imv_parse::{compile_path, parse_type_name, CompileOptions};
use imv_types::{EntityRef, EvalResult, Position, TypeRegistry, Value};

/// A host with two selectable entities and a fixed random source.
pub struct TestHost;

impl HostEnvironment for TestHost {
    fn select_entities(&self, selector: &str) -> EvalResult<Vec<EntityRef>> {
        Ok(match selector {
            "@e" => vec![EntityRef::new(1), EntityRef::new(2)],
            _ => Vec::new(),
        })
    }

    fn position_of(&self, entity: EntityRef) -> EvalResult<Position> {
        Ok(Position::new(entity.low_bits() as f64, 0.0, 0.0))
    }

    fn origin(&self) -> Position {
        Position::new(1.0, 2.0, 3.0)
    }

    fn random_unit(&self) -> EvalResult<f64> {
        Ok(0.25)
    }
}

pub struct Session {
    pub registry: TypeRegistry,
    pub options: CompileOptions,
    pub store: MemoryStore,
    pub sink: CollectingSink,
    pub host: TestHost,
}

impl Session {
    pub fn new() -> Self {
        Session {
            registry: TypeRegistry::new(),
            options: CompileOptions::default(),
            store: MemoryStore::new(),
            sink: CollectingSink::new(),
            host: TestHost,
        }
    }

    /// Declare `global:<name>` with a type written as in a cast.
    pub fn declare(&mut self, name: &str, ty: &str) {
        let ty = parse_type_name(ty, &self.registry).unwrap();
        self.store
            .add(VariableId::new("global", name), ty)
            .unwrap();
    }

    pub fn compile(&self, source: &str) -> Expression {
        Expression::compile(source, &self.registry, &self.options).unwrap()
    }

    pub fn eval(&self, source: &str) -> EvalResult<Evaluated> {
        let expression = self.compile(source);
        let ctx = EvalContext::new(&self.store, &self.host, &self.sink);
        let values = expression.evaluate(ctx)?.collect();
        Ok(values)
    }

    /// Evaluate to one non-null value.
    pub fn value(&self, source: &str) -> Value {
        self.eval(source).unwrap().into_single().unwrap().unwrap()
    }

    /// Evaluate and render the result.
    pub fn show(&self, source: &str) -> String {
        self.eval(source).unwrap().to_string()
    }

    pub fn set(&mut self, path: &str, source: &str) -> EvalResult<usize> {
        let values = self.eval(source)?;
        let path = compile_path(path, &self.registry, &self.options).unwrap();
        PathEngine::new(&self.host, &self.sink).set(&path, values, &mut self.store)
    }

    pub fn remove(&mut self, path: &str) -> EvalResult<usize> {
        let path = compile_path(path, &self.registry, &self.options).unwrap();
        PathEngine::new(&self.host, &self.sink).remove(&path, &mut self.store)
    }
}
