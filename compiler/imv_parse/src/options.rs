//! Compiler configuration.

/// Options shared by every compilation of one host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Namespace for variable references written without one.
    pub default_namespace: String,
    /// Whether expressions without context-dependent instructions are
    /// pre-evaluated once.
    pub fold_constants: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            default_namespace: "global".to_owned(),
            fold_constants: true,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn without_folding(mut self) -> Self {
        self.fold_constants = false;
        self
    }
}
