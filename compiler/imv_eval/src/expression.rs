//! Compiled expressions and constant folding.
//!
//! An expression whose code never consults the context (no variable loads,
//! no entity, position or random built-ins) always evaluates to the same
//! result. Such code is run once when the expression is built; a single
//! successful result replaces the code with one `LoadConstant`, and
//! evaluating it no longer touches the stack machine.

use std::fmt;

use imv_ir::{Code, Instruction};
use imv_parse::{CompileOptions, CompileResult};
use imv_types::{EvalResult, TypeRegistry, Value};

use crate::{execute, CollectingSink, EvalContext, Operand};


/// Code ready to be evaluated repeatedly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    code: Code,
}

impl Expression {
    /// Wrap code as is.
    pub fn new(code: Code) -> Self {
        Expression { code }
    }

    /// Wrap code, pre-evaluating it when it is constant.
    pub fn folded(code: Code) -> Self {
        Expression {
            code: fold_constants(code),
        }
    }

    /// Compile source text, folding it when `options` ask for it.
    pub fn compile(
        source: &str,
        registry: &TypeRegistry,
        options: &CompileOptions,
    ) -> CompileResult<Self> {
        let code = imv_parse::compile(source, registry, options)?;
        Ok(if options.fold_constants {
            Self::folded(code)
        } else {
            Self::new(code)
        })
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    /// The pre-computed result, when the code is a lone constant.
    pub fn constant(&self) -> Option<Option<&Value>> {
        match self.code.as_slice() {
            [Instruction::LoadConstant(value)] => Some(value.as_ref()),
            _ => None,
        }
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.constant().is_some()
    }

    /// Evaluate against a context.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn evaluate<'a>(&'a self, ctx: EvalContext<'a>) -> EvalResult<Operand<'a>> {
        if let Some(value) = self.constant() {
            return Ok(Operand::Single(value.cloned()));
        }
        execute(&self.code, ctx)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instruction) in self.code.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{instruction}")?;
        }
        Ok(())
    }
}

/// Replace context-free code with the single value it evaluates to.
///
/// Code that fails, yields a stream, or contains a not-constant
/// instruction is returned unchanged, so errors surface at evaluation.
pub fn fold_constants(code: Code) -> Code {
    if code.len() <= 1 || code.iter().any(Instruction::is_not_constant) {
        return code;
    }
    let sink = CollectingSink::new();
    let folded = match execute(&code, EvalContext::constant(&sink)) {
        Ok(Operand::Single(value)) => value,
        Ok(Operand::Many(_)) | Err(_) => return code,
    };
    tracing::debug!(
        instructions = code.len(),
        value = %folded.as_ref().map_or_else(|| "null".to_owned(), ToString::to_string),
        "folded constant expression"
    );
    vec![Instruction::LoadConstant(folded)]
}
