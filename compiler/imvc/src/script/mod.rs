//! Scripts of variable commands.
//!
//! A script is a sequence of lines, one command each. Blank lines and lines
//! starting with `#` are ignored.
//!
//! ```text
//! add <id> <type>               declare a variable holding the type's default
//! set <path> = <expr>           assign through a path
//! get <path>                    read through a path
//! remove <path>                 remove a variable or the slots a path names
//! eval <expr>                   evaluate an expression
//! list                          show every variable
//! compare <expr> <op> <expr>    compare with == != < <= > >=
//! encode <id>                   show a variable's binary encoding in hex
//! ```
//!
//! Execution stops at the first failing line.

use std::fmt::Write as _;

use imv_eval::{
    compare, CollectingSink, EvalContext, Evaluated, Expression, MemoryStore, PathEngine,
    VariableStore,
};
use imv_ir::{CompareOp, VariableId, VariableIdError};
use imv_parse::{compile_path, parse_type_name, CompileError, CompileOptions};
use imv_types::codec::{self, CodecError};
use imv_types::{EvalError, TypeRegistry};
use thiserror::Error;

use crate::SystemHost;


/// One parsed script line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Add { id: String, ty: String },
    Set { path: String, expr: String },
    Get { path: String },
    Remove { path: String },
    Eval { expr: String },
    List,
    Compare { left: String, op: CompareOp, right: String },
    Encode { id: String },
}

/// Failure of a single command.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{0}")]
    Syntax(String),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    InvalidId(#[from] VariableIdError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// A command that failed, with its 1-based line number.
#[derive(Debug, Error)]
#[error("line {line}: {error}")]
pub struct LineError {
    pub line: usize,
    #[source]
    pub error: ScriptError,
}

fn syntax(message: impl Into<String>) -> ScriptError {
    ScriptError::Syntax(message.into())
}

/// Parse one script line. `None` for blank lines and comments.
pub fn parse_command(line: &str) -> Result<Option<Command>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let command = match word {
        "add" => {
            let Some((id, ty)) = rest.split_once(char::is_whitespace) else {
                return Err(syntax("usage: add <id> <type>"));
            };
            Command::Add {
                id: id.to_owned(),
                ty: ty.trim().to_owned(),
            }
        }
        "set" => {
            let Some((at, len)) = find_top_level(rest, assignment_symbol) else {
                return Err(syntax("usage: set <path> = <expr>"));
            };
            Command::Set {
                path: rest[..at].trim().to_owned(),
                expr: rest[at + len..].trim().to_owned(),
            }
        }
        "get" => Command::Get {
            path: required(rest, "usage: get <path>")?,
        },
        "remove" => Command::Remove {
            path: required(rest, "usage: remove <path>")?,
        },
        "eval" => Command::Eval {
            expr: required(rest, "usage: eval <expr>")?,
        },
        "encode" => Command::Encode {
            id: required(rest, "usage: encode <id>")?,
        },
        "list" if rest.is_empty() => Command::List,
        "compare" => {
            let Some((at, len)) = find_top_level(rest, comparison_symbol) else {
                return Err(syntax("usage: compare <expr> <op> <expr>"));
            };
            let op = CompareOp::from_symbol(&rest[at..at + len])
                .ok_or_else(|| syntax(format!("unknown comparison {}", &rest[at..at + len])))?;
            Command::Compare {
                left: rest[..at].trim().to_owned(),
                op,
                right: rest[at + len..].trim().to_owned(),
            }
        }
        _ => return Err(syntax(format!("unknown command '{word}'"))),
    };
    Ok(Some(command))
}

fn required(rest: &str, usage: &str) -> Result<String, ScriptError> {
    if rest.is_empty() {
        Err(syntax(usage))
    } else {
        Ok(rest.to_owned())
    }
}

fn assignment_symbol(_before: &str, tail: &str) -> Option<usize> {
    tail.starts_with('=').then_some(1)
}

/// Length of the comparison operator starting `tail`, if any. Shift
/// operators are not comparisons.
fn comparison_symbol(before: &str, tail: &str) -> Option<usize> {
    if tail.starts_with("<<") || tail.starts_with(">>") {
        return None;
    }
    if before.ends_with('<') || before.ends_with('>') {
        return None;
    }
    if ["==", "!=", "<=", ">="].iter().any(|op| tail.starts_with(op)) {
        return Some(2);
    }
    (tail.starts_with('<') || tail.starts_with('>')).then_some(1)
}

/// Find the first match of `matcher` outside brackets and quoted literals.
/// Returns the byte offset and length of the match.
fn find_top_level(
    text: &str,
    mut matcher: impl FnMut(&str, &str) -> Option<usize>,
) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (at, c) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                if let Some(len) = matcher(&text[..at], &text[at..]) {
                    return Some((at, len));
                }
            }
            _ => {}
        }
    }
    None
}

/// Runs commands against an in-memory store.
pub struct ScriptRunner {
    registry: TypeRegistry,
    options: CompileOptions,
    store: MemoryStore,
    host: SystemHost,
    sink: CollectingSink,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl ScriptRunner {
    pub fn new(options: CompileOptions) -> Self {
        ScriptRunner {
            registry: TypeRegistry::new(),
            options,
            store: MemoryStore::new(),
            host: SystemHost,
            sink: CollectingSink::new(),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Run every line of `source`, handing each output line to `emit`.
    ///
    /// Errors of skipped stream elements are emitted as warnings after the
    /// output of the command that produced them.
    pub fn run(&mut self, source: &str, mut emit: impl FnMut(&str)) -> Result<(), LineError> {
        for (index, text) in source.lines().enumerate() {
            let line = index + 1;
            let outcome = parse_command(text).and_then(|command| match command {
                Some(command) => self.execute(&command),
                None => Ok(None),
            });
            match outcome {
                Ok(Some(output)) => emit(&output),
                Ok(None) => {}
                Err(error) => return Err(LineError { line, error }),
            }
            for skipped in self.sink.take() {
                emit(&format!("warning: skipped element: {skipped}"));
            }
        }
        Ok(())
    }

    /// Execute one command, returning what it prints.
    pub fn execute(&mut self, command: &Command) -> Result<Option<String>, ScriptError> {
        tracing::debug!(?command, "executing");
        match command {
            Command::Add { id, ty } => {
                let id = self.parse_id(id)?;
                let ty = parse_type_name(ty, &self.registry)?;
                self.store.add(id, ty)?;
                Ok(None)
            }
            Command::Set { path, expr } => {
                let values = self.evaluate(expr)?;
                let path = compile_path(path, &self.registry, &self.options)?;
                let engine = PathEngine::new(&self.host, &self.sink);
                let changed = engine.set(&path, values, &mut self.store)?;
                Ok(Some(format!("{changed} changed")))
            }
            Command::Get { path } => {
                let path = compile_path(path, &self.registry, &self.options)?;
                let engine = PathEngine::new(&self.host, &self.sink);
                let values = engine.get(&path, &self.store)?.collect();
                Ok(Some(values.to_string()))
            }
            Command::Remove { path } => {
                let path = compile_path(path, &self.registry, &self.options)?;
                let engine = PathEngine::new(&self.host, &self.sink);
                let removed = engine.remove(&path, &mut self.store)?;
                Ok(Some(format!("{removed} removed")))
            }
            Command::Eval { expr } => Ok(Some(self.evaluate(expr)?.to_string())),
            Command::List => Ok(self.list()),
            Command::Compare { left, op, right } => {
                let left = Expression::compile(left, &self.registry, &self.options)?;
                let right = Expression::compile(right, &self.registry, &self.options)?;
                let ctx = EvalContext::new(&self.store, &self.host, &self.sink);
                let (left, right) = (left.evaluate(ctx)?, right.evaluate(ctx)?);
                let comparison = compare(left, *op, right, &self.sink)?;
                if let [held] = comparison.results.as_slice() {
                    return Ok(Some(held.to_string()));
                }
                Ok(Some(format!(
                    "{} of {} held",
                    comparison.matched(),
                    comparison.results.len()
                )))
            }
            Command::Encode { id } => {
                let id = self.parse_id(id)?;
                let bytes = codec::encode(self.store.get_readonly(&id)?)?;
                let mut hex = String::with_capacity(bytes.len() * 2);
                for byte in bytes {
                    let _ = write!(hex, "{byte:02x}");
                }
                Ok(Some(hex))
            }
        }
    }

    fn parse_id(&self, text: &str) -> Result<VariableId, ScriptError> {
        Ok(VariableId::parse(text, &self.options.default_namespace)?)
    }

    fn evaluate(&self, source: &str) -> Result<Evaluated, ScriptError> {
        let expression = Expression::compile(source, &self.registry, &self.options)?;
        let ctx = EvalContext::new(&self.store, &self.host, &self.sink);
        let values = expression.evaluate(ctx)?.collect();
        Ok(values)
    }

    fn list(&self) -> Option<String> {
        let lines: Vec<String> = self
            .store
            .list_ids()
            .into_iter()
            .filter_map(|id| {
                let typed = self.store.get_readonly(&id).ok()?;
                Some(format!("{id} = {typed}"))
            })
            .collect();
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}
