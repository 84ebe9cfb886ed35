//! Expression parser and instruction emitter.
//!
//! Grammar:
//!
//! ```text
//! term     := operand (operator operand)*
//! operand  := value indexOp*
//! value    := '-' value | '(' type ')' value | '(' term ')' | literal
//!           | '{' entries '}' | call | variableRef
//! indexOp  := '[' (term | term '..' term | term '?')? ']'
//! ```
//!
//! Instructions are emitted left to right while scanning. Binary operators
//! are held on a stack and emitted once an operator of equal or lower
//! precedence (or the end of the term) is reached, so higher-precedence
//! operators land closer to their operands. The result is a single postfix
//! stream with no intermediate AST.
//!
//! # Casts
//!
//! `(name)` is a cast when `name` parses as a type and the character after
//! the `)` starts a value. If an operator, a closing delimiter or the end of
//! input follows instead, the parentheses hold an ordinary sub-term. Text
//! shaped like a cast (`(name<...`, or `(name)` before a value) that does
//! not name a valid type reports the type error.
//!
//! # Negation
//!
//! `'-' value` binds tighter than index suffixes, so `-l[0]` negates `l`
//! first and then indexes the result. Write `-(l[0])` to negate an element.

use imv_ir::{is_id_char, is_id_start, BinaryOp, Builtin, Code, Instruction, UnaryOp, VariableId};
use imv_types::{ensure_sufficient_stack, TypeRegistry};

use crate::cursor::Cursor;
use crate::error::{CompileError, CompileErrorKind, CompileResult};
use crate::literal::{scan_char, scan_number, scan_string};
use crate::ty::{is_type_name_char, parse_type};
use crate::CompileOptions;


/// The parsed form of one `[...]` suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum IndexForm {
    All,
    Single(Code),
    Optional(Code),
    Range(Code, Code),
}

pub(crate) struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    registry: &'a TypeRegistry,
    options: &'a CompileOptions,
    code: Code,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        source: &'a str,
        registry: &'a TypeRegistry,
        options: &'a CompileOptions,
    ) -> Self {
        Parser {
            cursor: Cursor::new(source),
            registry,
            options,
            code: Vec::new(),
        }
    }

    #[cold]
    fn error(&self, kind: CompileErrorKind) -> CompileError {
        CompileError::new(kind, self.cursor.pos())
    }

    fn emit(&mut self, instruction: Instruction) {
        tracing::trace!(%instruction, "emit");
        self.code.push(instruction);
    }

    /// Take the code emitted so far.
    pub(crate) fn finish(&mut self) -> Code {
        std::mem::take(&mut self.code)
    }

    /// Compile with `f` into a separate code block.
    fn sub_code(&mut self, f: impl FnOnce(&mut Self) -> CompileResult<()>) -> CompileResult<Code> {
        let outer = std::mem::take(&mut self.code);
        let result = f(self);
        let inner = std::mem::replace(&mut self.code, outer);
        result.map(|()| inner)
    }

    /// Fail unless the whole source has been consumed.
    pub(crate) fn expect_end(&mut self) -> CompileResult<()> {
        self.cursor.eat_whitespace();
        match self.cursor.current() {
            None => Ok(()),
            Some(c) => Err(self.error(CompileErrorKind::UnexpectedChar(c))),
        }
    }

    fn expect(&mut self, c: char, expected: &'static str) -> CompileResult<()> {
        self.cursor.eat_whitespace();
        if self.cursor.eat(c) {
            Ok(())
        } else {
            Err(self.error(CompileErrorKind::Expected { expected }))
        }
    }

    // Terms and operators

    /// Parse a term. With `stop_at_range`, a top-level `..` ends the term
    /// instead of being read as the range operator (inside `[a..b]`).
    pub(crate) fn parse_term(&mut self, stop_at_range: bool) -> CompileResult<()> {
        let mut pending: Vec<BinaryOp> = Vec::new();
        self.parse_operand()?;
        while let Some(op) = self.peek_operator(stop_at_range) {
            self.cursor.advance_bytes(op.as_symbol().len());
            tracing::trace!(op = op.as_symbol(), "operator");
            while let Some(&top) = pending.last() {
                if top.precedence() > op.precedence() {
                    break;
                }
                pending.pop();
                self.emit(Instruction::Binary(top));
            }
            pending.push(op);
            self.parse_operand()?;
        }
        while let Some(op) = pending.pop() {
            self.emit(Instruction::Binary(op));
        }
        Ok(())
    }

    /// The binary operator at the cursor (after whitespace), if any.
    fn peek_operator(&mut self, stop_at_range: bool) -> Option<BinaryOp> {
        self.cursor.eat_whitespace();
        BinaryOp::ALL
            .into_iter()
            .find(|op| self.cursor.starts_with(op.as_symbol()))
            .filter(|op| !(stop_at_range && *op == BinaryOp::Range))
    }

    fn parse_operand(&mut self) -> CompileResult<()> {
        self.parse_value()?;
        while let Some(index) = self.parse_index()? {
            self.emit_index(index);
        }
        Ok(())
    }

    fn emit_index(&mut self, index: IndexForm) {
        match index {
            IndexForm::All => self.emit(Instruction::GetAllContents),
            IndexForm::Single(code) => {
                self.code.extend(code);
                self.emit(Instruction::GetIndexedContents);
            }
            IndexForm::Optional(code) => {
                self.code.extend(code);
                self.emit(Instruction::GetOptionalIndexedContents);
            }
            IndexForm::Range(start, end) => {
                self.code.extend(start);
                self.code.extend(end);
                self.emit(Instruction::GetRangeIndexedContents);
            }
        }
    }

    /// Parse one `[...]` suffix, if present.
    pub(crate) fn parse_index(&mut self) -> CompileResult<Option<IndexForm>> {
        self.cursor.eat_whitespace();
        if !self.cursor.eat('[') {
            return Ok(None);
        }
        self.cursor.eat_whitespace();
        if self.cursor.eat(']') {
            return Ok(Some(IndexForm::All));
        }
        let first = self.sub_code(|p| p.parse_term(true))?;
        self.cursor.eat_whitespace();
        let form = if self.cursor.eat_str("..") {
            let end = self.sub_code(|p| p.parse_term(true))?;
            IndexForm::Range(first, end)
        } else if self.cursor.eat('?') {
            IndexForm::Optional(first)
        } else {
            IndexForm::Single(first)
        };
        self.expect(']', "']'")?;
        Ok(Some(form))
    }

    // Values

    fn parse_value(&mut self) -> CompileResult<()> {
        ensure_sufficient_stack(|| self.parse_value_inner())
    }

    fn parse_value_inner(&mut self) -> CompileResult<()> {
        self.cursor.eat_whitespace();
        let Some(c) = self.cursor.current() else {
            return Err(self.error(CompileErrorKind::ExpectedValue));
        };
        match c {
            '-' | '+' if self.cursor.peek().is_some_and(starts_number) => {
                self.parse_number_literal()
            }
            '-' => {
                self.cursor.advance();
                self.parse_value()?;
                self.emit(Instruction::Unary(UnaryOp::Neg));
                Ok(())
            }
            '(' => self.parse_paren(),
            '{' => self.parse_braces(),
            '"' => {
                let value = scan_string(&mut self.cursor)?;
                self.emit(Instruction::LoadConstant(Some(value)));
                Ok(())
            }
            '\'' => {
                let value = scan_char(&mut self.cursor)?;
                self.emit(Instruction::LoadConstant(Some(value)));
                Ok(())
            }
            c if c.is_ascii_digit() => self.parse_number_literal(),
            '.' if self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.parse_number_literal()
            }
            c if is_id_start(c) => self.parse_name(),
            _ => Err(self.error(CompileErrorKind::ExpectedValue)),
        }
    }

    fn parse_number_literal(&mut self) -> CompileResult<()> {
        let value = scan_number(&mut self.cursor)?;
        self.emit(Instruction::LoadConstant(Some(value)));
        Ok(())
    }

    /// `(type) value` or `(term)`.
    fn parse_paren(&mut self) -> CompileResult<()> {
        let open = self.cursor.pos();
        self.cursor.advance();

        let mut probe = self.cursor;
        match parse_type(&mut probe, self.registry) {
            Ok(ty) => {
                probe.eat_whitespace();
                if probe.eat(')') {
                    probe.eat_whitespace();
                    if probe.current().is_some_and(starts_value) {
                        tracing::trace!(%ty, "cast");
                        self.cursor = probe;
                        self.parse_value()?;
                        self.emit(Instruction::Cast(ty));
                        return Ok(());
                    }
                }
            }
            Err(err) if self.looks_like_cast() => return Err(err),
            Err(_) => {}
        }

        self.parse_term(false)?;
        self.cursor.eat_whitespace();
        if self.cursor.eat(')') {
            Ok(())
        } else {
            Err(CompileError::new(CompileErrorKind::UnterminatedParen, open))
        }
    }

    /// Whether the text after `(` has the shape of a cast even though it
    /// may not name a valid type: `name<` (not `<<` or `<=`), or `name)`
    /// followed by a value.
    fn looks_like_cast(&self) -> bool {
        let mut probe = self.cursor;
        probe.eat_whitespace();
        if probe.eat_while(is_type_name_char).is_empty() {
            return false;
        }
        probe.eat_whitespace();
        if probe.eat('<') {
            return !matches!(probe.current(), Some('<' | '='));
        }
        if probe.eat(')') {
            probe.eat_whitespace();
            return probe.current().is_some_and(starts_value);
        }
        false
    }

    /// `{}`, `{a, b, ...}` or `{key : value}`.
    fn parse_braces(&mut self) -> CompileResult<()> {
        self.cursor.advance();
        self.cursor.eat_whitespace();
        if self.cursor.eat('}') {
            self.emit(Instruction::BuildList { len: 0 });
            return Ok(());
        }

        self.parse_term(false)?;
        self.cursor.eat_whitespace();
        if self.cursor.eat(':') {
            self.parse_term(false)?;
            self.expect('}', "'}'")?;
            self.emit(Instruction::BuildEntry);
            return Ok(());
        }

        let mut len = 1;
        while self.cursor.eat(',') {
            self.parse_term(false)?;
            self.cursor.eat_whitespace();
            len += 1;
        }
        self.expect('}', "',' or '}'")?;
        self.emit(Instruction::BuildList { len });
        Ok(())
    }

    /// Scan an identifier-like name. Stops before `..` so `x..y` is a range.
    fn scan_name(&mut self) -> &'a str {
        let start = self.cursor.pos();
        while let Some(c) = self.cursor.current() {
            if !is_id_char(c) || (c == '.' && self.cursor.peek() == Some('.')) {
                break;
            }
            self.cursor.advance();
        }
        self.cursor.slice_from(start)
    }

    /// `null`, a function call or a variable reference.
    fn parse_name(&mut self) -> CompileResult<()> {
        let start = self.cursor.pos();
        let name = self.scan_name();

        if self.cursor.current() == Some('(') {
            return self.parse_call(name, start);
        }

        let is_qualified = self.cursor.current() == Some(':')
            && self.cursor.peek().is_some_and(is_id_start);
        if !is_qualified && name == "null" {
            self.emit(Instruction::LoadConstant(None));
            return Ok(());
        }

        let id = self.finish_variable_id(name, start)?;
        self.emit(Instruction::LoadVariable(id));
        Ok(())
    }

    /// Complete a variable id whose first name has been scanned.
    pub(crate) fn finish_variable_id(
        &mut self,
        first: &str,
        start: usize,
    ) -> CompileResult<VariableId> {
        let result = if self.cursor.current() == Some(':')
            && self.cursor.peek().is_some_and(is_id_start)
        {
            self.cursor.advance();
            let path = self.scan_name();
            VariableId::try_new(first, path)
        } else {
            VariableId::try_new(&self.options.default_namespace, first)
        };
        result.map_err(|err| CompileError::new(CompileErrorKind::InvalidVariableId(err), start))
    }

    /// `name(args...)`; the cursor is at the `(`.
    fn parse_call(&mut self, name: &str, start: usize) -> CompileResult<()> {
        let open = self.cursor.pos();
        self.cursor.advance();
        self.cursor.eat_whitespace();
        let mut argc = 0;
        if !self.cursor.eat(')') {
            loop {
                self.parse_term(false)?;
                argc += 1;
                self.cursor.eat_whitespace();
                if self.cursor.eat(',') {
                    continue;
                }
                if self.cursor.eat(')') {
                    break;
                }
                return Err(CompileError::new(CompileErrorKind::UnterminatedParen, open));
            }
        }
        let builtin = Builtin::lookup(name, argc).ok_or_else(|| {
            CompileError::new(
                CompileErrorKind::UnknownFunction {
                    name: name.to_owned(),
                    arity: argc,
                },
                start,
            )
        })?;
        self.emit(Instruction::Call { builtin, argc });
        Ok(())
    }

    /// Parse a name at the cursor for the path parser.
    pub(crate) fn scan_path_name(&mut self) -> CompileResult<&'a str> {
        self.cursor.eat_whitespace();
        if !self.cursor.at(is_id_start) {
            return Err(self.error(CompileErrorKind::ExpectedValue));
        }
        Ok(self.scan_name())
    }
}

/// Whether `c` begins a numeral (after a sign).
fn starts_number(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Whether `c` can begin a value, deciding `(type) value` casts.
fn starts_value(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit() || matches!(c, '(' | '{' | '"' | '\'' | '.')
}

/// Compile an expression into postfix code.
pub(crate) fn compile_code(
    source: &str,
    registry: &TypeRegistry,
    options: &CompileOptions,
) -> CompileResult<Code> {
    let mut parser = Parser::new(source, registry, options);
    parser.parse_term(false)?;
    parser.expect_end()?;
    let code = parser.finish();
    tracing::debug!(source, instructions = code.len(), "compiled expression");
    Ok(code)
}

/// Render code one instruction per line, for diagnostics.
pub fn disassemble(code: &[Instruction]) -> String {
    code.iter()
        .map(Instruction::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
