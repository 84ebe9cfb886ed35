//! Character cursor over expression source.
//!
//! Positions are byte offsets into the source, reported in compile errors.
//! The cursor is `Copy`, so speculative scans (cast probing) take a copy
//! and either commit it or drop it.

#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Cursor { source, pos: 0 }
    }

    /// Current byte offset in the source.
    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Returns the character at the current position, `None` at EOF.
    #[inline]
    pub(crate) fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Returns the character `n` positions ahead of current.
    #[inline]
    pub(crate) fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.peek_nth(1)
    }

    /// Whether the current character satisfies `pred`.
    #[inline]
    pub(crate) fn at(&self, pred: impl Fn(char) -> bool) -> bool {
        self.current().is_some_and(pred)
    }

    #[inline]
    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Advance past the current character.
    #[inline]
    pub(crate) fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.pos += c.len_utf8();
        }
    }

    /// Advance by `n` bytes. `n` must land on a character boundary.
    #[inline]
    pub(crate) fn advance_bytes(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.source.len());
    }

    /// Consume `c` if it is the current character.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.current() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `prefix` if the rest of the source starts with it.
    pub(crate) fn eat_str(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            self.advance_bytes(prefix.len());
            true
        } else {
            false
        }
    }

    /// Advance while `pred` holds; returns the consumed text.
    pub(crate) fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.at(&pred) {
            self.advance();
        }
        &self.source[start..self.pos]
    }

    pub(crate) fn eat_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    /// The source text between `start` and the current position.
    #[inline]
    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.pos]
    }
}
