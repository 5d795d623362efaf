//! Byte-level JSON scanner.
//!
//! The scanner never builds anything. Every operation takes a cursor
//! position, looks at the bytes from there and returns a new position or a
//! span, in time linear in the bytes it consumes. Containers are skipped
//! with an explicit depth counter, so adversarially deep input cannot grow
//! the call stack.
//!
//! Malformed input is never an error here: operations return `None` (or a
//! `Malformed` step) and the caller decides that the value is absent.

use crate::token::{Span, Token, TokenKind};

/// One step of object iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Member {
    /// A member: the key span (between the quotes, still escaped) and the
    /// position where its value starts.
    Key { key: Span, value: usize },
    /// The closing brace was reached; holds the position just past it.
    End(usize),
    /// Something that is neither a key nor the end of the object.
    Malformed,
}

/// One step of array iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    /// An element starting at this position. The position may hold a `,`
    /// when the element is absent, as in `[1,,2]`.
    Value(usize),
    /// The closing bracket was reached; holds the position just past it.
    End(usize),
    /// Something that cannot start an element.
    Malformed,
}

/// A cursor-free scanner over a JSON byte buffer.
#[derive(Clone, Copy, Debug)]
pub struct Scanner<'a> {
    bytes: &'a [u8],
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over `bytes`.
    #[inline]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Returns the scanned buffer.
    #[inline]
    pub const fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    fn byte(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    /// Skips insignificant whitespace, returning the first other position.
    #[inline]
    pub fn skip_whitespace(&self, mut pos: usize) -> usize {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.byte(pos) {
            pos += 1;
        }
        pos
    }

    /// Classifies the token after any whitespace at `pos`. Returns the kind
    /// and the position of its lead byte.
    pub fn classify(&self, pos: usize) -> (TokenKind, usize) {
        let start = self.skip_whitespace(pos);
        match self.byte(start) {
            Some(b) => (TokenKind::from_lead(b), start),
            None => (TokenKind::Invalid, start),
        }
    }

    /// Skips one complete value after any whitespace at `pos`.
    ///
    /// Returns `None` when no recognizable value starts there or when the
    /// value is cut off by the end of the buffer.
    pub fn skip_value(&self, pos: usize) -> Option<Token> {
        let (kind, start) = self.classify(pos);
        let end = match kind {
            TokenKind::Object | TokenKind::Array => self.closing_delimiter(start)?,
            TokenKind::String => self.skip_string(start)?,
            TokenKind::Number => self.skip_number(start)?,
            TokenKind::True => self.skip_literal(start, b"true")?,
            TokenKind::False => self.skip_literal(start, b"false")?,
            TokenKind::Null => self.skip_literal(start, b"null")?,
            TokenKind::Invalid => return None,
        };
        Some(Token {
            kind,
            span: Span::new(start, end),
        })
    }

    /// Finds the bracket closing the object or array that opens at `pos`.
    /// Returns the position just past it.
    ///
    /// Brackets of either kind share one depth counter, and string
    /// contents are skipped whole so brackets inside them are opaque.
    pub fn closing_delimiter(&self, pos: usize) -> Option<usize> {
        if !matches!(self.byte(pos)?, b'{' | b'[') {
            return None;
        }
        let mut depth = 0usize;
        let mut i = pos;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'"' => {
                    i = self.skip_string(i)?;
                    continue;
                }
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// Skips a string whose opening quote is at `pos`. Returns the position
    /// just past the closing quote.
    fn skip_string(&self, pos: usize) -> Option<usize> {
        let mut i = pos + 1;
        loop {
            let rest = self.bytes.get(i..)?;
            let offset = memchr::memchr2(b'"', b'\\', rest)?;
            i += offset;
            if self.bytes[i] == b'"' {
                return Some(i + 1);
            }
            // Backslash: the escaped byte cannot close the string.
            i += 2;
        }
    }

    /// Skips the maximal numeric lexeme at `pos`: sign, digits, optional
    /// fraction and optional exponent. Stops at the first byte that cannot
    /// continue the lexeme without judging what follows.
    fn skip_number(&self, pos: usize) -> Option<usize> {
        let mut i = pos;
        if self.byte(i) == Some(b'-') {
            i += 1;
        }
        let digits_start = i;
        i = self.skip_digits(i);
        if i == digits_start {
            return None;
        }
        if self.byte(i) == Some(b'.') {
            i = self.digits_after(i, i + 1);
        }
        if let Some(b'e' | b'E') = self.byte(i) {
            let mut exponent = i + 1;
            if let Some(b'+' | b'-') = self.byte(exponent) {
                exponent += 1;
            }
            i = self.digits_after(i, exponent);
        }
        Some(i)
    }

    /// Skips the digits at `from`. Without any, the lexeme ends at `mark`.
    #[inline]
    fn digits_after(&self, mark: usize, from: usize) -> usize {
        match self.skip_digits(from) {
            end if end == from => mark,
            end => end,
        }
    }

    #[inline]
    fn skip_digits(&self, mut pos: usize) -> usize {
        while let Some(b'0'..=b'9') = self.byte(pos) {
            pos += 1;
        }
        pos
    }

    fn skip_literal(&self, pos: usize, literal: &[u8]) -> Option<usize> {
        let end = pos + literal.len();
        if self.bytes.get(pos..end)? == literal {
            Some(end)
        } else {
            None
        }
    }

    /// Steps to the next member of an object.
    ///
    /// `pos` is just past the opening brace or just past the previous
    /// member's value. A leading comma is consumed, as is the colon after
    /// the key; a missing colon is tolerated.
    pub fn next_object_key(&self, pos: usize) -> Member {
        let mut i = self.skip_whitespace(pos);
        if self.byte(i) == Some(b',') {
            i = self.skip_whitespace(i + 1);
        }
        match self.byte(i) {
            Some(b'}') => Member::End(i + 1),
            Some(b'"') => {
                let Some(end) = self.skip_string(i) else {
                    return Member::Malformed;
                };
                let key = Span::new(i + 1, end - 1);
                let mut value = self.skip_whitespace(end);
                if self.byte(value) == Some(b':') {
                    value = self.skip_whitespace(value + 1);
                }
                Member::Key { key, value }
            }
            _ => Member::Malformed,
        }
    }

    /// Steps to the first element of an array. `pos` is just past the
    /// opening bracket.
    ///
    /// A comma here separates nothing: it marks an absent first element,
    /// as in `[,1]`.
    pub fn first_array_element(&self, pos: usize) -> Element {
        self.array_element_at(self.skip_whitespace(pos))
    }

    /// Steps to the next element of an array.
    ///
    /// `pos` is just past the previous element, or on the comma of an
    /// absent one. One separating comma is consumed.
    pub fn next_array_element(&self, pos: usize) -> Element {
        let mut i = self.skip_whitespace(pos);
        if self.byte(i) == Some(b',') {
            i = self.skip_whitespace(i + 1);
        }
        self.array_element_at(i)
    }

    fn array_element_at(&self, i: usize) -> Element {
        match self.byte(i) {
            Some(b']') => Element::End(i + 1),
            Some(b',') => Element::Value(i),
            Some(b) if TokenKind::from_lead(b) != TokenKind::Invalid => Element::Value(i),
            _ => Element::Malformed,
        }
    }

    /// Skips the value of a member or element starting at `pos`, returning
    /// the position just past it.
    ///
    /// A separator or closing bracket right at `pos` means the value is
    /// absent; the position is returned unchanged so iteration can go on.
    pub fn skip_member_value(&self, pos: usize) -> Option<usize> {
        match self.byte(pos)? {
            b',' | b'}' | b']' => Some(pos),
            _ => self.skip_value(pos).map(|token| token.span.end),
        }
    }

    /// Returns true if anything other than whitespace follows `end`.
    ///
    /// A value nested in a container is always followed by a separator or a
    /// closing bracket; a value that runs into the end of the buffer was
    /// truncated.
    #[inline]
    pub fn is_terminated(&self, end: usize) -> bool {
        self.skip_whitespace(end) < self.bytes.len()
    }
}
