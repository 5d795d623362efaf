//! Token classification and byte spans.

/// The kind of JSON token starting at a position, decided by its lead byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Object,
    Array,
    String,
    Number,
    True,
    False,
    Null,
    /// No JSON value can start with this byte.
    Invalid,
}

impl TokenKind {
    /// Classifies a lead byte.
    #[inline]
    pub fn from_lead(byte: u8) -> Self {
        match byte {
            b'{' => TokenKind::Object,
            b'[' => TokenKind::Array,
            b'"' => TokenKind::String,
            b'-' | b'0'..=b'9' => TokenKind::Number,
            b't' => TokenKind::True,
            b'f' => TokenKind::False,
            b'n' => TokenKind::Null,
            _ => TokenKind::Invalid,
        }
    }
}

/// A half-open byte range `[start, end)` into the scanned buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the bytes this span covers.
    #[inline]
    pub fn slice<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.start..self.end]
    }
}

/// A complete value: its kind and the span it occupies, delimiters included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
