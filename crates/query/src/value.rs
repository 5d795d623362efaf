//! Query results.
//!
//! A `Value` is a typed view of one JSON value. It usually borrows its raw
//! text from the queried document; results the engine has to build (the
//! arrays produced by `#` and `#[...]#`, and `#` counts) own their text.
//! Conversions to strings and numbers happen when an accessor is called
//! and never change the raw text.

use crate::executor::Executor;
use crate::iter::{Elements, Entries};
use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;
use jskim_core::{QueryOptions, Result};
use jskim_path::{parse_number, Path};
use jskim_scan::{unescape, Token, TokenKind};

/// The kind of a result value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    False,
    True,
    Number,
    String,
    /// An object or an array.
    Json,
}

impl Kind {
    pub(crate) fn from_token(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Object | TokenKind::Array => Kind::Json,
            TokenKind::String => Kind::String,
            TokenKind::Number => Kind::Number,
            TokenKind::True => Kind::True,
            TokenKind::False => Kind::False,
            TokenKind::Null | TokenKind::Invalid => Kind::Null,
        }
    }
}

/// A JSON value found by a query.
///
/// A value that was not found is represented by a value whose `exists()`
/// is false; every accessor on it returns the zero value of its type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Value<'a> {
    kind: Kind,
    raw: Cow<'a, [u8]>,
    index: usize,
    exists: bool,
}

impl Default for Value<'_> {
    fn default() -> Self {
        Self::none()
    }
}

impl<'a> Value<'a> {
    /// The not-found sentinel.
    pub const fn none() -> Self {
        Self {
            kind: Kind::Null,
            raw: Cow::Borrowed(&[]),
            index: 0,
            exists: false,
        }
    }

    /// Wraps a scanned token of `bytes`. `base` is the source offset of
    /// `bytes[0]`, if it is known.
    pub(crate) fn from_token(bytes: &'a [u8], token: Token, base: Option<usize>) -> Self {
        Self {
            kind: Kind::from_token(token.kind),
            raw: Cow::Borrowed(token.span.slice(bytes)),
            index: base.map_or(0, |b| b + token.span.start),
            exists: true,
        }
    }

    /// An owned, engine-built value.
    pub(crate) fn synthesized(kind: Kind, raw: Vec<u8>) -> Self {
        Self {
            kind,
            raw: Cow::Owned(raw),
            index: 0,
            exists: true,
        }
    }

    /// Builds the array `[a,b,...]` from the raw text of `items`.
    pub(crate) fn array_of(items: &[Value<'_>]) -> Self {
        let len = items.iter().map(|v| v.raw.len() + 1).sum::<usize>() + 2;
        let mut raw = Vec::with_capacity(len);
        raw.push(b'[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                raw.push(b',');
            }
            raw.extend_from_slice(&item.raw);
        }
        raw.push(b']');
        Self::synthesized(Kind::Json, raw)
    }

    /// Builds a number from a count.
    pub(crate) fn count(n: usize) -> Self {
        Self::synthesized(Kind::Number, n.to_string().into_bytes())
    }

    /// Returns true if the value was found.
    #[inline]
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Returns the kind of the value. A missing value reports `Null`.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the byte offset of the value in the queried document.
    ///
    /// Values the engine built have no position and report 0.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns true if the value borrows from the queried document.
    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self.raw, Cow::Borrowed(_))
    }

    /// Returns the raw JSON text of the value.
    #[inline]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Returns the raw JSON text of the value, or `""` if the document was
    /// not valid UTF-8 there.
    pub fn raw(&self) -> &str {
        core::str::from_utf8(&self.raw).unwrap_or("")
    }

    /// Returns true for an object.
    #[inline]
    pub fn is_object(&self) -> bool {
        self.kind == Kind::Json && self.raw.first() == Some(&b'{')
    }

    /// Returns true for an array.
    #[inline]
    pub fn is_array(&self) -> bool {
        self.kind == Kind::Json && self.raw.first() == Some(&b'[')
    }

    /// Returns the value as text: strings are unescaped, numbers and JSON
    /// are their raw text, booleans are `true`/`false`, null is empty.
    pub fn str(&self) -> Cow<'_, str> {
        match self.kind {
            Kind::Null => Cow::Borrowed(""),
            Kind::False => Cow::Borrowed("false"),
            Kind::True => Cow::Borrowed("true"),
            Kind::Number | Kind::Json => String::from_utf8_lossy(&self.raw),
            Kind::String => unescape(self.string_contents()),
        }
    }

    /// The bytes between the quotes of a string value.
    fn string_contents(&self) -> &[u8] {
        match self.raw.len() {
            0 | 1 => &[],
            n => &self.raw[1..n - 1],
        }
    }

    /// Returns the value as a float. Strings holding a number are parsed,
    /// `true` is 1; anything else is 0.
    pub fn float(&self) -> f64 {
        match self.kind {
            Kind::True => 1.0,
            Kind::Number => self.raw().parse().unwrap_or(0.0),
            Kind::String => parse_number(self.str().trim()).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Returns the value as a signed integer. Integers are read exactly;
    /// fractions are truncated toward zero and out-of-range values
    /// saturate.
    pub fn int(&self) -> i64 {
        match self.kind {
            Kind::True => 1,
            Kind::Number => self
                .raw()
                .parse()
                .unwrap_or_else(|_| self.float() as i64),
            Kind::String => {
                let text = self.str();
                let text = text.trim();
                text.parse()
                    .unwrap_or_else(|_| parse_number(text).unwrap_or(0.0) as i64)
            }
            _ => 0,
        }
    }

    /// Returns the value as an unsigned integer. Negative values are 0.
    pub fn uint(&self) -> u64 {
        match self.kind {
            Kind::True => 1,
            Kind::Number => self
                .raw()
                .parse()
                .unwrap_or_else(|_| self.float() as u64),
            Kind::String => {
                let text = self.str();
                let text = text.trim();
                text.parse()
                    .unwrap_or_else(|_| parse_number(text).unwrap_or(0.0) as u64)
            }
            _ => 0,
        }
    }

    /// Returns the value as a boolean: `true`, a non-zero number, or a
    /// string spelling truth (`1`, `t`, `T`, `true`, `TRUE`, `True`).
    pub fn bool(&self) -> bool {
        match self.kind {
            Kind::True => true,
            Kind::Number => self.float() != 0.0,
            Kind::String => matches!(
                self.str().as_ref(),
                "1" | "t" | "T" | "true" | "TRUE" | "True"
            ),
            _ => false,
        }
    }

    /// A borrowed copy of this value.
    fn reborrow(&self) -> Value<'_> {
        Value {
            kind: self.kind,
            raw: Cow::Borrowed(&self.raw),
            index: self.index,
            exists: self.exists,
        }
    }

    /// Returns the elements of an array. Null and missing values give an
    /// empty vector; any other value gives a vector holding just itself.
    pub fn array(&self) -> Vec<Value<'_>> {
        if !self.exists || self.kind == Kind::Null {
            return Vec::new();
        }
        if self.is_array() {
            return self.elements().collect();
        }
        vec![self.reborrow()]
    }

    /// Returns the members of an object keyed by their unescaped names.
    /// When a key repeats, the first occurrence is kept. Non-objects give
    /// an empty map.
    pub fn map(&self) -> HashMap<String, Value<'_>> {
        let mut map = HashMap::new();
        for (key, value) in self.entries() {
            map.entry(key.str().into_owned()).or_insert(value);
        }
        map
    }

    /// Source offset of `self.raw[0]` when it is known.
    fn base(&self) -> Option<usize> {
        self.is_borrowed().then_some(self.index)
    }

    /// Lazily iterates the elements of an array; empty for anything else.
    ///
    /// An absent element such as the middle of `[1,,2]` is yielded as a
    /// missing value so positions match the `n` path segments.
    pub fn elements(&self) -> Elements<'_> {
        Elements::new(&self.raw, self.base(), self.is_array())
    }

    /// Lazily iterates the members of an object as `(key, value)` pairs;
    /// empty for anything else. Keys are string values.
    pub fn entries(&self) -> Entries<'_> {
        Entries::new(&self.raw, self.base(), self.is_object())
    }

    /// Queries a path relative to this value. Invalid paths give a missing
    /// value.
    pub fn get(&self, path: &str) -> Value<'_> {
        self.get_with(path, &QueryOptions::default())
    }

    /// Queries a path relative to this value with options.
    pub fn get_with(&self, path: &str, options: &QueryOptions) -> Value<'_> {
        match self.try_get_with(path, options) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("invalid path {:?}: {}", path, err);
                Value::none()
            }
        }
    }

    /// Queries a path relative to this value, surfacing compile errors.
    pub fn try_get_with(&self, path: &str, options: &QueryOptions) -> Result<Value<'_>> {
        let path = Path::compile(path)?;
        Ok(self.query_with(&path, options))
    }

    /// Runs a compiled path relative to this value.
    pub fn query(&self, path: &Path) -> Value<'_> {
        self.query_with(path, &QueryOptions::default())
    }

    /// Runs a compiled path relative to this value with options.
    pub fn query_with(&self, path: &Path, options: &QueryOptions) -> Value<'_> {
        if !self.exists {
            return Value::none();
        }
        Executor::with_base(&self.raw, *options, self.base()).resolve_root(path.segments())
    }

    /// Detaches the value from the document it was found in.
    pub fn into_owned(self) -> Value<'static> {
        Value {
            kind: self.kind,
            raw: Cow::Owned(self.raw.into_owned()),
            index: self.index,
            exists: self.exists,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.str())
    }
}
