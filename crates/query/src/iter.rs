//! Lazy iteration over the children of an object or array value.

use crate::value::Value;
use jskim_scan::{Element, Member, Scanner, Span, Token, TokenKind};

/// Iterator over the elements of an array value.
///
/// Iteration stops at the closing bracket or at the first malformed byte.
pub struct Elements<'a> {
    scanner: Scanner<'a>,
    cursor: usize,
    base: Option<usize>,
    first: bool,
    done: bool,
}

impl<'a> Elements<'a> {
    pub(crate) fn new(raw: &'a [u8], base: Option<usize>, is_array: bool) -> Self {
        Self {
            scanner: Scanner::new(raw),
            cursor: 1,
            base,
            first: true,
            done: !is_array,
        }
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = Value<'a>;

    fn next(&mut self) -> Option<Value<'a>> {
        if self.done {
            return None;
        }
        let step = if self.first {
            self.first = false;
            self.scanner.first_array_element(self.cursor)
        } else {
            self.scanner.next_array_element(self.cursor)
        };
        let pos = match step {
            Element::Value(pos) => pos,
            Element::End(_) | Element::Malformed => {
                self.done = true;
                return None;
            }
        };
        if self.scanner.bytes()[pos] == b',' {
            self.cursor = pos;
            return Some(Value::none());
        }
        match self.scanner.skip_value(pos) {
            Some(token) => {
                self.cursor = token.span.end;
                Some(Value::from_token(self.scanner.bytes(), token, self.base))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Iterator over the `(key, value)` members of an object value.
///
/// Keys are string values. A member without a value, as in `{"a":,}`,
/// yields a missing value.
pub struct Entries<'a> {
    scanner: Scanner<'a>,
    cursor: usize,
    base: Option<usize>,
    done: bool,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(raw: &'a [u8], base: Option<usize>, is_object: bool) -> Self {
        Self {
            scanner: Scanner::new(raw),
            cursor: 1,
            base,
            done: !is_object,
        }
    }

    /// The key as a string value, quotes included.
    fn key(&self, key: Span) -> Value<'a> {
        let quoted = Token {
            kind: TokenKind::String,
            span: Span::new(key.start - 1, key.end + 1),
        };
        Value::from_token(self.scanner.bytes(), quoted, self.base)
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = (Value<'a>, Value<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (key, pos) = match self.scanner.next_object_key(self.cursor) {
            Member::Key { key, value } => (key, value),
            Member::End(_) | Member::Malformed => {
                self.done = true;
                return None;
            }
        };
        let key = self.key(key);
        if let Some(b',' | b'}') = self.scanner.bytes().get(pos) {
            self.cursor = pos;
            return Some((key, Value::none()));
        }
        match self.scanner.skip_value(pos) {
            Some(token) => {
                self.cursor = token.span.end;
                Some((key, Value::from_token(self.scanner.bytes(), token, self.base)))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_elements() {
        let raw = br#"[1, "a", [2, 3], {"b": null}]"#;
        let items: Vec<_> = Elements::new(raw, Some(10), true).collect();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].raw(), "1");
        assert_eq!(items[0].index(), 11);
        assert_eq!(items[1].str(), "a");
        assert!(items[2].is_array());
        assert!(items[3].is_object());
    }

    #[test]
    fn test_elements_absent_member_keeps_positions() {
        let items: Vec<_> = Elements::new(b"[1,,2]", None, true).collect();
        assert_eq!(items.len(), 3);
        assert!(!items[1].exists());
        assert_eq!(items[2].int(), 2);
    }

    #[test]
    fn test_elements_absent_first_element() {
        let items: Vec<_> = Elements::new(b"[,1]", None, true).collect();
        assert_eq!(items.len(), 2);
        assert!(!items[0].exists());
        assert_eq!(items[1].int(), 1);
    }

    #[test]
    fn test_elements_stop_on_malformed() {
        let items: Vec<_> = Elements::new(b"[1, x, 2]", None, true).collect();
        assert_eq!(items.len(), 1);
        let items: Vec<_> = Elements::new(b"[1, 2", None, true).collect();
        assert_eq!(items.len(), 2);
        let items: Vec<_> = Elements::new(b"[1, \"ab", None, true).collect();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_elements_of_non_array() {
        assert_eq!(Elements::new(b"{\"a\":1}", None, false).count(), 0);
        assert_eq!(Elements::new(b"[]", None, true).count(), 0);
    }

    #[test]
    fn test_entries() {
        let raw = br#"{"a": 1, "b\"c": [true], "d": {}}"#;
        let entries: Vec<_> = Entries::new(raw, Some(0), true).collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0.str(), "a");
        assert_eq!(entries[0].0.index(), 1);
        assert_eq!(entries[0].1.int(), 1);
        assert_eq!(entries[1].0.str(), "b\"c");
        assert!(entries[1].1.is_array());
        assert!(entries[2].1.is_object());
    }

    #[test]
    fn test_entries_absent_value() {
        let entries: Vec<_> = Entries::new(br#"{"tag":, "x": 2}"#, None, true).collect();
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].1.exists());
        assert_eq!(entries[1].1.int(), 2);
    }
}
