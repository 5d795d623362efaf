//! Path execution over raw JSON bytes.
//!
//! The executor walks compiled segments from a cursor position, skipping
//! every subtree it does not need. It has two modes:
//!
//! - single (`resolve`): one result; wildcards take the first child whose
//!   remaining path resolves
//! - all (`resolve_all`): every result, in document order
//!
//! `#` and `#[...]#` always evaluate their remaining path in all mode and
//! produce one synthesized array, in both modes.

use crate::compare;
use crate::value::Value;
use alloc::vec::Vec;
use jskim_core::{pattern_match, QueryOptions};
use jskim_path::{FilterExpr, Segment};
use jskim_scan::{key_eq, unescape, Element, Member, Scanner, TokenKind};
use log::trace;

/// Which children of a container a step selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Select<'p> {
    /// The member with this unescaped name.
    Key(&'p str),
    /// The element at this position, or the member named by its digits.
    Index(usize),
    /// Members (or elements, by their digits) matching a glob.
    Glob(&'p str),
    /// Every member or element.
    Any,
}

impl<'p> Select<'p> {
    /// The selection for a direct segment.
    pub(crate) fn direct(segment: &'p Segment) -> Option<Self> {
        match segment {
            Segment::Key { name, exact: true } => Some(Select::Key(name)),
            Segment::Index(n) => Some(Select::Index(*n)),
            _ => None,
        }
    }
}

/// How a walk over a container ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Walk {
    /// The visitor asked to stop.
    Stopped,
    /// The closing bracket was reached; holds the position past it.
    Ended(usize),
    /// The container is broken before its end.
    Malformed,
    /// There is no object or array at the position.
    NotContainer,
}

/// A member or element met while walking a container.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Child<'a> {
    /// Where the child's value starts. It may hold a separator when the
    /// value is absent.
    pub pos: usize,
    /// The raw member key; `None` for array elements.
    pub key: Option<&'a [u8]>,
    /// Position among its siblings.
    pub index: usize,
}

/// Formats `n` in decimal into `buf`.
pub(crate) fn decimal(n: usize, buf: &mut [u8; 20]) -> &[u8] {
    let mut i = buf.len();
    let mut n = n;
    loop {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    &buf[i..]
}

pub(crate) struct Executor<'a> {
    scanner: Scanner<'a>,
    options: QueryOptions,
    /// Source offset of the buffer's first byte, when known.
    base: Option<usize>,
    /// Position of the root value's lead byte.
    root: usize,
}

impl<'a> Executor<'a> {
    pub fn new(bytes: &'a [u8], options: QueryOptions) -> Self {
        Self::with_base(bytes, options, Some(0))
    }

    pub fn with_base(bytes: &'a [u8], options: QueryOptions, base: Option<usize>) -> Self {
        let scanner = Scanner::new(bytes);
        Self {
            scanner,
            options,
            base,
            root: scanner.skip_whitespace(0),
        }
    }

    #[inline]
    pub fn root(&self) -> usize {
        self.root
    }

    pub fn resolve_root(&self, segments: &[Segment]) -> Value<'a> {
        self.resolve(self.root, segments)
    }

    pub fn resolve_all_root(&self, segments: &[Segment]) -> Vec<Value<'a>> {
        let mut out = Vec::new();
        self.resolve_all(self.root, segments, &mut out);
        out
    }

    /// A value spanning `start..end` is complete unless it is nested and
    /// runs into the end of the buffer.
    #[inline]
    fn complete(&self, start: usize, end: usize) -> bool {
        start == self.root || self.scanner.is_terminated(end)
    }

    /// Wraps the value at `pos`.
    pub fn value_at(&self, pos: usize) -> Value<'a> {
        match self.scanner.skip_value(pos) {
            Some(token) if self.complete(token.span.start, token.span.end) => {
                Value::from_token(self.scanner.bytes(), token, self.base)
            }
            _ => {
                trace!("no complete value at byte {}", pos);
                Value::none()
            }
        }
    }

    /// Resolves `segments` from `pos` to a single value.
    pub fn resolve(&self, pos: usize, segments: &[Segment]) -> Value<'a> {
        let Some((segment, rest)) = segments.split_first() else {
            return self.value_at(pos);
        };
        match segment {
            Segment::Key { name, exact: true } => self.descend(pos, Select::Key(name), rest),
            Segment::Index(n) => self.descend(pos, Select::Index(*n), rest),
            Segment::Key { name, exact: false } => self.first_child(pos, Select::Glob(name), rest),
            Segment::Wildcard => self.first_child(pos, Select::Any, rest),
            Segment::Elements if rest.is_empty() => self.count(pos),
            Segment::Elements => self.collect(pos, None, rest),
            Segment::Filter {
                expr,
                collect_all: false,
            } => self.first_match(pos, expr, rest),
            Segment::Filter {
                expr,
                collect_all: true,
            } => self.collect(pos, Some(expr), rest),
        }
    }

    /// Resolves `segments` from `pos`, pushing every result in document
    /// order.
    pub fn resolve_all(&self, pos: usize, segments: &[Segment], out: &mut Vec<Value<'a>>) {
        let Some((segment, rest)) = segments.split_first() else {
            let value = self.value_at(pos);
            if value.exists() {
                out.push(value);
            }
            return;
        };
        let select = match segment {
            Segment::Key { name, exact: true } => Select::Key(name),
            Segment::Index(n) => Select::Index(*n),
            Segment::Key { name, exact: false } => Select::Glob(name),
            Segment::Wildcard => Select::Any,
            Segment::Filter {
                expr,
                collect_all: false,
            } => {
                if let Some(element) = self.find_match(pos, expr) {
                    self.resolve_all(element, rest, out);
                }
                return;
            }
            Segment::Elements | Segment::Filter { .. } => {
                let value = self.resolve(pos, segments);
                if value.exists() {
                    out.push(value);
                }
                return;
            }
        };
        if segment.is_direct() {
            if let Some(child) = self.find(pos, select) {
                self.resolve_all(child, rest, out);
            }
            return;
        }
        self.walk(pos, select, |child| {
            self.resolve_all(child, rest, out);
            true
        });
    }

    /// Visits the children of the container at `pos` that `select` picks,
    /// in document order, until `visit` returns false.
    pub fn walk(&self, pos: usize, select: Select<'_>, mut visit: impl FnMut(usize) -> bool) -> Walk {
        self.children(pos, |child| !self.selected(select, &child) || visit(child.pos))
    }

    /// Visits every child of the container at `pos` in document order,
    /// until `visit` returns false.
    pub fn children(&self, pos: usize, mut visit: impl FnMut(Child<'a>) -> bool) -> Walk {
        let (kind, start) = self.scanner.classify(pos);
        let mut cursor = start + 1;
        let mut index = 0;
        match kind {
            TokenKind::Object => loop {
                match self.scanner.next_object_key(cursor) {
                    Member::Key { key, value } => {
                        let child = Child {
                            pos: value,
                            key: Some(key.slice(self.scanner.bytes())),
                            index,
                        };
                        if !visit(child) {
                            return Walk::Stopped;
                        }
                        index += 1;
                        cursor = match self.scanner.skip_member_value(value) {
                            Some(next) => next,
                            None => return self.malformed(value),
                        };
                    }
                    Member::End(end) => return Walk::Ended(end),
                    Member::Malformed => return self.malformed(cursor),
                }
            },
            TokenKind::Array => loop {
                let step = if index == 0 {
                    self.scanner.first_array_element(cursor)
                } else {
                    self.scanner.next_array_element(cursor)
                };
                match step {
                    Element::Value(element) => {
                        let child = Child {
                            pos: element,
                            key: None,
                            index,
                        };
                        if !visit(child) {
                            return Walk::Stopped;
                        }
                        index += 1;
                        cursor = match self.scanner.skip_member_value(element) {
                            Some(next) => next,
                            None => return self.malformed(element),
                        };
                    }
                    Element::End(end) => return Walk::Ended(end),
                    Element::Malformed => return self.malformed(cursor),
                }
            },
            _ => Walk::NotContainer,
        }
    }

    /// Tests a child against a selection.
    pub fn selected(&self, select: Select<'_>, child: &Child<'_>) -> bool {
        match child.key {
            Some(key) => self.member_selected(select, key),
            None => self.element_selected(select, child.index),
        }
    }

    fn malformed(&self, pos: usize) -> Walk {
        trace!("malformed container at byte {}", pos);
        Walk::Malformed
    }

    /// Tests a raw (still escaped) member key against a selection.
    fn member_selected(&self, select: Select<'_>, key: &[u8]) -> bool {
        match select {
            Select::Key(name) => key_eq(key, name, self.options.case_insensitive_keys),
            Select::Index(n) => key == decimal(n, &mut [0; 20]),
            Select::Glob(pattern) => {
                let key = unescape(key);
                if self.options.case_insensitive_keys {
                    pattern_match::glob_ignore_case(&key, pattern)
                } else {
                    pattern_match::glob(&key, pattern)
                }
            }
            Select::Any => true,
        }
    }

    fn element_selected(&self, select: Select<'_>, index: usize) -> bool {
        match select {
            Select::Key(_) => false,
            Select::Index(n) => index == n,
            Select::Glob(pattern) => {
                let mut buf = [0; 20];
                let digits = decimal(index, &mut buf);
                core::str::from_utf8(digits).is_ok_and(|text| pattern_match::glob(text, pattern))
            }
            Select::Any => true,
        }
    }

    /// Returns true when a lookup at `pos` settles on the first match:
    /// always for arrays, and for objects under the first-wins policy.
    pub fn stops_at_first(&self, pos: usize) -> bool {
        self.options.first_wins() || self.scanner.classify(pos).0 != TokenKind::Object
    }

    /// Locates the child a direct selection picks.
    fn find(&self, pos: usize, select: Select<'_>) -> Option<usize> {
        let stop = self.stops_at_first(pos);
        let mut found = None;
        match self.walk(pos, select, |child| {
            found = Some(child);
            !stop
        }) {
            Walk::Stopped | Walk::Ended(_) => found,
            Walk::Malformed | Walk::NotContainer => None,
        }
    }

    fn descend(&self, pos: usize, select: Select<'_>, rest: &[Segment]) -> Value<'a> {
        match self.find(pos, select) {
            Some(child) => self.resolve(child, rest),
            None => Value::none(),
        }
    }

    /// The first (or, for objects under the last-wins policy, the last)
    /// selected child whose remaining path resolves.
    fn first_child(&self, pos: usize, select: Select<'_>, rest: &[Segment]) -> Value<'a> {
        let stop = self.stops_at_first(pos);
        let mut found = Value::none();
        let walk = self.walk(pos, select, |child| {
            let value = self.resolve(child, rest);
            if value.exists() {
                found = value;
                return !stop;
            }
            true
        });
        match walk {
            Walk::Stopped | Walk::Ended(_) => found,
            Walk::Malformed | Walk::NotContainer => Value::none(),
        }
    }

    /// Counts the elements of the array at `pos`.
    fn count(&self, pos: usize) -> Value<'a> {
        let (kind, start) = self.scanner.classify(pos);
        if kind != TokenKind::Array {
            return Value::none();
        }
        let mut n = 0;
        match self.walk(pos, Select::Any, |_| {
            n += 1;
            true
        }) {
            Walk::Ended(end) if self.complete(start, end) => Value::count(n),
            _ => Value::none(),
        }
    }

    /// Applies `rest` in all mode to every element of the array at `pos`
    /// that passes `filter`, collecting the results into one array.
    fn collect(&self, pos: usize, filter: Option<&FilterExpr>, rest: &[Segment]) -> Value<'a> {
        let (kind, start) = self.scanner.classify(pos);
        if kind != TokenKind::Array {
            return Value::none();
        }
        let mut items = Vec::new();
        let walk = self.walk(pos, Select::Any, |element| {
            if filter.map_or(true, |expr| self.test(expr, element)) {
                self.resolve_all(element, rest, &mut items);
            }
            true
        });
        match walk {
            Walk::Ended(end) if self.complete(start, end) => Value::array_of(&items),
            _ => Value::none(),
        }
    }

    fn find_match(&self, pos: usize, expr: &FilterExpr) -> Option<usize> {
        if self.scanner.classify(pos).0 != TokenKind::Array {
            return None;
        }
        let mut found = None;
        self.walk(pos, Select::Any, |element| {
            if self.test(expr, element) {
                found = Some(element);
                return false;
            }
            true
        });
        found
    }

    fn first_match(&self, pos: usize, expr: &FilterExpr, rest: &[Segment]) -> Value<'a> {
        match self.find_match(pos, expr) {
            Some(element) => self.resolve(element, rest),
            None => Value::none(),
        }
    }

    /// Evaluates a filter against the element at `pos`.
    fn test(&self, expr: &FilterExpr, pos: usize) -> bool {
        let field = self.resolve(pos, expr.field());
        match expr {
            FilterExpr::Exists { .. } => field.exists(),
            FilterExpr::Compare { op, literal, .. } => compare::matches(&field, *op, literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Kind;
    use alloc::string::{String, ToString};
    use jskim_core::DuplicateKeys;
    use jskim_path::Path;

    fn get<'a>(json: &'a str, path: &str) -> Value<'a> {
        get_with(json, path, QueryOptions::default())
    }

    fn get_with<'a>(json: &'a str, path: &str, options: QueryOptions) -> Value<'a> {
        let path = Path::compile(path).unwrap();
        Executor::new(json.as_bytes(), options).resolve_root(path.segments())
    }

    fn get_all<'a>(json: &'a str, path: &str) -> Vec<String> {
        let path = Path::compile(path).unwrap();
        Executor::new(json.as_bytes(), QueryOptions::default())
            .resolve_all_root(path.segments())
            .iter()
            .map(|v| String::from(v.raw()))
            .collect()
    }

    #[test]
    fn test_decimal() {
        let mut buf = [0; 20];
        assert_eq!(decimal(0, &mut buf), b"0");
        assert_eq!(decimal(1207, &mut buf), b"1207");
        assert_eq!(decimal(usize::MAX, &mut buf).len(), usize::MAX.to_string().len());
    }

    #[test]
    fn test_nested_key() {
        let v = get(r#"{"a":{"b":1}}"#, "a.b");
        assert_eq!(v.kind(), Kind::Number);
        assert_eq!(v.int(), 1);
        assert_eq!(v.index(), 10);
    }

    #[test]
    fn test_index() {
        assert_eq!(get(r#"{"a":[1,2,3]}"#, "a.1").int(), 2);
        assert!(!get(r#"{"a":[1,2,3]}"#, "a.3").exists());
        assert_eq!(get(r#"{"1":"one"}"#, "1").str(), "one");
        assert_eq!(get(r#"[[0,1],[2,3]]"#, "1.0").int(), 2);
    }

    #[test]
    fn test_skips_unrelated_subtrees() {
        let json = r#"{"x":{"y":[1,{"z":"]}"}]},"a":"found"}"#;
        assert_eq!(get(json, "a").str(), "found");
    }

    #[test]
    fn test_missing_and_type_mismatch() {
        let json = r#"{"a":{"b":1},"s":"text"}"#;
        assert!(!get(json, "a.c").exists());
        assert!(!get(json, "a.b.c").exists());
        assert!(!get(json, "s.0").exists());
        assert!(!get(json, "s.#").exists());
        assert!(!get(json, "a.#").exists());
    }

    #[test]
    fn test_truncated_values_are_missing() {
        assert!(!get(r#"{"a":1"#, "a").exists());
        assert!(!get(r#"{"a":[1,2]"#, "a.#").exists());
        assert!(!get(r#"{"a":"x"#, "a").exists());
        assert_eq!(get(r#"{"a":1,"b":2"#, "a").int(), 1);
    }

    #[test]
    fn test_root_value() {
        assert_eq!(get("  [1,2,3]", "#").int(), 3);
        assert_eq!(get("[1,2,3]", "2").int(), 3);
    }

    #[test]
    fn test_count() {
        let v = get(r#"{"a":[1,[2,3],{"b":4}]}"#, "a.#");
        assert_eq!(v.kind(), Kind::Number);
        assert_eq!(v.int(), 3);
        assert_eq!(get(r#"{"a":[]}"#, "a.#").int(), 0);
    }

    #[test]
    fn test_absent_first_element_keeps_positions() {
        let json = r#"{"a":[,1,2]}"#;
        assert!(!get(json, "a.0").exists());
        assert_eq!(get(json, "a.1").int(), 1);
        assert_eq!(get(json, "a.2").int(), 2);
        assert_eq!(get(json, "a.#").int(), 3);
        assert_eq!(get(r#"{"a":[1,,2]}"#, "a.#").int(), 3);
        assert_eq!(get(r#"{"a":[,]}"#, "a.#").int(), 1);
    }

    #[test]
    fn test_elements_map_rest() {
        let json = r#"{"p":[{"n":"a"},{"m":1},{"n":"c"}]}"#;
        let v = get(json, "p.#.n");
        assert!(v.is_array());
        assert_eq!(v.raw(), r#"["a","c"]"#);
    }

    #[test]
    fn test_filters() {
        let json = r#"{"items":[{"tag":"good","n":1},{"tag":"bad","n":2},{"tag":"good","n":3}]}"#;
        assert_eq!(get(json, r#"items.#[tag="good"].n"#).int(), 1);
        assert_eq!(get(json, r#"items.#[tag="good"]#.n"#).raw(), "[1,3]");
        assert_eq!(get(json, "items.#[n>1]#.tag").raw(), r#"["bad","good"]"#);
        assert_eq!(get(json, "items.#[n>5]#").raw(), "[]");
        assert!(!get(json, "items.#[n>5]").exists());
        assert_eq!(get(json, "items.#[tag%\"g*\"]#.n").raw(), "[1,3]");
    }

    #[test]
    fn test_filter_on_self() {
        let json = r#"{"v":[5,12,7,30]}"#;
        assert_eq!(get(json, "v.#[@>10]#").raw(), "[12,30]");
        assert_eq!(get(json, "v.#[>10]").int(), 12);
    }

    #[test]
    fn test_filter_exists() {
        let json = r#"{"u":[{"a":1},{"email":"x"},{"email":null}]}"#;
        assert_eq!(get(json, "u.#[email]#.email").raw(), r#"["x",null]"#);
    }

    #[test]
    fn test_glob_and_wildcard() {
        let json = r#"{"name":{"first":"Tom"},"nick":{"last":"T"},"other":{"first":"Sam"}}"#;
        assert_eq!(get(json, "n*.first").str(), "Tom");
        assert_eq!(get(json, "n*.last").str(), "T");
        assert_eq!(get(json, "*.first").str(), "Tom");
        assert_eq!(get(json, "n?me.first").str(), "Tom");
        assert!(!get(json, "x*").exists());
        assert_eq!(get(r#"[{"a":1},{"b":2}]"#, "*.b").int(), 2);
    }

    #[test]
    fn test_wildcard_matches_direct_lookup() {
        let json = r#"{"a":{"b":7}}"#;
        assert_eq!(get(json, "*.b"), get(json, "a.b"));
    }

    #[test]
    fn test_all_mode() {
        let json = r#"{"a":{"x":1},"b":{"x":2},"c":{"y":3}}"#;
        assert_eq!(get_all(json, "*.x"), ["1", "2"]);
        assert_eq!(get_all(json, "?.y"), ["3"]);
        assert_eq!(get_all(json, "a.x"), ["1"]);
        assert!(get_all(json, "z").is_empty());
        assert_eq!(get_all(r#"[[1,2],[3]]"#, "*.#"), ["2", "1"]);
    }

    #[test]
    fn test_duplicate_keys() {
        let json = r#"{"a":1,"b":{"c":1},"a":2,"b":{"d":2}}"#;
        assert_eq!(get(json, "a").int(), 1);
        let last = QueryOptions::new().with_duplicate_keys(DuplicateKeys::Last);
        assert_eq!(get_with(json, "a", last).int(), 2);
        // Exact keys commit to one occurrence.
        assert!(!get(json, "b.d").exists());
        assert!(!get_with(json, "b.c", last).exists());
        // Globs look for an occurrence that resolves.
        assert_eq!(get(json, "b*.d").int(), 2);
        assert_eq!(get_with(json, "b*.c", last).int(), 1);
    }

    #[test]
    fn test_case_insensitive_keys() {
        let json = r#"{"Name":{"First":"Ada"}}"#;
        assert!(!get(json, "name.first").exists());
        let options = QueryOptions::new().with_case_insensitive_keys(true);
        assert_eq!(get_with(json, "name.first", options).str(), "Ada");
        assert_eq!(get_with(json, "NA*.first", options).str(), "Ada");
    }

    #[test]
    fn test_escaped_keys() {
        let json = r#"{"end...ing":"soon","a\"b":1,"café":2}"#;
        assert_eq!(get(json, r"end\.\.\.ing").str(), "soon");
        assert_eq!(get(json, "a\"b").int(), 1);
        assert_eq!(get(json, "café").int(), 2);
    }

    #[test]
    fn test_malformed_members() {
        let json = r#"{"a":1, b:2, "c":3}"#;
        assert_eq!(get(json, "a").int(), 1);
        assert!(!get(json, "c").exists());
        let json = r#"{"tag":, "x":5}"#;
        assert!(!get(json, "tag").exists());
        assert_eq!(get(json, "x").int(), 5);
    }
}
