//! Path expression parser.
//!
//! Supports the dot-separated query syntax:
//! - `name` - object member
//! - `3` - array element (or the member named `3` on an object)
//! - `na*e`, `n?me` - glob match over member names
//! - `*` - any member or element
//! - `#` - array length; `#.name` maps the rest over every element
//! - `#[age>40]` / `#[age>40]#` - first / every element matching a filter
//! - `\.` - escapes a dot (or any special character) inside a name

use crate::filter::{find_closing, parse_filter_expr};
use crate::segment::Segment;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use jskim_core::{pattern_match, Error, Result};

/// A compiled path expression: a non-empty sequence of segments.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    source: String,
    segments: Vec<Segment>,
}

impl Path {
    /// Compiles a path expression.
    ///
    /// Fails only on the empty path and on filters that cannot be read;
    /// anything else inside a name is taken literally.
    pub fn compile(input: &str) -> Result<Self> {
        let segments = parse_segments(input, 0)?;
        Ok(Self {
            source: input.to_string(),
            segments,
        })
    }

    /// Returns the expression this path was compiled from.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the compiled segments, never empty.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Path::compile(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parses `input` into segments. `offset` is where `input` starts within
/// the outermost expression, so nested field paths report positions in
/// terms of the whole path.
pub(crate) fn parse_segments(input: &str, offset: usize) -> Result<Vec<Segment>> {
    if input.is_empty() {
        return Err(Error::EmptyPath);
    }
    let mut parser = Parser::new(input, offset);
    let mut segments = Vec::new();
    loop {
        // Every segment ends at a dot or at the end of the input.
        segments.push(parser.parse_segment()?);
        if parser.peek().is_none() {
            break;
        }
        parser.advance();
    }
    Ok(segments)
}

/// Parser state.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, offset: usize) -> Self {
        Self {
            input,
            pos: 0,
            offset,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Position in the outermost expression.
    fn position(&self) -> usize {
        self.offset + self.pos
    }

    fn parse_segment(&mut self) -> Result<Segment> {
        if self.peek() == Some('#') {
            let mark = self.pos;
            self.advance();
            match self.peek() {
                None | Some('.') => return Ok(Segment::Elements),
                Some('[') => return self.parse_filter(),
                // `#tag` is an ordinary name.
                _ => self.pos = mark,
            }
        }
        Ok(self.parse_key())
    }

    fn parse_filter(&mut self) -> Result<Segment> {
        let open = self.pos;
        let close = find_closing(self.input, open).ok_or_else(|| {
            Error::invalid_filter("unbalanced '#['", self.position())
        })?;
        let expr = parse_filter_expr(&self.input[open + 1..close], self.offset + open + 1)?;
        self.pos = close + 1;

        let collect_all = self.peek() == Some('#');
        if collect_all {
            self.advance();
        }
        match self.peek() {
            None | Some('.') => Ok(Segment::Filter { expr, collect_all }),
            Some(_) => Err(Error::invalid_filter(
                "expected '.' after filter",
                self.position(),
            )),
        }
    }

    fn parse_key(&mut self) -> Segment {
        let mut literal = String::new();
        let mut pattern = String::new();
        let mut escaped = false;

        while let Some(c) = self.peek() {
            if c == '.' {
                break;
            }
            self.advance();
            if c == '\\' {
                escaped = true;
                match self.peek() {
                    Some(next) => {
                        self.advance();
                        literal.push(next);
                        pattern.push('\\');
                        pattern.push(next);
                    }
                    None => {
                        literal.push('\\');
                        pattern.push_str("\\\\");
                    }
                }
            } else {
                literal.push(c);
                pattern.push(c);
            }
        }

        if pattern == "*" {
            Segment::Wildcard
        } else if pattern_match::has_wildcards(&pattern) {
            Segment::Key {
                name: pattern,
                exact: false,
            }
        } else {
            match canonical_index(&literal) {
                Some(index) if !escaped => Segment::Index(index),
                _ => Segment::Key {
                    name: literal,
                    exact: true,
                },
            }
        }
    }
}

/// Parses `0` or a digit string without a leading zero.
fn canonical_index(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{CompareOp, FilterExpr, Literal};
    use alloc::vec;

    fn key(name: &str) -> Segment {
        Segment::Key {
            name: name.into(),
            exact: true,
        }
    }

    fn segments(path: &str) -> Vec<Segment> {
        Path::compile(path).unwrap().segments().to_vec()
    }

    #[test]
    fn test_parse_single_key() {
        assert_eq!(segments("name"), vec![key("name")]);
    }

    #[test]
    fn test_parse_nested_keys() {
        assert_eq!(
            segments("widget.image.hOffset"),
            vec![key("widget"), key("image"), key("hOffset")]
        );
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(segments("a.1"), vec![key("a"), Segment::Index(1)]);
        assert_eq!(segments("50.widget"), vec![Segment::Index(50), key("widget")]);
        assert_eq!(segments("0"), vec![Segment::Index(0)]);
    }

    #[test]
    fn test_parse_non_canonical_digits_are_keys() {
        assert_eq!(segments("01"), vec![key("01")]);
        assert_eq!(segments("\\1"), vec![key("1")]);
        assert_eq!(
            segments("99999999999999999999999"),
            vec![key("99999999999999999999999")]
        );
    }

    #[test]
    fn test_parse_escapes() {
        assert_eq!(
            segments("lastly.end\\.\\.\\.ing"),
            vec![key("lastly"), key("end...ing")]
        );
        assert_eq!(segments("noop.what is a wren?").len(), 2);
        assert_eq!(segments("a\\*b"), vec![key("a*b")]);
    }

    #[test]
    fn test_parse_glob_keys() {
        assert_eq!(
            segments("na*e"),
            vec![Segment::Key {
                name: "na*e".into(),
                exact: false
            }]
        );
        assert_eq!(
            segments("n\\.?"),
            vec![Segment::Key {
                name: "n\\.?".into(),
                exact: false
            }]
        );
    }

    #[test]
    fn test_parse_wildcard() {
        assert_eq!(segments("*"), vec![Segment::Wildcard]);
        assert_eq!(segments("a.*.b"), vec![key("a"), Segment::Wildcard, key("b")]);
    }

    #[test]
    fn test_parse_elements() {
        assert_eq!(segments("items.#"), vec![key("items"), Segment::Elements]);
        assert_eq!(
            segments("items.#.name"),
            vec![key("items"), Segment::Elements, key("name")]
        );
        assert_eq!(segments("#tag"), vec![key("#tag")]);
    }

    #[test]
    fn test_parse_filter_first() {
        assert_eq!(
            segments("items.#[price<10].name"),
            vec![
                key("items"),
                Segment::Filter {
                    expr: FilterExpr::Compare {
                        field: vec![key("price")],
                        op: CompareOp::Lt,
                        literal: Literal::Number(10.0),
                    },
                    collect_all: false,
                },
                key("name"),
            ]
        );
    }

    #[test]
    fn test_parse_filter_all() {
        let parsed = segments(r#"loggy.programmers.#[tag="good"]#.firstName"#);
        assert_eq!(parsed.len(), 4);
        assert_eq!(
            parsed[2],
            Segment::Filter {
                expr: FilterExpr::Compare {
                    field: vec![key("tag")],
                    op: CompareOp::Eq,
                    literal: Literal::String("good".into()),
                },
                collect_all: true,
            }
        );
        assert_eq!(parsed[3], key("firstName"));
    }

    #[test]
    fn test_parse_filter_with_dots_in_literal() {
        let parsed = segments(r#"a.#[v=="x.y"]#"#);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_parse_nested_filter() {
        let parsed = segments("a.#[b.#[c>1]#.#>0]#");
        assert_eq!(parsed.len(), 2);
        match &parsed[1] {
            Segment::Filter {
                expr: FilterExpr::Compare { field, .. },
                collect_all: true,
            } => {
                assert_eq!(field.len(), 3);
                assert!(matches!(field[1], Segment::Filter { collect_all: true, .. }));
                assert_eq!(field[2], Segment::Elements);
            }
            other => panic!("unexpected segment {:?}", other),
        }
    }

    #[test]
    fn test_odd_characters_in_names_are_literal() {
        assert_eq!(
            segments("a[b]}.c:d.#!"),
            vec![key("a[b]}"), key("c:d"), key("#!")]
        );
        assert_eq!(segments("x#[y"), vec![key("x#[y")]);
    }

    #[test]
    fn test_parse_trailing_dot_is_empty_key() {
        assert_eq!(segments("a."), vec![key("a"), key("")]);
    }

    #[test]
    fn test_display_round_trips_source() {
        let path = Path::compile("a.#[b>1]#.c").unwrap();
        assert_eq!(path.to_string(), "a.#[b>1]#.c");
        assert_eq!(path.as_str(), "a.#[b>1]#.c");
        let parsed: Path = "a.b".parse().unwrap();
        assert_eq!(parsed.segments().len(), 2);
    }

    // Error handling tests
    #[test]
    fn test_parse_error_empty() {
        assert_eq!(Path::compile(""), Err(Error::EmptyPath));
    }

    #[test]
    fn test_parse_error_unbalanced_filter() {
        let err = Path::compile("items.#[tag==\"good\"").unwrap_err();
        assert!(matches!(err, Error::InvalidFilter { position: 7, .. }));
        assert!(Path::compile("items.#[a.#[b=1]").is_err());
    }

    #[test]
    fn test_parse_error_garbage_after_filter() {
        let err = Path::compile("items.#[a=1]x").unwrap_err();
        assert!(matches!(err, Error::InvalidFilter { position: 12, .. }));
        assert!(Path::compile("items.#[a=1]]").is_err());
    }

    #[test]
    fn test_parse_error_empty_filter() {
        assert!(matches!(
            Path::compile("items.#[ ]"),
            Err(Error::InvalidFilter { .. })
        ));
    }
}
