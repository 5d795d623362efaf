//! Filter expression parsing: the text between `#[` and `]`.

use crate::parser::parse_segments;
use crate::segment::{parse_number, CompareOp, FilterExpr, Literal, Segment};
use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;
use jskim_core::{Error, Result};

/// Finds the `]` matching the `[` at byte `open`. Quoted text and escaped
/// characters are skipped; nested brackets are counted.
pub(crate) fn find_closing(input: &str, open: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            i += 2;
            continue;
        }
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Parses a filter body. `offset` is the body's position in the whole path.
pub(crate) fn parse_filter_expr(body: &str, offset: usize) -> Result<FilterExpr> {
    let lead = body.len() - body.trim_start().len();
    let text = body.trim();
    let offset = offset + lead;
    if text.is_empty() {
        return Err(Error::invalid_filter("empty filter expression", offset));
    }

    match find_operator(text) {
        None => Ok(FilterExpr::Exists {
            field: parse_field(text, offset)?,
        }),
        Some((at, op, len)) => {
            let field = parse_field(text[..at].trim_end(), offset)?;
            let rest = &text[at + len..];
            let lead = rest.len() - rest.trim_start().len();
            let literal = parse_literal(rest.trim(), offset + at + len + lead)?;
            Ok(FilterExpr::Compare { field, op, literal })
        }
    }
}

/// Locates the first operator outside nested brackets and quotes. Returns
/// its byte position, the operator and its length.
fn find_operator(text: &str) -> Option<(usize, CompareOp, usize)> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b'"' | b'\'' if depth > 0 => {
                // Quoted literal of a nested filter.
                let close = find_quote_end(bytes, i)?;
                i = close + 1;
                continue;
            }
            _ if depth > 0 => {}
            b'=' if next == Some(b'=') => return Some((i, CompareOp::Eq, 2)),
            b'=' => return Some((i, CompareOp::Eq, 1)),
            b'!' if next == Some(b'=') => return Some((i, CompareOp::Ne, 2)),
            b'!' if next == Some(b'%') => return Some((i, CompareOp::NotLike, 2)),
            b'<' if next == Some(b'=') => return Some((i, CompareOp::Le, 2)),
            b'<' => return Some((i, CompareOp::Lt, 1)),
            b'>' if next == Some(b'=') => return Some((i, CompareOp::Ge, 2)),
            b'>' => return Some((i, CompareOp::Gt, 1)),
            b'%' if next == Some(b'=') => return Some((i, CompareOp::Like, 2)),
            b'%' => return Some((i, CompareOp::Like, 1)),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Returns the index of the quote closing the one at `open`.
fn find_quote_end(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Parses the tested field: `@` or nothing is the element itself, `@.x.y`
/// and `x.y` are paths relative to it.
fn parse_field(text: &str, offset: usize) -> Result<Vec<Segment>> {
    let (path, offset) = match text {
        "" | "@" => return Ok(Vec::new()),
        _ => match text.strip_prefix("@.") {
            Some(rest) => (rest, offset + 2),
            None => (text, offset),
        },
    };
    parse_segments(path, offset).map_err(|err| match err {
        Error::EmptyPath => Error::invalid_filter("empty field path", offset),
        other => other,
    })
}

fn parse_literal(text: &str, offset: usize) -> Result<Literal> {
    let Some(first) = text.bytes().next() else {
        return Err(Error::invalid_filter("missing literal", offset));
    };

    if first == b'"' || first == b'\'' {
        let close = find_quote_end(text.as_bytes(), 0)
            .ok_or_else(|| Error::invalid_filter("unterminated string literal", offset))?;
        if !text[close + 1..].trim().is_empty() {
            return Err(Error::invalid_filter(
                format!("unexpected characters after literal: {}", &text[close + 1..]),
                offset + close + 1,
            ));
        }
        let content = &text[1..close];
        let value = if first == b'\'' {
            let content = content.replace("\\'", "'");
            jskim_scan::unescape(content.as_bytes()).into_owned()
        } else {
            jskim_scan::unescape(content.as_bytes()).into_owned()
        };
        return Ok(Literal::String(value));
    }

    Ok(match text {
        "true" => Literal::Bool(true),
        "false" => Literal::Bool(false),
        "null" => Literal::Null,
        _ => match parse_number(text) {
            Some(n) => Literal::Number(n),
            None => Literal::String(text.to_string()),
        },
    })
}
