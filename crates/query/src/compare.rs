//! Filter predicate evaluation.

use crate::value::{Kind, Value};
use alloc::borrow::Cow;
use alloc::string::ToString;
use core::cmp::Ordering;
use jskim_core::pattern_match;
use jskim_path::{parse_number, CompareOp, Literal};

/// Tests `field op literal`. The field must exist.
pub(crate) fn matches(field: &Value<'_>, op: CompareOp, literal: &Literal) -> bool {
    if !field.exists() {
        return false;
    }
    match op {
        CompareOp::Like => like(field, literal),
        CompareOp::NotLike => !like(field, literal),
        CompareOp::Eq => compare(field, literal) == Some(Ordering::Equal),
        CompareOp::Ne => compare(field, literal) != Some(Ordering::Equal),
        CompareOp::Lt => compare(field, literal) == Some(Ordering::Less),
        CompareOp::Le => matches!(
            compare(field, literal),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CompareOp::Gt => compare(field, literal) == Some(Ordering::Greater),
        CompareOp::Ge => matches!(
            compare(field, literal),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// Orders a field against a literal.
///
/// Numbers compare numerically, and so do strings holding numbers when the
/// other side is numeric. Two strings compare lexically. Booleans and null
/// only compare equal to themselves; every other pairing is unordered.
fn compare(field: &Value<'_>, literal: &Literal) -> Option<Ordering> {
    match literal {
        Literal::Null => (field.kind() == Kind::Null).then_some(Ordering::Equal),
        Literal::Bool(b) => {
            let actual = match field.kind() {
                Kind::True => true,
                Kind::False => false,
                _ => return None,
            };
            (actual == *b).then_some(Ordering::Equal)
        }
        Literal::Number(n) => field_number(field)?.partial_cmp(n),
        Literal::String(s) => {
            if let (Some(a), Some(b)) = (field_number(field), parse_number(s)) {
                return a.partial_cmp(&b);
            }
            if field.kind() == Kind::String {
                return Some(field.str().as_ref().cmp(s.as_str()));
            }
            None
        }
    }
}

/// The field as a number, if it is one or a string spelling one.
fn field_number(field: &Value<'_>) -> Option<f64> {
    match field.kind() {
        Kind::Number => Some(field.float()),
        Kind::String => parse_number(&field.str()),
        _ => None,
    }
}

fn like(field: &Value<'_>, literal: &Literal) -> bool {
    let pattern: Cow<'_, str> = match literal {
        Literal::String(s) => Cow::Borrowed(s),
        Literal::Number(n) => Cow::Owned(n.to_string()),
        Literal::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Literal::Null => Cow::Borrowed("null"),
    };
    pattern_match::glob(&field.str(), &pattern)
}
