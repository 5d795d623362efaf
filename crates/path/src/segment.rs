//! Compiled path segments.

use alloc::string::String;
use alloc::vec::Vec;

/// One step of a compiled path.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    /// Object member access. With `exact` the name is the unescaped key;
    /// otherwise it is a glob pattern that keeps its `\` escapes.
    Key { name: String, exact: bool },
    /// Array element access (`3`). On an object it selects the member whose
    /// key is the decimal text of the index.
    Index(usize),
    /// A bare `*`: any member or element.
    Wildcard,
    /// `#`: the array length when last, otherwise the rest of the path
    /// applied to every element.
    Elements,
    /// `#[...]` (first match) or `#[...]#` (every match).
    Filter { expr: FilterExpr, collect_all: bool },
}

impl Segment {
    /// Returns true for segments that address exactly one child by name or
    /// position.
    #[inline]
    pub fn is_direct(&self) -> bool {
        matches!(self, Segment::Key { exact: true, .. } | Segment::Index(_))
    }
}

/// The predicate of a filter segment.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterExpr {
    /// `field op literal`
    Compare {
        field: Vec<Segment>,
        op: CompareOp,
        literal: Literal,
    },
    /// `field`: true when the field exists.
    Exists { field: Vec<Segment> },
}

impl FilterExpr {
    /// The path of the tested field relative to the element. Empty means
    /// the element itself.
    pub fn field(&self) -> &[Segment] {
        match self {
            FilterExpr::Compare { field, .. } => field,
            FilterExpr::Exists { field } => field,
        }
    }
}

/// Comparison operators for filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `%=` or `%`: glob match.
    Like,
    /// `!%`: glob mismatch.
    NotLike,
}

impl CompareOp {
    /// Returns the operator's canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Like => "%=",
            CompareOp::NotLike => "!%",
        }
    }
}

/// Values that can appear on the right side of a filter.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// Parses text as a number only when it looks like one: a digit first,
/// after an optional minus sign, so words like `inf`, `-infinity` and
/// `NaN` stay strings.
pub fn parse_number(text: &str) -> Option<f64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.as_bytes().first()?.is_ascii_digit() {
        return None;
    }
    text.parse().ok()
}
