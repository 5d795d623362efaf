//! jskim Path - Path expression compiler for the jskim query engine.
//!
//! A path is a dot-separated list of segments:
//!
//! - `widget.image.hOffset` - object members
//! - `statuses.3.id` - array elements by index
//! - `na*e` / `*` - glob names and wildcards
//! - `items.#` / `items.#.name` - array length and per-element mapping
//! - `items.#[tag="good"]` / `items.#[tag="good"]#` - filters
//!
//! # Example
//!
//! ```rust
//! use jskim_path::{CompareOp, FilterExpr, Path, Segment};
//!
//! let path = Path::compile(r#"loggy.programmers.#[tag="good"]#.firstName"#).unwrap();
//! assert_eq!(path.segments().len(), 4);
//!
//! match &path.segments()[2] {
//!     Segment::Filter { expr: FilterExpr::Compare { op, .. }, collect_all } => {
//!         assert_eq!(*op, CompareOp::Eq);
//!         assert!(*collect_all);
//!     }
//!     _ => unreachable!(),
//! }
//!
//! assert!(Path::compile("items.#[tag==\"good\"").is_err());
//! ```

#![no_std]

extern crate alloc;

mod filter;
mod parser;
mod segment;

pub use parser::Path;
pub use segment::{parse_number, CompareOp, FilterExpr, Literal, Segment};
