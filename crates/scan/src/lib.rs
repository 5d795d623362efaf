//! jskim Scan - Single-pass byte-level JSON scanner.
//!
//! This crate provides the primitives the query executor navigates with:
//!
//! - `Scanner`: classify, skip and iterate JSON values by byte position
//! - `Token` / `Span`: the kind and extent of a skipped value
//! - `unescape` / `key_eq`: string contents without building a tree
//!
//! # Example
//!
//! ```rust
//! use jskim_scan::{Member, Scanner, TokenKind};
//!
//! let json = br#"{"name": "Alice", "tags": ["a", "b"]}"#;
//! let scanner = Scanner::new(json);
//!
//! let token = scanner.skip_value(0).unwrap();
//! assert_eq!(token.kind, TokenKind::Object);
//! assert_eq!(token.span.end, json.len());
//!
//! match scanner.next_object_key(1) {
//!     Member::Key { key, value } => {
//!         assert_eq!(key.slice(json), b"name");
//!         assert_eq!(scanner.classify(value).0, TokenKind::String);
//!     }
//!     _ => unreachable!(),
//! }
//! ```

#![no_std]

extern crate alloc;

mod scanner;
mod string;
mod token;

pub use scanner::{Element, Member, Scanner};
pub use string::{key_eq, unescape};
pub use token::{Span, Token, TokenKind};
