//! jskim Core - Shared types for the jskim selective JSON query engine.
//!
//! This crate provides the pieces every other jskim crate depends on:
//!
//! - `Error`: Path compilation errors
//! - `QueryOptions`: Key matching configuration (case folding, duplicate keys)
//! - `pattern_match`: Glob matching used for wildcard keys and `%` filters
//!
//! # Example
//!
//! ```rust
//! use jskim_core::{pattern_match, DuplicateKeys, QueryOptions};
//!
//! let options = QueryOptions::new().with_duplicate_keys(DuplicateKeys::Last);
//! assert!(!options.first_wins());
//!
//! assert!(pattern_match::glob("firstName", "first*"));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod options;
pub mod pattern_match;

pub use error::{Error, Result};
pub use options::{DuplicateKeys, QueryOptions};
