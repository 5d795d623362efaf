//! jskim Query - Selective JSON queries over raw bytes.
//!
//! This crate answers path queries against a JSON document without parsing
//! all of it. The scanner walks only the bytes on the way to the requested
//! values and skips everything else; results borrow their text from the
//! document.
//!
//! - `get` / `get_with` / `try_get`: one path, one value
//! - `get_all`: every value a wildcard path reaches
//! - `get_many`: several paths in one pass, sharing common prefixes
//! - `execute*`: the same with paths compiled ahead of time
//! - `Value`: typed, lazily converted view of a result
//!
//! A path that matches nothing, or runs into malformed JSON, yields a value
//! whose `exists()` is false. Only path syntax errors are errors.
//!
//! # Example
//!
//! ```rust
//! use jskim_query::{get, get_many, Kind};
//!
//! let json = r#"{
//!     "name": {"first": "Tom", "last": "Anderson"},
//!     "friends": [
//!         {"first": "Dale", "age": 44},
//!         {"first": "Roger", "age": 68},
//!         {"first": "Jane", "age": 47}
//!     ]
//! }"#;
//!
//! assert_eq!(get(json, "name.last").str(), "Anderson");
//! assert_eq!(get(json, "friends.#").int(), 3);
//! assert_eq!(get(json, "friends.1.first").str(), "Roger");
//! assert_eq!(get(json, "friends.#[age>45]#.first").raw(), r#"["Roger","Jane"]"#);
//!
//! let values = get_many(json, &["name.first", "name.middle"]);
//! assert_eq!(values[0].kind(), Kind::String);
//! assert!(!values[1].exists());
//! ```

#![no_std]

extern crate alloc;

mod batch;
mod compare;
mod executor;
mod iter;
mod value;

pub use iter::{Elements, Entries};
pub use jskim_core::{pattern_match, DuplicateKeys, Error, QueryOptions, Result};
pub use jskim_path::{CompareOp, FilterExpr, Literal, Path, Segment};
pub use value::{Kind, Value};

use alloc::vec;
use alloc::vec::Vec;
use batch::Job;
use executor::Executor;
use jskim_scan::Scanner;

/// Compiles a path, logging and swallowing the error.
fn compile_or_warn(path: &str) -> Option<Path> {
    match Path::compile(path) {
        Ok(path) => Some(path),
        Err(err) => {
            log::warn!("invalid path {:?}: {}", path, err);
            None
        }
    }
}

/// Gets the value at `path`. Invalid paths give a missing value.
pub fn get<'a, J>(json: &'a J, path: &str) -> Value<'a>
where
    J: AsRef<[u8]> + ?Sized,
{
    get_with(json, path, &QueryOptions::default())
}

/// Gets the value at `path` with options.
pub fn get_with<'a, J>(json: &'a J, path: &str, options: &QueryOptions) -> Value<'a>
where
    J: AsRef<[u8]> + ?Sized,
{
    match compile_or_warn(path) {
        Some(path) => execute_with(json, &path, options),
        None => Value::none(),
    }
}

/// Gets the value at `path`, surfacing path syntax errors.
pub fn try_get<'a, J>(json: &'a J, path: &str) -> Result<Value<'a>>
where
    J: AsRef<[u8]> + ?Sized,
{
    let path = Path::compile(path)?;
    Ok(execute(json, &path))
}

/// Gets every value `path` reaches, in document order. Glob keys and
/// wildcards contribute one value per matching child.
pub fn get_all<'a, J>(json: &'a J, path: &str) -> Vec<Value<'a>>
where
    J: AsRef<[u8]> + ?Sized,
{
    get_all_with(json, path, &QueryOptions::default())
}

/// Gets every value `path` reaches with options.
pub fn get_all_with<'a, J>(json: &'a J, path: &str, options: &QueryOptions) -> Vec<Value<'a>>
where
    J: AsRef<[u8]> + ?Sized,
{
    match compile_or_warn(path) {
        Some(path) => execute_all_with(json, &path, options),
        None => Vec::new(),
    }
}

/// Gets several paths at once. The result has one slot per path, in order;
/// an invalid path leaves its slot missing without affecting the others.
pub fn get_many<'a, J, P>(json: &'a J, paths: &[P]) -> Vec<Value<'a>>
where
    J: AsRef<[u8]> + ?Sized,
    P: AsRef<str>,
{
    get_many_with(json, paths, &QueryOptions::default())
}

/// Gets several paths at once with options.
pub fn get_many_with<'a, J, P>(json: &'a J, paths: &[P], options: &QueryOptions) -> Vec<Value<'a>>
where
    J: AsRef<[u8]> + ?Sized,
    P: AsRef<str>,
{
    let compiled: Vec<Option<Path>> = paths.iter().map(|p| compile_or_warn(p.as_ref())).collect();
    let jobs = compiled
        .iter()
        .enumerate()
        .filter_map(|(slot, path)| {
            path.as_ref().map(|path| Job {
                slot,
                segments: path.segments(),
            })
        })
        .collect();
    run_batch(json.as_ref(), jobs, paths.len(), options)
}

/// Gets several paths at once, failing on the first path syntax error.
pub fn try_get_many<'a, J, P>(json: &'a J, paths: &[P]) -> Result<Vec<Value<'a>>>
where
    J: AsRef<[u8]> + ?Sized,
    P: AsRef<str>,
{
    let compiled = paths
        .iter()
        .map(|p| Path::compile(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(execute_many(json, &compiled))
}

/// Runs a compiled path.
pub fn execute<'a, J>(json: &'a J, path: &Path) -> Value<'a>
where
    J: AsRef<[u8]> + ?Sized,
{
    execute_with(json, path, &QueryOptions::default())
}

/// Runs a compiled path with options.
pub fn execute_with<'a, J>(json: &'a J, path: &Path, options: &QueryOptions) -> Value<'a>
where
    J: AsRef<[u8]> + ?Sized,
{
    Executor::new(json.as_ref(), *options).resolve_root(path.segments())
}

/// Runs a compiled path in multi-result mode.
pub fn execute_all<'a, J>(json: &'a J, path: &Path) -> Vec<Value<'a>>
where
    J: AsRef<[u8]> + ?Sized,
{
    execute_all_with(json, path, &QueryOptions::default())
}

/// Runs a compiled path in multi-result mode with options.
pub fn execute_all_with<'a, J>(json: &'a J, path: &Path, options: &QueryOptions) -> Vec<Value<'a>>
where
    J: AsRef<[u8]> + ?Sized,
{
    Executor::new(json.as_ref(), *options).resolve_all_root(path.segments())
}

/// Runs several compiled paths at once.
pub fn execute_many<'a, J>(json: &'a J, paths: &[Path]) -> Vec<Value<'a>>
where
    J: AsRef<[u8]> + ?Sized,
{
    execute_many_with(json, paths, &QueryOptions::default())
}

/// Runs several compiled paths at once with options.
pub fn execute_many_with<'a, J>(json: &'a J, paths: &[Path], options: &QueryOptions) -> Vec<Value<'a>>
where
    J: AsRef<[u8]> + ?Sized,
{
    let jobs = paths
        .iter()
        .enumerate()
        .map(|(slot, path)| Job {
            slot,
            segments: path.segments(),
        })
        .collect();
    run_batch(json.as_ref(), jobs, paths.len(), options)
}

fn run_batch<'a>(bytes: &'a [u8], jobs: Vec<Job<'_>>, len: usize, options: &QueryOptions) -> Vec<Value<'a>> {
    let exec = Executor::new(bytes, *options);
    let mut out = vec![Value::none(); len];
    batch::execute_many(&exec, jobs, &mut out);
    out
}

/// Wraps the first value of the document without navigating into it.
///
/// This has to find the end of that value, so it reads the whole of it;
/// prefer `get` when only parts are needed.
pub fn parse<J>(json: &J) -> Value<'_>
where
    J: AsRef<[u8]> + ?Sized,
{
    let bytes = json.as_ref();
    match Scanner::new(bytes).skip_value(0) {
        Some(token) => Value::from_token(bytes, token, Some(0)),
        None => {
            log::trace!("no value at the start of the document");
            Value::none()
        }
    }
}
