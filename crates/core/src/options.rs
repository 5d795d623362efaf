//! Query options.
//!
//! Options tune how keys are matched while navigating. They never change
//! how the document is scanned.

/// Which member wins when an object contains the same key more than once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DuplicateKeys {
    /// The first occurrence in document order.
    #[default]
    First,
    /// The last occurrence in document order.
    Last,
}

/// Options applied to a query.
///
/// ```
/// use jskim_core::{DuplicateKeys, QueryOptions};
///
/// let options = QueryOptions::new()
///     .with_case_insensitive_keys(true)
///     .with_duplicate_keys(DuplicateKeys::Last);
/// assert!(options.case_insensitive_keys);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct QueryOptions {
    /// Compare object keys ignoring ASCII case.
    pub case_insensitive_keys: bool,
    /// Tie-break for duplicate object keys in single-result queries.
    pub duplicate_keys: DuplicateKeys,
}

impl QueryOptions {
    /// Creates the default options: case-sensitive keys, first duplicate wins.
    pub const fn new() -> Self {
        Self {
            case_insensitive_keys: false,
            duplicate_keys: DuplicateKeys::First,
        }
    }

    /// Sets whether keys are compared ignoring ASCII case.
    pub const fn with_case_insensitive_keys(mut self, enabled: bool) -> Self {
        self.case_insensitive_keys = enabled;
        self
    }

    /// Sets the duplicate key policy.
    pub const fn with_duplicate_keys(mut self, policy: DuplicateKeys) -> Self {
        self.duplicate_keys = policy;
        self
    }

    /// Returns true if the first matching member settles a lookup.
    #[inline]
    pub fn first_wins(&self) -> bool {
        self.duplicate_keys == DuplicateKeys::First
    }
}
