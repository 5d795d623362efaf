//! Glob pattern matching for key segments and `%` filter operators.
//!
//! Provides a single, canonical implementation used by both key matching
//! during navigation and the `%=` / `!%` filter operators, ensuring
//! identical semantics across both.
//!
//! # Glob patterns
//!
//! - `*` matches zero or more characters
//! - `?` matches exactly one character
//! - `\x` matches the character `x` literally (so `\*` is a literal star)
//!
//! Matching operates on Unicode scalar values. It is **case-sensitive**
//! unless the `_ignore_case` variant is used, which folds ASCII letters only.

/// Glob pattern matching.
///
/// ```
/// use jskim_core::pattern_match::glob;
/// assert!(glob("hello", "h*o"));
/// assert!(glob("hello", "?ello"));
/// assert!(!glob("hello", "world"));
/// assert!(glob("a*b", "a\\*b"));
/// ```
pub fn glob(value: &str, pattern: &str) -> bool {
    glob_chars(value, pattern, false)
}

/// Glob pattern matching with ASCII case folding.
///
/// ```
/// use jskim_core::pattern_match::glob_ignore_case;
/// assert!(glob_ignore_case("HOffset", "h*set"));
/// ```
pub fn glob_ignore_case(value: &str, pattern: &str) -> bool {
    glob_chars(value, pattern, true)
}

/// Returns true if `pattern` contains an unescaped `*` or `?`.
pub fn has_wildcards(pattern: &str) -> bool {
    let mut escaped = false;
    for c in pattern.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '*' | '?' => return true,
            _ => {}
        }
    }
    false
}

/// One pattern element.
#[derive(Clone, Copy, PartialEq)]
enum Token {
    Star,
    Any,
    Char(char),
}

/// Reads the pattern element at byte `pos`, returning it with the position
/// of the next one.
#[inline]
fn token_at(pattern: &str, pos: usize) -> Option<(Token, usize)> {
    let mut chars = pattern[pos..].chars();
    let c = chars.next()?;
    let token = match c {
        '*' => Token::Star,
        '?' => Token::Any,
        '\\' => match chars.next() {
            Some(escaped) => {
                return Some((Token::Char(escaped), pos + 1 + escaped.len_utf8()));
            }
            None => Token::Char('\\'),
        },
        other => Token::Char(other),
    };
    Some((token, pos + c.len_utf8()))
}

#[inline]
fn char_eq(a: char, b: char, ignore_case: bool) -> bool {
    if ignore_case {
        a.eq_ignore_ascii_case(&b)
    } else {
        a == b
    }
}

#[inline]
fn char_len_at(text: &str, pos: usize) -> usize {
    text[pos..].chars().next().map_or(1, char::len_utf8)
}

/// Iterative matcher over byte positions of both strings: remembers the
/// pattern position after the last star and the value position it was
/// tried at, and retries from one character later on mismatch. Runs in
/// O(value * pattern) worst case without recursion or allocation.
fn glob_chars(value: &str, pattern: &str, ignore_case: bool) -> bool {
    let (mut vi, mut pi) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while let Some(c) = value[vi..].chars().next() {
        match token_at(pattern, pi) {
            Some((Token::Star, next)) => {
                star = Some((next, vi));
                pi = next;
            }
            Some((Token::Any, next)) => {
                vi += c.len_utf8();
                pi = next;
            }
            Some((Token::Char(t), next)) if char_eq(t, c, ignore_case) => {
                vi += c.len_utf8();
                pi = next;
            }
            _ => match star {
                Some((after_star, tried)) => {
                    vi = tried + char_len_at(value, tried);
                    pi = after_star;
                    star = Some((after_star, vi));
                }
                None => return false,
            },
        }
    }

    while let Some((token, next)) = token_at(pattern, pi) {
        if token != Token::Star {
            return false;
        }
        pi = next;
    }
    true
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_exact() {
        assert!(glob("hello", "hello"));
        assert!(!glob("hello", "world"));
        assert!(!glob("hello", "hell"));
    }

    #[test]
    fn glob_star() {
        assert!(glob("hello", "*"));
        assert!(glob("hello", "h*"));
        assert!(glob("hello", "*o"));
        assert!(glob("hello", "h*o"));
        assert!(glob("hello", "*ell*"));
        assert!(!glob("hello", "x*"));
    }

    #[test]
    fn glob_question() {
        assert!(glob("hello", "?ello"));
        assert!(glob("hello", "h?llo"));
        assert!(glob("hello", "?????"));
        assert!(!glob("hello", "??????"));
    }

    #[test]
    fn glob_backtracks_over_star() {
        assert!(glob("abcabcabd", "*abd"));
        assert!(glob("mississippi", "m*iss*ppi"));
        assert!(!glob("mississippi", "m*iss*ppx"));
    }

    #[test]
    fn glob_empty() {
        assert!(glob("", ""));
        assert!(glob("", "*"));
        assert!(glob("", "**"));
        assert!(!glob("", "?"));
        assert!(!glob("", "a"));
    }

    #[test]
    fn glob_escapes() {
        assert!(glob("a*b", "a\\*b"));
        assert!(!glob("axb", "a\\*b"));
        assert!(glob("what?", "what\\?"));
        assert!(glob("end.ing", "end\\.ing"));
    }

    #[test]
    fn glob_case_folding() {
        assert!(!glob("Hello", "hello"));
        assert!(glob_ignore_case("Hello", "hello"));
        assert!(glob_ignore_case("hOffset", "HOFF*"));
    }

    #[test]
    fn glob_unicode() {
        assert!(glob("héllo", "h?llo"));
        assert!(glob("日本語", "日*"));
    }

    #[test]
    fn glob_backtracks_over_multibyte_chars() {
        assert!(glob("日本語日本", "*本"));
        assert!(glob("ééx", "*éx"));
        assert!(!glob("ééy", "*éx"));
        assert!(glob("é*", "\\é\\*"));
        assert!(!glob_ignore_case("ÀbÀB", "*àb"));
        assert!(glob_ignore_case("xAB", "*ab"));
    }

    #[test]
    fn glob_trailing_backslash_is_literal() {
        assert!(glob("a\\", "a\\"));
        assert!(!glob("a", "a\\"));
    }

    #[test]
    fn detects_wildcards() {
        assert!(has_wildcards("na*e"));
        assert!(has_wildcards("?"));
        assert!(!has_wildcards("name"));
        assert!(!has_wildcards("na\\*e"));
    }
}
