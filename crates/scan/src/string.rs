//! String contents: unescaping and key comparison.
//!
//! Both functions take the raw bytes between the quotes. Strings without a
//! backslash are the common case and never allocate.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

/// Unescapes JSON string contents (without the surrounding quotes).
///
/// Unknown escapes are kept literally, lone surrogates become U+FFFD and
/// invalid UTF-8 is replaced lossily.
///
/// ```
/// use jskim_scan::unescape;
/// assert_eq!(unescape(br#"B\\\"R"#), "B\\\"R");
/// assert_eq!(unescape(br#"caf\u00e9"#), "café");
/// ```
pub fn unescape(raw: &[u8]) -> Cow<'_, str> {
    if memchr::memchr(b'\\', raw).is_none() {
        return String::from_utf8_lossy(raw);
    }

    let mut out: Vec<u8> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        match raw.get(i + 1) {
            Some(b'"') => out.push(b'"'),
            Some(b'\\') => out.push(b'\\'),
            Some(b'/') => out.push(b'/'),
            Some(b'b') => out.push(0x08),
            Some(b'f') => out.push(0x0c),
            Some(b'n') => out.push(b'\n'),
            Some(b'r') => out.push(b'\r'),
            Some(b't') => out.push(b'\t'),
            Some(b'u') => match decode_unicode_escape(raw, i) {
                Some((ch, consumed)) => {
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    i += consumed;
                    continue;
                }
                None => out.extend_from_slice(b"\\u"),
            },
            Some(other) => {
                out.push(b'\\');
                out.push(*other);
            }
            None => {
                out.push(b'\\');
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    match String::from_utf8(out) {
        Ok(s) => Cow::Owned(s),
        Err(err) => Cow::Owned(String::from_utf8_lossy(err.as_bytes()).into_owned()),
    }
}

/// Decodes `\uXXXX` (and a following low surrogate) at `pos`. Returns the
/// character and how many bytes of `raw` it used.
fn decode_unicode_escape(raw: &[u8], pos: usize) -> Option<(char, usize)> {
    let unit = parse_hex4(raw, pos + 2)?;
    if (0xD800..0xDC00).contains(&unit) {
        let low = match (raw.get(pos + 6), raw.get(pos + 7)) {
            (Some(b'\\'), Some(b'u')) => parse_hex4(raw, pos + 8),
            _ => None,
        };
        if let Some(low @ 0xDC00..=0xDFFF) = low {
            let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            return Some((char::from_u32(code).unwrap_or('\u{FFFD}'), 12));
        }
        return Some(('\u{FFFD}', 6));
    }
    Some((char::from_u32(unit).unwrap_or('\u{FFFD}'), 6))
}

fn parse_hex4(raw: &[u8], pos: usize) -> Option<u32> {
    let digits = raw.get(pos..pos + 4)?;
    let mut value = 0u32;
    for &d in digits {
        let nibble = match d {
            b'0'..=b'9' => d - b'0',
            b'a'..=b'f' => d - b'a' + 10,
            b'A'..=b'F' => d - b'A' + 10,
            _ => return None,
        };
        value = (value << 4) | nibble as u32;
    }
    Some(value)
}

/// Compares raw (escaped) key bytes against an unescaped name.
///
/// ```
/// use jskim_scan::key_eq;
/// assert!(key_eq(b"hOffset", "hOffset", false));
/// assert!(key_eq(b"HOFFSET", "hOffset", true));
/// assert!(key_eq(br#"a\"b"#, "a\"b", false));
/// ```
pub fn key_eq(raw: &[u8], name: &str, ignore_case: bool) -> bool {
    if memchr::memchr(b'\\', raw).is_none() {
        return if ignore_case {
            raw.eq_ignore_ascii_case(name.as_bytes())
        } else {
            raw == name.as_bytes()
        };
    }
    let key = unescape(raw);
    if ignore_case {
        key.eq_ignore_ascii_case(name)
    } else {
        key == name
    }
}
