use alloc::string::String;
use core::fmt::{self, Write};

use crate::{ParseError, Position};

// -----------------------------------------------------------------------------
// Escape

/// Escapes `text` for use between double quotes.
///
/// Quotes, backslashes and `\b \f \n \r \t` get their short escapes, every
/// other control character is written as `\uXXXX`.
///
/// # Examples
///
/// ```
/// use vc_meta::json::{escape, unescape};
///
/// let text = "tab\there \"quoted\" \u{1}";
/// let escaped = escape(text);
/// assert_eq!(escaped, r#"tab\there \"quoted\" \u0001"#);
/// assert_eq!(unescape(&escaped).unwrap(), text);
/// ```
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a `String` cannot fail.
    let _ = write_escaped(&mut out, text);
    out
}

/// Writes the escaped form of `text` into `out`, without surrounding quotes.
pub fn write_escaped<W: Write + ?Sized>(out: &mut W, text: &str) -> fmt::Result {
    let mut start = 0;
    for (index, ch) in text.char_indices() {
        let short = match ch {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\u{8}' => "\\b",
            '\u{c}' => "\\f",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            c if c.is_control() => {
                out.write_str(&text[start..index])?;
                write!(out, "\\u{:04x}", c as u32)?;
                start = index + ch.len_utf8();
                continue;
            }
            _ => continue,
        };
        out.write_str(&text[start..index])?;
        out.write_str(short)?;
        start = index + ch.len_utf8();
    }
    out.write_str(&text[start..])
}

// -----------------------------------------------------------------------------
// Unescape

/// Reverses [`escape`].
///
/// Also accepts `\/` and UTF-16 surrogate pairs written as two `\uXXXX`
/// escapes. Error positions are relative to `text`.
pub fn unescape(text: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices();

    while let Some((index, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let escaped = match chars.next() {
            Some((_, '"')) => '"',
            Some((_, '\\')) => '\\',
            Some((_, '/')) => '/',
            Some((_, 'b')) => '\u{8}',
            Some((_, 'f')) => '\u{c}',
            Some((_, 'n')) => '\n',
            Some((_, 'r')) => '\r',
            Some((_, 't')) => '\t',
            Some((_, 'u')) => {
                let unit = hex4(text, index + 2)?;
                let code = match unit {
                    0xD800..=0xDBFF => {
                        let low_at = index + 6;
                        if text.get(low_at..low_at + 2) != Some("\\u") {
                            return Err(error(text, low_at, "low surrogate escape"));
                        }
                        let low = hex4(text, low_at + 2)?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(error(text, low_at, "low surrogate escape"));
                        }
                        // Consume the second escape.
                        chars.nth(9);
                        0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
                    }
                    0xDC00..=0xDFFF => {
                        return Err(error(text, index, "high surrogate before low surrogate"));
                    }
                    _ => {
                        chars.nth(3);
                        u32::from(unit)
                    }
                };
                char::from_u32(code).ok_or_else(|| error(text, index, "unicode scalar value"))?
            }
            _ => return Err(error(text, index, "escape sequence")),
        };
        out.push(escaped);
    }

    Ok(out)
}

/// Parses the four hex digits starting at byte `at`.
fn hex4(text: &str, at: usize) -> Result<u16, ParseError> {
    text.get(at..at + 4)
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
        .and_then(|digits| u16::from_str_radix(digits, 16).ok())
        .ok_or_else(|| error(text, at, "four hex digits"))
}

#[cold]
fn error(text: &str, offset: usize, expected: &'static str) -> ParseError {
    ParseError::new(Position::locate(text, offset), expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_every_control_character() {
        let text: String = (0_u32..0x20)
            .chain([0x7f, 0x85])
            .filter_map(char::from_u32)
            .chain("\"\\ plain é 😀".chars())
            .collect();

        let escaped = escape(&text);
        assert!(!escaped.chars().any(|c| c.is_control()));
        assert!(escaped.starts_with("\\u0000\\u0001"));
        assert!(escaped.contains("\\b\\t\\n\\u000b\\f\\r"));
        assert_eq!(unescape(&escaped).unwrap(), text);

        // Accepted by a standard JSON parser too.
        let parsed: String = serde_json::from_str(&format!("\"{escaped}\"")).unwrap();
        assert_eq!(parsed, text);
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(unescape("\\u00e9\\u00E9").unwrap(), "éé");
        assert_eq!(unescape("a\\/b").unwrap(), "a/b");
        assert_eq!(unescape("\\ud83d\\ude00!").unwrap(), "😀!");

        let err = unescape("\\ud83d").unwrap_err();
        assert_eq!(err.expected, "low surrogate escape");
        let err = unescape("x\\ude00").unwrap_err();
        assert_eq!(err.position.column, 2);
        let err = unescape("\\u12").unwrap_err();
        assert_eq!(err.expected, "four hex digits");
        let err = unescape("\\q").unwrap_err();
        assert_eq!(err.expected, "escape sequence");
    }
}
