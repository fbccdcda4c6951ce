use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;

use super::escape::unescape;
use crate::info::{ScalarKind, ScalarValue};
use crate::serde::{Identity, MAX_DEPTH, Reader};
use crate::{ParseError, Position, ReflectError};

// -----------------------------------------------------------------------------
// JsonReader

/// Tokenizes the dialect written by [`JsonWriter`](super::JsonWriter).
///
/// - Whitespace and commas separate tokens.
/// - Bare tokens (numbers, booleans, null) end at a separator or a
///   structural character.
/// - Strings end at the first unescaped quote.
/// - Object headers are a type name followed by `{`.
///
/// Running out of input before a closing `}`, `]` or `"` is a
/// [`ParseError`]; every token either consumes input or fails. So is
/// nesting objects and arrays deeper than [`MAX_DEPTH`], skipped values
/// included.
pub struct JsonReader<'a> {
    input: &'a str,
    pos: usize,
    /// Objects and arrays currently open.
    depth: usize,
}

#[inline]
fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == ','
}

#[inline]
fn ends_bare_token(ch: char) -> bool {
    is_separator(ch) || matches!(ch, '{' | '}' | '[' | ']' | ':' | '"')
}

/// Bare scalars: booleans, numbers and both null spellings.
fn is_literal(token: &str) -> bool {
    matches!(token, "true" | "false" | "NULL" | "null") || token.parse::<f64>().is_ok()
}

#[inline]
fn ends_header(ch: char) -> bool {
    matches!(ch, '{' | '[' | ']' | '}' | '"' | '\n')
}

impl<'a> JsonReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    /// The position of the next unread character.
    #[inline]
    pub fn position(&self) -> Position {
        Position::locate(self.input, self.pos)
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_separators(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start_matches(is_separator).len();
    }

    #[cold]
    fn error_at(&self, offset: usize, expected: impl Into<Cow<'static, str>>) -> ReflectError {
        ParseError::new(Position::locate(self.input, offset), expected).into()
    }

    #[cold]
    fn error(&self, expected: impl Into<Cow<'static, str>>) -> ReflectError {
        self.error_at(self.pos, expected)
    }

    /// Opens one level of nesting, failing past [`MAX_DEPTH`].
    fn enter(&mut self) -> Result<(), ReflectError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("at most {MAX_DEPTH} nested objects and arrays")));
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn expect(&mut self, ch: char, expected: &'static str) -> Result<(), ReflectError> {
        self.skip_separators();
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    /// Scans a header at the cursor, returns the trimmed name and the offset
    /// of its `{`.
    fn scan_header(&self) -> Option<(&'a str, usize)> {
        let rest = self.rest();
        let end = rest.find(ends_header).unwrap_or(rest.len());
        let name = rest[..end].trim();
        if name.is_empty() || !rest[end..].starts_with('{') {
            return None;
        }
        Some((name, self.pos + end))
    }

    fn bare_token(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest.find(ends_bare_token).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn string(&mut self) -> Result<String, ReflectError> {
        if self.peek() != Some('"') {
            return Err(self.error("`\"`"));
        }
        let start = self.pos + 1;
        let bytes = self.input.as_bytes();

        let mut at = start;
        loop {
            match bytes.get(at) {
                None => return Err(self.error_at(self.input.len(), "closing `\"`")),
                Some(b'"') => break,
                Some(b'\\') => at += 2,
                Some(_) => at += 1,
            }
        }

        let raw = &self.input[start..at];
        let text = unescape(raw)
            .map_err(|err| self.error_at(start + err.position.offset, err.expected))?;
        self.pos = at + 1;
        Ok(text)
    }

    fn skip_object_body(&mut self) -> Result<(), ReflectError> {
        loop {
            self.skip_separators();
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    self.leave();
                    return Ok(());
                }
                Some('"') => {
                    self.string()?;
                    self.expect(':', "`:`")?;
                    self.skip_value()?;
                }
                None => return Err(self.error("`}`")),
                Some(_) => return Err(self.error("property name or `}`")),
            }
        }
    }
}

impl Reader for JsonReader<'_> {
    fn peek_type_name(&mut self) -> Result<String, ReflectError> {
        self.skip_separators();
        match self.scan_header() {
            Some((name, _)) => Ok(name.into()),
            None => Err(self.error("object header")),
        }
    }

    fn object_begin(&mut self) -> Result<String, ReflectError> {
        self.skip_separators();
        let Some((name, brace)) = self.scan_header() else {
            return Err(self.error("object header"));
        };
        self.enter()?;
        self.pos = brace + 1;
        Ok(name.into())
    }

    fn read_identity(&mut self) -> Result<Identity, ReflectError> {
        self.skip_separators();
        let start = self.pos;
        if self.peek() != Some('"') {
            return Ok(Identity::None);
        }

        let key = self.string()?;
        if key != "$id" && key != "$ref" {
            self.pos = start;
            return Ok(Identity::None);
        }

        self.expect(':', "`:`")?;
        self.skip_separators();
        let at = self.pos;
        let id = self
            .string()?
            .parse::<u64>()
            .map_err(|_| self.error_at(at, "object id"))?;

        Ok(if key == "$id" {
            Identity::Id(id)
        } else {
            Identity::Ref(id)
        })
    }

    fn next_property(&mut self) -> Result<Option<String>, ReflectError> {
        self.skip_separators();
        match self.peek() {
            Some('}') => Ok(None),
            Some('"') => {
                let name = self.string()?;
                self.expect(':', "`:`")?;
                Ok(Some(name))
            }
            None => Err(self.error("`}`")),
            Some(_) => Err(self.error("property name or `}`")),
        }
    }

    fn object_end(&mut self) -> Result<(), ReflectError> {
        self.expect('}', "`}`")?;
        self.leave();
        Ok(())
    }

    fn collection_begin(&mut self) -> Result<(), ReflectError> {
        self.skip_separators();
        if self.peek() == Some('[') {
            self.enter()?;
        }
        self.expect('[', "`[`")
    }

    fn next_element(&mut self) -> Result<bool, ReflectError> {
        self.skip_separators();
        match self.peek() {
            Some(']') => Ok(false),
            Some(_) => Ok(true),
            None => Err(self.error("`]`")),
        }
    }

    fn collection_end(&mut self) -> Result<(), ReflectError> {
        self.expect(']', "`]`")?;
        self.leave();
        Ok(())
    }

    fn read_null(&mut self) -> Result<bool, ReflectError> {
        self.skip_separators();
        let rest = self.rest();
        for literal in ["NULL", "null"] {
            if let Some(after) = rest.strip_prefix(literal)
                && after.chars().next().is_none_or(ends_bare_token)
            {
                self.pos += literal.len();
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn read_scalar(&mut self, kind: ScalarKind) -> Result<ScalarValue, ReflectError> {
        self.skip_separators();
        let start = self.pos;

        match kind {
            ScalarKind::Str => return Ok(ScalarValue::Str(self.string()?)),
            ScalarKind::Char => {
                let text = self.string()?;
                let mut chars = text.chars();
                return Ok(match (chars.next(), chars.next()) {
                    (Some(ch), None) => ScalarValue::Char(ch),
                    _ => ScalarValue::Str(text),
                });
            }
            _ => {}
        }

        let token = self.bare_token();
        let value = match kind {
            ScalarKind::Bool => match token {
                "true" => Some(ScalarValue::Bool(true)),
                "false" => Some(ScalarValue::Bool(false)),
                _ => None,
            },
            ScalarKind::Int => token.parse().ok().map(ScalarValue::Int),
            ScalarKind::UInt => token.parse().ok().map(ScalarValue::UInt),
            ScalarKind::Float => token.parse().ok().map(ScalarValue::Float),
            ScalarKind::Str | ScalarKind::Char => None,
        };

        value.ok_or_else(|| self.error_at(start, kind.as_str()))
    }

    fn skip_value(&mut self) -> Result<(), ReflectError> {
        self.skip_separators();
        match self.peek() {
            None => Err(self.error("value")),
            Some('"') => self.string().map(drop),
            Some('[') => {
                self.enter()?;
                self.pos += 1;
                while self.next_element()? {
                    self.skip_value()?;
                }
                self.collection_end()
            }
            Some('{') => {
                self.enter()?;
                self.pos += 1;
                self.skip_object_body()
            }
            Some(_) => {
                let rest = self.rest();
                let token = &rest[..rest.find(ends_bare_token).unwrap_or(rest.len())];
                if is_literal(token) {
                    self.pos += token.len();
                    return Ok(());
                }
                match self.scan_header() {
                    Some((_, brace)) => {
                        self.enter()?;
                        self.pos = brace + 1;
                        self.skip_object_body()
                    }
                    None => Err(self.error("value")),
                }
            }
        }
    }

    fn finish(&mut self) -> Result<(), ReflectError> {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
        if self.pos < self.input.len() {
            return Err(self.error("end of input"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_of_an_object() {
        let mut r = JsonReader::new("Point {\n\t\"$id\": \"7\",\n\t\"x\": 1.5,\n\t\"y\": -2\n}\n");
        assert_eq!(r.peek_type_name().unwrap(), "Point");
        assert_eq!(r.object_begin().unwrap(), "Point");
        assert_eq!(r.read_identity().unwrap(), Identity::Id(7));
        assert_eq!(r.next_property().unwrap().as_deref(), Some("x"));
        assert_eq!(r.read_scalar(ScalarKind::Float).unwrap(), ScalarValue::Float(1.5));
        assert_eq!(r.next_property().unwrap().as_deref(), Some("y"));
        assert_eq!(r.read_scalar(ScalarKind::Int).unwrap(), ScalarValue::Int(-2));
        assert_eq!(r.next_property().unwrap(), None);
        r.object_end().unwrap();
        r.finish().unwrap();
    }

    #[test]
    fn identity_is_optional() {
        let mut r = JsonReader::new("A { \"x\": true }");
        r.object_begin().unwrap();
        assert_eq!(r.read_identity().unwrap(), Identity::None);
        assert_eq!(r.next_property().unwrap().as_deref(), Some("x"));
        assert_eq!(r.read_scalar(ScalarKind::Bool).unwrap(), ScalarValue::Bool(true));

        let mut r = JsonReader::new("A {\n\t\"$ref\": \"3\"\n}");
        r.object_begin().unwrap();
        assert_eq!(r.read_identity().unwrap(), Identity::Ref(3));
        assert_eq!(r.next_property().unwrap(), None);
    }

    #[test]
    fn null_spellings() {
        let mut r = JsonReader::new("[NULL, null, nullish {}]");
        r.collection_begin().unwrap();
        assert!(r.read_null().unwrap());
        assert!(r.read_null().unwrap());
        assert!(!r.read_null().unwrap());
        r.skip_value().unwrap();
        assert!(!r.next_element().unwrap());
        r.collection_end().unwrap();
        r.finish().unwrap();
    }

    #[test]
    fn skips_nested_values() {
        let text = "[\"a]\\\"\", Inner {\n\t\"list\": [1, [2], Deep {}],\n\t\"p\": NULL\n}, 3.5]";
        let mut r = JsonReader::new(text);
        r.skip_value().unwrap();
        r.finish().unwrap();
    }

    #[test]
    fn truncated_input_fails() {
        for text in [
            "Point {\n\t\"x\": 1",
            "Point {\n\t\"x",
            "[1, 2",
            "Point",
            "",
        ] {
            let mut r = JsonReader::new(text);
            assert!(
                matches!(r.skip_value(), Err(ReflectError::Parse(_))),
                "{text:?}"
            );
        }

        let mut r = JsonReader::new("Point {\n\t\"x\": 1");
        r.object_begin().unwrap();
        r.next_property().unwrap();
        r.read_scalar(ScalarKind::Int).unwrap();
        let err = r.next_property().unwrap_err();
        let pos = err.as_parse_error().unwrap().position;
        assert_eq!((pos.line, pos.column), (2, 8));
    }

    #[test]
    fn wrong_scalar_reports_position() {
        let mut r = JsonReader::new("[\n  yes\n]");
        r.collection_begin().unwrap();
        r.next_element().unwrap();
        let err = r.read_scalar(ScalarKind::Bool).unwrap_err();
        let parse = err.as_parse_error().unwrap();
        assert_eq!(parse.expected, "boolean");
        assert_eq!((parse.position.line, parse.position.column), (2, 3));
    }

    #[test]
    fn nesting_is_bounded() {
        let fits = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        let mut r = JsonReader::new(&fits);
        r.skip_value().unwrap();
        r.finish().unwrap();

        let deep = "[".repeat(200_000);
        let err = JsonReader::new(&deep).skip_value().unwrap_err();
        let parse = err.as_parse_error().unwrap();
        assert_eq!(parse.position.offset, MAX_DEPTH);
        assert!(parse.expected.contains("nested"));

        let objects = "A { \"a\": ".repeat(MAX_DEPTH + 1);
        assert!(matches!(
            JsonReader::new(&objects).skip_value(),
            Err(ReflectError::Parse(_))
        ));

        // Levels opened through the hooks count as well.
        let mut r = JsonReader::new(&deep);
        for _ in 0..MAX_DEPTH {
            r.collection_begin().unwrap();
        }
        assert!(r.collection_begin().is_err());
    }

    #[test]
    fn trailing_input_is_rejected() {
        let mut r = JsonReader::new("1 2");
        r.read_scalar(ScalarKind::Int).unwrap();
        assert!(r.finish().is_err());
    }
}
