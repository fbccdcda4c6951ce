use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Position

/// A location inside a textual input.
///
/// `offset` is a byte offset, `line` and `column` are 1-based and count
/// characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The position of the first character.
    pub const START: Self = Self {
        offset: 0,
        line: 1,
        column: 1,
    };

    /// Locates the byte `offset` inside `text`.
    ///
    /// An offset past the end, or inside a character, is clamped to the
    /// preceding character boundary.
    pub fn locate(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }

        let before = &text[..offset];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Self {
            offset,
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl Default for Position {
    #[inline]
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

// -----------------------------------------------------------------------------
// ParseError

/// Malformed or truncated textual input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("expected {expected} at {position}")]
pub struct ParseError {
    pub position: Position,
    pub expected: Cow<'static, str>,
}

impl ParseError {
    #[inline]
    pub fn new(position: Position, expected: impl Into<Cow<'static, str>>) -> Self {
        Self {
            position,
            expected: expected.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// ReflectError

/// Errors surfaced by the registry, the property accessors and the drivers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReflectError {
    #[error("metatype `{name}` not declared")]
    NotRegistered { name: String },

    #[error("metatype `{name}` is already declared")]
    DuplicateType { name: String },

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: Cow<'static, str>,
        found: Cow<'static, str>,
    },

    #[error("property `{name}` not found in `{owner}`")]
    PropertyNotFound { owner: String, name: String },

    #[error("property `{owner}::{name}` is write-only")]
    NotReadable { owner: String, name: String },

    #[error("property `{owner}::{property}` refers to undeclared type `{type_name}`")]
    Unresolved {
        owner: String,
        property: String,
        type_name: String,
    },

    #[error("metatype `{name}` has no constructor")]
    NotConstructible { name: String },

    #[error("object reference `{id}` does not name a previously read object")]
    UnknownReference { id: u64 },

    #[error("`{name}` is a value and cannot be read from reference `{id}`")]
    UnexpectedReference { name: String, id: u64 },

    #[error("value nested deeper than {limit} levels")]
    DepthLimit { limit: usize },

    #[error("object of type `{name}` is already borrowed")]
    AlreadyBorrowed { name: Cow<'static, str> },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("formatting failure")]
    Fmt(#[from] fmt::Error),
}

impl ReflectError {
    /// Shorthand for [`ReflectError::TypeMismatch`].
    #[cold]
    pub fn mismatch(
        expected: impl Into<Cow<'static, str>>,
        found: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Shorthand for [`ReflectError::NotRegistered`].
    #[cold]
    pub fn not_registered(name: impl Into<String>) -> Self {
        Self::NotRegistered { name: name.into() }
    }

    /// Returns the [`ParseError`] if this error came from malformed input.
    #[inline]
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ReflectError::not_registered("Point");
        assert_eq!(err.to_string(), "metatype `Point` not declared");

        let err = ReflectError::mismatch("f64", "String");
        assert_eq!(
            err.to_string(),
            "type mismatch: expected `f64`, found `String`"
        );

        let pos = Position {
            offset: 10,
            line: 2,
            column: 4,
        };
        let err: ReflectError = ParseError::new(pos, "`}`").into();
        assert_eq!(err.to_string(), "expected `}` at line 2, column 4");
        assert_eq!(err.as_parse_error().unwrap().position, pos);
    }

    #[test]
    fn locate_counts_characters() {
        let text = "ab\nçd\ne";
        assert_eq!(Position::locate(text, 0), Position::START);

        let pos = Position::locate(text, 5);
        assert_eq!((pos.line, pos.column), (2, 2));

        // Inside `ç`, clamped to its start.
        let pos = Position::locate(text, 4);
        assert_eq!((pos.offset, pos.line, pos.column), (3, 2, 1));

        let pos = Position::locate(text, 100);
        assert_eq!((pos.offset, pos.line, pos.column), (text.len(), 3, 2));
    }
}
