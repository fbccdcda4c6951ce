use alloc::borrow::Cow;

// -----------------------------------------------------------------------------
// NullLiteral

/// How [`JsonWriter`](super::JsonWriter) spells a null handle.
///
/// [`JsonReader`](super::JsonReader) accepts both spellings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullLiteral {
    /// `NULL`, the spelling of existing documents.
    #[default]
    Compat,
    /// `null`, as standard JSON spells it.
    Standard,
}

impl NullLiteral {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compat => "NULL",
            Self::Standard => "null",
        }
    }
}

// -----------------------------------------------------------------------------
// JsonConfig

/// Output options of a [`JsonWriter`](super::JsonWriter).
///
/// # Examples
///
/// ```
/// use vc_meta::json::{JsonConfig, NullLiteral};
///
/// let config = JsonConfig::default()
///     .with_indent("  ")
///     .with_null_literal(NullLiteral::Standard);
/// assert_eq!(config.indent, "  ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonConfig {
    /// Written once per nesting level before every entry. Defaults to a tab.
    pub indent: Cow<'static, str>,
    pub null_literal: NullLiteral,
}

impl JsonConfig {
    #[inline]
    pub fn with_indent(mut self, indent: impl Into<Cow<'static, str>>) -> Self {
        self.indent = indent.into();
        self
    }

    #[inline]
    pub fn with_null_literal(mut self, null_literal: NullLiteral) -> Self {
        self.null_literal = null_literal;
        self
    }
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            indent: Cow::Borrowed("\t"),
            null_literal: NullLiteral::Compat,
        }
    }
}
