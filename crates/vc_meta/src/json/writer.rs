use alloc::vec::Vec;
use core::fmt::Write;

use super::JsonConfig;
use super::escape::write_escaped;
use crate::ReflectError;
use crate::info::ScalarRef;
use crate::serde::Writer;

// -----------------------------------------------------------------------------
// JsonWriter

/// Writes the indented JSON dialect into any [`core::fmt::Write`] sink.
///
/// ```text
/// Sample {
///     "$id": "1",
///     "name": "first",
///     "tags": [
///         "a",
///         "b"
///     ],
///     "other": NULL
/// }
/// ```
///
/// Objects open with their type name, entries sit one per line at one
/// indent per nesting level. Shared objects carry `"$id"` as their first
/// entry, repeated ones only `"$ref"`. Empty objects and arrays stay on one
/// line, `Name {}` and `[]`.
///
/// Floats use the shortest text that reads back to the same value, at the
/// width of the source type. Non-finite values are written bare as `NaN`,
/// `inf` and `-inf`, which [`JsonReader`](super::JsonReader) accepts.
pub struct JsonWriter<W> {
    out: W,
    config: JsonConfig,
    /// Entries written so far, per open object or array.
    frames: Vec<usize>,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W, config: JsonConfig) -> Self {
        Self {
            out,
            config,
            frames: Vec::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &JsonConfig {
        &self.config
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Starts a new line for the next entry of the innermost frame.
    fn entry(&mut self) -> Result<(), ReflectError> {
        if let Some(count) = self.frames.last_mut() {
            self.out
                .write_str(if *count == 0 { "\n" } else { ",\n" })?;
            *count += 1;
        }
        self.indent(self.frames.len())
    }

    fn indent(&mut self, depth: usize) -> Result<(), ReflectError> {
        for _ in 0..depth {
            self.out.write_str(&self.config.indent)?;
        }
        Ok(())
    }

    fn open(&mut self, token: &str) -> Result<(), ReflectError> {
        self.out.write_str(token)?;
        self.frames.push(0);
        Ok(())
    }

    fn close(&mut self, token: &str) -> Result<(), ReflectError> {
        if self.frames.pop().unwrap_or(0) > 0 {
            self.out.write_char('\n')?;
            self.indent(self.frames.len())?;
        }
        self.out.write_str(token)?;
        Ok(())
    }

    fn quoted(&mut self, text: &str) -> Result<(), ReflectError> {
        self.out.write_char('"')?;
        write_escaped(&mut self.out, text)?;
        self.out.write_char('"')?;
        Ok(())
    }

    fn marker(&mut self, key: &str, id: u64) -> Result<(), ReflectError> {
        self.entry()?;
        write!(self.out, "\"{key}\": \"{id}\"")?;
        Ok(())
    }
}

impl<W: Write> Writer for JsonWriter<W> {
    fn object_begin(&mut self, type_name: &str) -> Result<(), ReflectError> {
        self.out.write_str(type_name)?;
        self.open(" {")
    }

    fn write_identity(&mut self, id: u64) -> Result<(), ReflectError> {
        self.marker("$id", id)
    }

    fn write_reference(&mut self, id: u64) -> Result<(), ReflectError> {
        self.marker("$ref", id)
    }

    fn property_begin(&mut self, name: &str) -> Result<(), ReflectError> {
        self.entry()?;
        self.quoted(name)?;
        self.out.write_str(": ")?;
        Ok(())
    }

    #[inline]
    fn property_end(&mut self) -> Result<(), ReflectError> {
        Ok(())
    }

    fn object_end(&mut self) -> Result<(), ReflectError> {
        self.close("}")
    }

    fn collection_begin(&mut self) -> Result<(), ReflectError> {
        self.open("[")
    }

    #[inline]
    fn element_begin(&mut self) -> Result<(), ReflectError> {
        self.entry()
    }

    #[inline]
    fn element_end(&mut self) -> Result<(), ReflectError> {
        Ok(())
    }

    fn collection_end(&mut self) -> Result<(), ReflectError> {
        self.close("]")
    }

    fn write_null(&mut self) -> Result<(), ReflectError> {
        self.out.write_str(self.config.null_literal.as_str())?;
        Ok(())
    }

    fn write_scalar(&mut self, value: ScalarRef<'_>) -> Result<(), ReflectError> {
        match value {
            ScalarRef::Bool(v) => write!(self.out, "{v}")?,
            ScalarRef::Int(v) => write!(self.out, "{v}")?,
            ScalarRef::UInt(v) => write!(self.out, "{v}")?,
            ScalarRef::Float(v) => write!(self.out, "{v}")?,
            ScalarRef::Float32(v) => write!(self.out, "{v}")?,
            ScalarRef::Char(v) => {
                let mut buf = [0; 4];
                self.quoted(v.encode_utf8(&mut buf))?;
            }
            ScalarRef::Str(v) => self.quoted(v)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::NullLiteral;
    use alloc::string::String;

    fn writer() -> JsonWriter<String> {
        JsonWriter::new(String::new(), JsonConfig::default())
    }

    #[test]
    fn nested_layout() {
        let mut w = writer();
        w.object_begin("Outer").unwrap();
        w.write_identity(1).unwrap();
        w.property_begin("list").unwrap();
        w.collection_begin().unwrap();
        for n in [1_i64, -2] {
            w.element_begin().unwrap();
            w.write_scalar(ScalarRef::Int(n)).unwrap();
            w.element_end().unwrap();
        }
        w.collection_end().unwrap();
        w.property_end().unwrap();
        w.property_begin("next").unwrap();
        w.write_null().unwrap();
        w.property_end().unwrap();
        w.object_end().unwrap();

        assert_eq!(
            w.into_inner(),
            "Outer {\n\t\"$id\": \"1\",\n\t\"list\": [\n\t\t1,\n\t\t-2\n\t],\n\t\"next\": NULL\n}"
        );
    }

    #[test]
    fn empty_containers_and_escapes() {
        let config = JsonConfig::default()
            .with_indent("  ")
            .with_null_literal(NullLiteral::Standard);
        let mut w = JsonWriter::new(String::new(), config);
        w.collection_begin().unwrap();
        w.element_begin().unwrap();
        w.object_begin("Empty").unwrap();
        w.object_end().unwrap();
        w.element_end().unwrap();
        w.element_begin().unwrap();
        w.collection_begin().unwrap();
        w.collection_end().unwrap();
        w.element_end().unwrap();
        w.element_begin().unwrap();
        w.write_scalar(ScalarRef::Str("a\"b\n")).unwrap();
        w.element_end().unwrap();
        w.element_begin().unwrap();
        w.write_null().unwrap();
        w.element_end().unwrap();
        w.collection_end().unwrap();

        assert_eq!(
            w.into_inner(),
            "[\n  Empty {},\n  [],\n  \"a\\\"b\\n\",\n  null\n]"
        );
    }

    #[test]
    fn scalar_spelling() {
        let mut w = writer();
        w.collection_begin().unwrap();
        for value in [
            ScalarRef::Bool(true),
            ScalarRef::UInt(u64::MAX),
            ScalarRef::Float(1.5),
            ScalarRef::Float(-2.0),
            ScalarRef::Float32(0.1),
            ScalarRef::Char('é'),
        ] {
            w.element_begin().unwrap();
            w.write_scalar(value).unwrap();
        }
        w.collection_end().unwrap();

        assert_eq!(
            w.into_inner(),
            "[\n\ttrue,\n\t18446744073709551615,\n\t1.5,\n\t-2,\n\t0.1,\n\t\"é\"\n]"
        );
    }
}
