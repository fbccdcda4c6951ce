//! The indented JSON dialect and its convenience entry points.
//!
//! ```text
//! Point {
//!     "x": 1.5,
//!     "y": -2
//! }
//! ```
//!
//! The dialect differs from standard JSON in three ways: objects are
//! prefixed with their type name, shared objects carry `"$id"`/`"$ref"`
//! entries, and null handles are spelled `NULL` unless
//! [`NullLiteral::Standard`] is configured. String escapes follow JSON.
//!
//! ## Menu
//!
//! - [`to_string`], [`to_writer`]: serialize a registered value.
//! - [`from_str`], [`from_str_into`], [`from_reader`]: deserialize into a registered type.
//! - [`from_str_dynamic`]: deserialize whatever type the header names.
//! - [`JsonWriter`], [`JsonReader`]: the hook implementations.
//! - [`escape`], [`unescape`]: string literal escapes.

// -----------------------------------------------------------------------------
// Modules

mod config;
mod escape;
mod reader;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use config::{JsonConfig, NullLiteral};
pub use escape::{escape, unescape, write_escaped};
pub use reader::JsonReader;
pub use writer::JsonWriter;

use alloc::string::String;
use core::any::Any;
use std::io;

use crate::registry::Registry;
use crate::serde::{DeserializeDriver, DeserializeOptions, SerializeDriver};
use crate::{ReflectError, Value};

// -----------------------------------------------------------------------------
// Serialize

/// Serializes `value` with the default [`JsonConfig`].
#[inline]
pub fn to_string<T: Any>(registry: &Registry, value: &T) -> Result<String, ReflectError> {
    to_string_with(registry, value, JsonConfig::default())
}

pub fn to_string_with<T: Any>(
    registry: &Registry,
    value: &T,
    config: JsonConfig,
) -> Result<String, ReflectError> {
    let writer = JsonWriter::new(String::new(), config);
    let mut driver = SerializeDriver::new(registry, writer);
    driver.serialize(value)?;
    Ok(driver.into_writer().into_inner())
}

/// Serializes `value` into a byte sink as UTF-8.
pub fn to_writer<T: Any, W: io::Write>(
    registry: &Registry,
    value: &T,
    mut out: W,
) -> Result<(), ReflectError> {
    let text = to_string(registry, value)?;
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

// -----------------------------------------------------------------------------
// Deserialize

/// Reads a new `T` from `text`, rejecting trailing input.
#[inline]
pub fn from_str<T: Any>(registry: &Registry, text: &str) -> Result<T, ReflectError> {
    from_str_with(registry, text, DeserializeOptions::default())
}

pub fn from_str_with<T: Any>(
    registry: &Registry,
    text: &str,
    options: DeserializeOptions,
) -> Result<T, ReflectError> {
    let mut driver = DeserializeDriver::new(registry, JsonReader::new(text)).with_options(options);
    let value = driver.deserialize::<T>()?;
    driver.finish()?;
    Ok(value)
}

/// Reads `text` into an existing `T`.
///
/// Properties missing from `text` keep their current values.
pub fn from_str_into<T: Any>(
    registry: &Registry,
    text: &str,
    target: &mut T,
) -> Result<(), ReflectError> {
    let mut driver = DeserializeDriver::new(registry, JsonReader::new(text));
    driver.deserialize_into(target)?;
    driver.finish()
}

/// Reads a new `T` from a UTF-8 byte source.
pub fn from_reader<T: Any, R: io::Read>(registry: &Registry, mut input: R) -> Result<T, ReflectError> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    from_str(registry, &text)
}

/// Reads an object of the type named by its header.
pub fn from_str_dynamic(registry: &Registry, text: &str) -> Result<Value, ReflectError> {
    let mut driver = DeserializeDriver::new(registry, JsonReader::new(text));
    let value = driver.deserialize_dynamic()?;
    driver.finish()?;
    Ok(value)
}
