use alloc::string::String;

use crate::ReflectError;
use crate::info::{ScalarKind, ScalarRef, ScalarValue};

// -----------------------------------------------------------------------------
// Writer

/// The hook sequence a concrete output format implements.
///
/// [`SerializeDriver`](super::SerializeDriver) calls the hooks in this shape:
///
/// ```text
/// value      = write_null
///            | write_scalar
///            | object_begin (write_identity | write_reference)? property* object_end
///            | collection_begin element* collection_end
/// property   = property_begin value property_end
/// element    = element_begin value element_end
/// ```
///
/// An object with `write_reference` has no properties.
pub trait Writer {
    fn object_begin(&mut self, type_name: &str) -> Result<(), ReflectError>;

    /// Announces the id of a freshly written shared object.
    fn write_identity(&mut self, id: u64) -> Result<(), ReflectError>;

    /// Names a shared object written earlier in the same call.
    fn write_reference(&mut self, id: u64) -> Result<(), ReflectError>;

    fn property_begin(&mut self, name: &str) -> Result<(), ReflectError>;

    fn property_end(&mut self) -> Result<(), ReflectError>;

    fn object_end(&mut self) -> Result<(), ReflectError>;

    fn collection_begin(&mut self) -> Result<(), ReflectError>;

    fn element_begin(&mut self) -> Result<(), ReflectError>;

    fn element_end(&mut self) -> Result<(), ReflectError>;

    fn collection_end(&mut self) -> Result<(), ReflectError>;

    /// Writes a null handle.
    fn write_null(&mut self) -> Result<(), ReflectError>;

    fn write_scalar(&mut self, value: ScalarRef<'_>) -> Result<(), ReflectError>;
}

// -----------------------------------------------------------------------------
// Reader

/// The identity marker that may open an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    None,
    /// A freshly written shared object.
    Id(u64),
    /// A back reference to an object read earlier.
    Ref(u64),
}

/// The token stream a concrete input format offers, mirroring [`Writer`].
///
/// Every method either consumes input or fails, so the driver cannot spin on
/// malformed input.
pub trait Reader {
    /// Returns the type name of the object ahead without consuming it.
    ///
    /// Fails if the next value is not an object.
    fn peek_type_name(&mut self) -> Result<String, ReflectError>;

    /// Consumes an object header and returns its type name.
    fn object_begin(&mut self) -> Result<String, ReflectError>;

    /// Consumes an identity marker if one follows the header.
    fn read_identity(&mut self) -> Result<Identity, ReflectError>;

    /// Consumes the next property name, `None` at the end of the object.
    fn next_property(&mut self) -> Result<Option<String>, ReflectError>;

    fn object_end(&mut self) -> Result<(), ReflectError>;

    fn collection_begin(&mut self) -> Result<(), ReflectError>;

    /// Returns `true` if another element follows.
    fn next_element(&mut self) -> Result<bool, ReflectError>;

    fn collection_end(&mut self) -> Result<(), ReflectError>;

    /// Consumes a null literal, returns `false` and consumes nothing otherwise.
    fn read_null(&mut self) -> Result<bool, ReflectError>;

    fn read_scalar(&mut self, kind: ScalarKind) -> Result<ScalarValue, ReflectError>;

    /// Consumes one value of any shape.
    fn skip_value(&mut self) -> Result<(), ReflectError>;

    /// Checks that the input holds nothing but trailing whitespace.
    fn finish(&mut self) -> Result<(), ReflectError>;
}
