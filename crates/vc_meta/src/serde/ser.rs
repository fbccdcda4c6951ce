use core::any::Any;

use super::ref_table::WriteRefTable;
use super::{MAX_DEPTH, Writer};
use crate::info::{
    CollectionMeta, Kind, MetaKind, Metatype, NonStreamable, PointerMeta, Property,
};
use crate::registry::Registry;
use crate::ReflectError;

#[cfg(all(debug_assertions, feature = "debug"))]
use super::info_stack::TypeStack;

// -----------------------------------------------------------------------------
// SerializeDriver

/// Walks a value along its metatype and drives a [`Writer`].
///
/// - Scalars go to [`Writer::write_scalar`].
/// - Structs write their readable properties in declaration order, skipping
///   those annotated [`NonStreamable`].
/// - Collections write their elements in container order.
/// - `Ptr` handles write null, a back reference to an object written earlier
///   in the same call, or the pointee under a fresh sequential id.
///
/// The reference table lives as long as the driver, so one driver is one
/// serialization call.
///
/// Values nested deeper than [`MAX_DEPTH`](super::MAX_DEPTH) fail with
/// [`ReflectError::DepthLimit`]; every `Ptr` hop counts as one level, so a
/// linked chain of handles longer than that must be written in pieces.
///
/// # Examples
///
/// ```
/// use vc_meta::json::{JsonConfig, JsonWriter};
/// use vc_meta::registry::Registry;
/// use vc_meta::serde::SerializeDriver;
///
/// #[derive(Default)]
/// struct Point { x: f64, y: f64 }
///
/// let mut registry = Registry::new();
/// registry
///     .declare::<Point>()
///     .unwrap()
///     .field("x", |p| &p.x, |p| &mut p.x)
///     .field("y", |p| &p.y, |p| &mut p.y);
///
/// let writer = JsonWriter::new(String::new(), JsonConfig::default());
/// let mut driver = SerializeDriver::new(&registry, writer);
/// driver.serialize(&Point { x: 1.5, y: -2.0 }).unwrap();
///
/// let text = driver.into_writer().into_inner();
/// assert_eq!(text, "Point {\n\t\"x\": 1.5,\n\t\"y\": -2\n}");
/// ```
pub struct SerializeDriver<'r, W: Writer> {
    registry: &'r Registry,
    writer: W,
    refs: WriteRefTable,
    depth: usize,
    #[cfg(all(debug_assertions, feature = "debug"))]
    stack: TypeStack<'r>,
}

impl<'r, W: Writer> SerializeDriver<'r, W> {
    pub fn new(registry: &'r Registry, writer: W) -> Self {
        Self {
            registry,
            writer,
            refs: WriteRefTable::new(),
            depth: 0,
            #[cfg(all(debug_assertions, feature = "debug"))]
            stack: TypeStack::new(),
        }
    }

    /// Writes `value` using the metatype declared for `T`.
    pub fn serialize<T: Any>(&mut self, value: &T) -> Result<(), ReflectError> {
        let meta = self.registry.lookup_type::<T>()?;
        self.write(meta, value)
    }

    #[inline]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    #[inline]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Writes the erased `value` described by `meta`.
    pub fn write(&mut self, meta: &'r Metatype, value: &dyn Any) -> Result<(), ReflectError> {
        #[cfg(all(debug_assertions, feature = "debug"))]
        self.stack.push(meta.name());

        let result = if meta.kind() == Kind::Scalar {
            self.write_kind(meta, value)
        } else if self.depth < MAX_DEPTH {
            self.depth += 1;
            let result = self.write_kind(meta, value);
            self.depth -= 1;
            result
        } else {
            Err(ReflectError::DepthLimit { limit: MAX_DEPTH })
        };

        #[cfg(all(debug_assertions, feature = "debug"))]
        {
            if let Err(err) = &result {
                self.stack.report(err);
            }
            self.stack.pop();
        }

        result
    }

    fn write_kind(&mut self, meta: &'r Metatype, value: &dyn Any) -> Result<(), ReflectError> {
        match &meta.kind {
            MetaKind::Scalar(scalar) => {
                let leaf = scalar.write(value)?;
                self.writer.write_scalar(leaf)
            }
            MetaKind::Struct(_) => self.write_object(meta, value, None),
            MetaKind::Collection(collection) => self.write_collection(meta, collection, value),
            MetaKind::Pointer(pointer) => self.write_pointer(pointer, value),
        }
    }

    fn write_object(
        &mut self,
        meta: &'r Metatype,
        value: &dyn Any,
        identity: Option<u64>,
    ) -> Result<(), ReflectError> {
        let Some(object) = meta.as_struct() else {
            return Err(ReflectError::mismatch("struct", meta.name.clone()));
        };

        self.writer.object_begin(meta.name())?;
        if let Some(id) = identity {
            self.writer.write_identity(id)?;
        }

        for property in object.properties() {
            if !property.mode().is_readable() || property.annotations().has::<NonStreamable>() {
                continue;
            }
            let target = self.binding(property)?;

            self.writer.property_begin(property.name())?;
            match property.field(value)? {
                Some(field) => self.write(target, field)?,
                None => {
                    let current = property.get(value)?;
                    self.write(target, current.as_any())?;
                }
            }
            self.writer.property_end()?;
        }

        self.writer.object_end()
    }

    fn write_collection(
        &mut self,
        meta: &'r Metatype,
        collection: &'r CollectionMeta,
        value: &dyn Any,
    ) -> Result<(), ReflectError> {
        let element = element_of(self.registry, meta, collection)?;

        self.writer.collection_begin()?;
        for item in collection.adapter().iter(value)? {
            self.writer.element_begin()?;
            self.write(element, item)?;
            self.writer.element_end()?;
        }
        self.writer.collection_end()
    }

    fn write_pointer(
        &mut self,
        pointer: &'r PointerMeta,
        value: &dyn Any,
    ) -> Result<(), ReflectError> {
        let ops = pointer.ops();
        let Some(address) = ops.address(value)? else {
            return self.writer.write_null();
        };

        ops.with_pointee(value, &mut |pointee, type_name| {
            let registry = self.registry;
            let concrete = registry
                .lookup_type_id((*pointee).type_id())
                .ok_or_else(|| ReflectError::not_registered(registry.demangle(type_name)))?;

            if let Some(id) = self.refs.get(address) {
                self.writer.object_begin(concrete.name())?;
                self.writer.write_reference(id)?;
                return self.writer.object_end();
            }

            let id = self.refs.assign(address, ops.retain(value)?);
            self.write_object(concrete, pointee, Some(id))
        })
    }

    fn binding(&self, property: &Property) -> Result<&'r Metatype, ReflectError> {
        binding_of(self.registry, property)
    }
}

/// The metatype bound to `property`, failing while it is still pending.
pub(super) fn binding_of<'r>(
    registry: &'r Registry,
    property: &Property,
) -> Result<&'r Metatype, ReflectError> {
    property
        .binding()
        .and_then(|id| registry.get(id))
        .ok_or_else(|| ReflectError::Unresolved {
            owner: property.owner_name().into(),
            property: property.name().into(),
            type_name: property.type_name().into(),
        })
}

/// The element metatype of a collection, failing while it is still pending.
pub(super) fn element_of<'r>(
    registry: &'r Registry,
    meta: &Metatype,
    collection: &CollectionMeta,
) -> Result<&'r Metatype, ReflectError> {
    collection
        .element()
        .and_then(|id| registry.get(id))
        .ok_or_else(|| ReflectError::Unresolved {
            owner: meta.name().into(),
            property: "<element>".into(),
            type_name: collection.element_name().into(),
        })
}
