use alloc::rc::Rc;
use core::any::Any;

use super::ser::{binding_of, element_of};
use super::ref_table::ReadRefTable;
use super::{Identity, MAX_DEPTH, Reader};
use crate::info::{
    CollectionMeta, Kind, MetaKind, Metatype, NonStreamable, PointerMeta, StructMeta,
};
use crate::registry::Registry;
use crate::{ReflectError, Value};

#[cfg(all(debug_assertions, feature = "debug"))]
use super::info_stack::TypeStack;

// -----------------------------------------------------------------------------
// Options

/// What [`DeserializeDriver`] does with a property name its struct does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownPropertyPolicy {
    /// Skip the value and continue, tolerating schema evolution.
    #[default]
    Skip,
    /// Fail with [`ReflectError::PropertyNotFound`].
    Reject,
}

/// Runtime options of a [`DeserializeDriver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeserializeOptions {
    pub unknown_properties: UnknownPropertyPolicy,
}

// -----------------------------------------------------------------------------
// DeserializeDriver

/// Rebuilds values from a [`Reader`], the mirror of
/// [`SerializeDriver`](super::SerializeDriver).
///
/// - Struct headers must name the target type.
/// - Properties are matched by name. Reference-shaped ones are read in
///   place; value-shaped ones are read into their current value, or a
///   default one when write-only, and stored back through the setter.
///   Read-only and [`NonStreamable`] properties are skipped.
/// - Collections are cleared, then every element is built from its
///   metatype, read and inserted at the end.
/// - `Ptr` slots receive null, the object registered earlier under a
///   back reference, or a new object of the type named in the header. The
///   new object is registered before its properties are read, so it may
///   refer to itself.
///
/// Values nested deeper than [`MAX_DEPTH`](super::MAX_DEPTH) fail with
/// [`ReflectError::DepthLimit`].
///
/// A failed call leaves the target partially updated.
///
/// # Examples
///
/// ```
/// use vc_meta::json::JsonReader;
/// use vc_meta::registry::Registry;
/// use vc_meta::serde::DeserializeDriver;
///
/// #[derive(Default, Debug, PartialEq)]
/// struct Point { x: f64, y: f64 }
///
/// let mut registry = Registry::new();
/// registry
///     .declare::<Point>()
///     .unwrap()
///     .field("x", |p| &p.x, |p| &mut p.x)
///     .field("y", |p| &p.y, |p| &mut p.y);
///
/// let reader = JsonReader::new("Point { \"x\": 1.5, \"y\": -2 }");
/// let mut driver = DeserializeDriver::new(&registry, reader);
/// let point: Point = driver.deserialize().unwrap();
/// driver.finish().unwrap();
///
/// assert_eq!(point, Point { x: 1.5, y: -2.0 });
/// ```
pub struct DeserializeDriver<'r, R: Reader> {
    registry: &'r Registry,
    reader: R,
    options: DeserializeOptions,
    refs: ReadRefTable,
    depth: usize,
    #[cfg(all(debug_assertions, feature = "debug"))]
    stack: TypeStack<'r>,
}

impl<'r, R: Reader> DeserializeDriver<'r, R> {
    pub fn new(registry: &'r Registry, reader: R) -> Self {
        Self {
            registry,
            reader,
            options: DeserializeOptions::default(),
            refs: ReadRefTable::new(),
            depth: 0,
            #[cfg(all(debug_assertions, feature = "debug"))]
            stack: TypeStack::new(),
        }
    }

    #[inline]
    pub fn with_options(mut self, options: DeserializeOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads a new `T`, built by its metatype.
    pub fn deserialize<T: Any>(&mut self) -> Result<T, ReflectError> {
        let meta = self.registry.lookup_type::<T>()?;
        let mut value = meta.construct()?;
        self.read_into(meta, value.as_any_mut())?;
        value.take::<T>()
    }

    /// Reads into an existing `T`.
    pub fn deserialize_into<T: Any>(&mut self, target: &mut T) -> Result<(), ReflectError> {
        let meta = self.registry.lookup_type::<T>()?;
        self.read_into(meta, target)
    }

    /// Reads an object whose type is named by its header.
    pub fn deserialize_dynamic(&mut self) -> Result<Value, ReflectError> {
        let name = self.reader.peek_type_name()?;
        let meta = self.registry.lookup(&name)?;
        let mut value = meta.construct()?;
        self.read_into(meta, value.as_any_mut())?;
        Ok(value)
    }

    /// Checks that the input is exhausted.
    #[inline]
    pub fn finish(&mut self) -> Result<(), ReflectError> {
        self.reader.finish()
    }

    #[inline]
    pub fn into_reader(self) -> R {
        self.reader
    }

    /// Reads into the erased `slot` described by `meta`.
    pub fn read_into(&mut self, meta: &'r Metatype, slot: &mut dyn Any) -> Result<(), ReflectError> {
        #[cfg(all(debug_assertions, feature = "debug"))]
        self.stack.push(meta.name());

        let result = if meta.kind() == Kind::Scalar {
            self.read_kind(meta, slot)
        } else if self.depth < MAX_DEPTH {
            self.depth += 1;
            let result = self.read_kind(meta, slot);
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

    fn read_kind(&mut self, meta: &'r Metatype, slot: &mut dyn Any) -> Result<(), ReflectError> {
        match &meta.kind {
            MetaKind::Scalar(scalar) => {
                let value = self.reader.read_scalar(scalar.kind())?;
                scalar.read(slot, value)
            }
            MetaKind::Struct(object) => self.read_object(meta, object, slot),
            MetaKind::Collection(collection) => self.read_collection(meta, collection, slot),
            MetaKind::Pointer(pointer) => self.read_pointer(meta, pointer, slot),
        }
    }

    fn read_object(
        &mut self,
        meta: &'r Metatype,
        object: &'r StructMeta,
        instance: &mut dyn Any,
    ) -> Result<(), ReflectError> {
        let name = self.reader.object_begin()?;
        if name != meta.name() {
            let found = self.registry.lookup(&name)?;
            if found.id() != meta.id() {
                return Err(ReflectError::mismatch(
                    meta.name.clone(),
                    found.name.clone(),
                ));
            }
        }

        if let Identity::Ref(id) = self.reader.read_identity()? {
            return Err(ReflectError::UnexpectedReference {
                name: meta.name.clone(),
                id,
            });
        }

        self.read_body(meta, object, instance)
    }

    /// Reads properties up to and including the end of the object.
    fn read_body(
        &mut self,
        meta: &'r Metatype,
        object: &'r StructMeta,
        instance: &mut dyn Any,
    ) -> Result<(), ReflectError> {
        while let Some(name) = self.reader.next_property()? {
            let Some(property) = object.property(&name) else {
                match self.options.unknown_properties {
                    UnknownPropertyPolicy::Reject => {
                        return Err(ReflectError::PropertyNotFound {
                            owner: meta.name.clone(),
                            name,
                        });
                    }
                    UnknownPropertyPolicy::Skip => {
                        log::debug!("skipping unknown property `{name}` of `{}`", meta.name);
                        self.reader.skip_value()?;
                        continue;
                    }
                }
            };

            if property.annotations().has::<NonStreamable>() {
                self.reader.skip_value()?;
                continue;
            }
            if !property.mode().is_writable() {
                log::debug!("ignoring read-only property `{name}` of `{}`", meta.name);
                self.reader.skip_value()?;
                continue;
            }

            let target = binding_of(self.registry, property)?;
            match property.field_mut(instance)? {
                Some(field) => self.read_into(target, field)?,
                None => {
                    let mut current = if property.mode().is_readable() {
                        property.get(instance)?
                    } else {
                        target.construct()?
                    };
                    self.read_into(target, current.as_any_mut())?;
                    property.set(instance, current)?;
                }
            }
        }

        self.reader.object_end()
    }

    fn read_collection(
        &mut self,
        meta: &'r Metatype,
        collection: &'r CollectionMeta,
        slot: &mut dyn Any,
    ) -> Result<(), ReflectError> {
        let element = element_of(self.registry, meta, collection)?;
        let adapter = collection.adapter();

        self.reader.collection_begin()?;
        adapter.clear(slot)?;
        while self.reader.next_element()? {
            let mut item = element.construct()?;
            self.read_into(element, item.as_any_mut())?;
            adapter.insert_at_end(slot, item.into_any())?;
        }
        self.reader.collection_end()
    }

    fn read_pointer(
        &mut self,
        meta: &'r Metatype,
        pointer: &'r PointerMeta,
        slot: &mut dyn Any,
    ) -> Result<(), ReflectError> {
        if self.reader.read_null()? {
            return pointer.ops().set_null(slot);
        }

        let registry = self.registry;
        let name = self.reader.object_begin()?;

        match self.reader.read_identity()? {
            Identity::Ref(id) => {
                let (handle, concrete) = self
                    .refs
                    .get(id)
                    .ok_or(ReflectError::UnknownReference { id })?;
                let concrete = registry.resolve(concrete)?;
                while self.reader.next_property()?.is_some() {
                    self.reader.skip_value()?;
                }
                self.reader.object_end()?;
                registry.store_handle(meta, concrete, handle, slot)
            }
            identity => {
                let concrete = registry.lookup(&name)?;
                let Some(object) = concrete.as_struct() else {
                    return Err(ReflectError::mismatch(
                        meta.name.clone(),
                        concrete.name.clone(),
                    ));
                };
                let Some(handle_ops) = concrete.handle else {
                    return Err(ReflectError::NotConstructible {
                        name: concrete.name.clone(),
                    });
                };
                if !registry.can_upcast(meta, concrete) {
                    return Err(ReflectError::mismatch(
                        meta.name.clone(),
                        concrete.name.clone(),
                    ));
                }

                let handle = (handle_ops.make)(concrete.construct()?.into_any())?;
                if let Identity::Id(id) = identity {
                    self.refs.insert(id, Rc::clone(&handle), concrete.id());
                }
                registry.store_handle(meta, concrete, Rc::clone(&handle), slot)?;

                (handle_ops.with_mut)(&handle, &mut |instance| {
                    self.read_body(concrete, object, instance)
                })
            }
        }
    }
}
