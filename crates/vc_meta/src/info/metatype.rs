use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;

use super::{Annotations, CollectionAdapter, Property, Scalar, ScalarKind, ScalarRef, ScalarValue};
use crate::hash::HashMap;
use crate::ptr::Pointee;
use crate::value::{downcast_mut, downcast_ref};
use crate::{Ptr, ReflectError, Value};

// -----------------------------------------------------------------------------
// MetaId

/// Index of a [`Metatype`] inside its [`Registry`](crate::registry::Registry).
///
/// Only meaningful for the registry that handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaId(u32);

impl MetaId {
    /// Stands for "no owner yet" in freshly built properties.
    pub(crate) const PLACEHOLDER: Self = Self(u32::MAX);

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX - 1))
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MetaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// Kind

/// The shape of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Scalar,
    Struct,
    Collection,
    Pointer,
}

// -----------------------------------------------------------------------------
// ScalarMeta

/// Leaf codec hooks of a scalar metatype.
pub struct ScalarMeta {
    kind: ScalarKind,
    write: fn(&dyn Any) -> Result<ScalarRef<'_>, ReflectError>,
    read: fn(&mut dyn Any, ScalarValue) -> Result<(), ReflectError>,
}

impl ScalarMeta {
    pub(crate) fn of<T: Scalar>() -> Self {
        fn write<T: Scalar>(value: &dyn Any) -> Result<ScalarRef<'_>, ReflectError> {
            Ok(downcast_ref::<T>(value)?.to_scalar())
        }

        fn read<T: Scalar>(slot: &mut dyn Any, value: ScalarValue) -> Result<(), ReflectError> {
            *downcast_mut::<T>(slot)? = T::from_scalar(value)?;
            Ok(())
        }

        Self {
            kind: T::KIND,
            write: write::<T>,
            read: read::<T>,
        }
    }

    #[inline]
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Borrows the leaf value of `value`.
    #[inline]
    pub fn write<'a>(&self, value: &'a dyn Any) -> Result<ScalarRef<'a>, ReflectError> {
        (self.write)(value)
    }

    /// Stores `value` into `slot`.
    #[inline]
    pub fn read(&self, slot: &mut dyn Any, value: ScalarValue) -> Result<(), ReflectError> {
        (self.read)(slot, value)
    }
}

// -----------------------------------------------------------------------------
// StructMeta

/// Properties of a struct metatype, in declaration order.
#[derive(Default)]
pub struct StructMeta {
    properties: Vec<Property>,
    index: HashMap<String, usize>,
    is_abstract: bool,
}

impl StructMeta {
    pub(crate) fn new(is_abstract: bool) -> Self {
        Self {
            is_abstract,
            ..Self::default()
        }
    }

    #[inline]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.index.get(name).map(|&index| &self.properties[index])
    }

    /// Abstract types carry no constructor.
    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[inline]
    pub(crate) fn property_at_mut(&mut self, index: usize) -> Option<&mut Property> {
        self.properties.get_mut(index)
    }

    pub(crate) fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        let index = *self.index.get(name)?;
        self.properties.get_mut(index)
    }

    /// Adds `property`, replacing one with the same name in place.
    pub(crate) fn insert(&mut self, property: Property) -> usize {
        match self.index.get(property.name()) {
            Some(&index) => {
                self.properties[index] = property;
                index
            }
            None => {
                let index = self.properties.len();
                self.index.insert(property.name.clone(), index);
                self.properties.push(property);
                index
            }
        }
    }
}

// -----------------------------------------------------------------------------
// CollectionMeta

/// Element binding and adapter of a collection metatype.
pub struct CollectionMeta {
    pub(crate) element: Option<MetaId>,
    pub(crate) element_name: String,
    pub(crate) raw_element_name: &'static str,
    pub(crate) adapter: Box<dyn CollectionAdapter>,
}

impl CollectionMeta {
    /// The element metatype, `None` while the element type is undeclared.
    #[inline]
    pub fn element(&self) -> Option<MetaId> {
        self.element
    }

    #[inline]
    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    #[inline]
    pub fn adapter(&self) -> &dyn CollectionAdapter {
        &*self.adapter
    }
}

// -----------------------------------------------------------------------------
// PointerMeta

/// Type-erased operations on a `Ptr<U>`.
pub trait PointerOps: Send + Sync {
    /// The allocation address, `None` for null.
    fn address(&self, ptr: &dyn Any) -> Result<Option<usize>, ReflectError>;

    /// A clone of the handle, kept to pin the allocation.
    fn retain(&self, ptr: &dyn Any) -> Result<Box<dyn Any>, ReflectError>;

    /// Calls `f` with the concrete pointee and its Rust type name.
    /// Does nothing for null.
    fn with_pointee(
        &self,
        ptr: &dyn Any,
        f: &mut dyn FnMut(&dyn Any, &'static str) -> Result<(), ReflectError>,
    ) -> Result<(), ReflectError>;

    fn set_null(&self, ptr: &mut dyn Any) -> Result<(), ReflectError>;
}

pub(crate) struct PtrOps<U: ?Sized>(PhantomData<fn(&U)>);

impl<U: ?Sized + Pointee> PtrOps<U> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<U: ?Sized + Pointee> PointerOps for PtrOps<U> {
    fn address(&self, ptr: &dyn Any) -> Result<Option<usize>, ReflectError> {
        Ok(downcast_ref::<Ptr<U>>(ptr)?.address())
    }

    fn retain(&self, ptr: &dyn Any) -> Result<Box<dyn Any>, ReflectError> {
        Ok(Box::new(downcast_ref::<Ptr<U>>(ptr)?.clone()))
    }

    fn with_pointee(
        &self,
        ptr: &dyn Any,
        f: &mut dyn FnMut(&dyn Any, &'static str) -> Result<(), ReflectError>,
    ) -> Result<(), ReflectError> {
        match downcast_ref::<Ptr<U>>(ptr)?.try_borrow() {
            None => Ok(()),
            Some(Ok(guard)) => f((*guard).as_any(), (*guard).pointee_name()),
            Some(Err(_)) => Err(ReflectError::AlreadyBorrowed {
                name: type_name::<U>().into(),
            }),
        }
    }

    fn set_null(&self, ptr: &mut dyn Any) -> Result<(), ReflectError> {
        *downcast_mut::<Ptr<U>>(ptr)? = Ptr::null();
        Ok(())
    }
}

/// Pointer variant of a struct metatype.
pub struct PointerMeta {
    pub(crate) pointee: MetaId,
    pub(crate) ops: Box<dyn PointerOps>,
}

impl PointerMeta {
    /// The metatype of the declared pointee, which may be abstract.
    #[inline]
    pub fn pointee(&self) -> MetaId {
        self.pointee
    }

    #[inline]
    pub fn ops(&self) -> &dyn PointerOps {
        &*self.ops
    }
}

// -----------------------------------------------------------------------------
// HandleOps

/// Moves a freshly built value into a shared cell and fills it in place.
///
/// Read-side counterpart of [`PointerOps`]: handles are `Rc<RefCell<C>>`
/// erased to `Rc<dyn Any>`, which is what the read reference table stores.
#[derive(Clone, Copy)]
pub(crate) struct HandleOps {
    pub make: fn(Box<dyn Any>) -> Result<Rc<dyn Any>, ReflectError>,
    pub with_mut: fn(
        &Rc<dyn Any>,
        &mut dyn FnMut(&mut dyn Any) -> Result<(), ReflectError>,
    ) -> Result<(), ReflectError>,
}

impl HandleOps {
    pub(crate) fn of<C: Any>() -> Self {
        fn make<C: Any>(value: Box<dyn Any>) -> Result<Rc<dyn Any>, ReflectError> {
            let value = value
                .downcast::<C>()
                .map_err(|_| ReflectError::mismatch(type_name::<C>(), "<erased>"))?;
            let handle: Rc<dyn Any> = Rc::new(RefCell::new(*value));
            Ok(handle)
        }

        fn with_mut<C: Any>(
            handle: &Rc<dyn Any>,
            f: &mut dyn FnMut(&mut dyn Any) -> Result<(), ReflectError>,
        ) -> Result<(), ReflectError> {
            let cell = downcast_ref::<RefCell<C>>(&**handle)?;
            let mut guard = cell
                .try_borrow_mut()
                .map_err(|_| ReflectError::AlreadyBorrowed {
                    name: type_name::<C>().into(),
                })?;
            f(&mut *guard)
        }

        Self {
            make: make::<C>,
            with_mut: with_mut::<C>,
        }
    }
}

// -----------------------------------------------------------------------------
// Metatype

/// Kind-specific part of a [`Metatype`].
pub enum MetaKind {
    Scalar(ScalarMeta),
    Struct(StructMeta),
    Collection(CollectionMeta),
    Pointer(PointerMeta),
}

impl MetaKind {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Scalar(_) => Kind::Scalar,
            Self::Struct(_) => Kind::Struct,
            Self::Collection(_) => Kind::Collection,
            Self::Pointer(_) => Kind::Pointer,
        }
    }
}

pub(crate) type Factory = Box<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// The runtime descriptor of one declared type.
///
/// Metatypes are owned by a [`Registry`](crate::registry::Registry) and are
/// looked up by name, by [`TypeId`] or by [`MetaId`].
pub struct Metatype {
    pub(crate) id: MetaId,
    pub(crate) name: String,
    pub(crate) key: String,
    pub(crate) rust_name: &'static str,
    pub(crate) type_id: TypeId,
    pub(crate) kind: MetaKind,
    pub(crate) annotations: Annotations,
    pub(crate) pointer: Option<MetaId>,
    pub(crate) factory: Option<Factory>,
    pub(crate) handle: Option<HandleOps>,
}

impl Metatype {
    pub(crate) fn new<T: ?Sized + Any>(name: String, key: String, kind: MetaKind) -> Self {
        Self {
            id: MetaId::PLACEHOLDER,
            name,
            key,
            rust_name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            kind,
            annotations: Annotations::new(),
            pointer: None,
            factory: None,
            handle: None,
        }
    }

    pub(crate) fn with_factory<T: Any>(
        mut self,
        factory: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        self.factory = Some(Box::new(move || Box::new(factory()) as Box<dyn Any>));
        self
    }

    pub(crate) fn with_handle(mut self, handle: HandleOps) -> Self {
        self.handle = Some(handle);
        self
    }

    #[inline]
    pub fn id(&self) -> MetaId {
        self.id
    }

    /// The display name written in object headers.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The demangled Rust type name.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind.kind()
    }

    #[inline]
    pub fn meta_kind(&self) -> &MetaKind {
        &self.kind
    }

    #[inline]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// The `Ptr` metatype of a struct, the inverse of [`PointerMeta::pointee`].
    #[inline]
    pub fn pointer(&self) -> Option<MetaId> {
        self.pointer
    }

    #[inline]
    pub fn is_constructible(&self) -> bool {
        self.factory.is_some()
    }

    /// Builds a default instance.
    ///
    /// Fails with [`ReflectError::NotConstructible`] for abstract types.
    pub fn construct(&self) -> Result<Value, ReflectError> {
        match &self.factory {
            Some(factory) => Ok(Value::from_raw(factory(), self.rust_name)),
            None => Err(ReflectError::NotConstructible {
                name: self.name.clone(),
            }),
        }
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<&ScalarMeta> {
        match &self.kind {
            MetaKind::Scalar(meta) => Some(meta),
            _ => None,
        }
    }

    #[inline]
    pub fn as_struct(&self) -> Option<&StructMeta> {
        match &self.kind {
            MetaKind::Struct(meta) => Some(meta),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_struct_mut(&mut self) -> Option<&mut StructMeta> {
        match &mut self.kind {
            MetaKind::Struct(meta) => Some(meta),
            _ => None,
        }
    }

    #[inline]
    pub fn as_collection(&self) -> Option<&CollectionMeta> {
        match &self.kind {
            MetaKind::Collection(meta) => Some(meta),
            _ => None,
        }
    }

    #[inline]
    pub fn as_pointer(&self) -> Option<&PointerMeta> {
        match &self.kind {
            MetaKind::Pointer(meta) => Some(meta),
            _ => None,
        }
    }

    /// Properties in declaration order, empty for non-struct kinds.
    pub fn properties(&self) -> &[Property] {
        self.as_struct().map(StructMeta::properties).unwrap_or_default()
    }

    /// Looks up a property by name.
    ///
    /// Fails with [`ReflectError::PropertyNotFound`].
    pub fn property(&self, name: &str) -> Result<&Property, ReflectError> {
        self.as_struct()
            .and_then(|meta| meta.property(name))
            .ok_or_else(|| ReflectError::PropertyNotFound {
                owner: self.name.clone(),
                name: String::from(name),
            })
    }
}

impl fmt::Debug for Metatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metatype")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("properties", &self.properties())
            .finish_non_exhaustive()
    }
}
