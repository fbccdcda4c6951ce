use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::cell::RefCell;
use core::fmt;

use super::StructBuilder;
use crate::hash::HashMap;
use crate::info::{
    Collection, CollectionMeta, DEFAULT_DECORATORS, HandleOps, MetaId, MetaKind, Metatype,
    PointerMeta, Property, PtrOps, Scalar, ScalarMeta, StructMeta, TypedAdapter, demangle,
};
use crate::ptr::Pointee;
use crate::value::downcast_mut;
use crate::{Ptr, ReflectError};

// -----------------------------------------------------------------------------
// Config

/// What [`Registry`] does when a type is declared twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Return the existing descriptor, new properties extend it.
    #[default]
    Reuse,
    /// Fail with [`ReflectError::DuplicateType`].
    Reject,
}

/// Runtime options of a [`Registry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    pub duplicates: DuplicatePolicy,
}

// -----------------------------------------------------------------------------
// Internal tables

/// Stores a shared handle into a `Ptr<U>` slot, converting the pointee.
pub(crate) type Upcast =
    Box<dyn Fn(Rc<dyn Any>, &mut dyn Any) -> Result<(), ReflectError> + Send + Sync>;

fn make_upcast<C: Any, U: ?Sized + Pointee>(
    convert: fn(Rc<RefCell<C>>) -> Rc<RefCell<U>>,
) -> Upcast {
    Box::new(move |handle, slot| {
        let cell = handle
            .downcast::<RefCell<C>>()
            .map_err(|_| ReflectError::mismatch(type_name::<C>(), "<erased>"))?;
        *downcast_mut::<Ptr<U>>(slot)? = Ptr::from_rc(convert(cell));
        Ok(())
    })
}

/// A binding waiting for its type to be declared.
#[derive(Debug, Clone, Copy)]
enum PendingSlot {
    Property { owner: MetaId, index: usize },
    Element { owner: MetaId },
}

// -----------------------------------------------------------------------------
// Registry

/// The catalog of declared types.
///
/// Every declared type gets exactly one [`Metatype`], reachable by display
/// name, by demangled Rust name, by [`TypeId`] and by [`MetaId`]. Declaring
/// a struct also declares its `Ptr` variant.
///
/// Properties may name types that are declared later; their bindings are
/// patched once, when that type arrives.
///
/// # Examples
///
/// ```
/// use vc_meta::registry::Registry;
/// use vc_meta::{Ptr, ReflectError};
///
/// #[derive(Default)]
/// struct Node {
///     label: String,
///     next: Ptr<Node>,
/// }
///
/// let mut registry = Registry::new();
/// registry
///     .declare::<Node>()
///     .unwrap()
///     .field("label", |n| &n.label, |n| &mut n.label)
///     .field("next", |n| &n.next, |n| &mut n.next);
///
/// let node = registry.lookup("Node").unwrap();
/// assert_eq!(node.properties().len(), 2);
/// assert!(registry.lookup("Ptr<Node>").is_ok());
///
/// let err = registry.lookup("app::Missing").unwrap_err();
/// assert!(matches!(err, ReflectError::NotRegistered { name } if name == "Missing"));
/// ```
pub struct Registry {
    config: RegistryConfig,
    metatypes: Vec<Metatype>,
    by_name: HashMap<String, MetaId>,
    by_key: HashMap<String, MetaId>,
    by_type: HashMap<TypeId, MetaId>,
    pending: HashMap<String, Vec<PendingSlot>>,
    upcasts: HashMap<(TypeId, TypeId), Upcast>,
    decorators: Vec<String>,
}

impl Default for Registry {
    /// See [`Registry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry without any declaration.
    pub fn empty() -> Self {
        Self::empty_with_config(RegistryConfig::default())
    }

    fn empty_with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            metatypes: Vec::new(),
            by_name: HashMap::default(),
            by_key: HashMap::default(),
            by_type: HashMap::default(),
            pending: HashMap::default(),
            upcasts: HashMap::default(),
            decorators: DEFAULT_DECORATORS.iter().map(|d| String::from(*d)).collect(),
        }
    }

    /// Creates a registry with the primitive scalars declared.
    ///
    /// - `bool` `char`
    /// - `i8 - i64` `isize`
    /// - `u8 - u64` `usize`
    /// - `f32` `f64`
    /// - `String`
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let mut registry = Self::empty_with_config(config);
        registry.declare_defaults();
        registry
    }

    fn declare_defaults(&mut self) {
        type Declare = fn(&mut Registry) -> Result<MetaId, ReflectError>;
        const DEFAULTS: [Declare; 15] = [
            Registry::declare_scalar::<bool>,
            Registry::declare_scalar::<char>,
            Registry::declare_scalar::<i8>,
            Registry::declare_scalar::<i16>,
            Registry::declare_scalar::<i32>,
            Registry::declare_scalar::<i64>,
            Registry::declare_scalar::<isize>,
            Registry::declare_scalar::<u8>,
            Registry::declare_scalar::<u16>,
            Registry::declare_scalar::<u32>,
            Registry::declare_scalar::<u64>,
            Registry::declare_scalar::<usize>,
            Registry::declare_scalar::<f32>,
            Registry::declare_scalar::<f64>,
            Registry::declare_scalar::<String>,
        ];

        for declare in DEFAULTS {
            if let Err(err) = declare(self) {
                log::warn!("default scalar not declared: {err}");
            }
        }
    }

    /// Drops every declaration and restores the state of [`Registry::new`].
    ///
    /// The configuration is kept, custom decorators are not.
    pub fn clear(&mut self) {
        *self = Self::with_config(self.config);
    }

    #[inline]
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Adds a word that [`Registry::demangle`] strips when followed by a space.
    pub fn register_prefix_decorator(&mut self, decorator: &str) {
        if !self.decorators.iter().any(|d| d == decorator) {
            self.decorators.push(String::from(decorator));
        }
    }

    /// Normalizes a raw type name, see [`demangle`].
    #[inline]
    pub fn demangle(&self, raw: &str) -> String {
        demangle(raw, &self.decorators)
    }

    /// The number of declared metatypes.
    #[inline]
    pub fn len(&self) -> usize {
        self.metatypes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.metatypes.is_empty()
    }

    /// All metatypes in declaration order.
    #[inline]
    pub fn metatypes(&self) -> impl ExactSizeIterator<Item = &Metatype> {
        self.metatypes.iter()
    }

    /// The number of bindings still waiting for their type.
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    // -------------------------------------------------------------------------
    // Lookups

    #[inline]
    pub fn get(&self, id: MetaId) -> Option<&Metatype> {
        self.metatypes.get(id.index())
    }

    /// Looks up a metatype by display name or Rust type name.
    ///
    /// The query is demangled first; fails with [`ReflectError::NotRegistered`]
    /// carrying the demangled name.
    pub fn lookup(&self, name: &str) -> Result<&Metatype, ReflectError> {
        if let Some(&id) = self.by_name.get(name) {
            return self.resolve(id);
        }
        let key = self.demangle(name);
        match self.find(&key) {
            Some(id) => self.resolve(id),
            None => Err(ReflectError::not_registered(key)),
        }
    }

    /// Looks up the metatype declared for `T`.
    pub fn lookup_type<T: ?Sized + Any>(&self) -> Result<&Metatype, ReflectError> {
        match self.by_type.get(&TypeId::of::<T>()) {
            Some(&id) => self.resolve(id),
            None => Err(ReflectError::not_registered(self.demangle(type_name::<T>()))),
        }
    }

    #[inline]
    pub fn lookup_type_id(&self, type_id: TypeId) -> Option<&Metatype> {
        self.by_type.get(&type_id).and_then(|&id| self.get(id))
    }

    #[inline]
    pub fn contains<T: ?Sized + Any>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    #[inline]
    fn find(&self, key: &str) -> Option<MetaId> {
        self.by_name.get(key).or_else(|| self.by_key.get(key)).copied()
    }

    /// Maps an id handed out by this registry to its metatype.
    pub(crate) fn resolve(&self, id: MetaId) -> Result<&Metatype, ReflectError> {
        self.get(id)
            .ok_or_else(|| ReflectError::not_registered(format!("{id}")))
    }

    // -------------------------------------------------------------------------
    // Declarations

    /// Declares a struct type constructed with [`Default`].
    ///
    /// Declaring an already declared type returns a builder over the
    /// existing metatype, unless the config rejects duplicates.
    #[inline]
    pub fn declare<C: Any + Default>(&mut self) -> Result<StructBuilder<'_, C>, ReflectError> {
        self.declare_with(C::default)
    }

    /// Like [`Registry::declare`], under a custom display name.
    #[inline]
    pub fn declare_named<C: Any + Default>(
        &mut self,
        name: &str,
    ) -> Result<StructBuilder<'_, C>, ReflectError> {
        self.declare_sized(Some(name), C::default)
    }

    /// Declares a struct type built by `factory`.
    #[inline]
    pub fn declare_with<C: Any>(
        &mut self,
        factory: fn() -> C,
    ) -> Result<StructBuilder<'_, C>, ReflectError> {
        self.declare_sized(None, factory)
    }

    fn declare_sized<C: Any>(
        &mut self,
        name: Option<&str>,
        factory: fn() -> C,
    ) -> Result<StructBuilder<'_, C>, ReflectError> {
        let id = self.declare_struct::<C>(name, false, |meta| {
            meta.with_factory(factory).with_handle(HandleOps::of::<C>())
        })?;
        self.add_upcast::<C, C>(core::convert::identity);
        Ok(StructBuilder::new(self, id))
    }

    /// Declares a type that is never constructed by the drivers.
    ///
    /// `C` is either a sized base carrying shared properties or a trait
    /// object (`dyn Trait` where `Trait: Pointee`). Concrete types join a
    /// trait object base with [`StructBuilder::upcast`].
    pub fn declare_abstract<C: ?Sized + Pointee>(
        &mut self,
    ) -> Result<StructBuilder<'_, C>, ReflectError> {
        let id = self.declare_struct::<C>(None, true, |meta| meta)?;
        Ok(StructBuilder::new(self, id))
    }

    fn declare_struct<C: ?Sized + Pointee>(
        &mut self,
        name: Option<&str>,
        is_abstract: bool,
        finish: impl FnOnce(Metatype) -> Metatype,
    ) -> Result<MetaId, ReflectError> {
        let key = self.demangle(type_name::<C>());
        let name = name.map_or_else(|| key.clone(), String::from);
        let meta = Metatype::new::<C>(name, key, MetaKind::Struct(StructMeta::new(is_abstract)));
        let id = self.insert(finish(meta))?;
        self.declare_pointer::<C>(id)?;
        Ok(id)
    }

    /// Declares `Ptr<U>` and links it with the metatype of `U`.
    fn declare_pointer<U: ?Sized + Pointee>(
        &mut self,
        pointee: MetaId,
    ) -> Result<MetaId, ReflectError> {
        if let Some(&id) = self.by_type.get(&TypeId::of::<Ptr<U>>()) {
            return Ok(id);
        }
        let pointee_name = &self.resolve(pointee)?.name;
        let name = format!("Ptr<{pointee_name}>");
        let key = self.demangle(type_name::<Ptr<U>>());
        let kind = MetaKind::Pointer(PointerMeta {
            pointee,
            ops: Box::new(PtrOps::<U>::new()),
        });
        let meta = Metatype::new::<Ptr<U>>(name, key, kind).with_factory(Ptr::<U>::null);
        let id = self.insert(meta)?;
        if let Some(pointee) = self.metatypes.get_mut(pointee.index()) {
            pointee.pointer = Some(id);
        }
        Ok(id)
    }

    /// Declares a collection type; its element type may be declared later.
    ///
    /// The display name is the demangled Rust name, such as `Vec<Date>`.
    pub fn declare_collection<C: Collection + Default>(&mut self) -> Result<MetaId, ReflectError> {
        let key = self.demangle(type_name::<C>());
        let raw_element_name = type_name::<C::Item>();
        let element_name = self.demangle(raw_element_name);
        let element = self.find(&element_name);
        let kind = MetaKind::Collection(CollectionMeta {
            element,
            element_name: element_name.clone(),
            raw_element_name,
            adapter: Box::new(TypedAdapter::<C>::new()),
        });
        let meta = Metatype::new::<C>(key.clone(), key, kind).with_factory(C::default);
        let id = self.insert(meta)?;

        let element_missing = self
            .resolve(id)?
            .as_collection()
            .is_some_and(|meta| meta.element.is_none());
        if element_missing {
            log::trace!("collection {id} waits for element type `{element_name}`");
            self.pending
                .entry(element_name)
                .or_default()
                .push(PendingSlot::Element { owner: id });
        }
        Ok(id)
    }

    /// Declares a leaf type with a scalar codec.
    pub fn declare_scalar<T: Scalar>(&mut self) -> Result<MetaId, ReflectError> {
        let key = self.demangle(type_name::<T>());
        let kind = MetaKind::Scalar(ScalarMeta::of::<T>());
        let meta = Metatype::new::<T>(key.clone(), key, kind).with_factory(T::default);
        self.insert(meta)
    }

    /// Adds a metatype, applying the duplicate policy.
    pub(crate) fn insert(&mut self, mut meta: Metatype) -> Result<MetaId, ReflectError> {
        if let Some(&existing) = self.by_type.get(&meta.type_id) {
            if self.config.duplicates == DuplicatePolicy::Reject {
                return Err(ReflectError::DuplicateType { name: meta.name });
            }
            let current = self.resolve(existing)?;
            if current.name != meta.name {
                log::warn!(
                    "`{}` is already declared as `{}`, reusing it",
                    meta.name,
                    current.name
                );
            }
            return Ok(existing);
        }
        if self.by_name.contains_key(&meta.name) {
            return Err(ReflectError::DuplicateType { name: meta.name });
        }

        let id = MetaId::new(self.metatypes.len());
        meta.id = id;
        let name = meta.name.clone();
        let key = meta.key.clone();

        log::trace!("declared {:?} `{name}` as {id}", meta.kind());
        self.by_name.insert(name.clone(), id);
        self.by_key.entry(key.clone()).or_insert(id);
        self.by_type.insert(meta.type_id, id);
        self.metatypes.push(meta);

        self.resolve_pending(&key, id);
        if name != key {
            self.resolve_pending(&name, id);
        }
        Ok(id)
    }

    /// Patches every binding waiting for `key`, exactly once.
    fn resolve_pending(&mut self, key: &str, id: MetaId) {
        let Some(slots) = self.pending.remove(key) else {
            return;
        };

        for slot in slots {
            match slot {
                PendingSlot::Property { owner, index } => {
                    if let Some(property) = self
                        .metatypes
                        .get_mut(owner.index())
                        .and_then(Metatype::as_struct_mut)
                        .and_then(|meta| meta.property_at_mut(index))
                        && property.binding.is_none()
                        && (property.type_name == key || property.raw_type_name == key)
                    {
                        log::trace!(
                            "bound `{}::{}` to `{key}` ({id})",
                            property.owner_name,
                            property.name
                        );
                        property.binding = Some(id);
                    }
                }
                PendingSlot::Element { owner } => {
                    if let Some(Metatype {
                        kind: MetaKind::Collection(meta),
                        name,
                        ..
                    }) = self.metatypes.get_mut(owner.index())
                        && meta.element.is_none()
                        && (meta.element_name == key || meta.raw_element_name == key)
                    {
                        log::trace!("bound elements of `{name}` to `{key}` ({id})");
                        meta.element = Some(id);
                    }
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Properties

    /// Adds `property` to the struct `owner`, binding or deferring its type.
    pub(crate) fn push_property(&mut self, owner: MetaId, mut property: Property) {
        let key = self.demangle(property.raw_type_name);
        let Some(owner_meta) = self.get(owner) else {
            return;
        };
        property.owner = owner;
        property.owner_name = owner_meta.name.clone();
        property.binding = self.find(&key);
        property.type_name = key.clone();

        let name = property.name.clone();
        let bound = property.binding.is_some();
        let Some(meta) = self
            .metatypes
            .get_mut(owner.index())
            .and_then(Metatype::as_struct_mut)
        else {
            log::warn!("property `{name}` ignored, {owner} is not a struct");
            return;
        };
        let index = meta.insert(property);

        if bound {
            log::trace!("declared property `{name}` of {owner}");
        } else {
            log::trace!("property `{name}` of {owner} waits for `{key}`");
            self.pending
                .entry(key)
                .or_default()
                .push(PendingSlot::Property { owner, index });
        }
    }

    /// Returns the property `name` of the struct `owner` for annotation.
    pub(crate) fn property_mut(&mut self, owner: MetaId, name: &str) -> Option<&mut Property> {
        self.metatypes
            .get_mut(owner.index())
            .and_then(Metatype::as_struct_mut)
            .and_then(|meta| meta.property_mut(name))
    }

    pub(crate) fn metatype_mut(&mut self, id: MetaId) -> Option<&mut Metatype> {
        self.metatypes.get_mut(id.index())
    }

    // -------------------------------------------------------------------------
    // Handles

    /// Lets handles to `C` be stored into `Ptr<U>` slots.
    pub(crate) fn add_upcast<C: Any, U: ?Sized + Pointee>(
        &mut self,
        convert: fn(Rc<RefCell<C>>) -> Rc<RefCell<U>>,
    ) {
        self.upcasts.insert(
            (TypeId::of::<Ptr<U>>(), TypeId::of::<C>()),
            make_upcast(convert),
        );
    }

    /// Returns `true` if a handle to `concrete` fits the pointer metatype `ptr`.
    #[inline]
    pub(crate) fn can_upcast(&self, ptr: &Metatype, concrete: &Metatype) -> bool {
        self.upcasts.contains_key(&(ptr.type_id, concrete.type_id))
    }

    /// Stores a read-side handle into the `Ptr` slot described by `ptr`.
    pub(crate) fn store_handle(
        &self,
        ptr: &Metatype,
        concrete: &Metatype,
        handle: Rc<dyn Any>,
        slot: &mut dyn Any,
    ) -> Result<(), ReflectError> {
        match self.upcasts.get(&(ptr.type_id, concrete.type_id)) {
            Some(upcast) => upcast(handle, slot),
            None => Err(ReflectError::mismatch(ptr.name.clone(), concrete.name.clone())),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("metatypes", &self.metatypes.len())
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Badge, Category, Date, Point, Sample, Shape};
    use crate::info::{Kind, ValueShape};

    #[test]
    fn default_scalars() {
        let registry = Registry::new();
        assert_eq!(registry.len(), 15);
        assert_eq!(registry.lookup("f64").unwrap().kind(), Kind::Scalar);
        assert_eq!(registry.lookup("alloc::string::String").unwrap().name(), "String");
        assert!(registry.contains::<usize>());

        assert!(Registry::empty().is_empty());
    }

    #[test]
    fn declaring_twice_reuses_the_metatype() {
        let mut registry = Registry::new();
        let first = registry
            .declare::<Point>()
            .unwrap()
            .field("x", |p| &p.x, |p| &mut p.x)
            .id();
        let second = registry
            .declare_named::<Point>("Pt")
            .unwrap()
            .field("y", |p| &p.y, |p| &mut p.y)
            .field("x", |p| &p.x, |p| &mut p.x)
            .id();

        assert_eq!(first, second);
        let point = registry.lookup("Point").unwrap();
        let names: Vec<_> = point.properties().iter().map(Property::name).collect();
        assert_eq!(names, ["x", "y"]);
        assert!(registry.lookup("Pt").is_err());
        assert_eq!(point.pointer(), Some(registry.lookup("Ptr<Point>").unwrap().id()));
    }

    #[test]
    fn duplicates_can_be_rejected() {
        let mut registry = Registry::with_config(RegistryConfig {
            duplicates: DuplicatePolicy::Reject,
        });
        assert!(registry.declare::<Point>().is_ok());
        let err = registry.declare::<Point>().map(|b| b.id()).unwrap_err();
        assert!(matches!(err, ReflectError::DuplicateType { name } if name == "Point"));

        // A display name belongs to one type only, whatever the policy.
        let mut registry = Registry::new();
        registry.declare::<Point>().unwrap();
        let err = registry.declare_named::<Date>("Point").map(|b| b.id()).unwrap_err();
        assert!(matches!(err, ReflectError::DuplicateType { .. }));
    }

    #[test]
    fn late_types_are_bound_once_declared() {
        let mut registry = Registry::new();
        registry
            .declare::<Sample>()
            .unwrap()
            .field("dates", |s| &s.dates, |s| &mut s.dates)
            .field("origin", |s| &s.origin, |s| &mut s.origin);
        assert_eq!(registry.pending_count(), 2);

        let sample = registry.lookup("Sample").unwrap();
        let dates = sample.property("dates").unwrap();
        assert!(!dates.is_resolved());
        assert_eq!(dates.type_name(), "Vec<Date>");

        let list = registry.declare_collection::<Vec<Date>>().unwrap();
        // The property is bound, the element type now waits.
        assert_eq!(registry.pending_count(), 2);
        let sample = registry.lookup("Sample").unwrap();
        assert_eq!(sample.property("dates").unwrap().binding(), Some(list));

        registry.declare::<Date>().unwrap();
        registry.declare::<Point>().unwrap();
        assert_eq!(registry.pending_count(), 0);

        let list = registry.get(list).unwrap().as_collection().unwrap();
        assert_eq!(list.element(), Some(registry.lookup("Date").unwrap().id()));
        assert!(registry.lookup("Sample").unwrap().property("origin").unwrap().is_resolved());
    }

    #[test]
    fn missing_names_are_demangled() {
        let registry = Registry::new();

        let err = registry.lookup("app::model::Missing").unwrap_err();
        assert!(matches!(err, ReflectError::NotRegistered { name } if name == "Missing"));

        let err = registry.lookup_type::<Point>().unwrap_err();
        assert_eq!(err.to_string(), "metatype `Point` not declared");
    }

    #[test]
    fn clear_restores_defaults() {
        let mut registry = fixtures::registry();
        registry.register_prefix_decorator("mut");
        assert_eq!(registry.demangle("mut app::Point"), "Point");

        registry.clear();
        assert_eq!(registry.len(), Registry::new().len());
        assert!(registry.lookup("Sample").is_err());
        assert_eq!(registry.demangle("mut app::Point"), "mut Point");
    }

    #[test]
    fn read_only_fields_and_type_annotations() {
        let registry = fixtures::registry();
        let badge = registry.lookup("Badge").unwrap();

        let id = badge.property("id").unwrap();
        assert!(id.mode().is_read_only());
        assert_eq!(id.shape(), ValueShape::Reference);
        assert_eq!(id.get_as::<u32>(&Badge { id: 3, ..Badge::default() }).unwrap(), 3);
        assert!(id.field_mut(&mut Badge::default()).unwrap().is_none());

        assert_eq!(
            badge.annotations().first::<Category>(),
            Some(&Category("identity"))
        );
        assert!(registry.lookup("Point").unwrap().annotations().is_empty());
    }

    #[test]
    fn abstract_types() {
        let registry = fixtures::registry();
        let shape = registry.lookup_type::<dyn Shape>().unwrap();
        assert_eq!(shape.name(), "Shape");
        assert!(!shape.is_constructible());
        assert!(shape.as_struct().unwrap().is_abstract());
        assert!(matches!(
            shape.construct(),
            Err(ReflectError::NotConstructible { .. })
        ));

        let ptr = registry.lookup("Ptr<Shape>").unwrap();
        assert_eq!(ptr.as_pointer().unwrap().pointee(), shape.id());
        assert!(ptr.construct().unwrap().is::<Ptr<dyn Shape>>());

        let circle = registry.lookup("Circle").unwrap();
        assert!(registry.can_upcast(ptr, circle));
        assert!(!registry.can_upcast(ptr, registry.lookup("Date").unwrap()));
    }
}
