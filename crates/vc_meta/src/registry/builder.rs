use alloc::rc::Rc;
use core::any::Any;
use core::cell::RefCell;
use core::marker::PhantomData;

use super::Registry;
use crate::Ptr;
use crate::info::{MetaId, Property, ValueShape};
use crate::ptr::Pointee;

// -----------------------------------------------------------------------------
// StructBuilder

/// Adds properties and annotations to a declared struct metatype.
///
/// Returned by the `declare*` methods of [`Registry`]. Every method consumes
/// and returns the builder so declarations read as one chain. Declaring a
/// property twice replaces the first declaration.
///
/// # Examples
///
/// ```
/// use vc_meta::info::NonStreamable;
/// use vc_meta::registry::Registry;
///
/// #[derive(Default)]
/// struct Account {
///     owner: String,
///     balance: i64,
///     cache: u32,
/// }
///
/// impl Account {
///     fn balance(&self) -> i64 { self.balance }
///     fn set_balance(&mut self, value: i64) { self.balance = value; }
/// }
///
/// let mut registry = Registry::new();
/// registry
///     .declare::<Account>()
///     .unwrap()
///     .field("owner", |a| &a.owner, |a| &mut a.owner)
///     .property("balance", Account::balance, Account::set_balance)
///     .field("cache", |a| &a.cache, |a| &mut a.cache)
///     .annotate("cache", NonStreamable);
///
/// let account = registry.lookup("Account").unwrap();
/// assert!(account.property("cache").unwrap().annotations().has::<NonStreamable>());
/// ```
pub struct StructBuilder<'r, C: ?Sized> {
    registry: &'r mut Registry,
    id: MetaId,
    _marker: PhantomData<fn(&C)>,
}

impl<'r, C: ?Sized + Any> StructBuilder<'r, C> {
    #[inline]
    pub(crate) fn new(registry: &'r mut Registry, id: MetaId) -> Self {
        Self {
            registry,
            id,
            _marker: PhantomData,
        }
    }

    /// The metatype being built.
    #[inline]
    pub fn id(&self) -> MetaId {
        self.id
    }

    /// Attaches an annotation to the metatype itself.
    pub fn annotate_type<A: Any + Send + Sync>(self, annotation: A) -> Self {
        if let Some(meta) = self.registry.metatype_mut(self.id) {
            meta.annotations.push(annotation);
        }
        self
    }

    /// Attaches an annotation to the already declared property `property`.
    pub fn annotate<A: Any + Send + Sync>(self, property: &str, annotation: A) -> Self {
        match self.registry.property_mut(self.id, property) {
            Some(property) => property.annotations.push(annotation),
            None => log::warn!("annotation ignored, no property `{property}` in {}", self.id),
        }
        self
    }
}

impl<C: Any> StructBuilder<'_, C> {
    #[inline]
    fn with(self, property: Property) -> Self {
        self.registry.push_property(self.id, property);
        self
    }

    /// A field read and written in place.
    pub fn field<P: Any + Clone>(
        self,
        name: &str,
        get: fn(&C) -> &P,
        get_mut: fn(&mut C) -> &mut P,
    ) -> Self {
        self.with(Property::from_field(name, get, Some(get_mut)))
    }

    /// A read-only field.
    pub fn getter_ref<P: Any + Clone>(self, name: &str, get: fn(&C) -> &P) -> Self {
        self.with(Property::from_field(name, get, None))
    }

    /// A value exposed through a getter and a setter.
    pub fn property<P: Any>(self, name: &str, get: fn(&C) -> P, set: fn(&mut C, P)) -> Self {
        self.with(Property::from_methods(name, ValueShape::Value, Some(get), Some(set)))
    }

    /// A read-only value.
    pub fn getter<P: Any>(self, name: &str, get: fn(&C) -> P) -> Self {
        self.with(Property::from_methods(name, ValueShape::Value, Some(get), None))
    }

    /// A write-only value.
    pub fn setter<P: Any>(self, name: &str, set: fn(&mut C, P)) -> Self {
        self.with(Property::from_methods(name, ValueShape::Value, None, Some(set)))
    }

    /// A shared handle exposed through a getter and a setter.
    pub fn pointer<U: ?Sized + Pointee>(
        self,
        name: &str,
        get: fn(&C) -> Ptr<U>,
        set: fn(&mut C, Ptr<U>),
    ) -> Self {
        self.with(Property::from_methods(
            name,
            ValueShape::Pointer,
            Some(get),
            Some(set),
        ))
    }

    /// Lets handles to `C` be read into `Ptr<U>` properties.
    ///
    /// `U` is usually a trait object declared with
    /// [`Registry::declare_abstract`]; the conversion is the unsizing
    /// coercion, written `|rc| rc`.
    pub fn upcast<U: ?Sized + Pointee>(
        self,
        convert: fn(Rc<RefCell<C>>) -> Rc<RefCell<U>>,
    ) -> Self {
        self.registry.add_upcast(convert);
        self
    }
}
