use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use bitflags::bitflags;

use super::{Annotations, MetaId};
use crate::value::{downcast_mut, downcast_ref};
use crate::{ReflectError, Value};

// -----------------------------------------------------------------------------
// PropertyMode

bitflags! {
    /// How a property may be accessed.
    ///
    /// Derived from the accessors supplied at declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyMode: u8 {
        const READABLE = 1 << 0;
        const WRITABLE = 1 << 1;
    }
}

impl PropertyMode {
    #[inline]
    pub const fn is_readable(self) -> bool {
        self.contains(Self::READABLE)
    }

    #[inline]
    pub const fn is_writable(self) -> bool {
        self.contains(Self::WRITABLE)
    }

    #[inline]
    pub const fn is_read_write(self) -> bool {
        self.contains(Self::READABLE.union(Self::WRITABLE))
    }

    #[inline]
    pub const fn is_read_only(self) -> bool {
        self.is_readable() && !self.is_writable()
    }
}

// -----------------------------------------------------------------------------
// ValueShape

/// How a property hands out its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// A getter returning an owned value, stored back through a setter.
    Value,
    /// A borrowed field, read and written in place.
    Reference,
    /// A getter returning a [`Ptr`](crate::Ptr) handle.
    Pointer,
}

// -----------------------------------------------------------------------------
// Accessor

pub(crate) trait Accessor: Send + Sync {
    fn get(&self, instance: &dyn Any) -> Result<Option<Value>, ReflectError>;

    /// Returns `false` if there is no way to store a value.
    fn set(&self, instance: &mut dyn Any, value: Value) -> Result<bool, ReflectError>;

    fn field<'a>(&self, _instance: &'a dyn Any) -> Result<Option<&'a dyn Any>, ReflectError> {
        Ok(None)
    }

    fn field_mut<'a>(
        &self,
        _instance: &'a mut dyn Any,
    ) -> Result<Option<&'a mut dyn Any>, ReflectError> {
        Ok(None)
    }
}

pub(crate) struct FieldAccessor<C, P> {
    get: fn(&C) -> &P,
    get_mut: Option<fn(&mut C) -> &mut P>,
}

impl<C: Any, P: Any + Clone> Accessor for FieldAccessor<C, P> {
    fn get(&self, instance: &dyn Any) -> Result<Option<Value>, ReflectError> {
        let instance = downcast_ref::<C>(instance)?;
        Ok(Some(Value::new((self.get)(instance).clone())))
    }

    fn set(&self, instance: &mut dyn Any, value: Value) -> Result<bool, ReflectError> {
        let Some(get_mut) = self.get_mut else {
            return Ok(false);
        };
        let value = value.take::<P>()?;
        *get_mut(downcast_mut::<C>(instance)?) = value;
        Ok(true)
    }

    fn field<'a>(&self, instance: &'a dyn Any) -> Result<Option<&'a dyn Any>, ReflectError> {
        let instance = downcast_ref::<C>(instance)?;
        Ok(Some((self.get)(instance)))
    }

    fn field_mut<'a>(
        &self,
        instance: &'a mut dyn Any,
    ) -> Result<Option<&'a mut dyn Any>, ReflectError> {
        let Some(get_mut) = self.get_mut else {
            return Ok(None);
        };
        Ok(Some(get_mut(downcast_mut::<C>(instance)?)))
    }
}

pub(crate) struct MethodAccessor<C, P> {
    get: Option<fn(&C) -> P>,
    set: Option<fn(&mut C, P)>,
}

impl<C: Any, P: Any> Accessor for MethodAccessor<C, P> {
    fn get(&self, instance: &dyn Any) -> Result<Option<Value>, ReflectError> {
        let Some(get) = self.get else {
            return Ok(None);
        };
        Ok(Some(Value::new(get(downcast_ref::<C>(instance)?))))
    }

    fn set(&self, instance: &mut dyn Any, value: Value) -> Result<bool, ReflectError> {
        let Some(set) = self.set else {
            return Ok(false);
        };
        let value = value.take::<P>()?;
        set(downcast_mut::<C>(instance)?, value);
        Ok(true)
    }
}

// -----------------------------------------------------------------------------
// Property

/// A named, typed member of a struct metatype.
///
/// The declared type is bound to its metatype through [`Property::binding`].
/// The binding stays empty while that type is undeclared and is filled by
/// the registry as soon as it is.
///
/// # Examples
///
/// ```
/// use vc_meta::registry::Registry;
///
/// #[derive(Default)]
/// struct Point { x: f64, y: f64 }
///
/// let mut registry = Registry::new();
/// registry
///     .declare::<Point>()
///     .unwrap()
///     .field("x", |p| &p.x, |p| &mut p.x)
///     .getter("y", |p| p.y);
///
/// let point_type = registry.lookup("Point").unwrap();
/// let x = point_type.property("x").unwrap();
/// let y = point_type.property("y").unwrap();
/// assert!(x.mode().is_read_write());
/// assert!(y.mode().is_read_only());
///
/// let mut point = Point { x: 1.0, y: 2.0 };
/// x.set(&mut point, vc_meta::Value::new(4.5)).unwrap();
/// assert_eq!(x.get_as::<f64>(&point).unwrap(), 4.5);
///
/// // setting a read-only property does nothing
/// y.set(&mut point, vc_meta::Value::new(0.0)).unwrap();
/// assert_eq!(point.y, 2.0);
/// ```
pub struct Property {
    pub(crate) name: String,
    pub(crate) owner: MetaId,
    pub(crate) owner_name: String,
    pub(crate) raw_type_name: &'static str,
    pub(crate) type_name: String,
    pub(crate) type_id: TypeId,
    pub(crate) mode: PropertyMode,
    pub(crate) shape: ValueShape,
    pub(crate) annotations: Annotations,
    pub(crate) binding: Option<MetaId>,
    access: Box<dyn Accessor>,
}

impl Property {
    fn with_access<P: Any>(
        name: &str,
        mode: PropertyMode,
        shape: ValueShape,
        access: Box<dyn Accessor>,
    ) -> Self {
        Self {
            name: String::from(name),
            owner: MetaId::PLACEHOLDER,
            owner_name: String::new(),
            raw_type_name: type_name::<P>(),
            type_name: String::new(),
            type_id: TypeId::of::<P>(),
            mode,
            shape,
            annotations: Annotations::new(),
            binding: None,
            access,
        }
    }

    pub(crate) fn from_field<C: Any, P: Any + Clone>(
        name: &str,
        get: fn(&C) -> &P,
        get_mut: Option<fn(&mut C) -> &mut P>,
    ) -> Self {
        let mode = match get_mut {
            Some(_) => PropertyMode::READABLE | PropertyMode::WRITABLE,
            None => PropertyMode::READABLE,
        };
        Self::with_access::<P>(
            name,
            mode,
            ValueShape::Reference,
            Box::new(FieldAccessor { get, get_mut }),
        )
    }

    pub(crate) fn from_methods<C: Any, P: Any>(
        name: &str,
        shape: ValueShape,
        get: Option<fn(&C) -> P>,
        set: Option<fn(&mut C, P)>,
    ) -> Self {
        let mut mode = PropertyMode::empty();
        mode.set(PropertyMode::READABLE, get.is_some());
        mode.set(PropertyMode::WRITABLE, set.is_some());
        Self::with_access::<P>(name, mode, shape, Box::new(MethodAccessor { get, set }))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The metatype declaring this property.
    #[inline]
    pub fn owner(&self) -> MetaId {
        self.owner
    }

    #[inline]
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// The demangled name of the declared type, the key used for binding.
    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn mode(&self) -> PropertyMode {
        self.mode
    }

    #[inline]
    pub fn shape(&self) -> ValueShape {
        self.shape
    }

    #[inline]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// The metatype of the declared type, `None` while it is undeclared.
    #[inline]
    pub fn binding(&self) -> Option<MetaId> {
        self.binding
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.binding.is_some()
    }

    /// Returns a copy of the current value of this property on `instance`.
    ///
    /// Fails with [`ReflectError::NotReadable`] for write-only properties and
    /// with [`ReflectError::TypeMismatch`] if `instance` is not of the owning type.
    pub fn get(&self, instance: &dyn Any) -> Result<Value, ReflectError> {
        if !self.mode.is_readable() {
            return Err(self.not_readable());
        }
        self.access.get(instance)?.ok_or_else(|| self.not_readable())
    }

    /// Like [`Property::get`], unboxed as `T`.
    pub fn get_as<T: Any>(&self, instance: &dyn Any) -> Result<T, ReflectError> {
        self.get(instance)?.take::<T>()
    }

    /// Stores `value` into this property of `instance`.
    ///
    /// Does nothing if the property is not writable. Fails with
    /// [`ReflectError::TypeMismatch`] if `value` is not of the declared type.
    pub fn set(&self, instance: &mut dyn Any, value: Value) -> Result<(), ReflectError> {
        if !self.mode.is_writable() {
            return Ok(());
        }
        self.access.set(instance, value).map(|_| ())
    }

    /// Borrows the property of `instance` in place.
    ///
    /// Returns `None` unless the property has [`ValueShape::Reference`].
    pub fn field<'a>(&self, instance: &'a dyn Any) -> Result<Option<&'a dyn Any>, ReflectError> {
        self.access.field(instance)
    }

    /// Mutably borrows the property of `instance` in place.
    ///
    /// Returns `None` unless the property is a writable field.
    pub fn field_mut<'a>(
        &self,
        instance: &'a mut dyn Any,
    ) -> Result<Option<&'a mut dyn Any>, ReflectError> {
        self.access.field_mut(instance)
    }

    #[cold]
    fn not_readable(&self) -> ReflectError {
        ReflectError::NotReadable {
            owner: self.owner_name.clone(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("owner", &self.owner_name)
            .field("type_name", &self.type_name)
            .field("mode", &self.mode)
            .field("shape", &self.shape)
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Account {
        id: u32,
        balance: i64,
    }

    impl Account {
        fn balance(&self) -> i64 {
            self.balance
        }

        fn deposit(&mut self, amount: i64) {
            self.balance += amount;
        }
    }

    #[test]
    fn mode_follows_accessors() {
        let field = Property::from_field::<Account, u32>("id", |a| &a.id, Some(|a| &mut a.id));
        assert!(field.mode().is_read_write());
        assert_eq!(field.shape(), ValueShape::Reference);

        let getter = Property::from_methods::<Account, i64>(
            "balance",
            ValueShape::Value,
            Some(Account::balance),
            None,
        );
        assert!(getter.mode().is_read_only());

        let setter = Property::from_methods::<Account, i64>(
            "deposit",
            ValueShape::Value,
            None,
            Some(Account::deposit),
        );
        assert!(setter.mode().is_writable());
        assert!(!setter.mode().is_readable());
    }

    #[test]
    fn get_and_set_are_checked() {
        let mut account = Account::default();
        let id = Property::from_field::<Account, u32>("id", |a| &a.id, Some(|a| &mut a.id));
        let deposit = Property::from_methods::<Account, i64>(
            "deposit",
            ValueShape::Value,
            None,
            Some(Account::deposit),
        );

        id.set(&mut account, Value::new(9_u32)).unwrap();
        assert_eq!(id.get_as::<u32>(&account).unwrap(), 9);
        assert_eq!(
            *id.field(&account).unwrap().unwrap().downcast_ref::<u32>().unwrap(),
            9
        );

        let err = id.set(&mut account, Value::new(9_i32)).unwrap_err();
        assert!(matches!(err, ReflectError::TypeMismatch { .. }));
        let err = id.get_as::<i32>(&account).unwrap_err();
        assert!(matches!(err, ReflectError::TypeMismatch { .. }));
        assert!(id.get(&0_u8).is_err());

        deposit.set(&mut account, Value::new(20_i64)).unwrap();
        deposit.set(&mut account, Value::new(5_i64)).unwrap();
        assert_eq!(account.balance, 25);
        assert!(matches!(
            deposit.get(&account),
            Err(ReflectError::NotReadable { .. })
        ));
        assert!(deposit.field(&account).unwrap().is_none());
    }
}
