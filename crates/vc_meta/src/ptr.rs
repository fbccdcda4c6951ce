use alloc::rc::Rc;
use core::any::Any;
use core::cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut};
use core::fmt;

// -----------------------------------------------------------------------------
// Pointee

/// Types that can sit behind a [`Ptr`].
///
/// Implemented for every sized `'static` type. Trait objects become
/// pointees by naming `Pointee` as a supertrait:
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use vc_meta::{Ptr, ptr::Pointee};
///
/// trait Shape: Pointee {
///     fn area(&self) -> f64;
/// }
///
/// struct Square(f64);
///
/// impl Shape for Square {
///     fn area(&self) -> f64 { self.0 * self.0 }
/// }
///
/// let rc: Rc<RefCell<dyn Shape>> = Rc::new(RefCell::new(Square(2.0)));
/// let shape = Ptr::from_rc(rc);
/// let guard = shape.borrow().unwrap();
/// assert!((*guard).as_any().is::<Square>());
/// assert_eq!(guard.area(), 4.0);
/// ```
pub trait Pointee: Any {
    /// Returns the concrete value as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns the concrete value as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The Rust type name of the concrete value.
    fn pointee_name(&self) -> &'static str;
}

impl<T: Any> Pointee for T {
    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline(always)]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline(always)]
    fn pointee_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}

// -----------------------------------------------------------------------------
// Ptr

/// A nullable shared handle, the pointer-valued property type.
///
/// Two `Ptr`s alias when they share an allocation; the serializer uses the
/// allocation address as the object identity, which is how shared and
/// circular references survive a round trip.
///
/// Cycles built from `Ptr`s are not collected automatically, break them with
/// [`Ptr::take`] when the graph is no longer needed.
///
/// # Examples
///
/// ```
/// use vc_meta::Ptr;
///
/// let a = Ptr::new(5);
/// let b = a.clone();
/// assert!(a.ptr_eq(&b));
///
/// *b.borrow_mut().unwrap() += 1;
/// assert_eq!(*a.borrow().unwrap(), 6);
///
/// assert!(Ptr::<i32>::null().is_null());
/// ```
pub struct Ptr<T: ?Sized>(Option<Rc<RefCell<T>>>);

impl<T> Ptr<T> {
    /// Allocates `value` behind a new handle.
    #[inline]
    pub fn new(value: T) -> Self {
        Self(Some(Rc::new(RefCell::new(value))))
    }
}

impl<T: ?Sized> Ptr<T> {
    /// The null handle.
    #[inline]
    pub const fn null() -> Self {
        Self(None)
    }

    #[inline]
    pub fn from_rc(rc: Rc<RefCell<T>>) -> Self {
        Self(Some(rc))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub fn as_rc(&self) -> Option<&Rc<RefCell<T>>> {
        self.0.as_ref()
    }

    #[inline]
    pub fn into_rc(self) -> Option<Rc<RefCell<T>>> {
        self.0
    }

    /// Replaces this handle with null and returns the old one.
    #[inline]
    pub fn take(&mut self) -> Self {
        Self(self.0.take())
    }

    /// The address of the shared allocation, `None` for null.
    #[inline]
    pub fn address(&self) -> Option<usize> {
        self.0.as_ref().map(|rc| Rc::as_ptr(rc).cast::<()>().addr())
    }

    /// Returns `true` if both handles point at the same allocation, or are both null.
    #[inline]
    pub fn ptr_eq<U: ?Sized>(&self, other: &Ptr<U>) -> bool {
        self.address() == other.address()
    }

    /// Immutably borrows the pointee.
    ///
    /// Returns `None` for null. Panics if the pointee is mutably borrowed,
    /// see [`Ptr::try_borrow`].
    #[inline]
    pub fn borrow(&self) -> Option<Ref<'_, T>> {
        self.0.as_ref().map(|rc| rc.borrow())
    }

    /// Mutably borrows the pointee.
    ///
    /// Returns `None` for null. Panics if the pointee is already borrowed,
    /// see [`Ptr::try_borrow_mut`].
    #[inline]
    pub fn borrow_mut(&self) -> Option<RefMut<'_, T>> {
        self.0.as_ref().map(|rc| rc.borrow_mut())
    }

    #[inline]
    pub fn try_borrow(&self) -> Option<Result<Ref<'_, T>, BorrowError>> {
        self.0.as_ref().map(|rc| rc.try_borrow())
    }

    #[inline]
    pub fn try_borrow_mut(&self) -> Option<Result<RefMut<'_, T>, BorrowMutError>> {
        self.0.as_ref().map(|rc| rc.try_borrow_mut())
    }
}

impl<T: ?Sized> Clone for Ptr<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> Default for Ptr<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> fmt::Debug for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address() {
            Some(address) => write!(f, "Ptr({address:#x})"),
            None => f.write_str("Ptr(NULL)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Pointee {
        fn name(&self) -> &str;
    }

    struct Cat;

    impl Named for Cat {
        fn name(&self) -> &str {
            "cat"
        }
    }

    #[test]
    fn identity_survives_unsizing() {
        let cat = Ptr::new(Cat);
        let rc: Rc<RefCell<dyn Named>> = cat.as_rc().unwrap().clone();
        let named = Ptr::from_rc(rc);
        assert!(cat.ptr_eq(&named));
        let guard = named.borrow().unwrap();
        assert_eq!(guard.name(), "cat");
        assert!((*guard).as_any().is::<Cat>());
        assert!((*guard).pointee_name().ends_with("Cat"));
    }

    #[test]
    fn take_leaves_null() {
        let mut a = Ptr::new(1_u8);
        let b = a.take();
        assert!(a.is_null());
        assert!(!b.is_null());
        assert!(a.address().is_none());
        assert!(a.try_borrow().is_none());
    }
}
