use alloc::boxed::Box;
use core::any::{Any, type_name};
use core::fmt;

use crate::error::ReflectError;

// -----------------------------------------------------------------------------
// Value

/// A type-erased value, as returned by [`Property::get`].
///
/// The box remembers the name of the type it was created from so a failed
/// downcast can report both sides of the mismatch.
///
/// # Examples
///
/// ```
/// use vc_meta::{ReflectError, Value};
///
/// let value = Value::new(1.5_f64);
/// assert!(value.is::<f64>());
/// assert_eq!(value.downcast_ref::<f64>(), Some(&1.5));
///
/// let err = value.take::<i32>().unwrap_err();
/// assert!(matches!(err, ReflectError::TypeMismatch { .. }));
/// ```
///
/// [`Property::get`]: crate::info::Property::get
pub struct Value {
    inner: Box<dyn Any>,
    type_name: &'static str,
}

impl Value {
    /// Boxes `value`.
    #[inline]
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    #[inline]
    pub(crate) fn from_raw(inner: Box<dyn Any>, type_name: &'static str) -> Self {
        Self { inner, type_name }
    }

    /// The Rust type name of the boxed value.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the boxed value is a `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        (*self.inner).downcast_mut::<T>()
    }

    /// Unboxes the value as `T`.
    ///
    /// Fails with [`ReflectError::TypeMismatch`] if the boxed value is not a `T`.
    pub fn take<T: Any>(self) -> Result<T, ReflectError> {
        let found = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(ReflectError::mismatch(type_name::<T>(), found)),
        }
    }

    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        &*self.inner
    }

    #[inline]
    pub fn as_any_mut(&mut self) -> &mut dyn Any {
        &mut *self.inner
    }

    #[inline]
    pub fn into_any(self) -> Box<dyn Any> {
        self.inner
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Checked downcasts

/// Downcasts an erased reference, failing with [`ReflectError::TypeMismatch`].
#[inline]
pub(crate) fn downcast_ref<T: Any>(value: &dyn Any) -> Result<&T, ReflectError> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| ReflectError::mismatch(type_name::<T>(), "<erased>"))
}

/// Downcasts an erased mutable reference, failing with [`ReflectError::TypeMismatch`].
#[inline]
pub(crate) fn downcast_mut<T: Any>(value: &mut dyn Any) -> Result<&mut T, ReflectError> {
    value
        .downcast_mut::<T>()
        .ok_or_else(|| ReflectError::mismatch(type_name::<T>(), "<erased>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn take_and_mismatch() {
        let value = Value::new(String::from("abc"));
        assert_eq!(value.type_name(), type_name::<String>());
        assert_eq!(value.take::<String>().unwrap(), "abc");

        let value = Value::new(7_u8);
        match value.take::<u16>() {
            Err(ReflectError::TypeMismatch { expected, found }) => {
                assert_eq!(expected, "u16");
                assert_eq!(found, "u8");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn checked_downcasts() {
        let mut number = 3_i32;
        assert_eq!(*downcast_ref::<i32>(&number).unwrap(), 3);
        *downcast_mut::<i32>(&mut number).unwrap() = 4;
        assert_eq!(number, 4);
        assert!(downcast_ref::<i64>(&number).is_err());
    }
}
