use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

// -----------------------------------------------------------------------------
// Annotations

/// An ordered bag of typed metadata attached to a property or a metatype.
///
/// Unlike a map, several values of the same type may be stored; queries
/// return them in insertion order.
///
/// # Examples
///
/// ```
/// use vc_meta::info::{Annotations, NonStreamable};
///
/// struct Range(f32, f32);
///
/// let annotations = Annotations::new()
///     .with(Range(0.0, 1.0))
///     .with(Range(0.0, 0.5))
///     .with(NonStreamable);
///
/// assert!(annotations.has::<NonStreamable>());
/// assert_eq!(annotations.first::<Range>().unwrap().1, 1.0);
/// assert_eq!(annotations.all::<Range>().count(), 2);
/// assert!(!annotations.has::<u32>());
/// ```
#[derive(Clone, Default)]
pub struct Annotations {
    items: Vec<Arc<dyn Any + Send + Sync>>,
}

impl Annotations {
    /// Creates an empty set.
    #[inline]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends `value` and returns the set, for chaining.
    #[inline]
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    #[inline]
    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.items.push(Arc::new(value));
    }

    /// Returns the first annotation of type `T`.
    pub fn first<T: Any>(&self) -> Option<&T> {
        self.all::<T>().next()
    }

    /// Returns every annotation of type `T`, in insertion order.
    pub fn all<T: Any>(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|item| (**item).downcast_ref::<T>())
    }

    /// Returns `true` if at least one annotation of type `T` is present.
    #[inline]
    pub fn has<T: Any>(&self) -> bool {
        self.first::<T>().is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Debug for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotations")
            .field("len", &self.items.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// NonStreamable

/// Marks a property that the serialization drivers never write and ignore
/// when read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonStreamable;
