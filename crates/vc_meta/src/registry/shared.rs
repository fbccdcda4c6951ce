use alloc::sync::Arc;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Registry;

// -----------------------------------------------------------------------------
// SharedRegistry

/// A [`Registry`] shared between threads.
///
/// Declarations take the write lock and are expected to happen once, before
/// serialization starts; afterwards every lookup only takes the read lock.
///
/// # Examples
///
/// ```
/// use vc_meta::registry::SharedRegistry;
///
/// #[derive(Default)]
/// struct Point { x: f64 }
///
/// let shared = SharedRegistry::default();
/// shared.write().declare::<Point>().unwrap().field("x", |p| &p.x, |p| &mut p.x);
///
/// let reader = shared.clone();
/// std::thread::spawn(move || {
///     assert!(reader.read().lookup("Point").is_ok());
/// })
/// .join()
/// .unwrap();
/// ```
#[derive(Clone, Default)]
pub struct SharedRegistry {
    internal: Arc<RwLock<Registry>>,
}

impl SharedRegistry {
    /// Shares an already populated registry.
    #[inline]
    pub fn new(registry: Registry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes the read lock.
    ///
    /// A poisoned lock is recovered, declarations never leave the registry
    /// half updated.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the write lock.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.internal.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Registry> for SharedRegistry {
    #[inline]
    fn from(registry: Registry) -> Self {
        Self::new(registry)
    }
}

impl core::fmt::Debug for SharedRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&*self.read(), f)
    }
}
