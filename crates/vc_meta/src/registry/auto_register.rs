use super::Registry;
use crate::ReflectError;

// -----------------------------------------------------------------------------
// Declaration

/// A declaration function collected by [`auto_declare!`](crate::auto_declare).
///
/// Applied by [`Registry::auto_register`].
pub struct Declaration {
    #[cfg_attr(not(feature = "auto_register"), allow(dead_code))]
    declare: fn(&mut Registry) -> Result<(), ReflectError>,
}

impl Declaration {
    #[inline]
    pub const fn new(declare: fn(&mut Registry) -> Result<(), ReflectError>) -> Self {
        Self { declare }
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(Declaration);

/// Submits a declaration function to [`Registry::auto_register`].
///
/// The function has the signature `fn(&mut Registry) -> Result<(), ReflectError>`.
/// Without the `auto_register` feature the macro expands to nothing.
///
/// # Examples
///
/// ```no_run
/// use vc_meta::registry::Registry;
/// use vc_meta::ReflectError;
///
/// #[derive(Default)]
/// struct Point { x: f64, y: f64 }
///
/// fn declare_point(registry: &mut Registry) -> Result<(), ReflectError> {
///     registry
///         .declare::<Point>()?
///         .field("x", |p| &p.x, |p| &mut p.x)
///         .field("y", |p| &p.y, |p| &mut p.y);
///     Ok(())
/// }
///
/// vc_meta::auto_declare!(declare_point);
///
/// let mut registry = Registry::new();
/// assert_eq!(registry.auto_register().unwrap(), 1);
/// assert!(registry.lookup("Point").is_ok());
/// ```
#[macro_export]
macro_rules! auto_declare {
    ($declare:path) => {
        $crate::__auto_declare_impl!($declare);
    };
}

#[cfg(feature = "auto_register")]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_declare_impl {
    ($declare:path) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::Declaration::new($declare)
        }
    };
}

#[cfg(not(feature = "auto_register"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_declare_impl {
    ($declare:path) => {};
}

impl Registry {
    /// Applies every function submitted with [`auto_declare!`](crate::auto_declare).
    ///
    /// Returns how many declarations ran. Repeated calls are cheap under the
    /// default [`DuplicatePolicy::Reuse`](super::DuplicatePolicy::Reuse).
    ///
    /// Requires the `auto_register` feature, without it nothing is declared
    /// and `Ok(0)` is returned. Platform support follows the `inventory` crate.
    pub fn auto_register(&mut self) -> Result<usize, ReflectError> {
        #[cfg(feature = "auto_register")]
        {
            let mut count = 0;
            for declaration in inventory::iter::<Declaration> {
                (declaration.declare)(self)?;
                count += 1;
            }
            log::trace!("auto registered {count} declarations");
            Ok(count)
        }

        #[cfg(not(feature = "auto_register"))]
        {
            Ok(0)
        }
    }
}

#[cfg(all(test, feature = "auto_register"))]
mod tests {
    use super::*;

    crate::auto_declare!(crate::fixtures::declare);

    #[test]
    fn submitted_declarations_run() {
        let mut registry = Registry::new();
        assert!(registry.auto_register().unwrap() >= 1);
        assert!(registry.lookup("Sample").is_ok());
        assert_eq!(registry.pending_count(), 0);

        // Running them again reuses every metatype.
        let len = registry.len();
        registry.auto_register().unwrap();
        assert_eq!(registry.len(), len);
    }
}
