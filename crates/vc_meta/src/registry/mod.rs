//! The type registry and the declaration API.
//!
//! ## Menu
//!
//! - [`Registry`]: owns every [`Metatype`] and resolves deferred bindings.
//! - [`StructBuilder`]: declares the properties of a struct metatype.
//! - [`RegistryConfig`]: runtime options, see [`DuplicatePolicy`].
//! - [`SharedRegistry`]: a registry shared between threads.
//! - [`Declaration`] and [`auto_declare!`](crate::auto_declare): static
//!   declaration lists applied by [`Registry::auto_register`].
//!
//! ## Deferred binding
//!
//! A property may name a type that is not declared yet. The binding is kept
//! in a pending table under the demangled type name and patched, exactly
//! once, as soon as a type with that name is declared. Drivers fail with
//! [`ReflectError::Unresolved`] if they meet a binding that is still empty.
//!
//! [`Metatype`]: crate::info::Metatype
//! [`ReflectError::Unresolved`]: crate::ReflectError::Unresolved

// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod builder;
mod shared;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use auto_register::Declaration;
pub use builder::StructBuilder;
pub use shared::SharedRegistry;
pub use type_registry::{DuplicatePolicy, Registry, RegistryConfig};
