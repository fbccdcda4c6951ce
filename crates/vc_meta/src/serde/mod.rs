//! Format-agnostic serialization of object graphs.
//!
//! ## Menu
//!
//! - [`Writer`]: the output hooks a format implements.
//! - [`Reader`]: the input tokens a format offers, see [`Identity`].
//! - [`SerializeDriver`]: walks a value along its metatype and drives a `Writer`.
//! - [`DeserializeDriver`]: rebuilds a value from a `Reader`, see [`DeserializeOptions`].
//!
//! ## Shared objects
//!
//! Values behind a [`Ptr`](crate::Ptr) have an identity, their allocation.
//! Each call keeps its own reference table: the first time an allocation is
//! met it is written in full under a new id, later occurrences are written
//! as a back reference to that id. Reading restores the aliasing, a back
//! reference yields a handle to the object already built. This is also how
//! cycles terminate.
//!
//! By-value structs have no identity and are always written in full.
//!
//! ## Nesting
//!
//! Both drivers recurse once per nested object or collection, a `Ptr` hop
//! included. Past [`MAX_DEPTH`] levels they fail with
//! [`ReflectError::DepthLimit`](crate::ReflectError::DepthLimit) instead of
//! exhausting the stack, so long chains of handles cannot be written in one
//! call.

// -----------------------------------------------------------------------------
// Modules

mod de;
mod hooks;
mod ref_table;
mod ser;

#[cfg(all(debug_assertions, feature = "debug"))]
mod info_stack;

// -----------------------------------------------------------------------------
// Exports

pub use de::{DeserializeDriver, DeserializeOptions, UnknownPropertyPolicy};
pub use hooks::{Identity, Reader, Writer};
pub use ser::SerializeDriver;

/// Deepest nesting of objects and collections the drivers and the JSON
/// reader accept.
pub const MAX_DEPTH: usize = 128;
