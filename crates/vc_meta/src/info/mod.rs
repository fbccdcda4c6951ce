//! Runtime descriptors: metatypes, properties, collections and scalars.
//!
//! ## Menu
//!
//! - [`Metatype`]: the descriptor of one declared type, see [`MetaKind`].
//! - [`Property`]: a named member of a struct metatype, with its [`PropertyMode`]
//!   and [`ValueShape`].
//! - [`Collection`]: the contract a sequence type offers, erased as [`CollectionAdapter`].
//! - [`Scalar`]: leaf codecs for primitives and `String`.
//! - [`Annotations`]: typed metadata attached to properties and metatypes.
//! - [`demangle`]: the name normalization used for registry keys.

// -----------------------------------------------------------------------------
// Modules

mod annotations;
mod collection;
mod metatype;
mod name;
mod property;
mod scalar;

// -----------------------------------------------------------------------------
// Exports

pub use annotations::{Annotations, NonStreamable};
pub use collection::{Collection, CollectionAdapter};
pub use metatype::{
    CollectionMeta, Kind, MetaId, MetaKind, Metatype, PointerMeta, PointerOps, ScalarMeta,
    StructMeta,
};
pub use name::{DEFAULT_DECORATORS, demangle};
pub use property::{Property, PropertyMode, ValueShape};
pub use scalar::{Scalar, ScalarKind, ScalarRef, ScalarValue};

pub(crate) use collection::TypedAdapter;
pub(crate) use metatype::{HandleOps, PtrOps};
