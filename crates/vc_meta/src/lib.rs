#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Lets doc tests and `auto_declare!` expansions inside this crate name
// `vc_meta` the same way downstream crates do.
extern crate self as vc_meta;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod value;

pub mod hash;
pub mod info;
pub mod json;
pub mod ptr;
pub mod registry;
pub mod serde;

#[cfg(test)]
mod fixtures;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use error::{ParseError, Position, ReflectError};
pub use ptr::Ptr;
pub use value::Value;
