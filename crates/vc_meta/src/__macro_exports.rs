//! Items used by the macros of this crate, not public API.

#[cfg(feature = "auto_register")]
pub use inventory;
