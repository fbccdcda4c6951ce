#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_meta as meta;

pub use vc_meta::json;
pub use vc_meta::registry::{Registry, SharedRegistry};
pub use vc_meta::{Ptr, ReflectError, Value};
