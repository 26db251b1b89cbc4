//! Store-backed global bindings.
//!
//! A binding makes one environment store entry appear as a plain read/write
//! identifier. The [`BindingRegistry`] is the namespace those identifiers live
//! in: hosts look names up in it (or mirror it into a scripting runtime, see
//! [`crate::lua`]) instead of relying on an ambient global object.
//!
//! Installation never touches the store. Every read and write is a fresh
//! round trip, so external changes to the store are visible immediately.

mod registry;
mod types;

use thiserror::Error;

pub use registry::BindingRegistry;
pub use types::{Accessor, Attributes, Slot, StoreBinding};

/// Errors raised while defining or using bindings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BindError {
  /// The slot is held by a global that cannot be redefined or removed.
  #[error("cannot bind '{name}': an existing global of that name is not configurable")]
  Conflict { name: String },

  /// A scripting value with no store representation was assigned.
  #[error("cannot assign a {type_name} value to environment variable '{name}'")]
  UnsupportedValue { name: String, type_name: &'static str },
}
