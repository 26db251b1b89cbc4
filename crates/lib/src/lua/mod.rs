//! Lua runtime with environment-backed globals.
//!
//! This module embeds a Lua VM whose global namespace is extended with
//! store-backed bindings: after `install("HOME")`, scripts read and assign
//! `HOME` like any other global while every access goes to the store.
//!
//! # Submodules
//!
//! - [`globals`] - `_G` metatable wiring for installed bindings
//! - [`host`] - the `envbind` table exposed to scripts
//! - [`runtime`] - Lua VM creation and code evaluation
//! - [`value`] - conversions between Lua values and store values

mod error;
pub mod globals;
pub mod host;
pub mod runtime;
pub mod value;

pub use error::find_external;
pub use globals::EnvGlobals;
