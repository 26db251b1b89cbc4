//! Recovering Rust errors carried through Lua.

use mlua::prelude::*;

/// Find the external error of type `T` wrapped in `err`.
///
/// Errors raised inside a Rust callback reach the caller wrapped in
/// `CallbackError` (and possibly `WithContext`) layers; this walks through
/// them to the original value.
pub fn find_external<T>(err: &LuaError) -> Option<&T>
where
  T: std::error::Error + 'static,
{
  match err {
    LuaError::ExternalError(inner) => inner.downcast_ref::<T>(),
    LuaError::CallbackError { cause, .. } => find_external(cause),
    LuaError::WithContext { cause, .. } => find_external(cause),
    _ => None,
  }
}
