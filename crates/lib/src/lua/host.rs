//! The `envbind` host table.
//!
//! Gives scripts direct access to the store and to the binding namespace:
//!
//! - `envbind.get(name)` - read a variable from the store
//! - `envbind.set(name, value)` - write a variable to the store
//! - `envbind.bind(name)` - expose `name` as a global
//! - `envbind.unbind(name)` - remove the global again
//! - `envbind.is_bound(name)` - whether `name` is exposed
//! - `envbind.names()` - sorted list of exposed names
//! - `envbind.history()` - REPL input history, oldest first

use std::cell::RefCell;
use std::rc::Rc;

use mlua::IntoLua;
use mlua::prelude::*;

use super::globals::EnvGlobals;
use crate::history::History;
use super::value::env_value_from_lua;

/// Name of the host table in `_G`.
pub const HOST_TABLE: &str = "envbind";

/// Register the `envbind` table as a global.
pub fn register_host_table(lua: &Lua, globals: &EnvGlobals) -> LuaResult<()> {
  let host = lua.create_table()?;

  let store_globals = globals.clone();
  host.set(
    "get",
    lua.create_function(move |lua, name: String| {
      let store = store_globals.store();
      store.read(&name).map_err(LuaError::external)?.into_lua(lua)
    })?,
  )?;

  let store_globals = globals.clone();
  host.set(
    "set",
    lua.create_function(move |_, (name, value): (String, LuaValue)| {
      let value = env_value_from_lua(&name, value)?;
      store_globals.store().write(&name, value).map_err(LuaError::external)
    })?,
  )?;

  let bind_globals = globals.clone();
  host.set(
    "bind",
    lua.create_function(move |lua, name: String| bind_globals.install(lua, &name))?,
  )?;

  let unbind_globals = globals.clone();
  host.set(
    "unbind",
    lua.create_function(move |_, name: String| unbind_globals.remove(&name))?,
  )?;

  let query_globals = globals.clone();
  host.set(
    "is_bound",
    lua.create_function(move |_, name: String| Ok(query_globals.is_bound(&name)))?,
  )?;

  let list_globals = globals.clone();
  host.set("names", lua.create_function(move |_, ()| Ok(list_globals.names()))?)?;

  lua.globals().raw_set(HOST_TABLE, host)?;
  globals.seal(HOST_TABLE)?;

  Ok(())
}

/// Add `envbind.history()` backed by `history`.
///
/// Entries are read on every call, so lines recorded later are visible.
pub fn register_history(lua: &Lua, history: Rc<RefCell<History>>) -> LuaResult<()> {
  let host: LuaTable = lua.globals().raw_get(HOST_TABLE)?;
  host.set(
    "history",
    lua.create_function(move |_, ()| Ok(history.borrow().entries().to_vec()))?,
  )
}
