use std::path::Path;

use mlua::prelude::*;
use tracing::info;

use crate::bind::BindingRegistry;
use crate::lua::globals::EnvGlobals;
use crate::lua::host::register_host_table;

/// Create a new Lua runtime whose globals are backed by `registry`.
///
/// Every standard library global present at creation, and the `envbind`
/// host table, is sealed so environment bindings cannot replace them.
/// Returns the Lua instance and the handle used to install bindings.
pub fn create_runtime(registry: BindingRegistry) -> LuaResult<(Lua, EnvGlobals)> {
  let lua = Lua::new();
  let globals = EnvGlobals::attach(&lua, registry)?;
  register_host_table(&lua, &globals)?;
  let sealed = globals.seal_existing(&lua)?;

  info!(sealed, "created lua runtime");
  Ok((lua, globals))
}

/// Load and execute a Lua file at the given path.
/// Returns the result of the file execution.
pub fn load_file(lua: &Lua, path: &Path) -> LuaResult<LuaValue> {
  let canonical_path = path
    .canonicalize()
    .map_err(|e| LuaError::external(format!("cannot canonicalize '{}': {}", path.display(), e)))?;
  let content = std::fs::read_to_string(&canonical_path)
    .map_err(|e| LuaError::external(format!("cannot read '{}': {}", canonical_path.display(), e)))?;

  lua
    .load(&content)
    .set_name(format!("@{}", canonical_path.display()))
    .eval::<LuaValue>()
}

/// Evaluate a chunk of source code under the given chunk name.
///
/// Expressions are tried first (`return <source>`) so `HOME` evaluates to its
/// value; anything that does not parse as an expression runs as statements.
pub fn eval_chunk(lua: &Lua, source: &str, name: &str) -> LuaResult<LuaMultiValue> {
  let expression = format!("return {}", source);
  match lua.load(&expression).set_name(format!("={}", name)).into_function() {
    Ok(function) => function.call(()),
    Err(LuaError::SyntaxError { .. }) => lua.load(source).set_name(format!("={}", name)).eval(),
    Err(e) => Err(e),
  }
}
