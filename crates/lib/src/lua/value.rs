//! Conversions between Lua values and [`EnvValue`].

use mlua::IntoLua;
use mlua::prelude::*;

use crate::bind::BindError;
use crate::store::EnvValue;

impl IntoLua for EnvValue {
  fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
    match self {
      EnvValue::Unset => Ok(LuaValue::Nil),
      EnvValue::Boolean(b) => Ok(LuaValue::Boolean(b)),
      EnvValue::Integer(i) => Ok(LuaValue::Integer(i)),
      EnvValue::Number(n) => Ok(LuaValue::Number(n)),
      EnvValue::Text(s) => lua.create_string(&s).map(LuaValue::String),
    }
  }
}

/// Convert a value assigned to the bound global `name`.
///
/// Scalars map one to one; `nil` unsets. Tables, functions, userdata and
/// threads have no store representation and are rejected.
pub fn env_value_from_lua(name: &str, value: LuaValue) -> LuaResult<EnvValue> {
  match value {
    LuaValue::Nil => Ok(EnvValue::Unset),
    LuaValue::Boolean(b) => Ok(EnvValue::Boolean(b)),
    LuaValue::Integer(i) => Ok(EnvValue::Integer(i)),
    LuaValue::Number(n) => Ok(EnvValue::Number(n)),
    LuaValue::String(s) => Ok(EnvValue::Text(s.to_str()?.to_string())),
    other => Err(LuaError::external(BindError::UnsupportedValue {
      name: name.to_string(),
      type_name: other.type_name(),
    })),
  }
}
