//! Environment bindings as Lua globals.
//!
//! [`EnvGlobals`] mirrors a [`BindingRegistry`] into `_G` by giving `_G` a
//! metatable:
//!
//! - `__index` - reading a bound name calls the store's `read`
//! - `__newindex` - assigning a bound name calls the store's `write`
//! - `__pairs` - `pairs(_G)` yields raw globals followed by bound names
//!
//! A bound name never has a raw value in `_G`, so every access to it falls
//! through to the metamethods.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use mlua::IntoLua;
use mlua::prelude::*;
use tracing::debug;

use super::value::env_value_from_lua;
use crate::bind::BindingRegistry;
use crate::store::{EnvStore, EnvValue};

/// Value of `__metatable` on `_G`, which also blocks `setmetatable(_G, ...)`.
const METATABLE_GUARD: &str = "envbind";

/// Handle to the bindings installed into one Lua state.
#[derive(Clone)]
pub struct EnvGlobals {
  registry: Rc<RefCell<BindingRegistry>>,
}

impl EnvGlobals {
  /// Attach `registry` to the globals of `lua`.
  ///
  /// Replaces any metatable `_G` already has.
  pub fn attach(lua: &Lua, registry: BindingRegistry) -> LuaResult<Self> {
    let this = Self {
      registry: Rc::new(RefCell::new(registry)),
    };

    let mt = lua.create_table()?;
    mt.set("__index", this.index_fn(lua)?)?;
    mt.set("__newindex", this.newindex_fn(lua)?)?;
    mt.set("__pairs", this.pairs_fn(lua)?)?;
    mt.set("__metatable", METATABLE_GUARD)?;
    lua.globals().set_metatable(Some(mt))?;

    Ok(this)
  }

  /// Install a binding for `name` and expose it as a global.
  ///
  /// A configurable raw global of the same name is dropped so the accessor
  /// takes over. On conflict nothing changes.
  pub fn install(&self, lua: &Lua, name: &str) -> LuaResult<()> {
    self
      .registry
      .borrow_mut()
      .install(name)
      .map_err(LuaError::external)?;
    lua.globals().raw_set(name, LuaValue::Nil)?;
    Ok(())
  }

  /// Remove the binding for `name`; the global reads as `nil` afterwards.
  pub fn remove(&self, name: &str) -> LuaResult<bool> {
    self.registry.borrow_mut().remove(name).map_err(LuaError::external)
  }

  /// Mark `name` as a global that bindings may not replace.
  pub fn seal(&self, name: &str) -> LuaResult<()> {
    self.registry.borrow_mut().seal(name).map_err(LuaError::external)
  }

  /// Seal every global currently present in `_G` under a string key.
  ///
  /// Returns how many names were sealed.
  pub fn seal_existing(&self, lua: &Lua) -> LuaResult<usize> {
    let mut count = 0;
    for pair in lua.globals().pairs::<LuaValue, LuaValue>() {
      let (key, _) = pair?;
      let LuaValue::String(key) = key else {
        continue;
      };
      if let Ok(name) = key.to_str() {
        self.seal(&name)?;
        count += 1;
      }
    }
    debug!(count, "sealed existing globals");
    Ok(count)
  }

  pub fn names(&self) -> Vec<String> {
    self.registry.borrow().names()
  }

  pub fn is_bound(&self, name: &str) -> bool {
    self.registry.borrow().is_bound(name)
  }

  pub fn len(&self) -> usize {
    self.registry.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The store installed bindings forward to.
  pub fn store(&self) -> Arc<dyn EnvStore> {
    Arc::clone(self.registry.borrow().store())
  }

  /// Read the bound global `name`, or `None` when it is not bound.
  pub fn read(&self, name: &str) -> Option<LuaResult<EnvValue>> {
    let accessor = self.registry.borrow().accessor(name)?;
    Some(accessor.read().map_err(LuaError::external))
  }

  fn index_fn(&self, lua: &Lua) -> LuaResult<LuaFunction> {
    let registry = Rc::clone(&self.registry);
    lua.create_function(move |lua, (_, key): (LuaTable, LuaValue)| {
      // Bound names are always valid UTF-8; any other key is a plain global.
      let LuaValue::String(key) = key else {
        return Ok(LuaValue::Nil);
      };
      let Ok(name) = key.to_str() else {
        return Ok(LuaValue::Nil);
      };
      // The registry borrow must end before the store is called.
      let accessor = registry.borrow().accessor(&name);
      match accessor {
        Some(accessor) => accessor.read().map_err(LuaError::external)?.into_lua(lua),
        None => Ok(LuaValue::Nil),
      }
    })
  }

  fn newindex_fn(&self, lua: &Lua) -> LuaResult<LuaFunction> {
    let registry = Rc::clone(&self.registry);
    lua.create_function(move |_, (globals, key, value): (LuaTable, LuaValue, LuaValue)| {
      let name = match &key {
        LuaValue::String(name) => name.to_str().ok().map(|name| name.to_string()),
        _ => None,
      };
      if let Some(name) = name {
        let accessor = registry.borrow().accessor(&name);
        if let Some(accessor) = accessor {
          let value = env_value_from_lua(&name, value)?;
          return accessor.write(value).map_err(LuaError::external);
        }
      }
      globals.raw_set(key, value)
    })
  }

  fn pairs_fn(&self, lua: &Lua) -> LuaResult<LuaFunction> {
    let registry = Rc::clone(&self.registry);
    lua.create_function(move |lua, globals: LuaTable| {
      let mut keys = Vec::new();
      for pair in globals.clone().pairs::<LuaValue, LuaValue>() {
        let (key, _) = pair?;
        keys.push(key);
      }
      let raw_count = keys.len();
      for name in registry.borrow().names() {
        keys.push(LuaValue::String(lua.create_string(&name)?));
      }

      // Bound values are read lazily, when the loop reaches them.
      let registry = Rc::clone(&registry);
      let position = Cell::new(0usize);
      let next = lua.create_function(move |lua, (globals, _): (LuaTable, LuaValue)| {
        let index = position.get();
        let Some(key) = keys.get(index).cloned() else {
          return Ok((LuaValue::Nil, LuaValue::Nil));
        };
        position.set(index + 1);

        if index < raw_count {
          let value: LuaValue = globals.raw_get(key.clone())?;
          return Ok((key, value));
        }

        let accessor = match &key {
          LuaValue::String(name) => match name.to_str() {
            Ok(name) => registry.borrow().accessor(&name),
            Err(_) => None,
          },
          _ => None,
        };
        let value = match accessor {
          Some(accessor) => accessor.read().map_err(LuaError::external)?.into_lua(lua)?,
          None => LuaValue::Nil,
        };
        Ok((key, value))
      })?;

      Ok((next, globals, LuaValue::Nil))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bind::BindError;
  use crate::lua::find_external;
  use crate::store::{MemoryStore, ProcessEnvStore};
  use crate::util::testutil::{FailingStore, QuotaExceeded, QuotaStore};
  use serial_test::serial;

  fn attach(store: Arc<dyn EnvStore>) -> LuaResult<(Lua, EnvGlobals)> {
    let lua = Lua::new();
    let globals = EnvGlobals::attach(&lua, BindingRegistry::new(store))?;
    Ok((lua, globals))
  }

  mod access {
    use super::*;

    #[test]
    fn write_then_read_matches_direct_store_access() -> LuaResult<()> {
      let store = Arc::new(MemoryStore::new());
      let (lua, globals) = attach(store.clone())?;
      globals.install(&lua, "EDITOR")?;

      let seen: String = lua.load(r#"EDITOR = "nvim"; return EDITOR"#).eval()?;

      assert_eq!(seen, "nvim");
      assert_eq!(store.read("EDITOR").unwrap(), EnvValue::from("nvim"));
      Ok(())
    }

    #[test]
    fn values_pass_through_untouched() -> LuaResult<()> {
      let store = Arc::new(MemoryStore::new());
      let (lua, globals) = attach(store.clone())?;
      globals.install(&lua, "COUNT")?;

      let (value, kind): (i64, String) = lua.load("COUNT = 42; return COUNT, math.type(COUNT)").eval()?;

      assert_eq!(value, 42);
      assert_eq!(kind, "integer");
      assert_eq!(store.read("COUNT").unwrap(), EnvValue::Integer(42));
      Ok(())
    }

    #[test]
    #[serial]
    fn process_store_coercion_is_visible() -> LuaResult<()> {
      let name = "ENVBIND_GLOBALS_COERCION";
      temp_env::with_var_unset(name, || -> LuaResult<()> {
        let (lua, globals) = attach(Arc::new(ProcessEnvStore::new()))?;
        globals.install(&lua, name)?;

        let value: String = lua.load(format!("{name} = 7; return {name}")).eval()?;

        assert_eq!(value, "7");
        assert_eq!(std::env::var(name).unwrap(), "7");
        Ok(())
      })
    }

    #[test]
    fn unset_reads_as_nil_and_nil_unsets() -> LuaResult<()> {
      let store = Arc::new(MemoryStore::from_iter([("PAGER", EnvValue::from("less"))]));
      let (lua, globals) = attach(store.clone())?;
      globals.install(&lua, "PAGER")?;
      globals.install(&lua, "MISSING")?;

      let missing_is_nil: bool = lua.load("return MISSING == nil").eval()?;
      assert!(missing_is_nil);

      lua.load("PAGER = nil").exec()?;
      assert_eq!(store.read("PAGER").unwrap(), EnvValue::Unset);
      Ok(())
    }

    #[test]
    fn external_changes_are_visible() -> LuaResult<()> {
      let store = Arc::new(MemoryStore::new());
      let (lua, globals) = attach(store.clone())?;
      globals.install(&lua, "TERM")?;

      store.write("TERM", EnvValue::from("screen")).unwrap();
      let term: String = lua.load("return TERM").eval()?;
      assert_eq!(term, "screen");

      store.write("TERM", EnvValue::from("xterm")).unwrap();
      let term: String = lua.load("return TERM").eval()?;
      assert_eq!(term, "xterm");
      Ok(())
    }

    #[test]
    fn plain_globals_keep_normal_semantics() -> LuaResult<()> {
      let store = Arc::new(MemoryStore::new());
      let (lua, _globals) = attach(store.clone())?;

      let (value, raw): (i64, i64) = lua.load("answer = 41 + 1; return answer, rawget(_G, 'answer')").eval()?;

      assert_eq!(value, 42);
      assert_eq!(raw, 42);
      assert!(store.is_empty());
      Ok(())
    }

    #[test]
    fn removed_binding_reads_nil() -> LuaResult<()> {
      let store = Arc::new(MemoryStore::from_iter([("USER", EnvValue::from("root"))]));
      let (lua, globals) = attach(store.clone())?;
      globals.install(&lua, "USER")?;

      assert!(globals.remove("USER")?);
      let gone: bool = lua.load("return USER == nil").eval()?;

      assert!(gone);
      assert_eq!(store.read("USER").unwrap(), EnvValue::from("root"));
      Ok(())
    }

    #[test]
    fn non_utf8_keys_stay_plain_globals() -> LuaResult<()> {
      let store = Arc::new(MemoryStore::from_iter([("HOME", EnvValue::from("/root"))]));
      let (lua, globals) = attach(store.clone())?;
      globals.install(&lua, "HOME")?;

      let (value, raw, listed): (i64, i64, i64) = lua
        .load(
          r#"
          _G["\255x"] = 1
          local listed = 0
          for k, v in pairs(_G) do
            if k == "\255x" then listed = v end
          end
          return _G["\255x"], rawget(_G, "\255x"), listed
          "#,
        )
        .eval()?;
      let missing: bool = lua.load(r#"return _G["\254"] == nil"#).eval()?;

      assert_eq!((value, raw, listed), (1, 1, 1));
      assert!(missing);
      assert_eq!(store.names(), vec!["HOME"]);
      Ok(())
    }
  }

  mod installation {
    use super::*;

    #[test]
    fn install_never_touches_store() -> LuaResult<()> {
      let store = Arc::new(FailingStore::default());
      let (lua, globals) = attach(store.clone())?;

      globals.install(&lua, "HOME")?;
      globals.install(&lua, "PATH")?;

      assert_eq!(store.accesses(), 0);
      assert!(lua.load("return HOME").exec().is_err());
      assert_eq!(store.accesses(), 1);
      Ok(())
    }

    #[test]
    fn reinstall_is_idempotent() -> LuaResult<()> {
      let (lua, globals) = attach(Arc::new(MemoryStore::new()))?;
      globals.install(&lua, "SHELL")?;
      globals.install(&lua, "SHELL")?;

      let shell: String = lua.load(r#"SHELL = "/bin/zsh"; return SHELL"#).eval()?;

      assert_eq!(shell, "/bin/zsh");
      assert_eq!(globals.len(), 1);
      Ok(())
    }

    #[test]
    fn replaces_configurable_plain_global() -> LuaResult<()> {
      let store = Arc::new(MemoryStore::from_iter([("LANG", EnvValue::from("C.UTF-8"))]));
      let (lua, globals) = attach(store)?;
      lua.load(r#"LANG = "shadow""#).exec()?;

      globals.install(&lua, "LANG")?;

      let lang: String = lua.load("return LANG").eval()?;
      assert_eq!(lang, "C.UTF-8");
      Ok(())
    }

    #[test]
    fn sealed_global_conflicts_and_stays_intact() -> LuaResult<()> {
      let (lua, globals) = attach(Arc::new(MemoryStore::new()))?;
      globals.seal_existing(&lua)?;

      let err = globals.install(&lua, "print").unwrap_err();

      assert_eq!(
        find_external::<BindError>(&err),
        Some(&BindError::Conflict { name: "print".to_string() })
      );
      let kind: String = lua.load("return type(print)").eval()?;
      assert_eq!(kind, "function");
      assert!(!globals.is_bound("print"));
      Ok(())
    }

    #[test]
    fn metatable_is_guarded() -> LuaResult<()> {
      let (lua, _globals) = attach(Arc::new(MemoryStore::new()))?;

      let guard: String = lua.load("return getmetatable(_G)").eval()?;
      assert_eq!(guard, "envbind");
      assert!(lua.load("setmetatable(_G, {})").exec().is_err());
      Ok(())
    }
  }

  mod enumeration {
    use super::*;

    #[test]
    fn pairs_lists_bound_names() -> LuaResult<()> {
      let store = Arc::new(MemoryStore::from_iter([("EDITOR", EnvValue::from("vi"))]));
      let (lua, globals) = attach(store)?;
      globals.install(&lua, "EDITOR")?;
      globals.install(&lua, "UNSET_VAR")?;

      let (editor, unset_seen, print_seen): (String, bool, bool) = lua
        .load(
          r#"
          local editor, unset_seen, print_seen
          for k, v in pairs(_G) do
            if k == "EDITOR" then editor = v end
            if k == "UNSET_VAR" then unset_seen = (v == nil) end
            if k == "print" then print_seen = true end
          end
          return editor, unset_seen, print_seen
        "#,
        )
        .eval()?;

      assert_eq!(editor, "vi");
      assert!(unset_seen);
      assert!(print_seen);
      Ok(())
    }

    #[test]
    fn names_does_not_touch_store() -> LuaResult<()> {
      let store = Arc::new(FailingStore::default());
      let (lua, globals) = attach(store.clone())?;
      globals.install(&lua, "B")?;
      globals.install(&lua, "A")?;

      assert_eq!(globals.names(), vec!["A", "B"]);
      assert_eq!(store.accesses(), 0);
      Ok(())
    }
  }

  mod errors {
    use super::*;
    use crate::util::testutil::{DeniedStore, ReadDenied};

    #[test]
    fn store_read_error_reaches_caller_unchanged() -> LuaResult<()> {
      let (lua, globals) = attach(Arc::new(DeniedStore))?;
      globals.install(&lua, "SECRET")?;

      let err = lua.load("return SECRET").eval::<LuaValue>().unwrap_err();

      assert_eq!(
        find_external::<ReadDenied>(&err),
        Some(&ReadDenied { name: "SECRET".to_string() })
      );
      Ok(())
    }

    #[test]
    fn store_read_error_surfaces_from_pairs() -> LuaResult<()> {
      let (lua, globals) = attach(Arc::new(DeniedStore))?;
      globals.install(&lua, "SECRET")?;

      let err = lua.load("for _ in pairs(_G) do end").exec().unwrap_err();

      assert!(find_external::<ReadDenied>(&err).is_some());
      Ok(())
    }

    #[test]
    fn store_write_error_reaches_caller_unchanged() -> LuaResult<()> {
      let (lua, globals) = attach(Arc::new(QuotaStore::new("X")))?;
      globals.install(&lua, "X")?;

      let err = lua.load("X = 42").exec().unwrap_err();

      assert_eq!(
        find_external::<QuotaExceeded>(&err),
        Some(&QuotaExceeded { name: "X".to_string() })
      );
      Ok(())
    }

    #[test]
    fn store_errors_are_catchable_in_lua() -> LuaResult<()> {
      let (lua, globals) = attach(Arc::new(QuotaStore::new("X")))?;
      globals.install(&lua, "X")?;

      let (ok, message): (bool, String) = lua
        .load("local ok, err = pcall(function() X = 42 end); return ok, tostring(err)")
        .eval()?;

      assert!(!ok);
      assert!(message.contains("quota exceeded for 'X'"), "unexpected message: {}", message);
      Ok(())
    }

    #[test]
    fn table_assignment_is_rejected() -> LuaResult<()> {
      let store = Arc::new(MemoryStore::new());
      let (lua, globals) = attach(store.clone())?;
      globals.install(&lua, "PATH")?;

      let err = lua.load("PATH = { '/bin' }").exec().unwrap_err();

      assert!(matches!(
        find_external::<BindError>(&err),
        Some(BindError::UnsupportedValue { type_name: "table", .. })
      ));
      assert!(store.is_empty());
      Ok(())
    }
  }
}
