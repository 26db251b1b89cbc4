//! A Lua runtime with the configured environment bindings installed.
//!
//! This is the surrounding system the binding core was built for: it picks the
//! store, creates the runtime, installs one binding per exposed name at
//! startup and then evaluates user code.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use mlua::prelude::*;
use tracing::{debug, info, warn};

use crate::bind::{BindError, BindingRegistry};
use crate::config::{Config, ConfigError};
use crate::history::{History, HistoryError};
use crate::lua::host::register_history;
use crate::lua::runtime::{create_runtime, eval_chunk, load_file};
use crate::lua::{EnvGlobals, find_external};
use crate::store::{EnvStore, EnvValue, MemoryStore, ProcessEnvStore};

/// Errors that can occur while setting up or using a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
  /// Lua evaluation error.
  #[error("lua error: {0}")]
  Lua(#[from] LuaError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  History(#[from] HistoryError),
}

/// Which store backs the session's bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreMode {
  /// The live process environment.
  #[default]
  Process,
  /// A snapshot of the process environment; writes stay in memory.
  Isolated,
}

impl StoreMode {
  fn create_store(self, config: &Config) -> Arc<dyn EnvStore> {
    let read_only = config.read_only.iter().cloned();
    match self {
      StoreMode::Process => Arc::new(ProcessEnvStore::new().with_read_only(read_only)),
      StoreMode::Isolated => Arc::new(MemoryStore::from_process_env().with_read_only(read_only)),
    }
  }
}

pub struct Session {
  lua: Lua,
  globals: EnvGlobals,
  config: Config,
  skipped: Vec<String>,
  history: Rc<RefCell<History>>,
}

impl Session {
  pub fn new(config: Config, mode: StoreMode) -> Result<Self, SessionError> {
    let store = mode.create_store(&config);
    Self::with_store(config, store)
  }

  /// Create a session over a caller-supplied store.
  ///
  /// Names that collide with a sealed global (a Lua builtin such as `print`)
  /// are skipped with a warning rather than failing the whole session.
  pub fn with_store(config: Config, store: Arc<dyn EnvStore>) -> Result<Self, SessionError> {
    let (lua, globals) = create_runtime(BindingRegistry::new(store))?;

    let mut skipped = Vec::new();
    for name in config.exposed_names(ProcessEnvStore::names()) {
      match globals.install(&lua, &name) {
        Ok(()) => {}
        Err(err) if find_external::<BindError>(&err).is_some() => {
          warn!(name, "skipping environment variable that shadows a builtin global");
          skipped.push(name);
        }
        Err(err) => return Err(err.into()),
      }
    }

    let history = match config.history_path()? {
      Some(path) => History::load(path)?,
      None => History::in_memory(),
    };
    let history = Rc::new(RefCell::new(history));
    register_history(&lua, Rc::clone(&history))?;

    info!(bound = globals.len(), skipped = skipped.len(), "installed environment globals");
    Ok(Self {
      lua,
      globals,
      config,
      skipped,
      history,
    })
  }

  pub fn lua(&self) -> &Lua {
    &self.lua
  }

  pub fn globals(&self) -> &EnvGlobals {
    &self.globals
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Names that could not be bound because they collide with builtins.
  pub fn skipped(&self) -> &[String] {
    &self.skipped
  }

  /// Evaluate the configured startup script, if there is one.
  ///
  /// A configured script that does not exist is reported and ignored.
  pub fn run_startup(&self) -> Result<(), SessionError> {
    let Some(path) = self.config.startup_path()? else {
      return Ok(());
    };
    if !path.exists() {
      warn!(path = %path.display(), "startup script does not exist");
      return Ok(());
    }
    debug!(path = %path.display(), "running startup script");
    load_file(&self.lua, &path)?;
    Ok(())
  }

  /// Evaluate a Lua file and return its result.
  pub fn run_file(&self, path: &Path) -> Result<LuaValue, SessionError> {
    Ok(load_file(&self.lua, path)?)
  }

  /// Evaluate an expression or statements.
  pub fn eval(&self, source: &str) -> LuaResult<LuaMultiValue> {
    eval_chunk(&self.lua, source, "eval")
  }

  /// Record one line of interactive input.
  pub fn record(&self, line: &str) {
    self.history.borrow_mut().push(line);
  }

  /// Recorded input, oldest first.
  pub fn history(&self) -> Vec<String> {
    self.history.borrow().entries().to_vec()
  }

  /// Persist the input history to the configured file.
  pub fn save_history(&self) -> Result<(), SessionError> {
    Ok(self.history.borrow().save()?)
  }

  /// Current value of every exposed binding, in name order.
  pub fn bindings(&self) -> Result<Vec<(String, EnvValue)>, SessionError> {
    let mut bindings = Vec::new();
    for name in self.globals.names() {
      if let Some(value) = self.globals.read(&name) {
        bindings.push((name, value?));
      }
    }
    Ok(bindings)
  }
}
