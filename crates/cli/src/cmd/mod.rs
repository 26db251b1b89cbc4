mod eval;
mod info;
mod list;
mod repl;
mod run;

pub use eval::cmd_eval;
pub use info::cmd_info;
pub use list::cmd_list;
pub use repl::cmd_repl;
pub use run::cmd_run;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use envbind_lib::config::Config;
use envbind_lib::paths;
use envbind_lib::session::{Session, StoreMode};

/// Configuration and store choice shared by every command.
pub struct Host {
  config_path: Option<PathBuf>,
  config: Config,
  mode: StoreMode,
}

impl Host {
  /// Resolve and load the configuration.
  ///
  /// An explicit `--config` path must exist; the default location may be
  /// missing, in which case defaults apply.
  pub fn load(explicit: Option<PathBuf>, mode: StoreMode) -> Result<Self> {
    let (config_path, config) = match explicit {
      Some(path) => {
        let config = Config::load(&path).context("Failed to load configuration")?;
        (Some(path), config)
      }
      None => match paths::config_path() {
        Some(path) => {
          let config = Config::load_or_default(&path).context("Failed to load configuration")?;
          (Some(path), config)
        }
        None => (None, Config::default()),
      },
    };

    Ok(Self {
      config_path,
      config,
      mode,
    })
  }

  pub fn config_path(&self) -> Option<&Path> {
    self.config_path.as_deref()
  }

  pub fn mode(&self) -> StoreMode {
    self.mode
  }

  /// Create a session with every exposed name bound.
  ///
  /// With `startup` set, the configured startup script runs first.
  pub fn open_session(&self, startup: bool) -> Result<Session> {
    let session = Session::new(self.config.clone(), self.mode).context("Failed to create Lua runtime")?;
    if startup {
      session.run_startup().context("Startup script failed")?;
    }
    Ok(session)
  }
}
