//! Host configuration.
//!
//! Decides which environment variables become globals and how the store
//! treats them. Loaded from TOML:
//!
//! ```toml
//! expose_process_env = true
//! names = ["EDITOR", "PAGER"]
//! exclude = ["AWS_SECRET_ACCESS_KEY"]
//! read_only = ["HOME"]
//! startup = "~/.envbind.lua"
//! history = "$XDG_STATE_HOME/envbind/history"
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::DEFAULT_HISTORY;
use crate::paths::{ExpandError, expand_path};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("failed to expand path '{path}': {source}")]
  Expand {
    path: String,
    #[source]
    source: ExpandError,
  },
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Expose every variable present in the process environment at startup.
  pub expose_process_env: bool,
  /// Extra names to expose, whether or not they are set.
  pub names: Vec<String>,
  /// Names never exposed.
  pub exclude: Vec<String>,
  /// Names the store refuses to write.
  pub read_only: Vec<String>,
  /// Script evaluated before anything else.
  pub startup: Option<String>,
  /// REPL history file. Empty disables history.
  pub history: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      expose_process_env: true,
      names: Vec::new(),
      exclude: Vec::new(),
      read_only: Vec::new(),
      startup: None,
      history: DEFAULT_HISTORY.to_string(),
    }
  }
}

impl Config {
  pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load the config at `path`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config = Self::from_toml(&content, path)?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
  }

  /// Load the config at `path`, falling back to defaults when it does not exist.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      debug!(path = %path.display(), "config not found, using defaults");
      return Ok(Self::default());
    }
    Self::load(path)
  }

  /// Sorted, de-duplicated names to expose as globals.
  ///
  /// `process_names` are the variables currently set in the environment; they
  /// are only used when `expose_process_env` is on.
  pub fn exposed_names<I>(&self, process_names: I) -> Vec<String>
  where
    I: IntoIterator<Item = String>,
  {
    let mut names: BTreeSet<String> = self.names.iter().cloned().collect();
    if self.expose_process_env {
      names.extend(process_names);
    }
    for excluded in &self.exclude {
      names.remove(excluded);
    }
    names.into_iter().collect()
  }

  /// Startup script path with `~` and variables expanded.
  pub fn startup_path(&self) -> Result<Option<PathBuf>, ConfigError> {
    self.startup.as_deref().map(expand).transpose()
  }

  /// History file path with `~` and variables expanded.
  pub fn history_path(&self) -> Result<Option<PathBuf>, ConfigError> {
    if self.history.is_empty() {
      return Ok(None);
    }
    expand(&self.history).map(Some)
  }
}

fn expand(path: &str) -> Result<PathBuf, ConfigError> {
  expand_path(path).map_err(|source| ConfigError::Expand {
    path: path.to_string(),
    source,
  })
}
