//! Well-known filesystem locations and path expansion.

use std::env::VarError;
use std::path::PathBuf;

use crate::consts::{APP_NAME, CONFIG_ENV_VAR, CONFIG_FILENAME};

/// Failure to expand a `$VAR` reference in a configured path.
pub type ExpandError = shellexpand::LookupError<VarError>;

/// Returns the directory for configuration files for the application
pub fn config_dir() -> Option<PathBuf> {
  dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Path of the configuration file.
///
/// `ENVBIND_CONFIG` wins over the platform config directory.
pub fn config_path() -> Option<PathBuf> {
  if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
    return Some(PathBuf::from(path));
  }
  config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Expand a leading `~` and any `$VAR` or `${VAR}` references.
///
/// Fails when a referenced variable is not set.
pub fn expand_path(path: &str) -> Result<PathBuf, ExpandError> {
  Ok(PathBuf::from(shellexpand::full(path)?.into_owned()))
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn config_dir_prefers_xdg() {
    temp_env::with_var("XDG_CONFIG_HOME", Some("/xdg"), || {
      assert_eq!(config_dir(), Some(PathBuf::from("/xdg/envbind")));
    });
  }

  #[test]
  #[serial]
  fn config_dir_falls_back_to_home() {
    temp_env::with_vars([("XDG_CONFIG_HOME", None), ("HOME", Some("/home/me"))], || {
      assert_eq!(config_dir(), Some(PathBuf::from("/home/me/.config/envbind")));
    });
  }

  #[test]
  #[serial]
  fn config_path_honours_override() {
    temp_env::with_var(CONFIG_ENV_VAR, Some("/etc/envbind.toml"), || {
      assert_eq!(config_path(), Some(PathBuf::from("/etc/envbind.toml")));
    });
  }

  #[test]
  #[serial]
  fn expands_leading_tilde_only() {
    temp_env::with_var("HOME", Some("/home/me"), || {
      assert_eq!(expand_path("~/.envbind.lua").unwrap(), PathBuf::from("/home/me/.envbind.lua"));
      assert_eq!(expand_path("~").unwrap(), PathBuf::from("/home/me"));
      assert_eq!(expand_path("/opt/~/x").unwrap(), PathBuf::from("/opt/~/x"));
    });
  }

  #[test]
  #[serial]
  fn expands_variables() {
    temp_env::with_vars(
      [("HOME", Some("/home/me")), ("ENVBIND_PATHS_DIR", Some("/srv/scripts"))],
      || {
        assert_eq!(expand_path("$HOME/.envbind.lua").unwrap(), PathBuf::from("/home/me/.envbind.lua"));
        assert_eq!(
          expand_path("${ENVBIND_PATHS_DIR}/init.lua").unwrap(),
          PathBuf::from("/srv/scripts/init.lua")
        );
      },
    );
  }

  #[test]
  #[serial]
  fn unset_variable_fails_expansion() {
    temp_env::with_var_unset("ENVBIND_PATHS_MISSING", || {
      let err = expand_path("$ENVBIND_PATHS_MISSING/x.lua").unwrap_err();
      assert_eq!(err.var_name, "ENVBIND_PATHS_MISSING");
    });
  }
}
