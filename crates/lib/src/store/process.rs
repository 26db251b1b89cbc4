//! Store backed by the live process environment.

use std::collections::BTreeSet;
use std::env::{self, VarError};

use tracing::debug;

use super::{EnvError, EnvStore, EnvValue, StoreError, check_name};

/// Reads and writes `std::env`.
///
/// Values are kept as strings: integers, floats and booleans are stored in
/// their decimal/`true`/`false` rendering and read back as text. Writing
/// [`EnvValue::Unset`] removes the variable.
///
/// Mutating the process environment is only sound while no other thread reads
/// or writes it. Hosts that share this store across threads must serialise
/// access themselves.
#[derive(Debug, Default, Clone)]
pub struct ProcessEnvStore {
  read_only: BTreeSet<String>,
}

impl ProcessEnvStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Refuse writes to the given names.
  pub fn with_read_only<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.read_only.extend(names.into_iter().map(Into::into));
    self
  }

  pub fn is_read_only(&self, name: &str) -> bool {
    self.read_only.contains(name)
  }

  /// Names of all variables currently set in the process environment.
  ///
  /// Variables whose names are not valid unicode are skipped.
  pub fn names() -> Vec<String> {
    let mut names: Vec<String> = env::vars_os()
      .filter_map(|(key, _)| key.into_string().ok())
      .collect();
    names.sort();
    names
  }
}

impl EnvStore for ProcessEnvStore {
  fn read(&self, name: &str) -> Result<EnvValue, StoreError> {
    match env::var(name) {
      Ok(value) => Ok(EnvValue::Text(value)),
      Err(VarError::NotPresent) => Ok(EnvValue::Unset),
      Err(VarError::NotUnicode(_)) => Err(EnvError::NotUnicode { name: name.to_string() }.into()),
    }
  }

  fn write(&self, name: &str, value: EnvValue) -> Result<(), StoreError> {
    check_name(name)?;
    if self.is_read_only(name) {
      return Err(EnvError::ReadOnly { name: name.to_string() }.into());
    }

    match value.to_env_string() {
      Some(text) => {
        if text.contains('\0') {
          return Err(
            EnvError::InvalidValue {
              name: name.to_string(),
              reason: "contains a NUL byte",
            }
            .into(),
          );
        }
        // SAFETY: the name and value were checked above, and callers are
        // documented to serialise access to the process environment.
        unsafe { env::set_var(name, &text) };
        debug!(name, "set process environment variable");
      }
      None => {
        // SAFETY: see above.
        unsafe { env::remove_var(name) };
        debug!(name, "removed process environment variable");
      }
    }

    Ok(())
  }

  fn kind(&self) -> &'static str {
    "process"
  }
}
