//! Environment stores backing the global bindings.
//!
//! A store is the external collaborator that owns every value: bindings never
//! cache, they forward each access to [`EnvStore::read`] or
//! [`EnvStore::write`]. Two stores ship with the crate:
//!
//! - [`ProcessEnvStore`] - the live process environment (`std::env`)
//! - [`MemoryStore`] - an in-memory map, optionally seeded from the process

mod memory;
mod process;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryStore;
pub use process::ProcessEnvStore;

/// Error raised by a store during a read or write.
///
/// Boxed so a collaborator's own error type travels through the binding
/// untouched and the caller can downcast it back.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A value read from or written to an environment store.
///
/// `Unset` is the absent-value representation: reading an unset variable
/// yields it, and writing it removes the variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
  #[default]
  Unset,
  Boolean(bool),
  Integer(i64),
  Number(f64),
  Text(String),
}

impl EnvValue {
  pub fn is_unset(&self) -> bool {
    matches!(self, EnvValue::Unset)
  }

  /// The text stored by stores that only keep strings.
  ///
  /// Returns `None` for `Unset`.
  pub fn to_env_string(&self) -> Option<String> {
    match self {
      EnvValue::Unset => None,
      EnvValue::Boolean(b) => Some(b.to_string()),
      EnvValue::Integer(i) => Some(i.to_string()),
      EnvValue::Number(n) => Some(n.to_string()),
      EnvValue::Text(s) => Some(s.clone()),
    }
  }
}

impl fmt::Display for EnvValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.to_env_string() {
      Some(s) => f.write_str(&s),
      None => f.write_str("<unset>"),
    }
  }
}

impl From<&str> for EnvValue {
  fn from(value: &str) -> Self {
    EnvValue::Text(value.to_string())
  }
}

impl From<String> for EnvValue {
  fn from(value: String) -> Self {
    EnvValue::Text(value)
  }
}

impl From<i64> for EnvValue {
  fn from(value: i64) -> Self {
    EnvValue::Integer(value)
  }
}

impl From<bool> for EnvValue {
  fn from(value: bool) -> Self {
    EnvValue::Boolean(value)
  }
}

impl From<Option<String>> for EnvValue {
  fn from(value: Option<String>) -> Self {
    value.map(EnvValue::Text).unwrap_or_default()
  }
}

/// Key-value environment store.
///
/// Both operations are synchronous. `read` must not fail for a name that is
/// simply unset; it returns [`EnvValue::Unset`] instead.
pub trait EnvStore: Send + Sync {
  fn read(&self, name: &str) -> Result<EnvValue, StoreError>;

  fn write(&self, name: &str, value: EnvValue) -> Result<(), StoreError>;

  /// Short human-readable store name for diagnostics.
  fn kind(&self) -> &'static str {
    "custom"
  }
}

/// Errors raised by the built-in stores.
#[derive(Debug, Error, PartialEq)]
pub enum EnvError {
  #[error("environment variable '{name}' is read-only")]
  ReadOnly { name: String },

  #[error("invalid environment variable name '{name}'")]
  InvalidName { name: String },

  #[error("invalid value for environment variable '{name}': {reason}")]
  InvalidValue { name: String, reason: &'static str },

  #[error("environment variable '{name}' is not valid unicode")]
  NotUnicode { name: String },
}

/// Checks that the platform environment can hold `name`.
///
/// `std::env::set_var` panics on these inputs, so both stores refuse them up
/// front to keep the two interchangeable.
pub(crate) fn check_name(name: &str) -> Result<(), EnvError> {
  if name.is_empty() || name.contains('=') || name.contains('\0') {
    return Err(EnvError::InvalidName { name: name.to_string() });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unset_is_default() {
    assert_eq!(EnvValue::default(), EnvValue::Unset);
    assert!(EnvValue::Unset.is_unset());
    assert!(!EnvValue::from("x").is_unset());
  }

  #[test]
  fn env_string_rendering() {
    assert_eq!(EnvValue::Unset.to_env_string(), None);
    assert_eq!(EnvValue::Boolean(true).to_env_string().as_deref(), Some("true"));
    assert_eq!(EnvValue::Integer(42).to_env_string().as_deref(), Some("42"));
    assert_eq!(EnvValue::Number(1.5).to_env_string().as_deref(), Some("1.5"));
    assert_eq!(EnvValue::from("nvim").to_env_string().as_deref(), Some("nvim"));
  }

  #[test]
  fn display_marks_unset() {
    assert_eq!(EnvValue::Unset.to_string(), "<unset>");
    assert_eq!(EnvValue::Integer(7).to_string(), "7");
  }

  #[test]
  fn serializes_untagged() {
    assert_eq!(serde_json::to_string(&EnvValue::from("a")).unwrap(), "\"a\"");
    assert_eq!(serde_json::to_string(&EnvValue::Integer(3)).unwrap(), "3");
    assert_eq!(serde_json::to_string(&EnvValue::Unset).unwrap(), "null");
  }

  #[test]
  fn rejects_unrepresentable_names() {
    assert!(check_name("PATH").is_ok());
    assert!(check_name("").is_err());
    assert!(check_name("A=B").is_err());
    assert!(check_name("A\0B").is_err());
  }
}
