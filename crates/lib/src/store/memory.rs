//! In-memory environment store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{EnvError, EnvStore, EnvValue, StoreError, check_name};
use crate::store::ProcessEnvStore;

/// Map-backed store that keeps values exactly as written.
///
/// Used for isolated runs (seeded from the process environment so scripts
/// cannot change the real one) and by embedders that own their variables.
#[derive(Debug, Default)]
pub struct MemoryStore {
  vars: RwLock<BTreeMap<String, EnvValue>>,
  read_only: BTreeSet<String>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot of the current process environment.
  pub fn from_process_env() -> Self {
    let store = ProcessEnvStore::new();
    Self::from_iter(
      ProcessEnvStore::names()
        .into_iter()
        .filter_map(|name| store.read(&name).ok().map(|value| (name, value))),
    )
  }

  pub fn with_read_only<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.read_only.extend(names.into_iter().map(Into::into));
    self
  }

  pub fn len(&self) -> usize {
    self.vars().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Sorted names of all set variables.
  pub fn names(&self) -> Vec<String> {
    self.vars().keys().cloned().collect()
  }
}

impl MemoryStore {
  // Every write leaves the map consistent, so a poisoned lock is still usable.
  fn vars(&self) -> RwLockReadGuard<'_, BTreeMap<String, EnvValue>> {
    self.vars.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn vars_mut(&self) -> RwLockWriteGuard<'_, BTreeMap<String, EnvValue>> {
    self.vars.write().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<K: Into<String>> FromIterator<(K, EnvValue)> for MemoryStore {
  fn from_iter<T: IntoIterator<Item = (K, EnvValue)>>(iter: T) -> Self {
    let vars = iter
      .into_iter()
      .filter(|(_, value)| !value.is_unset())
      .map(|(name, value)| (name.into(), value))
      .collect();
    Self {
      vars: RwLock::new(vars),
      read_only: BTreeSet::new(),
    }
  }
}

impl EnvStore for MemoryStore {
  fn read(&self, name: &str) -> Result<EnvValue, StoreError> {
    let vars = self.vars();
    Ok(vars.get(name).cloned().unwrap_or_default())
  }

  fn write(&self, name: &str, value: EnvValue) -> Result<(), StoreError> {
    check_name(name)?;
    if self.read_only.contains(name) {
      return Err(EnvError::ReadOnly { name: name.to_string() }.into());
    }

    let mut vars = self.vars_mut();
    if value.is_unset() {
      vars.remove(name);
    } else {
      vars.insert(name.to_string(), value);
    }
    Ok(())
  }

  fn kind(&self) -> &'static str {
    "memory"
  }
}
