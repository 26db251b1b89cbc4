//! Test stores for exercising bindings.
//!
//! These stores misbehave on purpose so tests can check that bindings stay
//! lazy and forward store failures untouched.

use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::store::{EnvStore, EnvValue, StoreError};

/// Store that fails every access and counts how often it was hit.
#[derive(Debug, Default)]
pub struct FailingStore {
  accesses: AtomicUsize,
}

impl FailingStore {
  pub fn accesses(&self) -> usize {
    self.accesses.load(Ordering::SeqCst)
  }
}

impl EnvStore for FailingStore {
  fn read(&self, name: &str) -> Result<EnvValue, StoreError> {
    self.accesses.fetch_add(1, Ordering::SeqCst);
    Err(format!("store unavailable: read {}", name).into())
  }

  fn write(&self, name: &str, _value: EnvValue) -> Result<(), StoreError> {
    self.accesses.fetch_add(1, Ordering::SeqCst);
    Err(format!("store unavailable: write {}", name).into())
  }
}

#[derive(Debug, Error, PartialEq)]
#[error("quota exceeded for '{name}'")]
pub struct QuotaExceeded {
  pub name: String,
}

/// Store whose writes to one name always exceed the quota.
#[derive(Debug)]
pub struct QuotaStore {
  full: String,
}

impl QuotaStore {
  pub fn new(full: &str) -> Self {
    Self { full: full.to_string() }
  }
}

impl EnvStore for QuotaStore {
  fn read(&self, _name: &str) -> Result<EnvValue, StoreError> {
    Ok(EnvValue::Unset)
  }

  fn write(&self, name: &str, _value: EnvValue) -> Result<(), StoreError> {
    if name == self.full {
      return Err(QuotaExceeded { name: name.to_string() }.into());
    }
    Ok(())
  }
}

#[derive(Debug, Error, PartialEq)]
#[error("read of '{name}' denied")]
pub struct ReadDenied {
  pub name: String,
}

/// Store that refuses every read with a typed error.
#[derive(Debug)]
pub struct DeniedStore;

impl EnvStore for DeniedStore {
  fn read(&self, name: &str) -> Result<EnvValue, StoreError> {
    Err(ReadDenied { name: name.to_string() }.into())
  }

  fn write(&self, _name: &str, _value: EnvValue) -> Result<(), StoreError> {
    Ok(())
  }
}
