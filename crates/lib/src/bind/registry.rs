use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::BindError;
use super::types::{Accessor, Attributes, Slot, StoreBinding};
use crate::store::{EnvStore, EnvValue, StoreError};

/// Name-keyed namespace of accessor pairs.
///
/// Uses a [`BTreeMap`] so enumeration order is stable.
pub struct BindingRegistry {
  store: Arc<dyn EnvStore>,
  slots: BTreeMap<String, Slot>,
}

impl BindingRegistry {
  /// Create an empty registry whose installed bindings forward to `store`.
  pub fn new(store: Arc<dyn EnvStore>) -> Self {
    Self {
      store,
      slots: BTreeMap::new(),
    }
  }

  pub fn store(&self) -> &Arc<dyn EnvStore> {
    &self.store
  }

  /// Install a configurable, enumerable binding for `name`.
  ///
  /// Does not touch the store. Reinstalling a name replaces the previous
  /// accessor pair. Fails with [`BindError::Conflict`] when the name is held by
  /// a non-configurable slot, which is left as it was.
  pub fn install(&mut self, name: &str) -> Result<(), BindError> {
    let binding = StoreBinding::new(name, Arc::clone(&self.store));
    self.define(name, Arc::new(binding), Attributes::INSTALLED)
  }

  /// Install a binding for each name, stopping at the first conflict.
  ///
  /// Returns the number of bindings installed.
  pub fn install_all<I, S>(&mut self, names: I) -> Result<usize, BindError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut count = 0;
    for name in names {
      self.install(name.as_ref())?;
      count += 1;
    }
    info!(count, store = self.store.kind(), "installed environment bindings");
    Ok(count)
  }

  /// Define `name` with a caller-supplied accessor and attributes.
  pub fn define(
    &mut self,
    name: &str,
    accessor: Arc<dyn Accessor>,
    attributes: Attributes,
  ) -> Result<(), BindError> {
    self.ensure_configurable(name)?;
    let replaced = self
      .slots
      .insert(name.to_string(), Slot::Bound { accessor, attributes })
      .is_some();
    debug!(name, replaced, "defined binding");
    Ok(())
  }

  /// Mark `name` as held by a non-configurable global owned elsewhere.
  ///
  /// Sealing an already sealed name is a no-op.
  pub fn seal(&mut self, name: &str) -> Result<(), BindError> {
    if matches!(self.slots.get(name), Some(Slot::Sealed)) {
      return Ok(());
    }
    self.ensure_configurable(name)?;
    self.slots.insert(name.to_string(), Slot::Sealed);
    Ok(())
  }

  /// Remove the binding for `name`.
  ///
  /// Returns whether a binding was removed.
  pub fn remove(&mut self, name: &str) -> Result<bool, BindError> {
    self.ensure_configurable(name)?;
    let removed = self.slots.remove(name).is_some();
    if removed {
      debug!(name, "removed binding");
    }
    Ok(removed)
  }

  pub fn slot(&self, name: &str) -> Option<&Slot> {
    self.slots.get(name)
  }

  /// The accessor bound to `name`, if any.
  pub fn accessor(&self, name: &str) -> Option<Arc<dyn Accessor>> {
    match self.slots.get(name) {
      Some(Slot::Bound { accessor, .. }) => Some(Arc::clone(accessor)),
      _ => None,
    }
  }

  /// Read `name` through its binding, or `None` when it is not bound.
  pub fn read(&self, name: &str) -> Option<Result<EnvValue, StoreError>> {
    let accessor = self.accessor(name)?;
    Some(accessor.read().inspect_err(|err| debug!(name, error = %err, "store read failed")))
  }

  /// Write `value` through the binding for `name`, or `None` when it is not bound.
  pub fn write(&self, name: &str, value: EnvValue) -> Option<Result<(), StoreError>> {
    let accessor = self.accessor(name)?;
    Some(
      accessor
        .write(value)
        .inspect_err(|err| debug!(name, error = %err, "store write failed")),
    )
  }

  pub fn is_bound(&self, name: &str) -> bool {
    matches!(self.slots.get(name), Some(Slot::Bound { .. }))
  }

  pub fn is_sealed(&self, name: &str) -> bool {
    matches!(self.slots.get(name), Some(Slot::Sealed))
  }

  /// Sorted names of all enumerable bindings.
  pub fn names(&self) -> Vec<String> {
    self
      .slots
      .iter()
      .filter_map(|(name, slot)| match slot {
        Slot::Bound { attributes, .. } if attributes.enumerable => Some(name.clone()),
        _ => None,
      })
      .collect()
  }

  /// Number of bindings, enumerable or not.
  pub fn len(&self) -> usize {
    self
      .slots
      .values()
      .filter(|slot| matches!(slot, Slot::Bound { .. }))
      .count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn ensure_configurable(&self, name: &str) -> Result<(), BindError> {
    match self.slots.get(name) {
      Some(slot) if !slot.is_configurable() => Err(BindError::Conflict { name: name.to_string() }),
      _ => Ok(()),
    }
  }
}
