use std::fmt;
use std::sync::Arc;

use crate::store::{EnvStore, EnvValue, StoreError};

/// A getter/setter pair standing in for a variable.
pub trait Accessor: Send + Sync {
  fn name(&self) -> &str;

  fn read(&self) -> Result<EnvValue, StoreError>;

  fn write(&self, value: EnvValue) -> Result<(), StoreError>;
}

/// Accessor that forwards to an environment store.
///
/// Holds no value of its own, only the key and the store it relates to.
#[derive(Clone)]
pub struct StoreBinding {
  name: String,
  store: Arc<dyn EnvStore>,
}

impl StoreBinding {
  pub fn new(name: impl Into<String>, store: Arc<dyn EnvStore>) -> Self {
    Self {
      name: name.into(),
      store,
    }
  }
}

impl Accessor for StoreBinding {
  fn name(&self) -> &str {
    &self.name
  }

  fn read(&self) -> Result<EnvValue, StoreError> {
    self.store.read(&self.name)
  }

  fn write(&self, value: EnvValue) -> Result<(), StoreError> {
    self.store.write(&self.name, value)
  }
}

impl fmt::Debug for StoreBinding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StoreBinding")
      .field("name", &self.name)
      .field("store", &self.store.kind())
      .finish()
  }
}

/// Property attributes of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attributes {
  /// A later definition or removal of the same name succeeds.
  pub configurable: bool,
  /// The name shows up when the namespace is enumerated.
  pub enumerable: bool,
}

impl Attributes {
  /// Attributes given to every installed environment binding.
  pub const INSTALLED: Attributes = Attributes {
    configurable: true,
    enumerable: true,
  };

  pub const LOCKED: Attributes = Attributes {
    configurable: false,
    enumerable: true,
  };
}

impl Default for Attributes {
  fn default() -> Self {
    Self::INSTALLED
  }
}

/// What occupies a name in the namespace.
#[derive(Clone)]
pub enum Slot {
  Bound {
    accessor: Arc<dyn Accessor>,
    attributes: Attributes,
  },
  /// A non-configurable global owned by someone else.
  Sealed,
}

impl Slot {
  pub fn is_configurable(&self) -> bool {
    match self {
      Slot::Bound { attributes, .. } => attributes.configurable,
      Slot::Sealed => false,
    }
  }
}

impl fmt::Debug for Slot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Slot::Bound { accessor, attributes } => f
        .debug_struct("Bound")
        .field("name", &accessor.name())
        .field("attributes", attributes)
        .finish(),
      Slot::Sealed => f.write_str("Sealed"),
    }
  }
}
