//! List command implementation.
//!
//! Shows every enumerable binding with the value its store currently holds.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use envbind_lib::store::EnvValue;

use crate::cmd::Host;
use crate::output::{OutputFormat, print_info, print_json, print_stat};

pub fn cmd_list(host: &Host, format: OutputFormat) -> Result<()> {
  let session = host.open_session(false)?;
  let bindings = session.bindings().context("Failed to read bindings")?;

  if format.is_json() {
    let map: BTreeMap<&str, &EnvValue> = bindings.iter().map(|(name, value)| (name.as_str(), value)).collect();
    return print_json(&map);
  }

  if bindings.is_empty() {
    print_info("No environment bindings.");
    return Ok(());
  }
  for (name, value) in &bindings {
    print_stat(name, &value.to_string());
  }
  Ok(())
}
