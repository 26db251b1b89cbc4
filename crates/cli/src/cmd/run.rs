//! Implementation of the `envbind run` command.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::cmd::Host;
use crate::output::format_value;

/// Execute a Lua script with environment globals installed.
///
/// A non-nil value returned by the script is printed.
pub fn cmd_run(host: &Host, script: &Path) -> Result<()> {
  if !script.exists() {
    bail!("Script not found: {}", script.display());
  }

  let session = host.open_session(true)?;
  let value = session
    .run_file(script)
    .with_context(|| format!("Failed to run {}", script.display()))?;

  if !value.is_nil() {
    println!("{}", format_value(&value));
  }
  Ok(())
}
