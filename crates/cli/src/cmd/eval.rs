use anyhow::{Context, Result};

use crate::cmd::Host;
use crate::output::print_values;

pub fn cmd_eval(host: &Host, code: &str) -> Result<()> {
  let session = host.open_session(true)?;
  let values = session.eval(code).context("Evaluation failed")?;
  print_values(&values);
  Ok(())
}
