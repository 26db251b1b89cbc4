//! Line-oriented read-eval-print loop.
//!
//! Each line is evaluated on its own. Errors are reported and the loop goes
//! on; `exit` or end of input stops it. Entered lines are appended to the
//! history, which is written back when the loop ends.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use mlua::Error as LuaError;

use crate::cmd::Host;
use crate::output::{print_error, print_values};

const PROMPT: &str = ">";

pub fn cmd_repl(host: &Host) -> Result<()> {
  let session = host.open_session(true)?;
  let stdin = io::stdin();
  let interactive = stdin.is_terminal();
  let mut input = stdin.lock();
  let mut line = String::new();

  loop {
    if interactive {
      print!("{} ", PROMPT);
      io::stdout().flush()?;
    }

    line.clear();
    if input.read_line(&mut line)? == 0 {
      break;
    }
    let source = line.trim();
    if source.is_empty() {
      continue;
    }
    if source == "exit" {
      break;
    }
    session.record(source);

    match session.eval(source) {
      Ok(values) => print_values(&values),
      Err(LuaError::SyntaxError { message, .. }) => print_error(&format!("compile error: {}", message)),
      Err(err) => print_error(&format!("runtime error: {}", err)),
    }
  }

  session.save_history().context("Failed to save history")?;
  Ok(())
}
