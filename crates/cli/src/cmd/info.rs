use anyhow::Result;

use envbind_lib::session::StoreMode;

use crate::cmd::Host;
use crate::output::print_stat;

pub fn cmd_info(host: &Host) -> Result<()> {
  let session = host.open_session(false)?;
  let globals = session.globals();

  println!("envbind v{}", env!("CARGO_PKG_VERSION"));
  match host.config_path() {
    Some(path) if path.exists() => print_stat("Config", &path.display().to_string()),
    Some(path) => print_stat("Config", &format!("{} (not found, using defaults)", path.display())),
    None => print_stat("Config", "<none>"),
  }
  let mode = match host.mode() {
    StoreMode::Process => "live",
    StoreMode::Isolated => "isolated",
  };
  print_stat("Store", &format!("{} ({})", globals.store().kind(), mode));
  print_stat("Bound", &globals.len().to_string());
  if !session.skipped().is_empty() {
    print_stat("Skipped", &session.skipped().join(", "));
  }
  if let Some(startup) = session.config().startup_path()? {
    print_stat("Startup", &startup.display().to_string());
  }
  if let Some(history) = session.config().history_path()? {
    print_stat("History", &history.display().to_string());
  }
  Ok(())
}
