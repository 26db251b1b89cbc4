mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use envbind_lib::session::StoreMode;

use crate::cmd::Host;
use crate::output::OutputFormat;

/// envbind - environment variables as Lua globals
#[derive(Parser)]
#[command(name = "envbind")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Path to the configuration file
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Bind to a snapshot of the environment instead of the live one
  #[arg(long, global = true)]
  isolated: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a Lua script with environment globals installed
  Run {
    /// Path to the script
    script: PathBuf,
  },

  /// Evaluate a Lua expression or chunk and print the result
  Eval {
    /// Lua source
    code: String,
  },

  /// List exposed bindings and their current values
  List {
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Read and evaluate lines from stdin
  Repl,

  /// Show configuration and store details
  Info,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let mode = if cli.isolated {
    StoreMode::Isolated
  } else {
    StoreMode::Process
  };
  let host = Host::load(cli.config, mode)?;

  match cli.command {
    Commands::Run { script } => cmd::cmd_run(&host, &script),
    Commands::Eval { code } => cmd::cmd_eval(&host, &code),
    Commands::List { format } => cmd::cmd_list(&host, format),
    Commands::Repl => cmd::cmd_repl(&host),
    Commands::Info => cmd::cmd_info(&host),
  }
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}
