//! REPL input history, kept one entry per line in a plain text file.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum HistoryError {
  #[error("failed to read history {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write history {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

#[derive(Debug, Default)]
pub struct History {
  path: Option<PathBuf>,
  entries: Vec<String>,
}

impl History {
  /// History that is never persisted.
  pub fn in_memory() -> Self {
    Self::default()
  }

  /// Load the history at `path`. A missing file is an empty history.
  pub fn load(path: PathBuf) -> Result<Self, HistoryError> {
    let entries = match fs::read_to_string(&path) {
      Ok(content) => content.lines().filter(|line| !line.is_empty()).map(String::from).collect(),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
      Err(source) => return Err(HistoryError::Read { path, source }),
    };
    debug!(path = %path.display(), entries = entries.len(), "loaded history");
    Ok(Self {
      path: Some(path),
      entries,
    })
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  pub fn entries(&self) -> &[String] {
    &self.entries
  }

  /// Append one input line. Blank lines are not recorded.
  pub fn push(&mut self, line: &str) {
    let line = line.trim_end_matches(['\r', '\n']);
    if !line.trim().is_empty() {
      self.entries.push(line.to_string());
    }
  }

  /// Write every entry back to the history file, creating its directory.
  pub fn save(&self) -> Result<(), HistoryError> {
    let Some(path) = &self.path else {
      return Ok(());
    };
    let write_err = |source| HistoryError::Write {
      path: path.clone(),
      source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut content = self.entries.join("\n");
    if !content.is_empty() {
      content.push('\n');
    }
    fs::write(path, content).map_err(write_err)?;
    debug!(path = %path.display(), entries = self.entries.len(), "saved history");
    Ok(())
  }
}
