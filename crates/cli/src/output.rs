//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages and the rendering of Lua results.

use anyhow::Context;
use clap::ValueEnum;
use mlua::{MultiValue, Value};
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const ERROR: &str = "✗";
  pub const INFO: &str = "•";
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Render a Lua value the way `print` would show it.
pub fn format_value(value: &Value) -> String {
  match value {
    Value::Nil => "nil".to_string(),
    Value::Boolean(b) => b.to_string(),
    Value::Integer(i) => i.to_string(),
    Value::Number(n) => format_number(*n),
    Value::String(s) => s.to_string_lossy(),
    other => format!("{}: {:?}", other.type_name(), other.to_pointer()),
  }
}

/// Lua's float rendering: `%.14g`, with `.0` added when the result looks
/// like an integer.
fn format_number(n: f64) -> String {
  let sign = if n.is_sign_negative() { "-" } else { "" };
  if n.is_nan() {
    return format!("{}nan", sign);
  }
  if n.is_infinite() {
    return format!("{}inf", sign);
  }

  // Rounding to 14 significant digits first gives the exponent `%g` uses.
  let scientific = format!("{:.13e}", n);
  let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
  let exponent: i32 = exponent.parse().unwrap_or(0);

  if !(-4..14).contains(&exponent) {
    let exponent_sign = if exponent < 0 { '-' } else { '+' };
    return format!("{}e{}{:02}", trim_fraction(mantissa), exponent_sign, exponent.abs());
  }

  let decimals = (13 - exponent).max(0) as usize;
  let fixed = format!("{:.*}", decimals, n);
  let fixed = trim_fraction(&fixed);
  if fixed.bytes().all(|b| b == b'-' || b.is_ascii_digit()) {
    format!("{}.0", fixed)
  } else {
    fixed.to_string()
  }
}

fn trim_fraction(number: &str) -> &str {
  if number.contains('.') {
    number.trim_end_matches('0').trim_end_matches('.')
  } else {
    number
  }
}

/// Print evaluation results tab-separated, skipping output when all are nil.
pub fn print_values(values: &MultiValue) {
  if values.iter().all(Value::is_nil) {
    return;
  }
  let rendered: Vec<String> = values.iter().map(format_value).collect();
  println!("{}", rendered.join("\t"));
}
