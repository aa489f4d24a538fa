//! Tracing setup.
//!
//! Logs go to stderr, or to a file when one is given, so stdout carries only
//! the report. `RUST_LOG` takes precedence over the verbosity flag.

use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map `-v` repetitions to a filter directive for this crate.
pub fn level_for(verbosity: u8) -> &'static str {
  match verbosity {
    0 => "mrstat=info",
    1 => "mrstat=debug",
    _ => "mrstat=trace",
  }
}

/// Install the global subscriber.
///
/// The returned guard flushes pending log lines when dropped; hold it until exit.
#[must_use = "dropping the guard stops log output"]
pub fn init(verbosity: u8, file: Option<&Path>) -> Result<WorkerGuard> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

  let (writer, guard) = match file {
    Some(path) => {
      let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| eyre!("Failed to open log file {}: {}", path.display(), e))?;
      tracing_appender::non_blocking(file)
    }
    None => tracing_appender::non_blocking(std::io::stderr()),
  };

  let layer = fmt::layer()
    .with_writer(writer)
    .with_target(true)
    .with_level(true)
    .with_ansi(file.is_none());

  tracing_subscriber::registry()
    .with(filter)
    .with(layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_level_for_verbosity() {
    assert_eq!(level_for(0), "mrstat=info");
    assert_eq!(level_for(1), "mrstat=debug");
    assert_eq!(level_for(2), "mrstat=trace");
    assert_eq!(level_for(9), "mrstat=trace");
  }
}
