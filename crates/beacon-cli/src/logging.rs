// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::APP_NAME;

const LOG_ENV: &str = "BEACON_LOG";

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "beacon=info",
        1 => "beacon=debug",
        _ => "beacon=trace",
    }
}

pub fn log_path() -> Result<PathBuf> {
    let data_root = dirs::data_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; pass --log-stderr to log to the terminal")
    })?;
    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create log directory {}", app_dir.display()))?;
    Ok(app_dir.join("beacon.log"))
}

/// Installs the global subscriber. The TUI owns the terminal, so logs go to
/// a file unless `to_stderr` is set. Returns the file path when one is used.
pub fn init(verbosity: u8, to_stderr: bool) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    if to_stderr {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|error| anyhow!("install log subscriber: {error}"))?;
        return Ok(None);
    }

    let path = log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::default_directive;

    #[test]
    fn verbosity_raises_the_default_level() {
        assert_eq!(default_directive(0), "beacon=info");
        assert_eq!(default_directive(1), "beacon=debug");
        assert_eq!(default_directive(2), "beacon=trace");
        assert_eq!(default_directive(9), "beacon=trace");
    }
}
