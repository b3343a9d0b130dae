//! Global tracing subscriber setup for the binary.
//!
//! Diagnostics go to a log file so they never interleave with console
//! output printed by the CLI. `RUST_LOG` overrides the default filter.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default log location: one file per process in the system temp dir
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("fresh-playground-{}.log", std::process::id()))
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("playground=info"))
}

/// Install the global subscriber writing to `log_file`.
///
/// Falls back to stderr if the file cannot be opened. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init_global(log_file: &Path) {
    let file = log_file
        .parent()
        .map(std::fs::create_dir_all)
        .transpose()
        .and_then(|_| OpenOptions::new().create(true).append(true).open(log_file));

    let result = match file {
        Ok(file) => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
            .with(default_filter())
            .try_init(),
        Err(e) => {
            eprintln!(
                "Warning: could not open log file {}: {}; logging to stderr",
                log_file.display(),
                e
            );
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(default_filter())
                .try_init()
        }
    };

    if result.is_ok() {
        tracing::debug!("Logging to {:?}", log_file);
    }
}
