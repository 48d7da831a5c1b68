use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::span::EnteredSpan;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. Events go to stderr and, when
/// `log_file` is given, also to that file without ANSI colours. Only the first
/// call in a process installs a subscriber; later calls are no-ops.
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn init(level: &str, log_file: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    // Keep the first subscriber if one is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(file_layer)
        .try_init();
    Ok(())
}

/// Tags every event emitted on this thread with `prefix` until the returned
/// guard is dropped.
pub fn set_log_prefix(prefix: impl Into<String>) -> LogPrefixGuard {
    let prefix = prefix.into();
    LogPrefixGuard {
        _span: tracing::info_span!("task", %prefix).entered(),
    }
}

pub struct LogPrefixGuard {
    _span: EnteredSpan,
}
