//! Logging setup and span constructors.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::LogConfig;

/// File name used inside `[log] dir`.
pub const LOG_FILE_NAME: &str = "kaa.log";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level. Returns the log file path when
/// logging to a file.
pub fn init(config: &LogConfig) -> anyhow::Result<Option<PathBuf>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("invalid log level {:?}", config.level))?,
    };

    let (writer, ansi, path) = match config.dir {
        Some(ref dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log dir {}", dir.display()))?;
            let path = dir.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Arc::new(file)), false, Some(path))
        }
        None => (BoxMakeWriter::new(std::io::stderr), true, None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!(e))?;

    Ok(path)
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Span covering one server connection.
    pub fn connection(addr: &str, nick: &str) -> Span {
        info_span!("connection", addr = %addr, nick = %nick)
    }

    /// Span covering one hook invocation.
    pub fn hook(command: &str, source: Option<&str>) -> Span {
        debug_span!("hook", command = %command, source = source)
    }
}
