//! Tracing setup for the CLI and the HTTP server.
//!
//! Console output goes to stderr so that reports printed on stdout can be piped. Every event is
//! also appended to a log file, `LEGAL_SUMMARIZER_LOG_FILE` or `logs/legal-summarizer.log`.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_ENV: &str = "LEGAL_SUMMARIZER_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/legal-summarizer.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` controls filtering and defaults to `info`.
///
/// If the log file cannot be opened, logging continues on stderr only.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    let file_layer = open_log_file(&log_file_path(|key| std::env::var(key).ok())).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}

fn log_file_path(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    lookup(LOG_FILE_ENV)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from)
}

fn open_log_file(path: &Path) -> Option<NonBlocking> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name()?;

    if let Err(err) = std::fs::create_dir_all(directory) {
        eprintln!("Cannot create log directory {}: {err}", directory.display());
        return None;
    }

    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
    {
        Ok(appender) => appender,
        Err(err) => {
            eprintln!("Cannot open log file {}: {err}", path.display());
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Some(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_defaults_when_unset_or_blank() {
        assert_eq!(log_file_path(|_| None), PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(
            log_file_path(|_| Some("  ".into())),
            PathBuf::from(DEFAULT_LOG_FILE)
        );
    }

    #[test]
    fn log_path_follows_override() {
        let path = log_file_path(|key| (key == LOG_FILE_ENV).then(|| "/var/log/ls.log".into()));
        assert_eq!(path, PathBuf::from("/var/log/ls.log"));
    }
}
