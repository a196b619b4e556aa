#![expect(clippy::print_stderr, reason = "Tracing not initialized yet")]

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const LOG_FILE_ENV: &str = "STREAMGUARD_LOG";
const LOG_FORMAT_ENV: &str = "STREAMGUARD_LOG_FORMAT";
const LOG_STREAM_ENV: &str = "STREAMGUARD_LOG_STREAM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogStream {
    Stderr,
    Stdout,
}

/// Keeps the non-blocking file writer flushing until dropped.
#[derive(Debug)]
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

impl TelemetryGuard {
    fn disabled() -> Self {
        Self { _guard: None }
    }
}

pub fn init_tracing(default_level: &str) -> TelemetryGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let stream = log_stream_from_env();

    let (writer, guard, ansi) = match log_file_path_from_env() {
        Some(path) => match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                (BoxMakeWriter::new(non_blocking), Some(guard), false)
            }
            Err(err) => {
                eprintln!(
                    "Warning: failed to open log file {}: {}",
                    path.display(),
                    err
                );
                stream_writer(stream)
            }
        },
        None => stream_writer(stream),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(writer);

    let installed = match log_format_from_env() {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Text => builder.with_ansi(ansi).try_init().is_ok(),
    };
    if !installed {
        return TelemetryGuard::disabled();
    }

    TelemetryGuard { _guard: guard }
}

fn stream_writer(stream: LogStream) -> (BoxMakeWriter, Option<WorkerGuard>, bool) {
    match stream {
        LogStream::Stderr => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            std::io::stderr().is_terminal(),
        ),
        LogStream::Stdout => (
            BoxMakeWriter::new(std::io::stdout),
            None,
            std::io::stdout().is_terminal(),
        ),
    }
}

fn log_file_path_from_env() -> Option<PathBuf> {
    std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn log_format_from_env() -> LogFormat {
    parse_log_format(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
}

fn log_stream_from_env() -> LogStream {
    parse_log_stream(std::env::var(LOG_STREAM_ENV).ok().as_deref())
}

fn parse_log_format(value: Option<&str>) -> LogFormat {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if v == "json" => LogFormat::Json,
        Some(v) if v.is_empty() || v == "text" => LogFormat::Text,
        Some(v) => {
            eprintln!("Warning: unknown {LOG_FORMAT_ENV} '{v}', using text");
            LogFormat::Text
        }
        None => LogFormat::Text,
    }
}

fn parse_log_stream(value: Option<&str>) -> LogStream {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("stdout") => LogStream::Stdout,
        _ => LogStream::Stderr,
    }
}
