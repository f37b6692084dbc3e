//! Tracing subscriber setup.
//!
//! Logs go to stderr so command output on stdout stays clean. The filter
//! comes from `ADMINHUB_LOG` when set, else from the config's level, else
//! `warn` (`debug` with `--verbose`).

use std::path::{Path, PathBuf};

use tracing::metadata::LevelFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{LogFormat, LoggingSection};

pub const LOG_ENV: &str = "ADMINHUB_LOG";
const LOG_FILE_PREFIX: &str = "adminhub.log";

#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub verbose: bool,
    pub format: LogFormat,
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl TelemetryConfig {
    pub fn new(verbose: bool, logging: &LoggingSection) -> Self {
        Self {
            verbose,
            format: logging.format,
            level: logging.level.clone(),
            file: logging.file.clone(),
        }
    }
}

/// Keeps the file writer flushing until dropped.
pub struct TelemetryGuard {
    _guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
}

pub fn init(config: TelemetryConfig) -> TelemetryGuard {
    let mut guards = Vec::new();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    layers.push(build_stderr_layer(config.format));

    let mut file_setup_error = None;
    if let Some(file) = &config.file {
        let (dir, prefix) = split_log_path(file);
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let (layer, guard) = build_file_layer(config.format, &dir, &prefix);
                layers.push(layer);
                guards.push(guard);
            }
            Err(err) => {
                file_setup_error = Some(format!("log dir init failed for {}: {err}", dir.display()));
            }
        }
    }

    layers.push(Box::new(build_filter(&config)));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = Registry::default().with(layers).try_init();

    if let Some(error) = file_setup_error {
        tracing::warn!("{error}");
    }

    TelemetryGuard { _guards: guards }
}

fn build_filter(config: &TelemetryConfig) -> EnvFilter {
    let default = if config.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let builder = EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(LOG_ENV);
    match (&config.level, std::env::var_os(LOG_ENV)) {
        (Some(level), None) if !config.verbose => builder.parse_lossy(level),
        _ => builder.from_env_lossy(),
    }
}

fn build_stderr_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Text => Box::new(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true),
        ),
    }
}

fn build_file_layer(
    format: LogFormat,
    dir: &Path,
    prefix: &str,
) -> (
    Box<dyn Layer<Registry> + Send + Sync>,
    tracing_appender::non_blocking::WorkerGuard,
) {
    let appender = tracing_appender::rolling::daily(dir, prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Text => Box::new(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true),
        ),
    };
    (layer, guard)
}

/// `logs/adminhub.log` → (`logs`, `adminhub.log`). A bare directory keeps
/// the default file prefix.
fn split_log_path(path: &Path) -> (PathBuf, String) {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if path.extension().is_some() => {
            let dir = if parent.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                parent.to_path_buf()
            };
            (dir, name.to_string_lossy().into_owned())
        }
        _ => (path.to_path_buf(), LOG_FILE_PREFIX.to_string()),
    }
}
