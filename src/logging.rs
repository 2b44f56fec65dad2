//! Application logging.
//!
//! Normal runs write JSON to two daily-rotated files under `<root>/logs`
//! (`error.*` for errors only, `combined.*` for info and up, 14 days kept)
//! and a coloured compact line per event to stdout. With `TEST_RUN=true`
//! only the console output is set up so test runs leave the real logs alone.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const TEST_RUN_ENV_VAR: &str = "TEST_RUN";
pub const LOG_ROOT_ENV_VAR: &str = "LOG_ROOT";

const MAX_LOG_FILES: usize = 14;
const CONSOLE_DEFAULT_FILTER: &str = "debug";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create {name} log appender: {source}")]
    Appender {
        name: &'static str,
        #[source]
        source: InitError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub root: PathBuf,
    pub test_run: bool,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(LOG_ROOT_ENV_VAR).ok(),
            std::env::var(TEST_RUN_ENV_VAR).ok(),
        )
    }

    fn from_vars(root: Option<String>, test_run: Option<String>) -> Self {
        Self {
            root: root.map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".")),
            test_run: test_run.as_deref() == Some("true"),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}

/// Keeps the background file writers alive. Dropping it flushes them.
#[must_use = "dropping the guards stops file logging"]
pub struct LogGuards(#[allow(dead_code)] Vec<WorkerGuard>);

/// Install the global subscriber. A subscriber that is already installed
/// (e.g. by a test harness) is left in place.
pub fn init(settings: &LogSettings) -> Result<LogGuards, LoggingError> {
    if settings.test_run {
        let result = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .without_time()
                    .compact()
                    .with_filter(console_filter()),
            )
            .try_init();
        if result.is_err() {
            debug!("tracing subscriber already initialized, skipping");
        }
        return Ok(LogGuards(Vec::new()));
    }

    let dir = settings.log_dir();
    std::fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let (error_writer, error_guard) =
        tracing_appender::non_blocking(daily_appender(&dir, "error")?);
    let (combined_writer, combined_guard) =
        tracing_appender::non_blocking(daily_appender(&dir, "combined")?);

    let error_layer = fmt::layer()
        .json()
        .with_writer(error_writer)
        .with_ansi(false)
        .with_timer(ChronoUtc::rfc_3339())
        .with_filter(LevelFilter::ERROR);

    let combined_layer = fmt::layer()
        .json()
        .with_writer(combined_writer)
        .with_ansi(false)
        .with_timer(ChronoUtc::rfc_3339())
        .with_filter(LevelFilter::INFO);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(false)
        .with_timer(ChronoUtc::new("%H:%M:%S".to_owned()))
        .compact()
        .with_filter(console_filter());

    let result = tracing_subscriber::registry()
        .with(error_layer)
        .with(combined_layer)
        .with(console_layer)
        .try_init();
    if result.is_err() {
        debug!("tracing subscriber already initialized, skipping");
    }

    Ok(LogGuards(vec![error_guard, combined_guard]))
}

/// `RUST_LOG` wins; otherwise everything from debug up.
fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(CONSOLE_DEFAULT_FILTER))
}

fn daily_appender(dir: &Path, name: &'static str) -> Result<RollingFileAppender, LoggingError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(name)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .map_err(|source| LoggingError::Appender { name, source })
}
