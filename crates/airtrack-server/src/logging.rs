//! Logging setup driven by `[server]` configuration.
//!
//! Stdout always gets a human-readable layer: pretty with span events in
//! development, compact without ANSI colors in production. Production also
//! writes daily rolling JSON files to `server.log_dir`, so every scan span
//! (`scan_id`) and request trace can be correlated after the fact.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use airtrack_core::ServerConfig;

/// Fallback filter when `RUST_LOG` is unset.
pub const LOG_LEVEL_ENV: &str = "AIRTRACK_LOG_LEVEL";

/// Rolling file name prefix.
const LOG_FILE_PREFIX: &str = "airtrack";

const DEFAULT_FILTER: &str = "info";

/// Non-blocking writers flush on drop, so the guards live for the whole process.
static GUARDS: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber for `server`.
///
/// Returns the directory JSON logs go to, if any.
///
/// # Errors
///
/// Returns an error if the filter does not parse, the log directory cannot
/// be created, or a subscriber is already installed.
pub fn init(server: &ServerConfig) -> anyhow::Result<Option<PathBuf>> {
    let filter = env_filter()?;
    let mut guards = Vec::new();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let log_dir = if server.production {
        let dir = server.log_dir.clone().unwrap_or_else(default_log_dir);
        let (writer, guard) = tracing_appender::non_blocking(file_appender(&dir)?);
        guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_current_span(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );

        let (stdout, guard) = tracing_appender::non_blocking(std::io::stdout());
        guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(stdout)
                .with_ansi(false)
                .boxed(),
        );
        Some(dir)
    } else {
        layers.push(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .boxed(),
        );
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("A tracing subscriber is already installed")?;

    let _ = GUARDS.set(guards);
    Ok(log_dir)
}

/// `RUST_LOG`, else `AIRTRACK_LOG_LEVEL`, else `info`.
fn env_filter() -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    EnvFilter::try_new(&directives).with_context(|| format!("Invalid {LOG_LEVEL_ENV}: {directives}"))
}

/// Daily rolling appender in `dir`, creating the directory if needed.
fn file_appender(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("json")
        .build(dir)
        .with_context(|| format!("Cannot write logs to {}", dir.display()))
}

fn default_log_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/var/log/airtrack")
    }
    #[cfg(not(target_os = "linux"))]
    {
        directories::ProjectDirs::from("", "", "airtrack")
            .map_or_else(|| PathBuf::from("./logs"), |dirs| dirs.data_dir().join("logs"))
    }
}
