//! Structured logging setup using the `tracing` ecosystem.
//!
//! Console output goes to stderr so command output on stdout stays
//! pipeable. File output rotates daily under the configured directory,
//! optionally as JSON.
//!
//! A bare level such as `debug` applies to the `cms_*` crates only; the
//! HTTP stack underneath stays at `warn`. Full directive strings
//! (`cms_api=trace,hyper=debug`) and the `MICROCMS_LOG` environment
//! variable are passed to the filter unchanged.

use std::path::Path;

use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants;
use crate::error::{CmsError, CmsResult};

/// Environment variable that overrides the configured level.
pub const LOG_ENV_VAR: &str = "MICROCMS_LOG";

/// Crates whose events a bare level applies to.
const CRATE_TARGETS: [&str; 3] = ["cms_core", "cms_api", "cms_cli"];

/// Expand a configured level into filter directives.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    CRATE_TARGETS
        .iter()
        .fold(String::from("warn"), |mut directives, target| {
            directives.push_str(&format!(",{target}={level}"));
            directives
        })
}

fn env_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return filter;
    }
    EnvFilter::try_new(filter_directives(level))
        .unwrap_or_else(|_| EnvFilter::new(filter_directives("info")))
}

/// Initialize the global tracing subscriber.
///
/// # Arguments
/// * `level` - "trace" through "error", or a full directive string
/// * `log_dir` - Directory for the daily `microcms.log.*` files
/// * `json_output` - Write the file log as JSON lines
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> CmsResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, format!("{}.log", constants::APP_NAME));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    // Exactly one of the two file layers is present.
    let json_layer = json_output.then(|| {
        fmt::layer()
            .with_writer(non_blocking.clone())
            .json()
            .with_file(true)
            .with_line_number(true)
    });
    let text_layer = (!json_output).then(|| {
        fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| CmsError::Config(format!("failed to install logger: {e}")))?;

    tracing::info!("logging initialized at level={level}, dir={}", log_dir.display());

    Ok(LogGuard { _guard: guard })
}

/// Keeps the non-blocking file writer alive. Dropping it flushes the log.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Console-only logger, used when the log directory is unusable and in tests.
/// Calls after the first are no-ops.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .try_init();
}
