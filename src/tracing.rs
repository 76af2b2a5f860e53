use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "info";

/// Logs go to stderr; stdout carries the JSON report.
pub(crate) fn init() -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_DIRECTIVE))
        .context("Failed to build log filter")?;

    let json = matches!(std::env::var("APP_LOG_FORMAT").as_deref(), Ok("json"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()
    } else {
        registry.with(fmt::layer().with_writer(writer)).try_init()
    };
    installed.context("Failed to install tracing subscriber")?;

    Ok(guard)
}
