use crate::{
    config::ReadinessConfig,
    error::{Error, ErrorKind},
};
use std::io;
use std::time::Duration;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ReadinessError {
    #[error("readiness line seen {seen} of {expected} times within {timeout:?}")]
    Timeout {
        seen: u32,
        expected: u32,
        timeout: Duration,
    },
    #[error("container logs ended after {seen} of {expected} readiness lines")]
    LogsClosed { seen: u32, expected: u32 },
    #[error("failed to read container logs")]
    Logs(#[source] io::Error),
}

impl From<ReadinessError> for Error {
    fn from(err: ReadinessError) -> Self {
        match err {
            ReadinessError::Timeout { .. } => Error::new(ErrorKind::ReadinessTimedOut, err),
            ReadinessError::LogsClosed { .. } | ReadinessError::Logs(_) => {
                Error::new(ErrorKind::ProvisioningFailed, err)
            }
        }
    }
}

/// Consumes log lines until `readiness.message` has appeared
/// `readiness.occurrences` times or the startup timeout elapses.
pub(crate) async fn wait_for_occurrences<S>(
    lines: S,
    readiness: &ReadinessConfig,
) -> Result<(), ReadinessError>
where
    S: Stream<Item = io::Result<String>>,
{
    let expected = readiness.occurrences;
    let mut seen = 0;

    let counting = async {
        tokio::pin!(lines);

        while let Some(line) = lines.next().await {
            let line = match line {
                Ok(line) => line,
                Err(err) => return Err(ReadinessError::Logs(err)),
            };

            if line.contains(&readiness.message) {
                seen += 1;
                debug!(seen, expected, "Readiness line observed");

                if seen >= expected {
                    return Ok(());
                }
            }
        }

        Err(ReadinessError::LogsClosed { seen, expected })
    };

    let result = tokio::time::timeout(readiness.startup_timeout, counting).await;

    match result {
        Ok(result) => result,
        Err(_) => Err(ReadinessError::Timeout {
            seen,
            expected,
            timeout: readiness.startup_timeout,
        }),
    }
}
