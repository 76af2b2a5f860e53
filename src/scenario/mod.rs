use crate::{
    container::runtime,
    context::ExecutionContext,
    db::probe,
    error::{Error, ErrorExt, ErrorKind},
};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

mod environment;
mod report;

pub(crate) use environment::{DockerEnvironment, Environment};
pub(crate) use report::TeardownStatus;

/// Upper bound for teardown. Teardown runs outside the scenario deadline so a
/// cancelled or timed out scenario still cleans up after itself.
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Idle,
    Provisioning,
    Ready,
    Connected,
    Queried,
    TornDown,
}

impl Stage {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Provisioning => "provisioning",
            Stage::Ready => "ready",
            Stage::Connected => "connected",
            Stage::Queried => "queried",
            Stage::TornDown => "torn_down",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub(crate) enum Outcome {
    Pass,
    Fail(Error),
    /// The container runtime could not be reached.
    Skip(Error),
}

impl Outcome {
    /// Only a container that could not be created at all can mean the runtime
    /// is missing. Once it exists every error is a failure.
    fn from_start_error(err: Error) -> Self {
        if err.kind() == ErrorKind::ProvisioningFailed
            && runtime::is_unavailable(&err.chain_text())
        {
            Outcome::Skip(err)
        } else {
            Outcome::Fail(err)
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail(_) => "fail",
            Outcome::Skip(_) => "skip",
        }
    }
}

#[derive(Debug)]
pub(crate) struct ScenarioResult {
    pub(crate) outcome: Outcome,
    /// Last stage reached before teardown.
    pub(crate) reached: Stage,
    pub(crate) teardown: TeardownStatus,
    pub(crate) elapsed: Duration,
}

struct Progress {
    stage: Stage,
}

impl Progress {
    fn advance(&mut self, next: Stage) {
        info!(from = %self.stage, to = %next, "Scenario stage changed");
        self.stage = next;
    }
}

async fn step<T, F>(ctx: &ExecutionContext, kind: ErrorKind, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    ctx.run(fut).await.error(kind)?
}

/// Runs the provision / connect / query / teardown sequence once.
///
/// The container is terminated exactly once if it was created and the
/// connection is closed exactly once if it was opened, on every path. A teardown
/// failure is logged and reported but never changes the outcome.
pub(crate) async fn run<E: Environment>(env: &E, ctx: &ExecutionContext) -> ScenarioResult {
    let started = Instant::now();
    let mut progress = Progress { stage: Stage::Idle };
    debug!(
        budget = ?ctx.deadline().saturating_duration_since(started),
        "Scenario started"
    );

    progress.advance(Stage::Provisioning);
    let container = match step(ctx, ErrorKind::ProvisioningFailed, env.start_container())
        .instrument(info_span!("start_container"))
        .await
    {
        Ok(container) => container,
        Err(err) => {
            let outcome = Outcome::from_start_error(err);
            log_outcome(&outcome);
            return ScenarioResult {
                outcome,
                reached: progress.stage,
                teardown: TeardownStatus::NotRequired,
                elapsed: started.elapsed(),
            };
        }
    };

    let outcome = match drive(env, ctx, &container, &mut progress).await {
        Ok(()) => Outcome::Pass,
        Err(err) => Outcome::Fail(err),
    };
    let reached = progress.stage;

    if ctx.is_cancelled() {
        warn!("Scenario cancelled, tearing down container");
    }
    let teardown = teardown(env, container).await;
    progress.advance(Stage::TornDown);
    log_outcome(&outcome);

    ScenarioResult {
        outcome,
        reached,
        teardown,
        elapsed: started.elapsed(),
    }
}

async fn drive<E: Environment>(
    env: &E,
    ctx: &ExecutionContext,
    container: &E::Container,
    progress: &mut Progress,
) -> Result<(), Error> {
    step(ctx, ErrorKind::ProvisioningFailed, env.await_ready(container))
        .instrument(info_span!("await_ready"))
        .await?;
    progress.advance(Stage::Ready);

    let url = step(ctx, ErrorKind::ResolutionFailed, env.resolve(container)).await?;

    let mut conn = step(ctx, ErrorKind::ConnectionFailed, env.connect(&url))
        .instrument(info_span!("connect"))
        .await?;
    progress.advance(Stage::Connected);

    let queried = step(ctx, ErrorKind::QueryFailed, env.query(&mut conn))
        .instrument(info_span!("query"))
        .await;
    env.close(conn).await;

    let value = queried?;
    progress.advance(Stage::Queried);

    if value != probe::EXPECTED {
        return Err(Error::new(
            ErrorKind::UnexpectedResult,
            format!("expected {}, got {}", probe::EXPECTED, value),
        ));
    }

    info!(value, "Query returned expected result");
    Ok(())
}

async fn teardown<E: Environment>(env: &E, container: E::Container) -> TeardownStatus {
    let result = tokio::time::timeout(TEARDOWN_TIMEOUT, env.terminate(container))
        .instrument(info_span!("teardown"))
        .await;

    match result {
        Ok(Ok(())) => TeardownStatus::Completed,
        Ok(Err(err)) => {
            warn!(
                "Failed to terminate container, removal will be retried when the handle is dropped: {}",
                err
            );
            TeardownStatus::Failed
        }
        Err(_) => {
            warn!(
                "Failed to terminate container: no response within {:?}, removal will be retried when the handle is dropped",
                TEARDOWN_TIMEOUT
            );
            TeardownStatus::Failed
        }
    }
}

fn log_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Pass => info!("PostgreSQL container started successfully and query executed"),
        Outcome::Fail(err) => error!("Scenario failed: {}", err.chain_text()),
        Outcome::Skip(err) => warn!(
            "Container runtime is not available, skipping scenario: {}",
            err.chain_text()
        ),
    }
}
