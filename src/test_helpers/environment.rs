use crate::{
    config::DatabaseConfig,
    container::{Endpoint, ReadinessError},
    db::ConnectionString,
    error::{Error, ErrorKind},
    scenario::Environment,
};
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const UNAVAILABLE: &str = "Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Start,
    Ready,
    Resolve,
    Connect,
    Query,
}

/// How the log watch gives up when `FailPoint::Ready` is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessFailure {
    Timeout,
    LogsClosed,
    Logs,
}

impl FailPoint {
    fn error(self, readiness: ReadinessFailure, message: &str) -> Error {
        let kind = match self {
            FailPoint::Ready => return readiness.error(message).into(),
            FailPoint::Start => ErrorKind::ProvisioningFailed,
            FailPoint::Resolve => ErrorKind::ResolutionFailed,
            FailPoint::Connect => ErrorKind::ConnectionFailed,
            FailPoint::Query => ErrorKind::QueryFailed,
        };

        Error::new(kind, message.to_owned())
    }
}

impl ReadinessFailure {
    fn error(self, message: &str) -> ReadinessError {
        match self {
            ReadinessFailure::Timeout => ReadinessError::Timeout {
                seen: 1,
                expected: 2,
                timeout: Duration::from_secs(60),
            },
            ReadinessFailure::LogsClosed => ReadinessError::LogsClosed {
                seen: 1,
                expected: 2,
            },
            ReadinessFailure::Logs => {
                ReadinessError::Logs(io::Error::new(io::ErrorKind::Other, message.to_owned()))
            }
        }
    }
}

#[derive(Debug)]
pub struct FakeContainer;

#[derive(Debug)]
pub struct FakeConnection;

pub struct FakeEnvironment {
    fail_at: Option<FailPoint>,
    stall_at: Option<FailPoint>,
    readiness: ReadinessFailure,
    message: String,
    value: i32,
    teardown_fails: bool,
    query_calls: AtomicUsize,
    close_calls: AtomicUsize,
    terminate_calls: AtomicUsize,
}

impl FakeEnvironment {
    pub fn new() -> Self {
        Self {
            fail_at: None,
            stall_at: None,
            readiness: ReadinessFailure::Timeout,
            message: "injected failure".to_owned(),
            value: 1,
            teardown_fails: false,
            query_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            terminate_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_at(mut self, point: FailPoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    pub fn failing_readiness(mut self, failure: ReadinessFailure) -> Self {
        self.readiness = failure;
        self.failing_at(FailPoint::Ready)
    }

    /// The step never completes.
    pub fn stalling_at(mut self, point: FailPoint) -> Self {
        self.stall_at = Some(point);
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_owned();
        self
    }

    pub fn runtime_unavailable(self) -> Self {
        self.failing_at(FailPoint::Start).with_message(UNAVAILABLE)
    }

    pub fn returning(mut self, value: i32) -> Self {
        self.value = value;
        self
    }

    pub fn failing_teardown(mut self) -> Self {
        self.teardown_fails = true;
        self
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn terminate_calls(&self) -> usize {
        self.terminate_calls.load(Ordering::SeqCst)
    }

    async fn check(&self, point: FailPoint) -> Result<(), Error> {
        if self.stall_at == Some(point) {
            std::future::pending::<()>().await;
        }

        match self.fail_at {
            Some(p) if p == point => Err(point.error(self.readiness, &self.message)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Environment for FakeEnvironment {
    type Container = FakeContainer;
    type Connection = FakeConnection;

    async fn start_container(&self) -> Result<FakeContainer, Error> {
        self.check(FailPoint::Start).await?;
        Ok(FakeContainer)
    }

    async fn await_ready(&self, _: &FakeContainer) -> Result<(), Error> {
        self.check(FailPoint::Ready).await
    }

    async fn resolve(&self, _: &FakeContainer) -> Result<ConnectionString, Error> {
        self.check(FailPoint::Resolve).await?;

        let endpoint = Endpoint {
            host: "localhost".to_owned(),
            port: 5432,
        };
        let url = ConnectionString::new(&endpoint, &DatabaseConfig::default())
            .expect("Failed to build connection string");
        Ok(url)
    }

    async fn connect(&self, _: &ConnectionString) -> Result<FakeConnection, Error> {
        self.check(FailPoint::Connect).await?;
        Ok(FakeConnection)
    }

    async fn query(&self, _: &mut FakeConnection) -> Result<i32, Error> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.check(FailPoint::Query).await?;
        Ok(self.value)
    }

    async fn close(&self, _: FakeConnection) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn terminate(&self, _: FakeContainer) -> Result<(), Error> {
        self.terminate_calls.fetch_add(1, Ordering::SeqCst);

        if self.teardown_fails {
            return Err(Error::new(
                ErrorKind::TeardownFailed,
                "No such container: 3f2c9a",
            ));
        }

        Ok(())
    }
}
