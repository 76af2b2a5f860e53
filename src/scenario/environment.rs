use crate::{
    config::Config,
    container::PostgresContainer,
    db::{self, probe::SelectOneQuery, ConnectionString},
    error::{Error, ErrorExt, ErrorKind},
};
use async_trait::async_trait;
use sqlx::PgConnection;
use tracing::info;

/// The external world a scenario runs against. Each method is one step of the
/// scenario; the driver owns sequencing, deadlines and teardown.
#[async_trait]
pub(crate) trait Environment: Send + Sync {
    type Container: Send + Sync;
    type Connection: Send;

    async fn start_container(&self) -> Result<Self::Container, Error>;
    async fn await_ready(&self, container: &Self::Container) -> Result<(), Error>;
    async fn resolve(&self, container: &Self::Container) -> Result<ConnectionString, Error>;
    async fn connect(&self, url: &ConnectionString) -> Result<Self::Connection, Error>;
    async fn query(&self, conn: &mut Self::Connection) -> Result<i32, Error>;
    async fn close(&self, conn: Self::Connection);
    async fn terminate(&self, container: Self::Container) -> Result<(), Error>;
}

pub(crate) struct DockerEnvironment {
    config: Config,
}

impl DockerEnvironment {
    pub(crate) fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Environment for DockerEnvironment {
    type Container = PostgresContainer;
    type Connection = PgConnection;

    async fn start_container(&self) -> Result<PostgresContainer, Error> {
        PostgresContainer::start(&self.config)
            .await
            .error(ErrorKind::ProvisioningFailed)
    }

    async fn await_ready(&self, container: &PostgresContainer) -> Result<(), Error> {
        container
            .wait_until_ready(&self.config.readiness)
            .await
            .map_err(Error::from)?;

        info!(id = container.id(), "Container is ready");
        Ok(())
    }

    async fn resolve(&self, container: &PostgresContainer) -> Result<ConnectionString, Error> {
        let endpoint = container
            .endpoint()
            .await
            .error(ErrorKind::ResolutionFailed)?;

        let url = ConnectionString::new(&endpoint, &self.config.database)
            .error(ErrorKind::ResolutionFailed)?;

        info!(url = %url.redacted(), "Connection string resolved");
        Ok(url)
    }

    async fn connect(&self, url: &ConnectionString) -> Result<PgConnection, Error> {
        db::connect(url).await.error(ErrorKind::ConnectionFailed)
    }

    async fn query(&self, conn: &mut PgConnection) -> Result<i32, Error> {
        SelectOneQuery::new()
            .execute(conn)
            .await
            .error(ErrorKind::QueryFailed)
    }

    async fn close(&self, conn: PgConnection) {
        db::close(conn).await
    }

    async fn terminate(&self, container: PostgresContainer) -> Result<(), Error> {
        container.terminate().await.error(ErrorKind::TeardownFailed)
    }
}
