use crate::config::{Config, ReadinessConfig};
use testcontainers::{
    core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ContainerRequest,
    GenericImage, ImageExt, TestcontainersError,
};
use tokio::io::AsyncBufReadExt;
use tokio_stream::{wrappers::LinesStream, StreamExt};
use tracing::info;

pub(crate) mod readiness;
pub(crate) mod runtime;

pub(crate) use readiness::ReadinessError;

pub(crate) const POSTGRES_PORT: u16 = 5432;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub(crate) host: String,
    pub(crate) port: u16,
}

pub(crate) struct PostgresContainer {
    inner: ContainerAsync<GenericImage>,
}

fn request(config: &Config) -> ContainerRequest<GenericImage> {
    GenericImage::new(&config.image.name, &config.image.tag)
        .with_exposed_port(POSTGRES_PORT.tcp())
        .with_env_var("POSTGRES_DB", &config.database.name)
        .with_env_var("POSTGRES_USER", &config.database.user)
        .with_env_var("POSTGRES_PASSWORD", &config.database.password)
}

impl PostgresContainer {
    /// Creates and starts the container. Readiness is awaited separately so the
    /// caller owns the handle even when the server never comes up.
    pub(crate) async fn start(config: &Config) -> Result<Self, TestcontainersError> {
        let inner = request(config).start().await?;

        info!(
            id = inner.id(),
            image = %config.image.name,
            tag = %config.image.tag,
            "Container started"
        );

        Ok(Self { inner })
    }

    pub(crate) fn id(&self) -> &str {
        self.inner.id()
    }

    /// Follows stdout and stderr from the beginning of the container's life.
    pub(crate) async fn wait_until_ready(
        &self,
        readiness: &ReadinessConfig,
    ) -> Result<(), ReadinessError> {
        let stdout = LinesStream::new(self.inner.stdout(true).lines());
        let stderr = LinesStream::new(self.inner.stderr(true).lines());

        readiness::wait_for_occurrences(stdout.merge(stderr), readiness).await
    }

    pub(crate) async fn endpoint(&self) -> Result<Endpoint, TestcontainersError> {
        let host = self.inner.get_host().await?;
        let port = self.inner.get_host_port_ipv4(POSTGRES_PORT.tcp()).await?;

        Ok(Endpoint {
            host: host.to_string(),
            port,
        })
    }

    /// Stops and removes the container.
    pub(crate) async fn terminate(self) -> Result<(), TestcontainersError> {
        let id = self.inner.id().to_owned();
        self.inner.rm().await?;
        info!(%id, "Container terminated");
        Ok(())
    }
}
