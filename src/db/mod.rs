use sqlx::{Connection, PgConnection};
use tracing::warn;

pub(crate) mod connection_string;
pub(crate) mod probe;

pub(crate) use connection_string::ConnectionString;

pub(crate) async fn connect(url: &ConnectionString) -> sqlx::Result<PgConnection> {
    PgConnection::connect(url.as_str()).await
}

/// Sends a graceful terminate message. A failure here has no bearing on the
/// query outcome.
pub(crate) async fn close(conn: PgConnection) {
    if let Err(err) = conn.close().await {
        warn!("Failed to close database connection: {}", err);
    }
}
