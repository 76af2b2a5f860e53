use crate::config::DatabaseConfig;
use crate::container::Endpoint;
use std::fmt;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConnectionStringError {
    #[error("invalid host `{host}`")]
    Host {
        host: String,
        #[source]
        source: url::ParseError,
    },
    #[error("cannot set {0} on connection string")]
    Component(&'static str),
}

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ConnectionString(Url);

impl ConnectionString {
    pub(crate) fn new(
        endpoint: &Endpoint,
        database: &DatabaseConfig,
    ) -> Result<Self, ConnectionStringError> {
        let mut url = Url::parse("postgres://localhost").expect("Infallible");

        url.set_host(Some(&endpoint.host))
            .map_err(|source| ConnectionStringError::Host {
                host: endpoint.host.clone(),
                source,
            })?;
        url.set_port(Some(endpoint.port))
            .map_err(|_| ConnectionStringError::Component("port"))?;
        url.set_username(&database.user)
            .map_err(|_| ConnectionStringError::Component("user"))?;
        url.set_password(Some(&database.password))
            .map_err(|_| ConnectionStringError::Component("password"))?;
        url.path_segments_mut()
            .map_err(|_| ConnectionStringError::Component("database"))?
            .clear()
            .push(&database.name);
        url.query_pairs_mut()
            .append_pair("sslmode", database.ssl_mode.as_str());

        Ok(Self(url))
    }

    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Same string with the password masked, for logs.
    pub(crate) fn redacted(&self) -> String {
        let mut url = self.0.clone();

        if url.password().is_some() {
            // Setting a password only fails for URLs without a host.
            let _ = url.set_password(Some("***"));
        }

        url.into()
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionString")
            .field(&self.redacted())
            .finish()
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}
