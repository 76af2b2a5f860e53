use std::error::Error as StdError;
use std::fmt;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

struct ErrorKindProperties {
    kind: &'static str,
    title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    ProvisioningFailed,
    ReadinessTimedOut,
    ResolutionFailed,
    ConnectionFailed,
    QueryFailed,
    UnexpectedResult,
    TeardownFailed,
}

impl ErrorKind {
    pub(crate) fn slug(self) -> &'static str {
        let properties: ErrorKindProperties = self.into();
        properties.kind
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let properties: ErrorKindProperties = self.to_owned().into();
        write!(f, "{}", properties.title)
    }
}

impl From<ErrorKind> for ErrorKindProperties {
    fn from(k: ErrorKind) -> Self {
        match k {
            ErrorKind::ProvisioningFailed => ErrorKindProperties {
                kind: "provisioning_failed",
                title: "Failed to start PostgreSQL container",
            },
            ErrorKind::ReadinessTimedOut => ErrorKindProperties {
                kind: "readiness_timed_out",
                title: "PostgreSQL container did not become ready in time",
            },
            ErrorKind::ResolutionFailed => ErrorKindProperties {
                kind: "resolution_failed",
                title: "Failed to get connection string",
            },
            ErrorKind::ConnectionFailed => ErrorKindProperties {
                kind: "connection_failed",
                title: "Failed to open database connection",
            },
            ErrorKind::QueryFailed => ErrorKindProperties {
                kind: "query_failed",
                title: "Failed to execute query",
            },
            ErrorKind::UnexpectedResult => ErrorKindProperties {
                kind: "unexpected_result",
                title: "Query returned an unexpected result",
            },
            ErrorKind::TeardownFailed => ErrorKindProperties {
                kind: "teardown_failed",
                title: "Failed to terminate container",
            },
        }
    }
}

pub(crate) struct Error {
    kind: ErrorKind,
    source: BoxError,
}

impl Error {
    pub(crate) fn new<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Renders the whole source chain, outermost first.
    pub(crate) fn chain_text(&self) -> String {
        let mut text = self.to_string();
        let mut source = self.source.source();

        while let Some(err) = source {
            text.push_str(": ");
            text.push_str(&err.to_string());
            source = err.source();
        }

        text
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.source)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

pub(crate) trait ErrorExt<T> {
    fn error(self, kind: ErrorKind) -> Result<T, Error>;
}

impl<T, E: Into<BoxError>> ErrorExt<T> for Result<T, E> {
    fn error(self, kind: ErrorKind) -> Result<T, Error> {
        self.map_err(|source| Error::new(kind, source))
    }
}
