use serde_derive::Deserialize;
use std::fmt;
use std::time::Duration;

const CONFIG_FILE: &str = "pg-smoke";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) image: ImageConfig,
    pub(crate) database: DatabaseConfig,
    pub(crate) readiness: ReadinessConfig,
    #[serde(with = "humantime_serde")]
    pub(crate) scenario_timeout: Duration,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct ImageConfig {
    pub(crate) name: String,
    pub(crate) tag: String,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub(crate) struct DatabaseConfig {
    pub(crate) name: String,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) ssl_mode: SslMode,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct ReadinessConfig {
    /// Log line the server prints once it accepts connections.
    pub(crate) message: String,
    /// The official image runs a temporary server during init, so the line is
    /// printed once before the real start.
    pub(crate) occurrences: u32,
    #[serde(with = "humantime_serde")]
    pub(crate) startup_timeout: Duration,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SslMode {
    Disable,
    Prefer,
    Require,
}

impl SslMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image: ImageConfig::default(),
            database: DatabaseConfig::default(),
            readiness: ReadinessConfig::default(),
            scenario_timeout: Duration::from_secs(5 * 60),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            name: "postgres".to_owned(),
            tag: "16-alpine".to_owned(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "test".to_owned(),
            user: "test".to_owned(),
            password: "test".to_owned(),
            ssl_mode: SslMode::Disable,
        }
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            message: "database system is ready to accept connections".to_owned(),
            occurrences: 2,
            startup_timeout: Duration::from_secs(60),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl Config {
    fn validate(self) -> Result<Self, config::ConfigError> {
        if self.readiness.occurrences == 0 {
            return Err(config::ConfigError::Message(
                "readiness.occurrences must be at least 1".to_owned(),
            ));
        }

        if self.readiness.message.is_empty() {
            return Err(config::ConfigError::Message(
                "readiness.message must not be empty".to_owned(),
            ));
        }

        Ok(self)
    }
}

pub(crate) fn load() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize::<Config>()?
        .validate()
}

#[cfg(test)]
pub(crate) fn from_toml(source: &str) -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from_str(source, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?
        .validate()
}
