use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("toast queue requires a tokio runtime")]
    Runtime {
        #[source]
        source: tokio::runtime::TryCurrentError,
    },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

impl From<tokio::runtime::TryCurrentError> for Error {
    fn from(source: tokio::runtime::TryCurrentError) -> Self {
        Self::Runtime { source }
    }
}

impl Error {
    /// Whether the failure came from user-supplied configuration rather than
    /// the process environment.
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
