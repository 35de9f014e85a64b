use thiserror::Error;

/// Result type local to shardwise-workload.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] shardwise_core::error::Error),

    #[error("document parse error: {0}")]
    Parse(String),

    #[error("unknown design '{0}'")]
    UnknownDesign(String),
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}
