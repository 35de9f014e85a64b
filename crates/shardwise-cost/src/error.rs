use thiserror::Error;

use shardwise_core::error::Error as CoreError;

/// Result type local to shardwise-cost.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("workload combine: {0}")]
    Combine(#[from] shardwise_workload::Error),
}

impl Error {
    /// True when the design itself cannot be scored (as opposed to a bad
    /// configuration or workload).
    pub fn is_infeasible(&self) -> bool {
        match self {
            Error::Core(CoreError::Design(_)) => true,
            Error::Combine(shardwise_workload::Error::Core(CoreError::Design(_))) => true,
            _ => false,
        }
    }
}

impl From<shardwise_core::error::DesignError> for Error {
    fn from(e: shardwise_core::error::DesignError) -> Self {
        Error::Core(CoreError::Design(e))
    }
}
