use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Infeasible design: {0}")]
    Design(#[from] DesignError),

    #[error("Workload error: {0}")]
    Workload(String),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serde(e.to_string())
    }
}

/// Why a design cannot be scored against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesignError {
    #[error("collection '{0}' is not in the catalog")]
    UnknownCollection(String),

    #[error("{role} field '{field}' is not a field of collection '{collection}'")]
    UnknownField {
        collection: String,
        field: String,
        role: &'static str,
    },

    #[error("denormalization parent '{parent}' of '{collection}' is not in the catalog")]
    UnknownParent { collection: String, parent: String },

    #[error("denormalization parent '{parent}' of '{collection}' is not part of the design")]
    ParentNotInDesign { collection: String, parent: String },

    #[error("collection '{0}' cannot be denormalized into itself")]
    SelfParent(String),

    #[error("denormalization cycle through collection '{0}'")]
    DenormalizationCycle(String),
}
