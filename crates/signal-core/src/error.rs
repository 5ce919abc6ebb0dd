use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Missing source data: {0}")]
    MissingSourceData(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
