use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Local storage failure: {0}")]
    Storage(String),

    #[error("Remote store failure: {0}")]
    Remote(String),

    #[error("Migration failure: {0}")]
    Migration(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No active session; ingestion cannot start before sign-in")]
    NoActiveSession,

    #[error("Drain cycle cancelled")]
    Cancelled,

    #[error("Serialization failure: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        SyncError::Storage(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for SyncError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        SyncError::Migration(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
