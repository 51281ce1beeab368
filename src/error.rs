use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("Config entry has no device_id")]
    MissingDeviceId,

    #[error("Invalid device_id: {0}")]
    InvalidDeviceId(String),

    #[error("Duplicate sensor key in registry: {0}")]
    DuplicateSensorKey(String),

    #[error("Snapshot fetch failed: {0}")]
    FetchFailed(String),

    #[error("Invalid snapshot payload: {0}")]
    InvalidSnapshot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
