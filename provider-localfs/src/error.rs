use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocalFsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl From<LocalFsError> for BridgeError {
    fn from(error: LocalFsError) -> Self {
        match error {
            LocalFsError::Io(io) => BridgeError::Io(io),
            LocalFsError::Json(json) => BridgeError::Persistence(json.to_string()),
            LocalFsError::InvalidPath(path) => BridgeError::OperationFailed(path),
        }
    }
}

pub type Result<T> = std::result::Result<T, LocalFsError>;
