use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Collaborator not available: {0}")]
    NotAvailable(String),

    #[error("Collaborator operation failed: {0}")]
    OperationFailed(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
