use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Equalizer reports no bands")]
    EmptyBandTable,

    #[error("Session loop is no longer running")]
    Terminated,

    #[error("Collaborator error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
