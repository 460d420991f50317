use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OfflineError {
    #[error("Content already downloaded: {id}")]
    AlreadyCached { id: String },

    #[error("Download already in progress: {id}")]
    AlreadyDownloading { id: String },

    #[error("Invalid content id: {reason}")]
    InvalidContentId { reason: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, OfflineError>;
