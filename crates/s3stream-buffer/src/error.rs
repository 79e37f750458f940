use thiserror::Error;

/// Result type local to s3stream-buffer.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] s3stream_core::error::Error),

    /// A driver-side transfer failure, recorded on the stream for the other side to inspect.
    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
