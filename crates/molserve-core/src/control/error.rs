use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to bind command listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read command: {0}")]
    Read(#[from] io::Error),

    #[error("Command is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("Console I/O failed: {0}")]
    Console(#[source] io::Error),

    #[error("Dispatching command failed: {0}")]
    Dispatch(String),
}
