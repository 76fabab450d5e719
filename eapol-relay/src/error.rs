use std::io;
use thiserror::Error;

/// Faults that stop the relay. Read and write faults on a running relay are not represented
/// here: the forwarding loops log them and carry on.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("interface by name {name}: {source}")]
    InterfaceNotFound {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to listen on {name}: {source}")]
    Socket {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("eapol-relay is already running!")]
    AlreadyRunning,

    #[error("Failed to set up logging: {0}")]
    Logging(String),

    #[error("Forwarding task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO Error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
