//! Error types for the simulation layer

use thiserror::Error;

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Simulation errors
#[derive(Error, Debug)]
pub enum Error {
    /// Network core error
    #[error("Network error: {0}")]
    Network(#[from] network_core::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A spawned task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),

    /// IO error (config file loading)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
